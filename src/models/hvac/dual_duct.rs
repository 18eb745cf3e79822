//! Dual-duct air terminal models.
//!
//! Three terminal variants share one lifecycle:
//!
//! - **Constant volume**: fixed total flow split between a hot and a cold
//!   duct to meet the zone load.
//! - **Variable volume (VAV)**: total flow follows the load between a
//!   minimum-fraction floor and the available maximum, raised to carry the
//!   zone's outdoor-air requirement, then split like constant volume.
//! - **VAV with outdoor air**: a dedicated outdoor-air duct carries the
//!   ventilation requirement; an optional recirculated duct meets the
//!   remaining cooling load.
//!
//! Build a [`TerminalStore`] once from [`TerminalDefinition`]s, resolve each
//! terminal's [`TerminalHandle`] by name, and call
//! [`TerminalStore::simulate`] every step with the caller-owned
//! [`AirNodes`] table and a [`StepContext`].
//!
//! The per-step solvers are also usable on their own as
//! [`twine_core::Model`]s: [`ConstantVolumeMixer`], [`VariableVolumeMixer`]
//! and [`OutdoorAirMixer`].

pub(crate) mod core;

pub use self::core::{
    AirLoopId, AirLoopStatus, AirNode, AirNodes, ConfigContext, ConfigDefect, ConfigError,
    ConstantVolumeInput, ConstantVolumeMixer, ContaminantTracking, DesignFlows,
    DistributionUnitId, FlowHistory, FlowState, HotColdMix, MaxAirFlow, NodeId,
    OutdoorAirInput, OutdoorAirMix, OutdoorAirMixer, OutdoorAirRequest,
    OutdoorAirRequirementId, OutdoorAirResolver, PerPersonMode, RecirculatedInput,
    ScheduleId, SimulationError, SolverConfig, StepContext, StepFlags, Telemetry,
    TerminalDefinition, TerminalHandle, TerminalKind, TerminalStore, VariableVolumeInput,
    VariableVolumeMix, VariableVolumeMixer, ZoneAir, ZoneDemand, ZoneDesignFlows, ZoneId,
    ZoneLink, recirculation_is_used,
};
