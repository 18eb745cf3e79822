//! Dual-duct terminal modeling.
//!
//! A dual-duct terminal mixes two supply streams into one zone inlet. Hot/cold
//! terminals (constant-volume and VAV) blend a heating deck with a cooling
//! deck to meet the zone load. Outdoor-air terminals set a dedicated
//! ventilation duct from the zone's outdoor-air requirement and let an
//! optional recirculated-air duct carry the remaining cooling.
//!
//! The flow solvers ([`ConstantVolumeMixer`], [`VariableVolumeMixer`],
//! [`OutdoorAirMixer`]) are pure [`twine_core::Model`]s. The [`TerminalStore`]
//! owns everything that persists between steps and drives the solvers
//! through init, solve and update.

mod config;
mod context;
mod definition;
mod error;
mod ids;
mod lane;
mod mixing;
mod outdoor_air;
mod sizing;
mod solve;
mod store;
mod terminal;

#[cfg(test)]
pub(super) mod test_support;

pub use config::SolverConfig;
pub use context::{
    AirLoopStatus, AirNode, AirNodes, ConfigContext, ContaminantTracking, OutdoorAirRequest,
    OutdoorAirResolver, StepContext, ZoneDemand, ZoneDesignFlows, ZoneLink,
};
pub use definition::{
    MaxAirFlow, PerPersonMode, TerminalDefinition, TerminalKind, recirculation_is_used,
};
pub use error::{ConfigDefect, ConfigError, SimulationError};
pub use ids::{AirLoopId, DistributionUnitId, NodeId, OutdoorAirRequirementId, ScheduleId, ZoneId};
pub use lane::{FlowHistory, FlowState};
pub use sizing::DesignFlows;
pub use solve::{
    ConstantVolumeInput, ConstantVolumeMixer, HotColdMix, OutdoorAirInput, OutdoorAirMix,
    OutdoorAirMixer, RecirculatedInput, VariableVolumeInput, VariableVolumeMix,
    VariableVolumeMixer, ZoneAir,
};
pub use store::{TerminalHandle, TerminalStore};
pub use terminal::{StepFlags, Telemetry};
