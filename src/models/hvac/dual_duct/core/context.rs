//! Collaborators owned by the surrounding simulation.
//!
//! Terminals never own zone, schedule or air-loop data. They read it
//! through [`StepContext`] while stepping and through [`ConfigContext`]
//! while the store is built. Air nodes live in a caller-owned [`AirNodes`]
//! table that terminals read from and publish to.

use std::ops::{Index, IndexMut};

use uom::{
    ConstZero,
    si::{
        f64::{
            MassDensity, MassRate, Power, Pressure, Ratio, ThermodynamicTemperature, VolumeRate,
        },
        pressure::pascal,
        ratio::ratio,
        thermodynamic_temperature::degree_celsius,
    },
};

use crate::support::{psychrometrics, units::SpecificEnthalpy};

use super::ids::{
    AirLoopId, DistributionUnitId, NodeId, OutdoorAirRequirementId, ScheduleId, ZoneId,
};

/// State of one air node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirNode {
    pub temperature: ThermodynamicTemperature,
    pub humidity_ratio: Ratio,
    pub enthalpy: SpecificEnthalpy,
    pub mass_flow: MassRate,
    pub mass_flow_max: MassRate,
    pub mass_flow_min: MassRate,
    pub max_avail: MassRate,
    pub min_avail: MassRate,
    pub pressure: Pressure,
    pub quality: f64,
    /// Carbon dioxide concentration, ppm.
    pub co2: f64,
    pub generic_contaminant: f64,
}

impl AirNode {
    /// Creates a node at the given air condition with no flow.
    #[must_use]
    pub fn at(temperature: ThermodynamicTemperature, humidity_ratio: Ratio) -> Self {
        Self {
            temperature,
            humidity_ratio,
            enthalpy: psychrometrics::enthalpy(temperature, humidity_ratio),
            mass_flow: MassRate::ZERO,
            mass_flow_max: MassRate::ZERO,
            mass_flow_min: MassRate::ZERO,
            max_avail: MassRate::ZERO,
            min_avail: MassRate::ZERO,
            pressure: Pressure::new::<pascal>(101_325.0),
            quality: 0.0,
            co2: 0.0,
            generic_contaminant: 0.0,
        }
    }

    /// Returns this node with flow and availability set.
    #[must_use]
    pub fn with_flow(self, mass_flow: MassRate, max_avail: MassRate) -> Self {
        Self {
            mass_flow,
            max_avail,
            ..self
        }
    }
}

impl Default for AirNode {
    fn default() -> Self {
        Self::at(
            ThermodynamicTemperature::new::<degree_celsius>(20.0),
            Ratio::new::<ratio>(0.0),
        )
    }
}

/// Caller-owned table of air nodes addressed by [`NodeId`].
#[derive(Debug, Clone, Default)]
pub struct AirNodes {
    nodes: Vec<AirNode>,
}

impl AirNodes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node and returns its id.
    pub fn add(&mut self, node: AirNode) -> NodeId {
        let id = id_at(self.nodes.len());
        self.nodes.push(node);
        id
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&AirNode> {
        self.nodes.get(id.index() as usize)
    }

    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }
}

/// Id of the node at `index`, saturating past the last representable id.
fn id_at(index: usize) -> NodeId {
    NodeId::from_index(u32::try_from(index).unwrap_or(u32::MAX))
}

/// Indexing panics on ids that do not belong to this table.
impl Index<NodeId> for AirNodes {
    type Output = AirNode;

    fn index(&self, id: NodeId) -> &AirNode {
        &self.nodes[id.index() as usize]
    }
}

impl IndexMut<NodeId> for AirNodes {
    fn index_mut(&mut self, id: NodeId) -> &mut AirNode {
        &mut self.nodes[id.index() as usize]
    }
}

/// Remaining thermal demand of a zone this iteration.
///
/// Positive outputs call for heating, negative for cooling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneDemand {
    pub remaining_output: Power,
    pub output_to_heating_setpoint: Power,
    pub output_to_cooling_setpoint: Power,
    /// Load-compensation multiplier on supply flow; only values above 1 apply.
    pub supply_air_adjust_factor: f64,
    pub heating_setpoint: ThermodynamicTemperature,
    pub cooling_setpoint: ThermodynamicTemperature,
}

impl Default for ZoneDemand {
    fn default() -> Self {
        Self {
            remaining_output: Power::ZERO,
            output_to_heating_setpoint: Power::ZERO,
            output_to_cooling_setpoint: Power::ZERO,
            supply_air_adjust_factor: 1.0,
            heating_setpoint: ThermodynamicTemperature::new::<degree_celsius>(21.0),
            cooling_setpoint: ThermodynamicTemperature::new::<degree_celsius>(24.0),
        }
    }
}

/// Outdoor-air status of the primary air loop serving a terminal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirLoopStatus {
    pub outdoor_air_fraction: Ratio,
    /// Demand-controlled ventilation is active on the loop.
    pub demand_controlled_ventilation: bool,
}

/// Final design supply flows of a zone, from zone sizing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneDesignFlows {
    pub cooling: VolumeRate,
    pub heating: VolumeRate,
}

/// How a design outdoor-air requirement should be evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutdoorAirRequest {
    pub requirement: OutdoorAirRequirementId,
    pub zone: ZoneId,
    /// Scale per-person rates by current occupancy rather than design occupancy.
    pub use_occupancy_schedule: bool,
    /// Apply the requirement's minimum outdoor-air schedule.
    pub use_min_outdoor_air_schedule: bool,
    /// The terminal gave no per-person mode; the resolver picks its default.
    pub per_person_not_set: bool,
    /// Return the design-level (maximum) flow instead of the current one.
    pub max_design_level: bool,
}

/// Connection of a terminal to its zone, found through its distribution unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneLink {
    pub distribution_unit: DistributionUnitId,
    pub zone: ZoneId,
    pub zone_node: NodeId,
    /// Zone inlet node fed by the terminal outlet, used to find the air loop.
    pub zone_inlet: NodeId,
}

/// Which contaminants the surrounding simulation tracks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContaminantTracking {
    pub co2: bool,
    pub generic: bool,
}

/// Resolves design outdoor-air requirements to volume flows.
pub trait OutdoorAirResolver {
    /// Outdoor-air volume flow required for `request`.
    fn outdoor_air_volume_flow(&self, request: &OutdoorAirRequest) -> VolumeRate;

    /// Per-person outdoor-air rate of a requirement.
    ///
    /// Zero when the requirement's method does not include a per-person term.
    fn per_person_rate(&self, requirement: OutdoorAirRequirementId) -> VolumeRate;
}

/// Read-only view of the simulation used while building a [`TerminalStore`].
///
/// [`TerminalStore`]: super::TerminalStore
pub trait ConfigContext: OutdoorAirResolver {
    fn schedule(&self, name: &str) -> Option<ScheduleId>;

    fn outdoor_air_requirement(&self, name: &str) -> Option<OutdoorAirRequirementId>;

    /// Zone connection of the distribution unit whose outlet is `outlet`.
    fn distribution_unit(&self, outlet: NodeId) -> Option<ZoneLink>;
}

/// Read-only view of the simulation used while stepping terminals.
pub trait StepContext: OutdoorAirResolver {
    /// Current value of a schedule.
    fn schedule_value(&self, schedule: ScheduleId) -> f64;

    fn zone_demand(&self, zone: ZoneId) -> ZoneDemand;

    /// Air loop feeding `zone_inlet`, once the loop topology is known.
    fn air_loop_serving(&self, zone: ZoneId, zone_inlet: NodeId) -> Option<AirLoopId>;

    fn air_loop_status(&self, air_loop: AirLoopId) -> AirLoopStatus;

    /// Zone design flows, when zone sizing has run.
    fn zone_design_flows(&self, zone: ZoneId) -> Option<ZoneDesignFlows>;

    /// Design number of occupants in a zone.
    fn zone_design_occupants(&self, zone: ZoneId) -> f64;

    fn standard_air_density(&self) -> MassDensity {
        psychrometrics::standard_density()
    }

    fn contaminants(&self) -> ContaminantTracking {
        ContaminantTracking::default()
    }
}
