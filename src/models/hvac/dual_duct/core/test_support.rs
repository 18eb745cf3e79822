//! Shared fixtures for dual-duct tests.

use std::collections::HashMap;

use uom::si::{
    f64::{MassRate, Ratio, ThermodynamicTemperature, VolumeRate},
    mass_density::kilogram_per_cubic_meter,
    mass_rate::kilogram_per_second,
    ratio::ratio,
    thermodynamic_temperature::degree_celsius,
    volume_rate::cubic_meter_per_second,
};

use crate::support::psychrometrics;

use super::{
    context::{
        AirLoopStatus, ConfigContext, ContaminantTracking, OutdoorAirRequest, OutdoorAirResolver,
        StepContext, ZoneDemand, ZoneDesignFlows, ZoneLink,
    },
    ids::{AirLoopId, DistributionUnitId, NodeId, OutdoorAirRequirementId, ScheduleId, ZoneId},
    lane::FlowState,
    solve::ZoneAir,
};

pub(crate) fn kg_s(value: f64) -> MassRate {
    MassRate::new::<kilogram_per_second>(value)
}

pub(crate) fn m3_s(value: f64) -> VolumeRate {
    VolumeRate::new::<cubic_meter_per_second>(value)
}

pub(crate) fn celsius(value: f64) -> ThermodynamicTemperature {
    ThermodynamicTemperature::new::<degree_celsius>(value)
}

pub(crate) fn humidity(value: f64) -> Ratio {
    Ratio::new::<ratio>(value)
}

/// Standard air density in kg/m³.
pub(crate) fn std_density() -> f64 {
    psychrometrics::standard_density().get::<kilogram_per_cubic_meter>()
}

/// A lane at the given flows (kg/s) and air condition (°C, kg/kg).
pub(crate) fn lane(flow: f64, max_avail: f64, max: f64, t: f64, w: f64) -> FlowState {
    FlowState::default()
        .with_flows(kg_s(flow), kg_s(max_avail), kg_s(max))
        .with_air(celsius(t), humidity(w))
}

pub(crate) fn zone_air(t: f64, w: f64) -> ZoneAir {
    ZoneAir {
        temperature: celsius(t),
        humidity_ratio: humidity(w),
    }
}

#[derive(Debug, Clone)]
struct Requirement {
    name: Option<String>,
    volume: VolumeRate,
    per_person: VolumeRate,
}

/// In-memory simulation context with a single zone.
///
/// Requirements resolve to a fixed volume; design-level requests are
/// scaled by [`set_design_level_scale`](Self::set_design_level_scale).
#[derive(Debug, Clone)]
pub(crate) struct TestContext {
    requirements: Vec<Requirement>,
    air_loops: Vec<AirLoopStatus>,
    schedules: Vec<(String, f64)>,
    links: HashMap<NodeId, ZoneLink>,
    design_level_scale: f64,
    design_occupants: f64,
    demand: ZoneDemand,
    serving_loop: Option<AirLoopId>,
    zone_design: Option<ZoneDesignFlows>,
    contaminants: ContaminantTracking,
}

impl TestContext {
    pub(crate) fn new() -> Self {
        Self {
            requirements: Vec::new(),
            air_loops: Vec::new(),
            schedules: Vec::new(),
            links: HashMap::new(),
            design_level_scale: 1.0,
            design_occupants: 0.0,
            demand: ZoneDemand::default(),
            serving_loop: None,
            zone_design: None,
            contaminants: ContaminantTracking::default(),
        }
    }

    fn push_requirement(
        &mut self,
        name: Option<&str>,
        volume: f64,
        per_person: f64,
    ) -> OutdoorAirRequirementId {
        let id = OutdoorAirRequirementId::from_index(index(self.requirements.len()));
        self.requirements.push(Requirement {
            name: name.map(str::to_owned),
            volume: m3_s(volume),
            per_person: m3_s(per_person),
        });
        id
    }

    /// Adds an unnamed requirement (m³/s total, m³/s per person).
    pub(crate) fn add_requirement(&mut self, volume: f64, per_person: f64) -> OutdoorAirRequirementId {
        self.push_requirement(None, volume, per_person)
    }

    pub(crate) fn add_named_requirement(
        &mut self,
        name: &str,
        volume: f64,
        per_person: f64,
    ) -> OutdoorAirRequirementId {
        self.push_requirement(Some(name), volume, per_person)
    }

    pub(crate) fn add_air_loop(&mut self, fraction: f64, dcv: bool) -> AirLoopId {
        let id = AirLoopId::from_index(index(self.air_loops.len()));
        self.air_loops.push(AirLoopStatus {
            outdoor_air_fraction: Ratio::new::<ratio>(fraction),
            demand_controlled_ventilation: dcv,
        });
        id
    }

    pub(crate) fn add_schedule(&mut self, name: &str, value: f64) -> ScheduleId {
        let id = ScheduleId::from_index(index(self.schedules.len()));
        self.schedules.push((name.to_owned(), value));
        id
    }

    pub(crate) fn set_schedule_value(&mut self, id: ScheduleId, value: f64) {
        self.schedules[id.index() as usize].1 = value;
    }

    /// Connects `outlet` to zone 0 through distribution unit `unit`.
    pub(crate) fn link(&mut self, outlet: NodeId, unit: u32, zone_node: NodeId) {
        self.links.insert(
            outlet,
            ZoneLink {
                distribution_unit: DistributionUnitId::from_index(unit),
                zone: ZoneId::from_index(0),
                zone_node,
                zone_inlet: outlet,
            },
        );
    }

    pub(crate) fn set_design_level_scale(&mut self, scale: f64) {
        self.design_level_scale = scale;
    }

    pub(crate) fn set_design_occupants(&mut self, occupants: f64) {
        self.design_occupants = occupants;
    }

    pub(crate) fn set_demand(&mut self, demand: ZoneDemand) {
        self.demand = demand;
    }

    pub(crate) fn serve_with(&mut self, air_loop: AirLoopId) {
        self.serving_loop = Some(air_loop);
    }

    pub(crate) fn set_zone_design(&mut self, cooling: f64, heating: f64) {
        self.zone_design = Some(ZoneDesignFlows {
            cooling: m3_s(cooling),
            heating: m3_s(heating),
        });
    }

    pub(crate) fn track_contaminants(&mut self) {
        self.contaminants = ContaminantTracking {
            co2: true,
            generic: true,
        };
    }
}

fn index(len: usize) -> u32 {
    u32::try_from(len).expect("test fixtures stay small")
}

impl OutdoorAirResolver for TestContext {
    fn outdoor_air_volume_flow(&self, request: &OutdoorAirRequest) -> VolumeRate {
        let volume = self.requirements[request.requirement.index() as usize].volume;
        if request.max_design_level {
            volume * self.design_level_scale
        } else {
            volume
        }
    }

    fn per_person_rate(&self, requirement: OutdoorAirRequirementId) -> VolumeRate {
        self.requirements[requirement.index() as usize].per_person
    }
}

impl ConfigContext for TestContext {
    fn schedule(&self, name: &str) -> Option<ScheduleId> {
        self.schedules
            .iter()
            .position(|(schedule, _)| schedule.eq_ignore_ascii_case(name))
            .map(|i| ScheduleId::from_index(index(i)))
    }

    fn outdoor_air_requirement(&self, name: &str) -> Option<OutdoorAirRequirementId> {
        self.requirements
            .iter()
            .position(|requirement| {
                requirement
                    .name
                    .as_deref()
                    .is_some_and(|known| known.eq_ignore_ascii_case(name))
            })
            .map(|i| OutdoorAirRequirementId::from_index(index(i)))
    }

    fn distribution_unit(&self, outlet: NodeId) -> Option<ZoneLink> {
        self.links.get(&outlet).copied()
    }
}

impl StepContext for TestContext {
    fn schedule_value(&self, schedule: ScheduleId) -> f64 {
        self.schedules[schedule.index() as usize].1
    }

    fn zone_demand(&self, _zone: ZoneId) -> ZoneDemand {
        self.demand
    }

    fn air_loop_serving(&self, _zone: ZoneId, _zone_inlet: NodeId) -> Option<AirLoopId> {
        self.serving_loop
    }

    fn air_loop_status(&self, air_loop: AirLoopId) -> AirLoopStatus {
        self.air_loops[air_loop.index() as usize]
    }

    fn zone_design_flows(&self, _zone: ZoneId) -> Option<ZoneDesignFlows> {
        self.zone_design
    }

    fn zone_design_occupants(&self, _zone: ZoneId) -> f64 {
        self.design_occupants
    }

    fn contaminants(&self) -> ContaminantTracking {
        self.contaminants
    }
}
