//! One configured terminal and its per-step lifecycle.
//!
//! A step runs init (sizing, begin-environment bounds, air-loop lookup,
//! first-iteration resets, lane refresh), dispatches to the variant's mixer,
//! then publishes the solved state to the node table.

use tracing::{debug, warn};
use twine_core::Model;
use uom::{
    ConstZero,
    si::{
        f64::{MassRate, VolumeRate},
        mass_rate::kilogram_per_second,
        ratio::ratio,
    },
};

use crate::support::constraint::{Constrained, UnitInterval};

use super::{
    config::SolverConfig,
    context::{AirNode, AirNodes, StepContext, ZoneLink},
    definition::{MaxAirFlow, PerPersonMode},
    ids::{AirLoopId, NodeId, OutdoorAirRequirementId, ScheduleId},
    lane::{FlowHistory, FlowState},
    mixing::{larger, smaller},
    outdoor_air::Ventilation,
    sizing::{self, DesignFlows, SizingLayout},
    solve::{
        ConstantVolumeInput, ConstantVolumeMixer, HotColdMix, OutdoorAirInput, OutdoorAirMixer,
        RecirculatedInput, VariableVolumeInput, VariableVolumeMixer, ZoneAir,
    },
};

/// Simulation state flags passed with every step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepFlags {
    /// First iteration of the air-loop/zone-equipment loop this time step.
    pub first_iteration: bool,
    /// The simulation is starting a new environment (design day or run period).
    pub begin_environment: bool,
    /// System sizing is still running; autosizing waits until it ends.
    pub system_sizing: bool,
}

/// Damper and outdoor-air telemetry from the latest step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Telemetry {
    ConstantVolume {
        hot_damper: Constrained<f64, UnitInterval>,
        cold_damper: Constrained<f64, UnitInterval>,
    },
    VariableVolume {
        hot_damper: Constrained<f64, UnitInterval>,
        cold_damper: Constrained<f64, UnitInterval>,
        /// Outdoor air carried in the supply at the air loop's OA fraction.
        outdoor_air_volume_flow: VolumeRate,
    },
    OutdoorAir {
        outdoor_air_damper: Constrained<f64, UnitInterval>,
        /// `None` when the terminal has no recirculated duct.
        recirculated_damper: Option<Constrained<f64, UnitInterval>>,
        outdoor_air_fraction: Constrained<f64, UnitInterval>,
        /// Per-person outdoor air at the zone's design occupancy.
        per_person_design_level: VolumeRate,
    },
}

/// One inlet duct: the node it reads from and its lane state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct Duct {
    pub node: NodeId,
    pub lane: FlowState,
}

impl Duct {
    pub(super) fn new(node: NodeId) -> Self {
        Self {
            node,
            lane: FlowState::default(),
        }
    }

    /// Loads flow and air condition from the node.
    fn refresh_point(&mut self, node: &AirNode) {
        self.lane.mass_flow = node.mass_flow;
        self.lane.temperature = node.temperature;
        self.lane.humidity_ratio = node.humidity_ratio;
        self.lane.enthalpy = node.enthalpy;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct RecirculatedDuct {
    pub duct: Duct,
    pub history: FlowHistory,
    pub oscillation_threshold: MassRate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum Variant {
    ConstantVolume {
        hot: Duct,
        cold: Duct,
    },
    VariableVolume {
        hot: Duct,
        cold: Duct,
        zone_min_air_fraction: Constrained<f64, UnitInterval>,
        outdoor_air_requirement: Option<OutdoorAirRequirementId>,
    },
    OutdoorAir {
        outdoor_air: Duct,
        recirculated: Option<RecirculatedDuct>,
        outdoor_air_requirement: Option<OutdoorAirRequirementId>,
        per_person_mode: Option<PerPersonMode>,
        per_person_design_level: VolumeRate,
    },
}

/// Lazy one-time work still owed by a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Pending {
    pub sizing: bool,
    pub begin_environment: bool,
    /// The first handle-based call still has to confirm the name.
    pub name_check: bool,
}

impl Default for Pending {
    fn default() -> Self {
        Self {
            sizing: true,
            begin_environment: true,
            name_check: true,
        }
    }
}

/// A configured dual-duct terminal.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct TerminalUnit {
    pub name: String,
    pub schedule: Option<ScheduleId>,
    pub outlet_node: NodeId,
    pub link: ZoneLink,
    pub max_air_flow: MaxAirFlow,
    pub design: DesignFlows,
    pub variant: Variant,
    pub outlet: FlowState,
    pub air_loop: Option<AirLoopId>,
    pub pending: Pending,
    /// Not on any zone equipment list; never simulated.
    pub excluded: bool,
    pub telemetry: Telemetry,
}

impl TerminalUnit {
    /// Every node this terminal reads or writes, zone node included.
    pub(super) fn nodes(&self) -> Vec<NodeId> {
        let mut nodes = vec![self.outlet_node, self.link.zone_node];
        match &self.variant {
            Variant::ConstantVolume { hot, cold } | Variant::VariableVolume { hot, cold, .. } => {
                nodes.extend([hot.node, cold.node]);
            }
            Variant::OutdoorAir {
                outdoor_air,
                recirculated,
                ..
            } => {
                nodes.push(outdoor_air.node);
                nodes.extend(recirculated.map(|recirculated| recirculated.duct.node));
            }
        }
        nodes
    }

    /// Runs one full step and returns the new telemetry.
    ///
    /// Callers must have checked that every id in [`nodes`](Self::nodes)
    /// exists in `nodes`.
    pub(super) fn step(
        &mut self,
        flags: StepFlags,
        ctx: &impl StepContext,
        nodes: &mut AirNodes,
        config: &SolverConfig,
    ) -> Telemetry {
        let schedule_value = self.schedule.map_or(1.0, |id| ctx.schedule_value(id));

        if !flags.system_sizing && self.pending.sizing {
            self.size(ctx, config);
            self.pending.sizing = false;
        }

        if flags.begin_environment && self.pending.begin_environment {
            self.begin_environment(ctx, nodes, config);
            self.pending.begin_environment = false;
        }
        if !flags.begin_environment {
            self.pending.begin_environment = true;
        }

        if self.air_loop.is_none() {
            self.air_loop = ctx.air_loop_serving(self.link.zone, self.link.zone_inlet);
        }

        if flags.first_iteration {
            self.reset_inlets(schedule_value > 0.0, nodes);
        }
        self.refresh_lanes(nodes);

        self.telemetry = self.solve(schedule_value, ctx, nodes, config);
        self.publish(ctx, nodes);
        self.telemetry
    }

    fn size(&mut self, ctx: &impl StepContext, config: &SolverConfig) {
        let density = ctx.standard_air_density();
        if self.max_air_flow != MaxAirFlow::Autosize {
            self.design.max_mass = self.design.max_volume * density;
            return;
        }

        let layout = match &self.variant {
            Variant::OutdoorAir { recirculated, .. } => SizingLayout::OutdoorAir {
                recirculation: recirculated.is_some(),
            },
            Variant::ConstantVolume { .. } | Variant::VariableVolume { .. } => {
                SizingLayout::HotCold
            }
        };

        let Some(zone) = ctx.zone_design_flows(self.link.zone) else {
            warn!(
                terminal = self.name.as_str(),
                "no zone design flows for an autosized terminal; maximum air flow is zero"
            );
            self.design = DesignFlows::default();
            return;
        };
        self.design = sizing::size(
            &self.name,
            layout,
            zone,
            self.design.outdoor_air_volume,
            density,
            config,
        );
    }

    /// Sets design maxima on lanes and nodes for a new environment.
    fn begin_environment(
        &mut self,
        ctx: &impl StepContext,
        nodes: &mut AirNodes,
        config: &SolverConfig,
    ) {
        let density = ctx.standard_air_density();
        let design = self.design;
        let outlet = &mut nodes[self.outlet_node];

        match &mut self.variant {
            Variant::ConstantVolume { hot, cold } => {
                outlet.mass_flow_max = design.max_volume * density;
                outlet.mass_flow_min = MassRate::ZERO;
                let max = outlet.mass_flow_max;
                hot_cold_maxima(hot, cold, max, nodes);
            }
            Variant::VariableVolume {
                hot,
                cold,
                zone_min_air_fraction,
                ..
            } => {
                outlet.mass_flow_max = design.max_volume * density;
                outlet.mass_flow_min = outlet.mass_flow_max * zone_min_air_fraction.into_inner();
                let max = outlet.mass_flow_max;
                hot_cold_maxima(hot, cold, max, nodes);
            }
            Variant::OutdoorAir {
                outdoor_air,
                recirculated,
                outdoor_air_requirement,
                per_person_mode,
                per_person_design_level,
            } => {
                outlet.mass_flow_max = design.max_mass;
                outlet.mass_flow_min = MassRate::ZERO;

                outdoor_air.lane.max = design.outdoor_air_volume * density;
                let oa_node = &mut nodes[outdoor_air.node];
                oa_node.mass_flow_max = outdoor_air.lane.max;
                oa_node.mass_flow_min = MassRate::ZERO;

                if let Some(recirculated) = recirculated {
                    recirculated.duct.lane.max = design.recirculated_volume * density;
                    recirculated.oscillation_threshold =
                        recirculated.duct.lane.max * config.oscillation_threshold_fraction;
                    let ra_node = &mut nodes[recirculated.duct.node];
                    ra_node.mass_flow_max = recirculated.duct.lane.max;
                    ra_node.mass_flow_min = MassRate::ZERO;
                }
                *per_person_design_level = Ventilation {
                    terminal: &self.name,
                    requirement: *outdoor_air_requirement,
                    zone: self.link.zone,
                    per_person_mode: *per_person_mode,
                }
                .per_person_design_level(ctx);
            }
        }
    }

    /// Resets inlet node flows and availabilities on the first iteration.
    ///
    /// Running inlets restart at their design maxima; stopped inlets or an
    /// unscheduled unit get zero.
    fn reset_inlets(&mut self, scheduled: bool, nodes: &mut AirNodes) {
        let restart = |value: MassRate, max: MassRate| {
            if value > MassRate::ZERO && scheduled {
                max
            } else {
                MassRate::ZERO
            }
        };

        match &mut self.variant {
            Variant::ConstantVolume { hot, cold } => {
                for duct in [hot, cold] {
                    let node = &mut nodes[duct.node];
                    node.mass_flow = restart(node.mass_flow, duct.lane.max);
                    node.max_avail = restart(node.max_avail, duct.lane.max);
                    node.min_avail = MassRate::ZERO;
                }
            }
            Variant::VariableVolume {
                hot,
                cold,
                zone_min_air_fraction,
                ..
            } => {
                let fraction = zone_min_air_fraction.into_inner();
                for duct in [hot, cold] {
                    let node = &mut nodes[duct.node];
                    node.mass_flow = restart(node.mass_flow, duct.lane.max);
                    node.max_avail = restart(node.max_avail, duct.lane.max);
                    node.min_avail = restart(node.mass_flow, duct.lane.max * fraction);
                }
            }
            Variant::OutdoorAir {
                outdoor_air,
                recirculated,
                ..
            } => {
                let node = &mut nodes[outdoor_air.node];
                node.mass_flow = restart(node.mass_flow, outdoor_air.lane.max);
                node.max_avail = restart(node.max_avail, outdoor_air.lane.max);
                node.min_avail = MassRate::ZERO;

                if let Some(recirculated) = recirculated {
                    let node = &mut nodes[recirculated.duct.node];
                    node.mass_flow = restart(node.mass_flow, recirculated.duct.lane.max);
                    node.max_avail = restart(node.max_avail, recirculated.duct.lane.max);
                    node.min_avail = MassRate::ZERO;
                    recirculated.history.clear();
                }
            }
        }
    }

    /// Loads lane bounds and point values from the nodes for this step.
    fn refresh_lanes(&mut self, nodes: &AirNodes) {
        let outlet = &nodes[self.outlet_node];
        match &mut self.variant {
            Variant::ConstantVolume { hot, cold } | Variant::VariableVolume { hot, cold, .. } => {
                for duct in [hot, cold] {
                    let node = &nodes[duct.node];
                    duct.lane.max_avail = smaller(outlet.mass_flow_max, node.max_avail);
                    duct.lane.min_avail = smaller(
                        larger(outlet.mass_flow_min, node.min_avail),
                        node.max_avail,
                    );
                    duct.refresh_point(node);
                }
            }
            Variant::OutdoorAir {
                outdoor_air,
                recirculated,
                ..
            } => {
                let ducts = [Some(outdoor_air), recirculated.as_mut().map(|r| &mut r.duct)];
                for duct in ducts.into_iter().flatten() {
                    let node = &nodes[duct.node];
                    duct.lane.max_avail = node.max_avail;
                    duct.lane.min_avail = node.min_avail;
                    duct.refresh_point(node);
                }
            }
        }
    }

    fn solve(
        &mut self,
        schedule_value: f64,
        ctx: &impl StepContext,
        nodes: &AirNodes,
        config: &SolverConfig,
    ) -> Telemetry {
        let Self {
            name,
            link,
            variant,
            outlet,
            air_loop,
            ..
        } = self;

        let zone_node = &nodes[link.zone_node];
        let zone = ZoneAir {
            temperature: zone_node.temperature,
            humidity_ratio: zone_node.humidity_ratio,
        };
        let demand = ctx.zone_demand(link.zone);

        match variant {
            Variant::ConstantVolume { hot, cold } => {
                let Ok(mix) = ConstantVolumeMixer::new(*config).call(&ConstantVolumeInput {
                    schedule_value,
                    remaining_load: demand.remaining_output,
                    zone,
                    hot: hot.lane,
                    cold: cold.lane,
                });
                *outlet = apply_hot_cold(&mix, hot, cold);
                Telemetry::ConstantVolume {
                    hot_damper: mix.hot_damper,
                    cold_damper: mix.cold_damper,
                }
            }
            Variant::VariableVolume {
                hot,
                cold,
                zone_min_air_fraction,
                outdoor_air_requirement,
            } => {
                let supply = Ventilation {
                    terminal: name,
                    requirement: *outdoor_air_requirement,
                    zone: link.zone,
                    per_person_mode: None,
                }
                .supply_flow_for_oa_fraction(*air_loop, ctx, config);

                let Ok(out) = VariableVolumeMixer::new(*config).call(&VariableVolumeInput {
                    schedule_value,
                    demand,
                    zone,
                    hot: hot.lane,
                    cold: cold.lane,
                    zone_min_air_fraction: *zone_min_air_fraction,
                    outdoor_air_floor: supply.supply_flow,
                    air_loop_outdoor_air_fraction: supply.air_loop_fraction,
                });
                *outlet = apply_hot_cold(&out.mix, hot, cold);
                Telemetry::VariableVolume {
                    hot_damper: out.mix.hot_damper,
                    cold_damper: out.mix.cold_damper,
                    outdoor_air_volume_flow: out.outdoor_air_flow / ctx.standard_air_density(),
                }
            }
            Variant::OutdoorAir {
                outdoor_air,
                recirculated,
                outdoor_air_requirement,
                per_person_mode,
                per_person_design_level,
            } => {
                let required = Ventilation {
                    terminal: name,
                    requirement: *outdoor_air_requirement,
                    zone: link.zone,
                    per_person_mode: *per_person_mode,
                }
                .oa_only_mass_flow(ctx);

                let Ok(out) = OutdoorAirMixer::new(*config).call(&OutdoorAirInput {
                    schedule_value,
                    demand,
                    zone,
                    outdoor_air: outdoor_air.lane,
                    recirculated: recirculated.map(|r| RecirculatedInput {
                        state: r.duct.lane,
                        history: r.history,
                        oscillation_threshold: r.oscillation_threshold,
                    }),
                    required_outdoor_air: required,
                });

                outdoor_air.lane.mass_flow = out.outdoor_air_flow;
                if let Some(recirculated) = recirculated {
                    recirculated.duct.lane.mass_flow = out.recirculated_flow;
                    recirculated.history.push(out.recirculated_flow);
                }
                if out.oscillation_damped {
                    debug!(
                        terminal = name.as_str(),
                        held_kg_s = out.recirculated_flow.get::<kilogram_per_second>(),
                        "recirculated flow oscillating; holding previous value"
                    );
                }
                *outlet = out.outlet;
                Telemetry::OutdoorAir {
                    outdoor_air_damper: out.outdoor_air_damper,
                    recirculated_damper: out.recirculated_damper,
                    outdoor_air_fraction: out.outdoor_air_fraction,
                    per_person_design_level: *per_person_design_level,
                }
            }
        }
    }

    /// Writes lane flows to the inlets and the mixed state to the outlet.
    fn publish(&self, ctx: &impl StepContext, nodes: &mut AirNodes) {
        let (first, second) = match &self.variant {
            Variant::ConstantVolume { hot, cold } | Variant::VariableVolume { hot, cold, .. } => {
                (hot, Some(cold))
            }
            Variant::OutdoorAir {
                outdoor_air,
                recirculated,
                ..
            } => (outdoor_air, recirculated.as_ref().map(|r| &r.duct)),
        };

        nodes[first.node].mass_flow = first.lane.mass_flow;
        if let Some(second) = second {
            nodes[second.node].mass_flow = second.lane.mass_flow;
        }

        let source = nodes[first.node];
        let other = second.map(|duct| nodes[duct.node]);
        let tracking = ctx.contaminants();
        let flow = self.outlet.mass_flow;

        let outlet = &mut nodes[self.outlet_node];
        outlet.mass_flow = flow;
        outlet.max_avail = flow;
        outlet.min_avail = self.outlet.min_avail;
        outlet.temperature = self.outlet.temperature;
        outlet.humidity_ratio = self.outlet.humidity_ratio;
        outlet.enthalpy = self.outlet.enthalpy;
        outlet.pressure = source.pressure;
        outlet.quality = source.quality;

        if tracking.co2 {
            outlet.co2 = blend(&source, other.as_ref(), flow, |node| node.co2);
        }
        if tracking.generic {
            outlet.generic_contaminant =
                blend(&source, other.as_ref(), flow, |node| node.generic_contaminant);
        }
    }
}

fn hot_cold_maxima(hot: &mut Duct, cold: &mut Duct, max: MassRate, nodes: &mut AirNodes) {
    for duct in [hot, cold] {
        duct.lane.max = max;
        let node = &mut nodes[duct.node];
        node.mass_flow_max = max;
        node.mass_flow_min = MassRate::ZERO;
    }
}

fn apply_hot_cold(mix: &HotColdMix, hot: &mut Duct, cold: &mut Duct) -> FlowState {
    hot.lane.mass_flow = mix.hot_flow;
    cold.lane.mass_flow = mix.cold_flow;
    mix.outlet
}

/// Flow-weighted contaminant level at the outlet.
///
/// A single inlet passes straight through. At zero outlet flow the inlets
/// are averaged.
fn blend(
    first: &AirNode,
    second: Option<&AirNode>,
    outlet_flow: MassRate,
    level: impl Fn(&AirNode) -> f64,
) -> f64 {
    let Some(second) = second else {
        return level(first);
    };
    if outlet_flow > MassRate::ZERO {
        let weighted = first.mass_flow * level(first) + second.mass_flow * level(second);
        (weighted / outlet_flow).get::<ratio>()
    } else {
        (level(first) + level(second)) / 2.0
    }
}
