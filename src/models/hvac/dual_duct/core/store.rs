//! The collection of configured terminals and its simulate entry point.

use tracing::warn;
use uom::{
    ConstZero,
    si::f64::{MassRate, VolumeRate},
};

use crate::support::constraint::{Constrained, NonNegative, UnitInterval};

use super::{
    config::SolverConfig,
    context::{AirNodes, ConfigContext, StepContext, ZoneLink},
    definition::{MaxAirFlow, TerminalDefinition, TerminalKind},
    error::{ConfigDefect, ConfigError, SimulationError},
    ids::{DistributionUnitId, OutdoorAirRequirementId},
    lane::{FlowHistory, FlowState},
    outdoor_air::Ventilation,
    sizing::DesignFlows,
    terminal::{Duct, Pending, RecirculatedDuct, StepFlags, Telemetry, TerminalUnit, Variant},
};

/// Opaque index of a terminal in a [`TerminalStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TerminalHandle(usize);

/// Every configured dual-duct terminal, built once from definitions.
///
/// The caller owns the store and the [`AirNodes`] table and passes both
/// into each [`simulate`](Self::simulate) call.
#[derive(Debug, Clone)]
pub struct TerminalStore {
    terminals: Vec<TerminalUnit>,
    config: SolverConfig,
}

impl TerminalStore {
    /// Builds the store, resolving every name through `ctx`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] listing every defect found across all
    /// definitions. No store is built if any definition is defective.
    pub fn new(
        definitions: &[TerminalDefinition],
        ctx: &impl ConfigContext,
        config: SolverConfig,
    ) -> Result<Self, ConfigError> {
        let mut defects = Vec::new();
        let mut terminals = Vec::with_capacity(definitions.len());

        for (index, definition) in definitions.iter().enumerate() {
            let duplicate = definitions[..index]
                .iter()
                .any(|earlier| earlier.name.eq_ignore_ascii_case(&definition.name));
            if duplicate {
                defects.push(ConfigDefect::DuplicateName {
                    terminal: definition.name.clone(),
                });
            }

            if let Some(terminal) = build(definition, ctx, &mut defects) {
                terminals.push(terminal);
            }
        }

        if defects.is_empty() {
            Ok(Self { terminals, config })
        } else {
            Err(ConfigError { defects })
        }
    }

    /// Looks up a terminal by name, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::UnknownTerminal`] if no terminal has this name.
    pub fn find(&self, name: &str) -> Result<TerminalHandle, SimulationError> {
        self.terminals
            .iter()
            .position(|terminal| terminal.name.eq_ignore_ascii_case(name))
            .map(TerminalHandle)
            .ok_or_else(|| SimulationError::UnknownTerminal {
                name: name.to_owned(),
            })
    }

    /// Resolves a cached handle, or finds one by name when none is cached.
    ///
    /// The first use of each handle also confirms that it belongs to `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is unknown, the handle is out of range,
    /// or the handle refers to a terminal with a different name.
    pub fn resolve(
        &mut self,
        handle: Option<TerminalHandle>,
        name: &str,
    ) -> Result<TerminalHandle, SimulationError> {
        let Some(handle) = handle else {
            let handle = self.find(name)?;
            self.terminals[handle.0].pending.name_check = false;
            return Ok(handle);
        };

        let count = self.terminals.len();
        let terminal =
            self.terminals
                .get_mut(handle.0)
                .ok_or_else(|| SimulationError::InvalidHandle {
                    handle,
                    name: name.to_owned(),
                    count,
                })?;

        if terminal.pending.name_check {
            if !terminal.name.eq_ignore_ascii_case(name) {
                return Err(SimulationError::NameMismatch {
                    handle,
                    name: name.to_owned(),
                    stored: terminal.name.clone(),
                });
            }
            terminal.pending.name_check = false;
        }
        Ok(handle)
    }

    /// Excludes every terminal whose distribution unit is on no zone
    /// equipment list.
    ///
    /// Call once zone equipment lists are known. Excluded terminals are
    /// logged and refuse to simulate.
    pub fn check_equipment_lists(&mut self, is_listed: impl Fn(DistributionUnitId) -> bool) {
        for terminal in &mut self.terminals {
            if is_listed(terminal.link.distribution_unit) {
                continue;
            }
            warn!(
                terminal = terminal.name.as_str(),
                distribution_unit = %terminal.link.distribution_unit,
                "air distribution unit is not on any zone equipment list; terminal will not be simulated"
            );
            terminal.excluded = true;
        }
    }

    /// Runs one step of the terminal at `handle`.
    ///
    /// # Errors
    ///
    /// Returns an error if the handle does not resolve for `name`, the
    /// terminal is excluded, or a node it references is missing from `nodes`.
    pub fn simulate(
        &mut self,
        handle: TerminalHandle,
        name: &str,
        flags: StepFlags,
        ctx: &impl StepContext,
        nodes: &mut AirNodes,
    ) -> Result<Telemetry, SimulationError> {
        let handle = self.resolve(Some(handle), name)?;
        let config = self.config;
        let terminal = &mut self.terminals[handle.0];

        if terminal.excluded {
            return Err(SimulationError::Excluded {
                name: terminal.name.clone(),
            });
        }
        if let Some(node) = terminal.nodes().into_iter().find(|&id| !nodes.contains(id)) {
            return Err(SimulationError::MissingNode {
                name: terminal.name.clone(),
                node,
            });
        }

        Ok(terminal.step(flags, ctx, nodes, &config))
    }

    /// Telemetry from the terminal's latest step.
    #[must_use]
    pub fn telemetry(&self, handle: TerminalHandle) -> Option<Telemetry> {
        self.terminals.get(handle.0).map(|terminal| terminal.telemetry)
    }

    /// Current design flows of a terminal; autosized values appear after
    /// its first step outside system sizing.
    #[must_use]
    pub fn design_flows(&self, handle: TerminalHandle) -> Option<DesignFlows> {
        self.terminals.get(handle.0).map(|terminal| terminal.design)
    }
}

/// Builds one terminal, recording its defects.
///
/// Returns `None` when a defect leaves nothing to build.
fn build(
    definition: &TerminalDefinition,
    ctx: &impl ConfigContext,
    defects: &mut Vec<ConfigDefect>,
) -> Option<TerminalUnit> {
    let terminal = definition.name.as_str();

    let schedule = match &definition.availability_schedule {
        Some(name) => {
            let schedule = ctx.schedule(name);
            if schedule.is_none() {
                defects.push(ConfigDefect::MissingSchedule {
                    terminal: terminal.to_owned(),
                    schedule: name.clone(),
                });
            }
            schedule
        }
        None => None,
    };

    let link = ctx.distribution_unit(definition.outlet);
    if link.is_none() {
        defects.push(ConfigDefect::NoDistributionUnit {
            terminal: terminal.to_owned(),
        });
    }

    let max_volume = match definition.max_air_flow {
        MaxAirFlow::Fixed(volume) => NonNegative::new(volume).map_or_else(
            |_| {
                defects.push(ConfigDefect::InvalidMaxAirFlow {
                    terminal: terminal.to_owned(),
                    value: volume,
                });
                VolumeRate::ZERO
            },
            Constrained::into_inner,
        ),
        MaxAirFlow::Autosize => VolumeRate::ZERO,
    };
    let mut design = DesignFlows {
        max_volume,
        ..DesignFlows::default()
    };

    let variant = match &definition.kind {
        TerminalKind::ConstantVolume {
            hot_inlet,
            cold_inlet,
        } => Some(Variant::ConstantVolume {
            hot: Duct::new(*hot_inlet),
            cold: Duct::new(*cold_inlet),
        }),
        TerminalKind::VariableVolume {
            hot_inlet,
            cold_inlet,
            zone_min_air_fraction,
            outdoor_air_requirement,
        } => {
            let fraction = UnitInterval::new(*zone_min_air_fraction);
            if fraction.is_err() {
                defects.push(ConfigDefect::InvalidMinimumAirFraction {
                    terminal: terminal.to_owned(),
                    value: *zone_min_air_fraction,
                });
            }
            let requirement = match outdoor_air_requirement {
                Some(name) => {
                    let id = requirement_id(terminal, Some(name), ctx, defects);
                    id.is_some().then_some(id)
                }
                None => Some(None),
            };
            match (fraction, requirement) {
                (Ok(fraction), Some(requirement)) => Some(Variant::VariableVolume {
                    hot: Duct::new(*hot_inlet),
                    cold: Duct::new(*cold_inlet),
                    zone_min_air_fraction: fraction,
                    outdoor_air_requirement: requirement,
                }),
                _ => None,
            }
        }
        TerminalKind::OutdoorAir {
            outdoor_air_inlet,
            recirculated_inlet,
            outdoor_air_requirement,
            per_person_mode,
        } => {
            let requirement =
                requirement_id(terminal, outdoor_air_requirement.as_deref(), ctx, defects);

            if let Some(requirement) = requirement {
                if per_person_mode.is_none() && ctx.per_person_rate(requirement) > VolumeRate::ZERO
                {
                    defects.push(ConfigDefect::PerPersonModeMissing {
                        terminal: terminal.to_owned(),
                    });
                }

                if let Some(link) = link {
                    design.outdoor_air_volume = Ventilation {
                        terminal,
                        requirement: Some(requirement),
                        zone: link.zone,
                        per_person_mode: *per_person_mode,
                    }
                    .design_volume_flow(ctx);
                }

                if let MaxAirFlow::Fixed(max) = definition.max_air_flow {
                    if recirculated_inlet.is_some() {
                        let remainder = max - design.outdoor_air_volume;
                        if remainder > VolumeRate::ZERO {
                            design.recirculated_volume = remainder;
                        }
                    } else if max < design.outdoor_air_volume {
                        defects.push(ConfigDefect::MaxFlowBelowOutdoorAir {
                            terminal: terminal.to_owned(),
                            max_flow: max,
                            design_outdoor_air: design.outdoor_air_volume,
                        });
                    }
                }
            }

            requirement.map(|requirement| Variant::OutdoorAir {
                outdoor_air: Duct::new(*outdoor_air_inlet),
                recirculated: recirculated_inlet.map(|node| RecirculatedDuct {
                    duct: Duct::new(node),
                    history: FlowHistory::default(),
                    oscillation_threshold: MassRate::ZERO,
                }),
                outdoor_air_requirement: Some(requirement),
                per_person_mode: *per_person_mode,
                per_person_design_level: VolumeRate::ZERO,
            })
        }
    };

    let variant = variant?;
    let link: ZoneLink = link?;
    if schedule.is_none() && definition.availability_schedule.is_some() {
        return None;
    }

    Some(TerminalUnit {
        name: definition.name.clone(),
        schedule,
        outlet_node: definition.outlet,
        link,
        max_air_flow: definition.max_air_flow,
        design,
        telemetry: initial_telemetry(&variant),
        variant,
        outlet: FlowState::default(),
        air_loop: None,
        pending: Pending::default(),
        excluded: false,
    })
}

/// Resolves a requirement name, recording a defect when it is blank or unknown.
fn requirement_id(
    terminal: &str,
    name: Option<&str>,
    ctx: &impl ConfigContext,
    defects: &mut Vec<ConfigDefect>,
) -> Option<OutdoorAirRequirementId> {
    let id = name.and_then(|name| ctx.outdoor_air_requirement(name));
    if id.is_none() {
        defects.push(ConfigDefect::MissingOutdoorAirRequirement {
            terminal: terminal.to_owned(),
            requirement: name.map(str::to_owned),
        });
    }
    id
}

fn initial_telemetry(variant: &Variant) -> Telemetry {
    match variant {
        Variant::ConstantVolume { .. } => Telemetry::ConstantVolume {
            hot_damper: UnitInterval::zero(),
            cold_damper: UnitInterval::zero(),
        },
        Variant::VariableVolume { .. } => Telemetry::VariableVolume {
            hot_damper: UnitInterval::zero(),
            cold_damper: UnitInterval::zero(),
            outdoor_air_volume_flow: VolumeRate::ZERO,
        },
        Variant::OutdoorAir { recirculated, .. } => Telemetry::OutdoorAir {
            outdoor_air_damper: UnitInterval::zero(),
            recirculated_damper: recirculated.map(|_| UnitInterval::zero()),
            outdoor_air_fraction: UnitInterval::zero(),
            per_person_design_level: VolumeRate::ZERO,
        },
    }
}
