use uom::si::f64::VolumeRate;

use super::ids::NodeId;

/// Configuration record for one dual-duct terminal.
///
/// Names refer to entities resolved through a
/// [`ConfigContext`](super::ConfigContext) when the store is built.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalDefinition {
    pub name: String,
    /// Availability schedule; always available when absent.
    pub availability_schedule: Option<String>,
    pub outlet: NodeId,
    pub max_air_flow: MaxAirFlow,
    pub kind: TerminalKind,
}

/// Maximum terminal air flow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaxAirFlow {
    /// Sized from zone design flows before the first step.
    Autosize,
    Fixed(VolumeRate),
}

/// The three terminal variants and the inputs each one needs.
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalKind {
    /// Fixed total flow split between a hot and a cold duct.
    ConstantVolume { hot_inlet: NodeId, cold_inlet: NodeId },

    /// Load-driven total flow with a minimum fraction, split between a hot
    /// and a cold duct.
    VariableVolume {
        hot_inlet: NodeId,
        cold_inlet: NodeId,
        /// Fraction of design flow always delivered, in `[0, 1]`.
        zone_min_air_fraction: f64,
        /// Optional requirement that sets a supply-flow floor.
        outdoor_air_requirement: Option<String>,
    },

    /// A ventilation-driven outdoor-air duct plus an optional load-driven
    /// recirculated-air duct.
    OutdoorAir {
        outdoor_air_inlet: NodeId,
        recirculated_inlet: Option<NodeId>,
        outdoor_air_requirement: Option<String>,
        per_person_mode: Option<PerPersonMode>,
    },
}

/// How per-person outdoor-air rates are scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerPersonMode {
    /// Scale by the occupancy schedule (demand-controlled ventilation).
    CurrentOccupancy,
    /// Scale by design occupancy.
    DesignOccupancy,
}

impl TerminalDefinition {
    /// Whether this definition has a recirculated-air duct.
    ///
    /// Only outdoor-air terminals can leave it out.
    #[must_use]
    pub fn uses_recirculation(&self) -> bool {
        match &self.kind {
            TerminalKind::OutdoorAir {
                recirculated_inlet, ..
            } => recirculated_inlet.is_some(),
            TerminalKind::ConstantVolume { .. } | TerminalKind::VariableVolume { .. } => true,
        }
    }
}

/// Reports whether the outdoor-air terminal `name` has a recirculated-air duct.
///
/// Answers from raw definitions so it can be asked before a store exists.
/// Names that match no outdoor-air terminal report `true`.
#[must_use]
pub fn recirculation_is_used(definitions: &[TerminalDefinition], name: &str) -> bool {
    definitions
        .iter()
        .filter(|definition| matches!(definition.kind, TerminalKind::OutdoorAir { .. }))
        .find(|definition| definition.name.eq_ignore_ascii_case(name))
        .is_none_or(TerminalDefinition::uses_recirculation)
}
