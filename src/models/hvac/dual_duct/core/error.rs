use std::fmt;

use thiserror::Error;
use uom::si::{f64::VolumeRate, volume_rate::cubic_meter_per_second};

use super::store::TerminalHandle;

/// A defect found in one terminal definition while building the store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigDefect {
    /// The availability schedule name does not match any schedule.
    #[error("{terminal}: availability schedule `{schedule}` not found")]
    MissingSchedule { terminal: String, schedule: String },

    /// The outdoor-air requirement is absent or names nothing known.
    #[error("{terminal}: outdoor air requirement {} not found", display_name(.requirement.as_deref()))]
    MissingOutdoorAirRequirement {
        terminal: String,
        requirement: Option<String>,
    },

    /// A fixed maximum flow cannot carry the design outdoor air and there
    /// is no recirculation duct to absorb the difference.
    #[error(
        "{terminal}: maximum air flow {:.5} m3/s is lower than the outdoor air requirement {:.5} m3/s",
        .max_flow.get::<cubic_meter_per_second>(),
        .design_outdoor_air.get::<cubic_meter_per_second>()
    )]
    MaxFlowBelowOutdoorAir {
        terminal: String,
        max_flow: VolumeRate,
        design_outdoor_air: VolumeRate,
    },

    /// The requirement has a per-person rate but the terminal does not say
    /// whether to use current or design occupancy.
    #[error("{terminal}: per-person outdoor air mode is required (current or design occupancy)")]
    PerPersonModeMissing { terminal: String },

    /// No air distribution unit has this terminal's outlet.
    #[error("{terminal}: no air distribution unit connects this terminal to a zone")]
    NoDistributionUnit { terminal: String },

    /// Another terminal already uses this name.
    #[error("duplicate terminal name `{terminal}`")]
    DuplicateName { terminal: String },

    /// A fixed maximum air flow is negative or not a number.
    #[error(
        "{terminal}: maximum air flow {:.5} m3/s must not be negative",
        .value.get::<cubic_meter_per_second>()
    )]
    InvalidMaxAirFlow { terminal: String, value: VolumeRate },

    /// The minimum zone-air fraction is outside `[0, 1]`.
    #[error("{terminal}: minimum zone air fraction {value} is outside [0, 1]")]
    InvalidMinimumAirFraction { terminal: String, value: f64 },
}

fn display_name(name: Option<&str>) -> String {
    name.map_or_else(|| "(blank)".to_owned(), |name| format!("`{name}`"))
}

/// Every defect found while building the store.
///
/// The store is only built when the whole definition set is clean.
#[derive(Debug, Clone, PartialEq, Error)]
pub struct ConfigError {
    pub defects: Vec<ConfigDefect>,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} error(s) in dual-duct terminal definitions",
            self.defects.len()
        )?;
        for defect in &self.defects {
            write!(f, "\n  {defect}")?;
        }
        Ok(())
    }
}

/// Errors that stop a simulation step.
///
/// These indicate a bookkeeping bug in the caller, not a data problem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// No terminal has this name.
    #[error("dual-duct terminal `{name}` not found")]
    UnknownTerminal { name: String },

    /// The handle does not index a terminal in this store.
    #[error("invalid terminal handle {handle:?} for `{name}`; store holds {count} terminal(s)")]
    InvalidHandle {
        handle: TerminalHandle,
        name: String,
        count: usize,
    },

    /// The handle indexes a terminal with a different name.
    #[error("terminal handle {handle:?} was passed with `{name}` but refers to `{stored}`")]
    NameMismatch {
        handle: TerminalHandle,
        name: String,
        stored: String,
    },

    /// The terminal's distribution unit is on no zone equipment list.
    #[error("dual-duct terminal `{name}` is excluded from simulation")]
    Excluded { name: String },

    /// A node referenced by the terminal is missing from the node table.
    #[error("dual-duct terminal `{name}` references missing air node {node:?}")]
    MissingNode {
        name: String,
        node: super::ids::NodeId,
    },
}
