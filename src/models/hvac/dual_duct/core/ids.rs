use std::fmt;
use std::num::NonZeroU32;

/// Defines a compact, stable identifier for one kind of external entity.
///
/// - `u32` keeps memory small
/// - `NonZero` enables `Option<Id>` to be pointer-optimized
/// - one type per entity keeps a zone id from being passed as a node id
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(NonZeroU32);

        impl $name {
            /// Create an id from a 0-based index by storing index+1.
            #[must_use]
            pub const fn from_index(index: u32) -> Self {
                Self(NonZeroU32::MIN.saturating_add(index))
            }

            /// Recover the 0-based index.
            #[must_use]
            pub const fn index(self) -> u32 {
                self.0.get() - 1
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.index())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.index())
            }
        }
    };
}

define_id!(
    /// Air node in the caller's [`AirNodes`](super::AirNodes) table.
    NodeId
);
define_id!(
    /// Thermal zone.
    ZoneId
);
define_id!(
    /// Availability schedule.
    ScheduleId
);
define_id!(
    /// Design outdoor-air requirement.
    OutdoorAirRequirementId
);
define_id!(
    /// Primary air loop.
    AirLoopId
);
define_id!(
    /// Air distribution unit wrapping a terminal.
    DistributionUnitId
);
