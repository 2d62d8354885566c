//! Typed identifiers for the entities held by the [`crate::RegionStore`].

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl $name {
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

entity_id!(
    /// Identity of an interned [`crate::Point`].
    PointId,
    "Point"
);
entity_id!(
    /// Identity of a [`crate::Region`].
    RegionId,
    "Region"
);
entity_id!(
    /// Identity of a [`crate::Grid`].
    GridId,
    "Grid"
);
entity_id!(
    /// Identity of a [`crate::Zone`]. Also used as the opaque polygon id sent to the
    /// raster provider.
    ZoneId,
    "Zone"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ZoneId(12).to_string(), "Zone#12");
        assert_eq!(RegionId(3).to_string(), "Region#3");
    }
}
