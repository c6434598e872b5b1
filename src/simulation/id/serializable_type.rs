use crate::simulation::network::global_network::{Link, Node};
use crate::simulation::network::lanes::Lane;
use crate::simulation::vehicles::Vehicle;

/// Separates the id spaces of the id store. The values are fixed, so that internal ids of one type
/// never depend on the order in which other types were created.
pub trait StableTypeId {
    fn stable_type_id() -> u64;
}

impl StableTypeId for String {
    fn stable_type_id() -> u64 {
        STRING_TYPE_ID
    }
}

impl StableTypeId for Link {
    fn stable_type_id() -> u64 {
        LINK_TYPE_ID
    }
}

impl StableTypeId for Node {
    fn stable_type_id() -> u64 {
        NODE_TYPE_ID
    }
}

impl StableTypeId for Lane {
    fn stable_type_id() -> u64 {
        LANE_TYPE_ID
    }
}

impl StableTypeId for Vehicle {
    fn stable_type_id() -> u64 {
        VEHICLE_TYPE_ID
    }
}

impl StableTypeId for () {
    fn stable_type_id() -> u64 {
        0
    }
}

pub const STRING_TYPE_ID: u64 = 1;
pub const LINK_TYPE_ID: u64 = 3;
pub const NODE_TYPE_ID: u64 = 4;
pub const LANE_TYPE_ID: u64 = 5;
pub const VEHICLE_TYPE_ID: u64 = 6;
