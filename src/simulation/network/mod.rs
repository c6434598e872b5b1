pub mod capacity;
pub mod capacity_table;
pub mod flow_cap;
pub mod global_network;
pub mod lanes;
pub mod link;
pub mod storage_cap;
pub mod validation;
