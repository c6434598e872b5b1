use std::path::Path;

use serde::Serialize;

use crate::simulation::io::{file_reader, IoError};
use crate::simulation::network::capacity::LinkCapacityResult;
use crate::simulation::network::capacity_table::CapacityTable;

#[derive(Serialize)]
struct IOCapacities<'a> {
    links: Vec<&'a LinkCapacityResult>,
}

/// Writes all link capacities of the table as json. Links keep the order of the network.
pub fn write_capacities(table: &CapacityTable, path: &Path) -> Result<(), IoError> {
    let capacities = IOCapacities {
        links: table.iter().collect(),
    };
    file_reader::write_json(&capacities, path)
}
