use std::error::Error;

use clap::Parser;
use itertools::Itertools;
use tracing::info;

use rust_qsim_lanes::simulation::config::{CommandLineArgs, Config};
use rust_qsim_lanes::simulation::io::capacities::write_capacities;
use rust_qsim_lanes::simulation::io::resolve_path;
use rust_qsim_lanes::simulation::logging::{init_logging, init_std_out_logging_thread_local};
use rust_qsim_lanes::simulation::network::capacity_table::CapacityTable;
use rust_qsim_lanes::simulation::scenario::Scenario;

/// Computes flow and storage capacities of all links and their lanes and writes them to
/// `<output_dir>/link_capacities.json`.
fn main() -> Result<(), Box<dyn Error>> {
    let _std_out_guard = init_std_out_logging_thread_local();

    let args = CommandLineArgs::parse();
    info!("Started with args: {:?}", args);

    let config = Config::from_args(&args)?;
    let _guards = init_logging(&config);

    let scenario = Scenario::load(&config)?;
    let table = CapacityTable::compute(&scenario.network, scenario.lanes.as_ref(), &config)?;

    for result in table.iter().filter(|r| r.has_lanes()) {
        info!(
            "Link {}: {} veh/s, {} veh storage. Lanes: {}",
            result.link_id,
            result.simulated_flow_capacity,
            result.space_cap,
            result
                .downstream_lanes
                .iter()
                .map(|l| format!(
                    "{} ({} veh/s, {} veh)",
                    l.lane_id, l.segment.simulated_flow_capacity, l.segment.storage_capacity
                ))
                .join(", ")
        );
    }
    info!(
        "Total storage capacity of the network: {} veh",
        table.total_storage_capacity()
    );

    let output_dir = resolve_path(config.context(), &config.output().output_dir);
    write_capacities(&table, &output_dir.join("link_capacities.json"))?;
    Ok(())
}
