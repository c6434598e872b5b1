use assert_approx_eq::assert_approx_eq;
use rust_qsim_lanes::simulation::config::{CommandLineArgs, Config};
use rust_qsim_lanes::simulation::id::Id;
use rust_qsim_lanes::simulation::io::capacities::write_capacities;
use rust_qsim_lanes::simulation::io::resolve_path;
use rust_qsim_lanes::simulation::logging::init_std_out_logging_thread_local;
use rust_qsim_lanes::simulation::network::capacity_table::{CapacityError, CapacityTable};
use rust_qsim_lanes::simulation::network::global_network::Link;
use rust_qsim_lanes::simulation::network::link::{QLaneIndex, QLink};
use rust_qsim_lanes::simulation::scenario::Scenario;
use rust_qsim_lanes::test_utils;

const CONFIG: &str = "./tests/resources/lanes/config.yml";

fn config_with(overrides: &[(&str, &str)]) -> Config {
    let mut args = CommandLineArgs::new_with_path(CONFIG);
    args.overrides = overrides
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Config::from_args(&args).unwrap()
}

#[test]
fn capacities_of_three_lanes() {
    let _guard = init_std_out_logging_thread_local();
    let config = config_with(&[]);
    let scenario = Scenario::load(&config).unwrap();
    let table = CapacityTable::compute(&scenario.network, scenario.lanes.as_ref(), &config).unwrap();

    let link_1 = table.get(&Id::<Link>::get_from_ext("1")).unwrap();
    assert_eq!(0.5, link_1.simulated_flow_capacity);
    assert_eq!(296., link_1.space_cap);
    assert_eq!(240., link_1.original_segment.storage_capacity);

    let lane_storages: Vec<f64> = link_1
        .downstream_lanes
        .iter()
        .map(|l| l.segment.storage_capacity)
        .collect();
    assert_eq!(vec![14., 28., 14.], lane_storages);
    assert_approx_eq!(1., link_1.total_lane_flow_capacity());

    let link_2 = table.get(&Id::<Link>::get_from_ext("2")).unwrap();
    assert!(!link_2.has_lanes());
    assert_eq!(1., link_2.simulated_flow_capacity);
}

#[test]
fn lanes_switched_off_by_override() {
    let config = config_with(&[("lanes.use_lanes", "false")]);
    let scenario = Scenario::load(&config).unwrap();
    assert!(scenario.lanes.is_none());

    let table = CapacityTable::compute(&scenario.network, scenario.lanes.as_ref(), &config).unwrap();
    assert_eq!(268., table.get(&Id::get_from_ext("1")).unwrap().space_cap);
}

#[test]
fn strict_validation_by_override() {
    let config = config_with(&[("lanes.validation", "Strict")]);
    let scenario = Scenario::load(&config).unwrap();
    let result = CapacityTable::compute(&scenario.network, scenario.lanes.as_ref(), &config);

    match result {
        Err(CapacityError::InconsistentLanes { issues }) => assert_eq!(1, issues.len()),
        other => panic!("Expected inconsistent lanes, got {other:?}"),
    }
}

#[test]
fn scaled_capacities() {
    let config = config_with(&[
        ("simulation.flow_capacity_factor", "0.1"),
        ("simulation.storage_capacity_factor", "0.5"),
    ]);
    let scenario = Scenario::load(&config).unwrap();
    let table = CapacityTable::compute(&scenario.network, scenario.lanes.as_ref(), &config).unwrap();

    let link_1 = table.get(&Id::get_from_ext("1")).unwrap();
    assert_approx_eq!(0.05, link_1.simulated_flow_capacity);
    assert_approx_eq!(148., link_1.space_cap);
    assert_approx_eq!(0.1, link_1.total_lane_flow_capacity());
}

#[test]
fn write_results() {
    let dir = tempfile::tempdir().unwrap();
    let output_dir = dir.path().to_string_lossy().to_string();
    let config = config_with(&[("output.output_dir", output_dir.as_str())]);
    let scenario = Scenario::load(&config).unwrap();
    let table = CapacityTable::compute(&scenario.network, scenario.lanes.as_ref(), &config).unwrap();

    let out_path =
        resolve_path(config.context(), &config.output().output_dir).join("link_capacities.json");
    write_capacities(&table, &out_path).unwrap();

    let json: serde_json::Value =
        serde_json::from_reader(std::fs::File::open(&out_path).unwrap()).unwrap();
    assert_eq!(296., json["links"][0]["space_cap"]);
    assert_eq!("2", json["links"][0]["downstream_lanes"][1]["lane_id"]);
    assert_eq!(0.5, json["links"][0]["downstream_lanes"][1]["simulated_flow_capacity"]);
}

#[test]
fn vehicles_spread_over_lanes() {
    let config = config_with(&[]);
    let scenario = Scenario::load(&config).unwrap();
    let table = CapacityTable::compute(&scenario.network, scenario.lanes.as_ref(), &config).unwrap();

    let link_id = Id::<Link>::get_from_ext("1");
    let link = scenario.network.get_link(&link_id);
    let lanes = scenario.lanes.as_ref().and_then(|l| l.get(&link_id));
    let mut q_link = QLink::new(link, table.get(&link_id).unwrap(), lanes);
    assert_eq!(296., q_link.space_cap());

    q_link.push_veh(test_utils::vehicle("veh-1", 20.), 0);
    q_link.push_veh(test_utils::vehicle("veh-2", 20.), 0);

    // 900m on the original lane at 15m/s. The original lane lets 0.5 veh/s pass.
    q_link.update_flow_cap(60);
    assert_eq!(1, q_link.move_original_to_lanes(60));
    q_link.update_flow_cap(61);
    assert_eq!(0, q_link.move_original_to_lanes(61));
    q_link.update_flow_cap(62);
    assert_eq!(1, q_link.move_original_to_lanes(62));

    // all lanes lead to link 2, so the second vehicle takes the emptier lane
    assert_eq!(1, q_link.to_node_lanes()[0].veh_count());
    assert_eq!(1, q_link.to_node_lanes()[1].veh_count());

    q_link.update_flow_cap(67);
    let offers = q_link.offers_veh(67);
    assert_eq!(1, offers.len());
    assert_eq!(QLaneIndex::ToNode(0), offers[0].0);
    assert_eq!("veh-1", offers[0].1.id.external());

    let vehicle = q_link.pop_veh(QLaneIndex::ToNode(0)).unwrap();
    assert_eq!("2", vehicle.next_link().unwrap().external());
    q_link.apply_storage_cap_updates();
    assert_eq!(1., q_link.used_storage());
}
