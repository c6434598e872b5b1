use crate::simulation::id::Id;
use crate::simulation::network::global_network::{Network, Node};
use crate::simulation::network::lanes::{Lane, LaneBuilder, LanesToLinkAssignment};
use crate::simulation::vehicles::Vehicle;

/// Two consecutive links. Link "1" is the link all lane fixtures refer to: 1005m long, two
/// lanes, 1800 veh/h and 15m/s. Link "2" is only there so that lanes have somewhere to lead to.
pub fn two_link_network() -> Network {
    let mut network = Network::new();
    let n1 = Node::new(Id::create("1"), 0., 0.);
    let n2 = Node::new(Id::create("2"), 1005., 0.);
    let n3 = Node::new(Id::create("3"), 2010., 0.);
    let n1_id = n1.id.clone();
    let n2_id = n2.id.clone();
    let n3_id = n3.id.clone();
    network.add_node(n1);
    network.add_node(n2);
    network.add_node(n3);

    network.create_link(Id::create("1"), &n1_id, &n2_id, 1005., 1800., 15., 2.);
    network.create_link(Id::create("2"), &n2_id, &n3_id, 1005., 3600., 15., 1.);
    network
}

fn original_lane(to_lane_ids: &[&str]) -> Lane {
    LaneBuilder::default()
        .id(Id::create("1.ol"))
        .starts_at_meter_from_link_end(1005.)
        .number_of_represented_lanes(2.)
        .capacity_vehicles_per_hour(1800.)
        .to_lane_ids(to_lane_ids.iter().map(|id| Id::create(id)).collect())
        .build()
        .unwrap()
}

fn to_node_lane(id: &str, starts_at: f64, represented: Option<f64>, capacity: f64) -> Lane {
    let mut builder = LaneBuilder::default();
    builder
        .id(Id::create(id))
        .starts_at_meter_from_link_end(starts_at)
        .capacity_vehicles_per_hour(capacity)
        .to_link_ids(vec![Id::create("2")]);
    if let Some(represented) = represented {
        builder.number_of_represented_lanes(represented);
    }
    builder.build().unwrap()
}

/// Link "1" with one to-node lane "1" starting 105m before the link end, representing
/// `represented` lanes.
pub fn one_lane_assignment(represented: f64) -> LanesToLinkAssignment {
    one_lane_assignment_at(105., represented)
}

pub fn one_lane_assignment_at(starts_at: f64, represented: f64) -> LanesToLinkAssignment {
    let mut assignment = LanesToLinkAssignment::new(Id::create("1"));
    assignment
        .set_original_lane(original_lane(&["1"]))
        .add_lane(to_node_lane(
            "1",
            starts_at,
            Some(represented),
            represented * 900.,
        ));
    assignment
}

/// Link "1" with three to-node lanes starting 105m before the link end. Lanes "1" and "3" leave
/// the number of represented lanes unset, lane "2" represents two lanes.
pub fn three_lanes_assignment() -> LanesToLinkAssignment {
    let mut assignment = LanesToLinkAssignment::new(Id::create("1"));
    assignment
        .set_original_lane(original_lane(&["1", "2", "3"]))
        .add_lane(to_node_lane("1", 105., None, 900.))
        .add_lane(to_node_lane("2", 105., Some(2.), 1800.))
        .add_lane(to_node_lane("3", 105., None, 900.));
    assignment
}

/// A vehicle with 1 pce travelling link "1" and then link "2".
pub fn vehicle(id: &str, max_v: f64) -> Vehicle {
    Vehicle::new(
        Id::create(id),
        1.,
        max_v,
        vec![Id::create("1"), Id::create("2")],
    )
}
