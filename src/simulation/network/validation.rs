use thiserror::Error;

use crate::simulation::id::Id;
use crate::simulation::network::global_network::{Link, Network};
use crate::simulation::network::lanes::{Lane, Lanes, LanesToLinkAssignment};

const REPRESENTED_LANES_TOLERANCE: f64 = 1e-9;

/// Lane geometry which the capacity computation accepts but which most likely isn't what the
/// modeller intended.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LaneInconsistency {
    #[error("lane {lane} on link {link} starts {starts_at}m from the link end, but the link is only {link_length}m long")]
    LaneExceedsLink {
        link: Id<Link>,
        lane: Id<Lane>,
        starts_at: f64,
        link_length: f64,
    },
    #[error("lanes on link {link} represent {declared} lanes, but the link has {link_lanes}")]
    RepresentedLanesMismatch {
        link: Id<Link>,
        declared: f64,
        link_lanes: f64,
    },
    #[error("link {link} has lanes but {link_lanes} lanes of its own")]
    NoLinkLanes { link: Id<Link>, link_lanes: f64 },
    #[error("lanes are defined for link {link}, which is not part of the network")]
    UnknownLink { link: Id<Link> },
}

/// Checks the lanes of a single link against the link's geometry.
pub fn validate_lanes(link: &Link, lanes: &LanesToLinkAssignment) -> Vec<LaneInconsistency> {
    let mut result = Vec::new();

    if link.permlanes <= 0. && !lanes.to_node_lanes.is_empty() {
        result.push(LaneInconsistency::NoLinkLanes {
            link: link.id.clone(),
            link_lanes: link.permlanes,
        });
    }

    for lane in &lanes.to_node_lanes {
        if lane.starts_at_meter_from_link_end > link.length {
            result.push(LaneInconsistency::LaneExceedsLink {
                link: link.id.clone(),
                lane: lane.id.clone(),
                starts_at: lane.starts_at_meter_from_link_end,
                link_length: link.length,
            });
        }
    }

    let declared = lanes.represented_lanes_sum();
    if !lanes.to_node_lanes.is_empty()
        && (declared - link.permlanes).abs() > REPRESENTED_LANES_TOLERANCE
    {
        result.push(LaneInconsistency::RepresentedLanesMismatch {
            link: link.id.clone(),
            declared,
            link_lanes: link.permlanes,
        });
    }

    result
}

/// Checks all lane definitions of a scenario. Findings are sorted by link, so that reports don't
/// depend on hash map order.
pub fn validate_network_lanes(network: &Network, lanes: &Lanes) -> Vec<LaneInconsistency> {
    let mut assignments: Vec<_> = lanes.assignments().collect();
    assignments.sort_by_key(|assignment| assignment.link_id.internal());

    assignments
        .into_iter()
        .flat_map(|assignment| match network.try_get_link(&assignment.link_id) {
            Some(link) => validate_lanes(link, assignment),
            None => vec![LaneInconsistency::UnknownLink {
                link: assignment.link_id.clone(),
            }],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::simulation::id::Id;
    use crate::simulation::network::lanes::{LaneBuilder, Lanes, LanesToLinkAssignment};
    use crate::simulation::network::validation::{
        validate_lanes, validate_network_lanes, LaneInconsistency,
    };
    use crate::test_utils;

    #[test]
    fn reference_fixtures_are_consistent() {
        let network = test_utils::two_link_network();
        let link = network.get_link(&Id::create("1"));

        assert!(validate_lanes(link, &test_utils::one_lane_assignment(2.)).is_empty());
        assert!(validate_lanes(link, &LanesToLinkAssignment::new(link.id.clone())).is_empty());
    }

    #[test]
    fn represented_lanes_mismatch() {
        let network = test_utils::two_link_network();
        let link = network.get_link(&Id::create("1"));

        let issues = validate_lanes(link, &test_utils::three_lanes_assignment());
        assert_eq!(
            vec![LaneInconsistency::RepresentedLanesMismatch {
                link: link.id.clone(),
                declared: 4.,
                link_lanes: 2.,
            }],
            issues
        );
    }

    #[test]
    fn lane_exceeds_link() {
        let network = test_utils::two_link_network();
        let link = network.get_link(&Id::create("1"));

        let issues = validate_lanes(link, &test_utils::one_lane_assignment_at(1080., 2.));
        assert_eq!(1, issues.len());
        assert!(matches!(
            &issues[0],
            LaneInconsistency::LaneExceedsLink { starts_at, link_length, .. }
                if *starts_at == 1080. && *link_length == 1005.
        ));
    }

    #[test]
    fn no_link_lanes() {
        let network = test_utils::two_link_network();
        let mut link = network.get_link(&Id::create("1")).clone();
        link.permlanes = 0.;

        let issues = validate_lanes(&link, &test_utils::one_lane_assignment(1.));
        assert!(issues.contains(&LaneInconsistency::NoLinkLanes {
            link: link.id.clone(),
            link_lanes: 0.,
        }));
    }

    #[test]
    fn unknown_link() {
        let network = test_utils::two_link_network();
        let mut lanes = Lanes::new();
        let mut assignment = LanesToLinkAssignment::new(Id::create("does-not-exist"));
        assignment.add_lane(
            LaneBuilder::default()
                .id(Id::create("1"))
                .starts_at_meter_from_link_end(10.)
                .build()
                .unwrap(),
        );
        lanes.add_assignment(assignment);

        let issues = validate_network_lanes(&network, &lanes);
        assert_eq!(
            vec![LaneInconsistency::UnknownLink {
                link: Id::create("does-not-exist")
            }],
            issues
        );
    }

    #[test]
    fn display() {
        let issue = LaneInconsistency::RepresentedLanesMismatch {
            link: Id::create("1"),
            declared: 4.,
            link_lanes: 2.,
        };
        assert_eq!(
            "lanes on link 1 represent 4 lanes, but the link has 2",
            issue.to_string()
        );
    }
}
