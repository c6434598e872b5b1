use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::simulation::id::Id;
use crate::simulation::io::{file_reader, IoError};
use crate::simulation::network::global_network::{Link, Network};
use crate::simulation::network::lanes::{Lane, Lanes, LanesToLinkAssignment};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct IOLane {
    pub id: String,
    pub starts_at_meter_from_link_end: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_represented_lanes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_vehicles_per_hour: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to_lane_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub to_link_ids: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct IOLanesToLinkAssignment {
    pub link_id: String,
    #[serde(default)]
    pub lanes: Vec<IOLane>,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub struct IOLanes {
    #[serde(default)]
    pub lanes_to_link_assignments: Vec<IOLanesToLinkAssignment>,
}

impl IOLanes {
    pub fn from_file(file_path: &Path) -> Result<IOLanes, IoError> {
        let lanes: IOLanes = file_reader::read(file_path)?;
        info!(
            "IOLanes:: Finished reading lanes. They contain {} lanes on {} links.",
            lanes
                .lanes_to_link_assignments
                .iter()
                .map(|a| a.lanes.len())
                .sum::<usize>(),
            lanes.lanes_to_link_assignments.len()
        );
        Ok(lanes)
    }

    /// Converts the file representation into lanes of the given network. A lane which leads to
    /// other lanes is the original lane of its link. All other lanes lead to the to-node and keep
    /// their order from the file.
    ///
    /// Links of an assignment are not required to be part of the network. Lane validation reports
    /// those. Lanes pointing to unknown lanes or links are rejected, though, as are links with more
    /// than one assignment.
    pub fn into_lanes(self, network: &Network) -> Result<Lanes, IoError> {
        let mut result = Lanes::new();

        for io_assignment in self.lanes_to_link_assignments {
            let link_id: Id<Link> = Id::create(&io_assignment.link_id);
            if result.get(&link_id).is_some() {
                return Err(IoError::DuplicateAssignment {
                    link: io_assignment.link_id,
                });
            }
            let mut assignment = LanesToLinkAssignment::new(link_id);

            for io_lane in &io_assignment.lanes {
                let lane = convert_lane(io_lane, &io_assignment, network)?;
                if lane.to_lane_ids.is_empty() {
                    assignment.add_lane(lane);
                } else if assignment.original_lane.is_some() {
                    return Err(IoError::LaneTree {
                        link: io_assignment.link_id.clone(),
                    });
                } else {
                    assignment.set_original_lane(lane);
                }
            }

            result.add_assignment(assignment);
        }

        Ok(result)
    }
}

fn convert_lane(
    io_lane: &IOLane,
    io_assignment: &IOLanesToLinkAssignment,
    network: &Network,
) -> Result<Lane, IoError> {
    let referenced_by = || format!("lane {} on link {}", io_lane.id, io_assignment.link_id);

    let mut to_lane_ids = Vec::with_capacity(io_lane.to_lane_ids.len());
    for to_lane in &io_lane.to_lane_ids {
        if !io_assignment.lanes.iter().any(|l| &l.id == to_lane) {
            return Err(IoError::UnknownReference {
                kind: "lane",
                id: to_lane.clone(),
                referenced_by: referenced_by(),
            });
        }
        to_lane_ids.push(Id::create(to_lane));
    }

    let mut to_link_ids = Vec::with_capacity(io_lane.to_link_ids.len());
    for to_link in &io_lane.to_link_ids {
        let id = Id::<Link>::try_get_from_ext(to_link)
            .filter(|id| network.try_get_link(id).is_some())
            .ok_or_else(|| IoError::UnknownReference {
                kind: "link",
                id: to_link.clone(),
                referenced_by: referenced_by(),
            })?;
        to_link_ids.push(id);
    }

    Ok(Lane {
        id: Id::create(&io_lane.id),
        starts_at_meter_from_link_end: io_lane.starts_at_meter_from_link_end,
        number_of_represented_lanes: io_lane.number_of_represented_lanes,
        capacity_vehicles_per_hour: io_lane.capacity_vehicles_per_hour,
        to_lane_ids,
        to_link_ids,
    })
}
