//! Flow and storage capacities of links and of the lanes at their downstream end.
//!
//! A link without lanes is a single queue. A link with lanes consists of the original lane,
//! which covers the link from its start to the point where the first to-node lane begins, followed
//! by the to-node lanes, each of which runs from its start point to the end of the link.
//!
//! * The flow capacity of a link only depends on its hourly capacity and is not affected by lanes.
//!   The original lane has the full link flow capacity. To-node lanes get the share of the link's
//!   flow capacity which corresponds to the share of lanes they represent.
//! * The storage capacity of a segment is its length times the number of lanes divided by the
//!   effective cell size. The storage capacity of a link is the sum over all its segments.
//!
//! Nothing here checks whether the lane geometry fits the link. See
//! [crate::simulation::network::validation] for that.

use serde::Serialize;

use crate::simulation::config;
use crate::simulation::id::Id;
use crate::simulation::network::global_network::{Link, DEFAULT_EFFECTIVE_CELL_SIZE};
use crate::simulation::network::lanes::{Lane, LanesToLinkAssignment};

/// Scales applied when turning link attributes into simulated capacities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapacityFactors {
    pub flow_capacity_factor: f64,
    pub storage_capacity_factor: f64,
    pub effective_cell_size: f64,
}

impl Default for CapacityFactors {
    fn default() -> Self {
        CapacityFactors {
            flow_capacity_factor: 1.0,
            storage_capacity_factor: 1.0,
            effective_cell_size: DEFAULT_EFFECTIVE_CELL_SIZE,
        }
    }
}

impl CapacityFactors {
    pub fn new(simulation: &config::Simulation, effective_cell_size: f64) -> Self {
        CapacityFactors {
            flow_capacity_factor: simulation.flow_capacity_factor,
            storage_capacity_factor: simulation.storage_capacity_factor,
            effective_cell_size,
        }
    }

    /// Vehicles per second for a capacity given in vehicles per capacity period.
    pub fn flow_capacity(&self, capacity: f64, capacity_period: f64) -> f64 {
        capacity * self.flow_capacity_factor / capacity_period
    }

    /// Vehicles which fit onto a segment. The lane meters are divided by the cell size rather than
    /// multiplied with its inverse, which keeps results for multiples of the cell size exact.
    pub fn storage_capacity(&self, length: f64, lanes: f64) -> f64 {
        length * lanes * self.storage_capacity_factor / self.effective_cell_size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentCapacity {
    pub length: f64,
    pub number_of_lanes: f64,
    pub storage_capacity: f64,
    pub simulated_flow_capacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneCapacity {
    pub lane_id: Id<Lane>,
    #[serde(flatten)]
    pub segment: SegmentCapacity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkCapacityResult {
    pub link_id: Id<Link>,
    pub simulated_flow_capacity: f64,
    pub space_cap: f64,
    pub original_segment: SegmentCapacity,
    pub downstream_lanes: Vec<LaneCapacity>,
}

impl LinkCapacityResult {
    pub fn has_lanes(&self) -> bool {
        !self.downstream_lanes.is_empty()
    }

    pub fn lane(&self, lane_id: &Id<Lane>) -> Option<&LaneCapacity> {
        self.downstream_lanes
            .iter()
            .find(|lane| &lane.lane_id == lane_id)
    }

    pub fn total_lane_flow_capacity(&self) -> f64 {
        self.downstream_lanes
            .iter()
            .map(|lane| lane.segment.simulated_flow_capacity)
            .sum()
    }
}

/// Computes the capacities of a link and, if present, of its lanes.
pub fn compute_capacities(
    link: &Link,
    lanes: Option<&LanesToLinkAssignment>,
    factors: &CapacityFactors,
) -> LinkCapacityResult {
    let flow = factors.flow_capacity(link.capacity, link.capacity_period);

    let Some(lanes) = lanes else {
        let original_segment = SegmentCapacity {
            length: link.length,
            number_of_lanes: link.permlanes,
            storage_capacity: factors.storage_capacity(link.length, link.permlanes),
            simulated_flow_capacity: flow,
        };
        return LinkCapacityResult {
            link_id: link.id.clone(),
            simulated_flow_capacity: flow,
            space_cap: original_segment.storage_capacity,
            original_segment,
            downstream_lanes: Vec::new(),
        };
    };

    let original_length = link.length - lanes.max_lane_start();
    let original_segment = SegmentCapacity {
        length: original_length,
        number_of_lanes: link.permlanes,
        storage_capacity: factors.storage_capacity(original_length, link.permlanes),
        simulated_flow_capacity: flow,
    };

    let downstream_lanes: Vec<_> = lanes
        .to_node_lanes
        .iter()
        .map(|lane| lane_capacity(lane, flow, link.permlanes, factors))
        .collect();

    let space_cap = original_segment.storage_capacity
        + downstream_lanes
            .iter()
            .map(|lane| lane.segment.storage_capacity)
            .sum::<f64>();

    LinkCapacityResult {
        link_id: link.id.clone(),
        simulated_flow_capacity: flow,
        space_cap,
        original_segment,
        downstream_lanes,
    }
}

fn lane_capacity(
    lane: &Lane,
    link_flow: f64,
    link_lanes: f64,
    factors: &CapacityFactors,
) -> LaneCapacity {
    let length = lane.starts_at_meter_from_link_end;
    let represented = lane.represented_lanes();
    LaneCapacity {
        lane_id: lane.id.clone(),
        segment: SegmentCapacity {
            length,
            number_of_lanes: represented,
            storage_capacity: factors.storage_capacity(length, represented),
            simulated_flow_capacity: link_flow / link_lanes * represented,
        },
    }
}
