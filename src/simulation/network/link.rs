use std::collections::VecDeque;

use tracing::trace;

use crate::simulation::id::Id;
use crate::simulation::network::capacity::{LinkCapacityResult, SegmentCapacity};
use crate::simulation::network::flow_cap::Flowcap;
use crate::simulation::network::global_network::Link;
use crate::simulation::network::lanes::{Lane, LanesToLinkAssignment};
use crate::simulation::network::storage_cap::StorageCap;
use crate::simulation::vehicles::Vehicle;

/// Addresses one of the queues of a [QLink].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QLaneIndex {
    Original,
    ToNode(usize),
}

#[derive(Debug, Clone)]
struct VehicleQEntry {
    vehicle: Vehicle,
    earliest_exit_time: u32,
}

/// A FIFO queue on one segment of a link.
#[derive(Debug, Clone)]
pub struct QLane {
    pub id: Id<Lane>,
    q: VecDeque<VehicleQEntry>,
    length: f64,
    free_speed: f64,
    flow_cap: Flowcap,
    storage_cap: StorageCap,
    to_link_ids: Vec<Id<Link>>,
}

impl QLane {
    pub fn new(
        id: Id<Lane>,
        segment: &SegmentCapacity,
        free_speed: f64,
        to_link_ids: Vec<Id<Link>>,
    ) -> Self {
        QLane {
            id,
            q: VecDeque::new(),
            length: segment.length,
            free_speed,
            flow_cap: Flowcap::from_segment(segment),
            storage_cap: StorageCap::from_segment(segment),
            to_link_ids,
        }
    }

    pub fn push_veh(&mut self, vehicle: Vehicle, now: u32) {
        let speed = self.free_speed.min(vehicle.max_v);
        // a speed of 0 casts to u32::MAX, i.e. the vehicle never reaches the end of the lane
        let duration = 1.max((self.length / speed) as u32); // at least 1 second per lane
        let earliest_exit_time = now.saturating_add(duration);

        // update state
        self.storage_cap.consume(vehicle.pce);
        self.q.push_back(VehicleQEntry {
            vehicle,
            earliest_exit_time,
        });
    }

    pub fn pop_front(&mut self) -> Option<Vehicle> {
        let entry = self.q.pop_front()?;
        self.flow_cap.consume_capacity(entry.vehicle.pce);
        self.storage_cap.release(entry.vehicle.pce);
        Some(entry.vehicle)
    }

    pub fn q_front(&self, now: u32) -> Option<&Vehicle> {
        // check if we have flow cap left for current time step, otherwise abort
        if !self.flow_cap.has_capacity() {
            return None;
        }

        // peek if fist vehicle in queue can leave
        self.q
            .front()
            .filter(|entry| entry.earliest_exit_time <= now)
            .map(|entry| &entry.vehicle)
    }

    pub fn update_flow_cap(&mut self, now: u32) {
        // increase flow cap if new time step
        self.flow_cap.update_capacity(now);
    }

    pub fn apply_storage_cap_updates(&mut self) {
        self.storage_cap.apply_updates();
    }

    pub fn is_available(&self) -> bool {
        self.storage_cap.is_available()
    }

    pub fn used_storage(&self) -> f64 {
        self.storage_cap.currently_used()
    }

    pub fn storage_cap(&self) -> f64 {
        self.storage_cap.max()
    }

    pub fn flow_cap(&self) -> f64 {
        self.flow_cap.capacity()
    }

    pub fn veh_count(&self) -> usize {
        self.q.len()
    }

    pub fn leads_to(&self, link_id: &Id<Link>) -> bool {
        self.to_link_ids.contains(link_id)
    }
}

/// A link in the queue simulation. Vehicles enter the original lane. On links with lanes they move
/// on into the to-node lane which leads to their next link and leave the link from there. Links
/// without lanes are left directly from the original lane.
#[derive(Debug, Clone)]
pub struct QLink {
    pub id: Id<Link>,
    original: QLane,
    to_node_lanes: Vec<QLane>,
}

impl QLink {
    pub fn new(
        link: &Link,
        capacities: &LinkCapacityResult,
        lanes: Option<&LanesToLinkAssignment>,
    ) -> Self {
        assert_eq!(
            link.id, capacities.link_id,
            "Capacities of link {} can't be used for link {}",
            capacities.link_id, link.id
        );

        let original_id = match lanes {
            Some(lanes) => lanes.original_lane_id(),
            None => Id::create(&format!("{}.ol", link.id)),
        };
        let original = QLane::new(
            original_id,
            &capacities.original_segment,
            link.freespeed,
            Vec::new(),
        );

        let to_node_lanes = capacities
            .downstream_lanes
            .iter()
            .map(|lane_cap| {
                let to_link_ids = lanes
                    .and_then(|lanes| {
                        lanes
                            .to_node_lanes
                            .iter()
                            .find(|lane| lane.id == lane_cap.lane_id)
                    })
                    .map(|lane| lane.to_link_ids.clone())
                    .unwrap_or_default();
                QLane::new(
                    lane_cap.lane_id.clone(),
                    &lane_cap.segment,
                    link.freespeed,
                    to_link_ids,
                )
            })
            .collect();

        QLink {
            id: link.id.clone(),
            original,
            to_node_lanes,
        }
    }

    pub fn original_lane(&self) -> &QLane {
        &self.original
    }

    pub fn to_node_lanes(&self) -> &[QLane] {
        &self.to_node_lanes
    }

    pub fn lane(&self, index: QLaneIndex) -> Option<&QLane> {
        match index {
            QLaneIndex::Original => Some(&self.original),
            QLaneIndex::ToNode(i) => self.to_node_lanes.get(i),
        }
    }

    fn lane_mut(&mut self, index: QLaneIndex) -> Option<&mut QLane> {
        match index {
            QLaneIndex::Original => Some(&mut self.original),
            QLaneIndex::ToNode(i) => self.to_node_lanes.get_mut(i),
        }
    }

    /// Whether a vehicle may enter the link. Only the original lane is relevant here, as vehicles
    /// always enter a link at its upstream end.
    pub fn is_available(&self) -> bool {
        self.original.is_available()
    }

    pub fn push_veh(&mut self, vehicle: Vehicle, now: u32) {
        self.original.push_veh(vehicle, now);
    }

    pub fn space_cap(&self) -> f64 {
        self.original.storage_cap()
            + self
                .to_node_lanes
                .iter()
                .map(QLane::storage_cap)
                .sum::<f64>()
    }

    pub fn used_storage(&self) -> f64 {
        self.original.used_storage()
            + self
                .to_node_lanes
                .iter()
                .map(QLane::used_storage)
                .sum::<f64>()
    }

    pub fn veh_count(&self) -> usize {
        self.original.veh_count()
            + self
                .to_node_lanes
                .iter()
                .map(QLane::veh_count)
                .sum::<usize>()
    }

    pub fn update_flow_cap(&mut self, now: u32) {
        self.original.update_flow_cap(now);
        for lane in &mut self.to_node_lanes {
            lane.update_flow_cap(now);
        }
    }

    pub fn apply_storage_cap_updates(&mut self) {
        self.original.apply_storage_cap_updates();
        for lane in &mut self.to_node_lanes {
            lane.apply_storage_cap_updates();
        }
    }

    /// Moves vehicles which have reached the end of the original lane into the to-node lanes.
    /// Vehicles are moved in order. If the first vehicle can't be moved, because the original lane
    /// has no flow capacity left or its target lane is full, the vehicles behind it wait as well.
    /// Returns the number of moved vehicles.
    pub fn move_original_to_lanes(&mut self, now: u32) -> usize {
        if self.to_node_lanes.is_empty() {
            return 0;
        }

        let mut moved = 0;
        while let Some(vehicle) = self.original.q_front(now) {
            let target = self.choose_lane(vehicle);
            if !self.to_node_lanes[target].is_available() {
                break;
            }
            let Some(vehicle) = self.original.pop_front() else {
                break;
            };
            trace!(
                "Moving vehicle {} from {} to lane {}",
                vehicle.id,
                self.original.id,
                self.to_node_lanes[target].id
            );
            self.to_node_lanes[target].push_veh(vehicle, now);
            moved += 1;
        }
        moved
    }

    /// Picks the to-node lane leading to the vehicle's next link. If several lanes do, the one with
    /// the least used storage is taken. Vehicles whose next link isn't served by any lane may use
    /// all lanes.
    fn choose_lane(&self, vehicle: &Vehicle) -> usize {
        let serving: Vec<usize> = match vehicle.next_link() {
            Some(next) => (0..self.to_node_lanes.len())
                .filter(|i| self.to_node_lanes[*i].leads_to(next))
                .collect(),
            None => Vec::new(),
        };
        let candidates = if serving.is_empty() {
            (0..self.to_node_lanes.len()).collect()
        } else {
            serving
        };

        candidates
            .into_iter()
            .min_by(|a, b| {
                self.to_node_lanes[*a]
                    .used_storage()
                    .total_cmp(&self.to_node_lanes[*b].used_storage())
            })
            .unwrap_or(0)
    }

    /// The vehicles which may leave the link in this time step, one per exit lane.
    pub fn offers_veh(&self, now: u32) -> Vec<(QLaneIndex, &Vehicle)> {
        if self.to_node_lanes.is_empty() {
            return self
                .original
                .q_front(now)
                .map(|vehicle| vec![(QLaneIndex::Original, vehicle)])
                .unwrap_or_default();
        }

        self.to_node_lanes
            .iter()
            .enumerate()
            .filter_map(|(i, lane)| lane.q_front(now).map(|v| (QLaneIndex::ToNode(i), v)))
            .collect()
    }

    pub fn pop_veh(&mut self, index: QLaneIndex) -> Option<Vehicle> {
        self.lane_mut(index).and_then(QLane::pop_front)
    }
}
