use derive_builder::Builder;
use nohash_hasher::IntMap;

use crate::simulation::id::Id;
use crate::simulation::network::global_network::Link;

/// Number of lanes a lane record stands for if nothing else was declared.
pub const DEFAULT_REPRESENTED_LANES: f64 = 1.0;

/// A lane record at the downstream end of a link. Lanes run from the point at
/// `starts_at_meter_from_link_end` up to the end of the link.
#[derive(Debug, Clone, Builder)]
pub struct Lane {
    pub id: Id<Lane>,
    pub starts_at_meter_from_link_end: f64,
    #[builder(setter(strip_option), default)]
    pub number_of_represented_lanes: Option<f64>,
    /// Informational only. Flow capacities of lanes are derived from the link's flow capacity.
    #[builder(setter(strip_option), default)]
    pub capacity_vehicles_per_hour: Option<f64>,
    #[builder(default)]
    pub to_lane_ids: Vec<Id<Lane>>,
    #[builder(default)]
    pub to_link_ids: Vec<Id<Link>>,
}

impl Lane {
    pub fn represented_lanes(&self) -> f64 {
        self.number_of_represented_lanes
            .unwrap_or(DEFAULT_REPRESENTED_LANES)
    }

    pub fn leads_to(&self, link_id: &Id<Link>) -> bool {
        self.to_link_ids.contains(link_id)
    }
}

/// The lanes of one link: an optional record of the original lane, which covers the link from its
/// start to the point where the lanes diverge, and the lanes leading to the to-node in declaration
/// order.
#[derive(Debug, Clone)]
pub struct LanesToLinkAssignment {
    pub link_id: Id<Link>,
    pub original_lane: Option<Lane>,
    pub to_node_lanes: Vec<Lane>,
}

impl LanesToLinkAssignment {
    pub fn new(link_id: Id<Link>) -> Self {
        LanesToLinkAssignment {
            link_id,
            original_lane: None,
            to_node_lanes: Vec::new(),
        }
    }

    pub fn set_original_lane(&mut self, lane: Lane) -> &mut Self {
        self.original_lane = Some(lane);
        self
    }

    pub fn add_lane(&mut self, lane: Lane) -> &mut Self {
        self.to_node_lanes.push(lane);
        self
    }

    /// The id of the original lane. Links without an explicit record get '<link id>.ol'.
    pub fn original_lane_id(&self) -> Id<Lane> {
        match &self.original_lane {
            Some(lane) => lane.id.clone(),
            None => Id::create(&format!("{}.ol", self.link_id)),
        }
    }

    /// The point furthest from the link end at which a to-node lane begins. Everything upstream of
    /// it belongs to the original lane.
    pub fn max_lane_start(&self) -> f64 {
        self.to_node_lanes
            .iter()
            .map(|lane| lane.starts_at_meter_from_link_end)
            .fold(0., f64::max)
    }

    pub fn represented_lanes_sum(&self) -> f64 {
        self.to_node_lanes
            .iter()
            .map(Lane::represented_lanes)
            .sum()
    }
}

/// All lane definitions of a scenario, keyed by the link they belong to.
#[derive(Debug, Default)]
pub struct Lanes {
    assignments: IntMap<Id<Link>, LanesToLinkAssignment>,
}

impl Lanes {
    pub fn new() -> Self {
        Lanes::default()
    }

    pub fn add_assignment(&mut self, assignment: LanesToLinkAssignment) {
        assert!(
            !self.assignments.contains_key(&assignment.link_id),
            "Lanes for link {} were already added.",
            assignment.link_id
        );
        self.assignments
            .insert(assignment.link_id.clone(), assignment);
    }

    pub fn get(&self, link_id: &Id<Link>) -> Option<&LanesToLinkAssignment> {
        self.assignments.get(link_id)
    }

    pub fn assignments(&self) -> impl Iterator<Item = &LanesToLinkAssignment> {
        self.assignments.values()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::simulation::id::Id;
    use crate::simulation::network::lanes::{Lane, LaneBuilder, Lanes, LanesToLinkAssignment};

    fn lane(id: &str, starts_at: f64) -> Lane {
        LaneBuilder::default()
            .id(Id::create(id))
            .starts_at_meter_from_link_end(starts_at)
            .build()
            .unwrap()
    }

    #[test]
    fn builder_defaults() {
        let lane = lane("1", 105.);
        assert_eq!(None, lane.number_of_represented_lanes);
        assert_eq!(1.0, lane.represented_lanes());
        assert_eq!(None, lane.capacity_vehicles_per_hour);
        assert!(lane.to_link_ids.is_empty());
        assert!(lane.to_lane_ids.is_empty());
    }

    #[test]
    fn builder_requires_start() {
        let result = LaneBuilder::default().id(Id::create("1")).build();
        assert!(result.is_err());
    }

    #[test]
    fn builder_explicit_values() {
        let lane = LaneBuilder::default()
            .id(Id::create("2"))
            .starts_at_meter_from_link_end(105.)
            .number_of_represented_lanes(2.)
            .capacity_vehicles_per_hour(1800.)
            .to_link_ids(vec![Id::create("2")])
            .build()
            .unwrap();

        assert_eq!(2., lane.represented_lanes());
        assert_eq!(Some(1800.), lane.capacity_vehicles_per_hour);
        assert!(lane.leads_to(&Id::create("2")));
        assert!(!lane.leads_to(&Id::create("3")));
    }

    #[test]
    fn original_lane_id_fallback() {
        let mut assignment = LanesToLinkAssignment::new(Id::create("1"));
        assert_eq!("1.ol", assignment.original_lane_id().external());

        assignment.set_original_lane(lane("upstream", 1005.));
        assert_eq!("upstream", assignment.original_lane_id().external());
    }

    #[test]
    fn max_lane_start() {
        let mut assignment = LanesToLinkAssignment::new(Id::create("1"));
        assert_eq!(0., assignment.max_lane_start());

        assignment
            .add_lane(lane("1", 105.))
            .add_lane(lane("2", 250.))
            .add_lane(lane("3", 30.));
        assert_eq!(250., assignment.max_lane_start());
        assert_eq!(3., assignment.represented_lanes_sum());
    }

    #[test]
    fn lanes_by_link() {
        let mut lanes = Lanes::new();
        lanes.add_assignment(LanesToLinkAssignment::new(Id::create("1")));

        assert_eq!(1, lanes.len());
        assert!(lanes.get(&Id::create("1")).is_some());
        assert!(lanes.get(&Id::create("2")).is_none());
    }

    #[test]
    #[should_panic]
    fn lanes_reject_duplicate_link() {
        let mut lanes = Lanes::new();
        lanes.add_assignment(LanesToLinkAssignment::new(Id::create("1")));
        lanes.add_assignment(LanesToLinkAssignment::new(Id::create("1")));
    }
}
