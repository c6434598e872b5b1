use nohash_hasher::IntMap;

use crate::simulation::id::Id;

/// Default spatial extent of one vehicle in a jam, in meters. Storage capacities are computed by
/// dividing a segment's lane meters by this value.
pub const DEFAULT_EFFECTIVE_CELL_SIZE: f64 = 7.5;

/// Default period in seconds to which link capacities refer.
pub const DEFAULT_CAPACITY_PERIOD: f64 = 3600.;

/// This is called global network, as it holds every link of a scenario, regardless of how the
/// links are later turned into simulation links.
#[derive(Debug)]
pub struct Network {
    nodes: Vec<Node>,
    links: Vec<Link>,
    node_index: IntMap<Id<Node>, usize>,
    link_index: IntMap<Id<Link>, usize>,
    pub capacity_period: f64,
    pub effective_cell_size: f64,
}

#[derive(Debug)]
pub struct Node {
    pub id: Id<Node>,
    pub x: f64,
    pub y: f64,
    pub in_links: Vec<Id<Link>>,
    pub out_links: Vec<Id<Link>>,
}

#[derive(Debug, Clone)]
pub struct Link {
    pub id: Id<Link>,
    pub from: Id<Node>,
    pub to: Id<Node>,
    pub length: f64,
    pub capacity: f64,
    pub freespeed: f64,
    pub permlanes: f64,
    pub capacity_period: f64,
}

impl Default for Network {
    fn default() -> Self {
        Network::new()
    }
}

impl Network {
    pub fn new() -> Self {
        Network {
            nodes: Vec::new(),
            links: Vec::new(),
            node_index: IntMap::default(),
            link_index: IntMap::default(),
            capacity_period: DEFAULT_CAPACITY_PERIOD,
            effective_cell_size: DEFAULT_EFFECTIVE_CELL_SIZE,
        }
    }

    pub fn add_node(&mut self, node: Node) {
        assert!(
            !self.node_index.contains_key(&node.id),
            "Node id {} already exists in the network.",
            node.id
        );
        self.node_index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
    }

    pub fn add_link(&mut self, link: Link) {
        assert!(
            !self.link_index.contains_key(&link.id),
            "Link id {} already exists in the network.",
            link.id
        );

        // wire up in and out links and push link to the links vec
        self.get_node_mut(&link.from).out_links.push(link.id.clone());
        self.get_node_mut(&link.to).in_links.push(link.id.clone());
        self.link_index.insert(link.id.clone(), self.links.len());
        self.links.push(link);
    }

    /// Creates a link with the capacity period of this network and adds it.
    #[allow(clippy::too_many_arguments)]
    pub fn create_link(
        &mut self,
        id: Id<Link>,
        from: &Id<Node>,
        to: &Id<Node>,
        length: f64,
        capacity: f64,
        freespeed: f64,
        permlanes: f64,
    ) -> &Link {
        let link = Link::new(
            id.clone(),
            from.clone(),
            to.clone(),
            length,
            capacity,
            freespeed,
            permlanes,
            self.capacity_period,
        );
        self.add_link(link);
        self.get_link(&id)
    }

    pub fn get_node(&self, id: &Id<Node>) -> &Node {
        self.try_get_node(id)
            .unwrap_or_else(|| panic!("Node {id} is not part of the network."))
    }

    pub fn try_get_node(&self, id: &Id<Node>) -> Option<&Node> {
        self.node_index.get(id).map(|index| &self.nodes[*index])
    }

    fn get_node_mut(&mut self, id: &Id<Node>) -> &mut Node {
        let index = *self
            .node_index
            .get(id)
            .unwrap_or_else(|| panic!("Node {id} is not part of the network."));
        &mut self.nodes[index]
    }

    pub fn get_link(&self, id: &Id<Link>) -> &Link {
        self.try_get_link(id)
            .unwrap_or_else(|| panic!("Link {id} is not part of the network."))
    }

    pub fn try_get_link(&self, id: &Id<Link>) -> Option<&Link> {
        self.link_index.get(id).map(|index| &self.links[*index])
    }

    /// Links in the order they were added.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

impl Node {
    pub fn new(id: Id<Node>, x: f64, y: f64) -> Self {
        Node {
            id,
            x,
            y,
            in_links: Vec::new(),
            out_links: Vec::new(),
        }
    }
}

impl Link {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: Id<Link>,
        from: Id<Node>,
        to: Id<Node>,
        length: f64,
        capacity: f64,
        freespeed: f64,
        permlanes: f64,
        capacity_period: f64,
    ) -> Self {
        Link {
            id,
            from,
            to,
            length,
            capacity,
            freespeed,
            permlanes,
            capacity_period,
        }
    }

    pub fn new_with_default(id: Id<Link>, from: &Node, to: &Node) -> Self {
        // compute eucledean distance between from and to node
        let length = ((from.x - to.x).powi(2) + (from.y - to.y).powi(2)).sqrt();
        Link::new(
            id,
            from.id.clone(),
            to.id.clone(),
            length,
            1.,
            1.,
            1.,
            DEFAULT_CAPACITY_PERIOD,
        )
    }
}
