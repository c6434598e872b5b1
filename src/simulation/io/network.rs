use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::simulation::id::Id;
use crate::simulation::io::{file_reader, IoError};
use crate::simulation::network::global_network::{
    Link, Network, Node, DEFAULT_CAPACITY_PERIOD, DEFAULT_EFFECTIVE_CELL_SIZE,
};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct IONode {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Default, Clone)]
pub struct IOLink {
    pub id: String,
    pub from: String,
    pub to: String,
    pub length: f64,
    pub capacity: f64,
    pub freespeed: f64,
    pub permlanes: f64,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct IONetwork {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_capacity_period")]
    pub capacity_period: f64,
    #[serde(default = "default_effective_cell_size")]
    pub effective_cell_size: f64,
    #[serde(default)]
    pub nodes: Vec<IONode>,
    #[serde(default)]
    pub links: Vec<IOLink>,
}

fn default_capacity_period() -> f64 {
    DEFAULT_CAPACITY_PERIOD
}

fn default_effective_cell_size() -> f64 {
    DEFAULT_EFFECTIVE_CELL_SIZE
}

impl IONetwork {
    pub fn new(name: Option<String>) -> IONetwork {
        IONetwork {
            name,
            capacity_period: DEFAULT_CAPACITY_PERIOD,
            effective_cell_size: DEFAULT_EFFECTIVE_CELL_SIZE,
            nodes: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn from_file(file_path: &Path) -> Result<IONetwork, IoError> {
        let network: IONetwork = file_reader::read(file_path)?;
        info!(
            "IONetwork:: Finished reading network. It contains {} nodes and {} links.",
            network.nodes.len(),
            network.links.len()
        );
        Ok(network)
    }

    /// Creates ids for all nodes and links and wires links up with their nodes. Links referencing
    /// nodes which are not part of the file are reported as errors.
    pub fn into_network(self) -> Result<Network, IoError> {
        let mut network = Network::new();
        network.capacity_period = self.capacity_period;
        network.effective_cell_size = self.effective_cell_size;

        for io_node in &self.nodes {
            network.add_node(Node::new(Id::create(&io_node.id), io_node.x, io_node.y));
        }

        for io_link in &self.links {
            let from = node_id(&network, &io_link.from, &io_link.id)?;
            let to = node_id(&network, &io_link.to, &io_link.id)?;
            network.add_link(Link::new(
                Id::create(&io_link.id),
                from,
                to,
                io_link.length,
                io_link.capacity,
                io_link.freespeed,
                io_link.permlanes,
                self.capacity_period,
            ));
        }

        Ok(network)
    }
}

fn node_id(network: &Network, external: &str, link: &str) -> Result<Id<Node>, IoError> {
    Id::<Node>::try_get_from_ext(external)
        .filter(|id| network.try_get_node(id).is_some())
        .ok_or_else(|| IoError::UnknownReference {
            kind: "node",
            id: external.to_string(),
            referenced_by: format!("link {link}"),
        })
}

impl From<&Network> for IONetwork {
    fn from(network: &Network) -> Self {
        let mut result = IONetwork::new(None);
        result.capacity_period = network.capacity_period;
        result.effective_cell_size = network.effective_cell_size;
        result.nodes = network
            .nodes()
            .iter()
            .map(|n| IONode {
                id: n.id.external().to_string(),
                x: n.x,
                y: n.y,
            })
            .collect();
        result.links = network
            .links()
            .iter()
            .map(|l| IOLink {
                id: l.id.external().to_string(),
                from: l.from.external().to_string(),
                to: l.to.external().to_string(),
                length: l.length,
                capacity: l.capacity,
                freespeed: l.freespeed,
                permlanes: l.permlanes,
            })
            .collect();
        result
    }
}
