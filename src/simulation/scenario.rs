use thiserror::Error;
use tracing::info;

use crate::simulation::config::Config;
use crate::simulation::io::lanes::IOLanes;
use crate::simulation::io::network::IONetwork;
use crate::simulation::io::{resolve_path, IoError};
use crate::simulation::network::global_network::Network;
use crate::simulation::network::lanes::Lanes;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("the config has no scenario module, so there is no network to load")]
    MissingScenario,
    #[error(transparent)]
    Io(#[from] IoError),
}

/// Network and lanes of a run.
#[derive(Debug)]
pub struct Scenario {
    pub network: Network,
    pub lanes: Option<Lanes>,
}

impl Scenario {
    /// Loads the files of the scenario module. Lanes are only read if a lanes file is configured
    /// and `lanes.use_lanes` is set.
    pub fn load(config: &Config) -> Result<Scenario, ScenarioError> {
        let scenario_config = config.scenario().ok_or(ScenarioError::MissingScenario)?;

        let network_path = resolve_path(config.context(), &scenario_config.network);
        let network = IONetwork::from_file(&network_path)?.into_network()?;

        let lanes = match scenario_config.lanes {
            Some(lanes_file) if config.lanes().use_lanes => {
                let lanes_path = resolve_path(config.context(), &lanes_file);
                Some(IOLanes::from_file(&lanes_path)?.into_lanes(&network)?)
            }
            _ => None,
        };

        info!(
            "Loaded scenario with {} nodes, {} links and lanes on {} links.",
            network.nodes().len(),
            network.links().len(),
            lanes.as_ref().map_or(0, Lanes::len)
        );
        Ok(Scenario { network, lanes })
    }
}
