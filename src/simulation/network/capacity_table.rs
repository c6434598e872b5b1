use itertools::Itertools;
use nohash_hasher::IntMap;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::simulation::config::{Config, LaneValidation};
use crate::simulation::id::Id;
use crate::simulation::network::capacity::{
    compute_capacities, CapacityFactors, LinkCapacityResult,
};
use crate::simulation::network::global_network::{Link, Network};
use crate::simulation::network::lanes::Lanes;
use crate::simulation::network::validation::{validate_network_lanes, LaneInconsistency};

#[derive(Debug, Error)]
pub enum CapacityError {
    #[error("found {} inconsistent lane definitions: {}", .issues.len(), .issues.iter().join("; "))]
    InconsistentLanes { issues: Vec<LaneInconsistency> },
}

/// Capacities of all links of a network. The table is computed once before a simulation run and
/// is read only afterwards, so that it can be shared between threads.
#[derive(Debug)]
pub struct CapacityTable {
    results: Vec<LinkCapacityResult>,
    index: IntMap<Id<Link>, usize>,
}

impl CapacityTable {
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn compute(
        network: &Network,
        lanes: Option<&Lanes>,
        config: &Config,
    ) -> Result<CapacityTable, CapacityError> {
        let lanes_config = config.lanes();
        let lanes = lanes.filter(|_| lanes_config.use_lanes);

        if let Some(lanes) = lanes {
            check_lanes(network, lanes, lanes_config.validation)?;
        }

        let factors = CapacityFactors::new(&config.simulation(), network.effective_cell_size);
        let mut results = Vec::with_capacity(network.links().len());
        let mut index = IntMap::default();

        for link in network.links() {
            let assignment = lanes.and_then(|l| l.get(&link.id));
            let result = compute_capacities(link, assignment, &factors);
            debug!(
                "Link {}: flow capacity {} veh/s, storage capacity {} veh on {} segments",
                link.id,
                result.simulated_flow_capacity,
                result.space_cap,
                result.downstream_lanes.len() + 1
            );
            index.insert(link.id.clone(), results.len());
            results.push(result);
        }

        let table = CapacityTable { results, index };
        info!(
            "Computed capacities of {} links. {} of them have lanes.",
            table.len(),
            table.iter().filter(|r| r.has_lanes()).count()
        );
        Ok(table)
    }

    pub fn get(&self, link_id: &Id<Link>) -> Option<&LinkCapacityResult> {
        self.index.get(link_id).map(|i| &self.results[*i])
    }

    /// Results in the order in which the links were added to the network.
    pub fn iter(&self) -> impl Iterator<Item = &LinkCapacityResult> {
        self.results.iter()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn total_storage_capacity(&self) -> f64 {
        self.results.iter().map(|r| r.space_cap).sum()
    }
}

fn check_lanes(
    network: &Network,
    lanes: &Lanes,
    validation: LaneValidation,
) -> Result<(), CapacityError> {
    match validation {
        LaneValidation::None => Ok(()),
        LaneValidation::Warn => {
            for issue in validate_network_lanes(network, lanes) {
                warn!("{issue}");
            }
            Ok(())
        }
        LaneValidation::Strict => {
            let issues = validate_network_lanes(network, lanes);
            if issues.is_empty() {
                Ok(())
            } else {
                Err(CapacityError::InconsistentLanes { issues })
            }
        }
    }
}
