use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::PersistError;
use crate::{Cost, NodeId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyFile {
    pub nodes: Vec<NodeId>,
    pub links: Vec<LinkRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub source: NodeId,
    pub target: NodeId,
    pub cost: Cost,
}

impl TopologyFile {
    /// Parses and validates `text`. Nothing is returned unless the whole
    /// file could be applied.
    pub fn parse(text: &str) -> Result<Self, PersistError> {
        let file: TopologyFile = serde_json::from_str(text)?;
        file.validate()?;
        Ok(file)
    }

    pub fn to_json(&self) -> Result<String, PersistError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), PersistError> {
        let known: BTreeSet<&str> = self.nodes.iter().map(String::as_str).collect();

        for link in &self.links {
            if link.source == link.target {
                return Err(PersistError::SelfLoop(link.source.clone()));
            }
            for endpoint in [&link.source, &link.target] {
                if !known.contains(endpoint.as_str()) {
                    return Err(PersistError::UnknownEndpoint {
                        from: link.source.clone(),
                        to: link.target.clone(),
                        missing: endpoint.clone(),
                    });
                }
            }
            if !is_valid_cost(link.cost) {
                return Err(PersistError::InvalidCost {
                    from: link.source.clone(),
                    to: link.target.clone(),
                    cost: link.cost,
                });
            }
        }

        Ok(())
    }
}

pub fn is_valid_cost(cost: Cost) -> bool {
    cost.is_finite() && cost > 0.0
}
