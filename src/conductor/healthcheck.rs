use crate::core::ProviderError;

use super::api::{CloudConfig, Node};

/// Nodes that can run transcodes right now.
pub fn active_server_count(nodes: &[Node]) -> usize {
    nodes.iter().filter(|node| node.is_active_server()).count()
}

/// Point-in-time capacity check against the cluster's configured minimum.
pub fn check_capacity(nodes: &[Node], cloud_config: &CloudConfig) -> Result<(), ProviderError> {
    let active = active_server_count(nodes);
    if active < cloud_config.min_nodes {
        return Err(ProviderError::Capacity {
            required: cloud_config.min_nodes,
            active,
        });
    }
    Ok(())
}
