use super::schema::NodeInfoResponse;

/// What the node reports about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    /// The chain id the node participates in.
    pub network: String,
    pub moniker: String,
    pub node_version: String,
    pub app_version: Option<String>,
}

impl From<NodeInfoResponse> for NodeInfo {
    fn from(value: NodeInfoResponse) -> Self {
        NodeInfo {
            network: value.default_node_info.network,
            moniker: value.default_node_info.moniker,
            node_version: value.default_node_info.version,
            app_version: value
                .application_version
                .map(|app| format!("{} {}", app.name, app.version).trim().to_string()),
        }
    }
}
