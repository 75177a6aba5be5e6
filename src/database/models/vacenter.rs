use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaCenter {
    pub guid: String,
    pub name: String,
}

/// VA centers reachable by a user through their VA groups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaCenterList {
    pub user_guid: String,
    pub vacenter_list: Vec<VaCenter>,
}
