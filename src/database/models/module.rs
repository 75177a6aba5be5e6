use serde::{Deserialize, Serialize};
use std::fmt;

/// Server type id assigned to every RTV module
pub const RTV_MODULE_TYPE_ID: ServerTypeId = ServerTypeId::Numeric(2);
pub const RTV_MODULE_TYPE_DESC: &str = "RTV";

/// A server module belonging to a core (or an RTV server)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreModule {
    pub id: i64,
    pub description: Option<String>,
    pub module_type_id: ServerTypeId,
    pub module_type_desc: Option<String>,
    pub ip: Option<String>,
    pub port_http: Option<i64>,
    pub port_https: Option<i64>,
    pub port_core: Option<i64>,
    pub port_webcontrol: Option<i64>,
}

/// RTV servers share the core module shape
pub type RtvModule = CoreModule;

/// `idWCoreServerType` is a VARCHAR key; numeric values are emitted as
/// numbers, anything else is passed through as text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerTypeId {
    Numeric(i64),
    Text(String),
}

impl ServerTypeId {
    pub fn from_column(raw: &str) -> Self {
        match raw.trim().parse::<i64>() {
            Ok(id) => ServerTypeId::Numeric(id),
            Err(_) => ServerTypeId::Text(raw.to_string()),
        }
    }
}

impl From<i64> for ServerTypeId {
    fn from(id: i64) -> Self {
        ServerTypeId::Numeric(id)
    }
}

impl fmt::Display for ServerTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerTypeId::Numeric(id) => write!(f, "{}", id),
            ServerTypeId::Text(text) => write!(f, "{}", text),
        }
    }
}
