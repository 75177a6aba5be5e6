use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of organizational entity a locator GUID refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocatorKind {
    Campaign,
    Branch,
    #[serde(rename = "vacenter")]
    VaCenter,
}

impl LocatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocatorKind::Campaign => "campaign",
            LocatorKind::Branch => "branch",
            LocatorKind::VaCenter => "vacenter",
        }
    }
}

impl fmt::Display for LocatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocatorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "campaign" => Ok(LocatorKind::Campaign),
            "branch" => Ok(LocatorKind::Branch),
            "vacenter" => Ok(LocatorKind::VaCenter),
            other => Err(format!("unknown locator kind: {}", other)),
        }
    }
}

/// Core and RTV identifiers a locator resolves to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairCoreRtv {
    pub core_locator: LocatorKind,
    pub core_locator_id: String,
    pub core_id: i64,
    pub rtv_id: i64,
}

impl PairCoreRtv {
    pub fn new(core_locator: LocatorKind, core_locator_id: impl Into<String>, core_id: i64, rtv_id: i64) -> Self {
        Self {
            core_locator,
            core_locator_id: core_locator_id.into(),
            core_id,
            rtv_id,
        }
    }
}
