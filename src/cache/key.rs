use serde_json::json;
use std::fmt;

use crate::database::models::LocatorKind;

/// Cache key of a lookup, rendered as `{"<operation>":<argument>}`.
/// Absent numeric ids are keyed as `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheKey<'a> {
    CoreById(Option<i64>),
    RtvById(Option<i64>),
    VaCentersByUser(&'a str),
    CoreByLocator(LocatorKind, &'a str),
}

impl CacheKey<'_> {
    pub fn operation(&self) -> &'static str {
        match self {
            CacheKey::CoreById(_) => "get_core_by_id",
            CacheKey::RtvById(_) => "get_rtv_by_id",
            CacheKey::VaCentersByUser(_) => "get_vacenters_by_user",
            CacheKey::CoreByLocator(LocatorKind::Campaign, _) => "get_core_by_campaign",
            CacheKey::CoreByLocator(LocatorKind::Branch, _) => "get_core_by_branch",
            CacheKey::CoreByLocator(LocatorKind::VaCenter, _) => "get_core_by_vacenter",
        }
    }
}

impl fmt::Display for CacheKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let argument = match self {
            CacheKey::CoreById(id) | CacheKey::RtvById(id) => json!(id.unwrap_or(0)),
            CacheKey::VaCentersByUser(guid) | CacheKey::CoreByLocator(_, guid) => json!(guid),
        };
        let mut object = serde_json::Map::new();
        object.insert(self.operation().to_string(), argument);
        write!(f, "{}", serde_json::Value::Object(object))
    }
}
