use serde::Serialize;

use crate::database::models::{CoreModule, ServerTypeId, VaCenter, VaCenterList};
use crate::services::CoreResolution;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleSummary {
    pub id: i64,
    pub desc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleType {
    pub id: ServerTypeId,
    pub desc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModulePorts {
    pub http: Option<i64>,
    pub https: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleElement {
    pub core_id: i64,
    pub core: Option<i64>,
    pub webcontrol: Option<i64>,
    pub desc: Option<String>,
    #[serde(rename = "type")]
    pub module_type: ModuleType,
    pub ip: Option<String>,
    pub port: ModulePorts,
}

impl From<&CoreModule> for ModuleElement {
    fn from(module: &CoreModule) -> Self {
        Self {
            core_id: module.id,
            core: module.port_core,
            webcontrol: module.port_webcontrol,
            desc: module.description.clone(),
            module_type: ModuleType {
                id: module.module_type_id.clone(),
                desc: module.module_type_desc.clone(),
            },
            ip: module.ip.clone(),
            port: ModulePorts {
                http: module.port_http,
                https: module.port_https,
            },
        }
    }
}

/// Successful answer to the `get_core_by_*` events
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreResponse {
    pub result: &'static str,
    pub core: ModuleSummary,
    pub rtv: ModuleSummary,
    pub elements: Vec<ModuleElement>,
}

impl From<&CoreResolution> for CoreResponse {
    fn from(resolution: &CoreResolution) -> Self {
        // The first module names the core
        let core = resolution
            .cores
            .first()
            .map(|module| ModuleSummary {
                id: module.id,
                desc: module.description.clone(),
            })
            .unwrap_or(ModuleSummary {
                id: resolution.pair.core_id,
                desc: None,
            });

        Self {
            result: "ok",
            core,
            rtv: ModuleSummary {
                id: resolution.rtv.id,
                desc: resolution.rtv.description.clone(),
            },
            elements: resolution.cores.iter().map(ModuleElement::from).collect(),
        }
    }
}

/// Successful answer to `get_vacenters_by_user`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VaCentersResponse {
    pub result: &'static str,
    pub user_guid: String,
    pub elements: Vec<VaCenter>,
}

impl From<VaCenterList> for VaCentersResponse {
    fn from(list: VaCenterList) -> Self {
        Self {
            result: "ok",
            user_guid: list.user_guid,
            elements: list.vacenter_list,
        }
    }
}

/// Failure envelope; `resultcode` distinguishes the failure kind
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KoResponse {
    pub result: &'static str,
    pub message: String,
    pub resultcode: u16,
}

impl KoResponse {
    pub fn new(message: impl Into<String>, resultcode: u16) -> Self {
        Self {
            result: "ko",
            message: message.into(),
            resultcode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{LocatorKind, PairCoreRtv};
    use serde_json::json;

    fn module(description: &str) -> CoreModule {
        CoreModule {
            id: 1,
            description: Some(description.to_string()),
            module_type_id: ServerTypeId::Numeric(1),
            module_type_desc: Some("module description".to_string()),
            ip: Some("ip".to_string()),
            port_http: Some(80),
            port_https: Some(443),
            port_core: Some(9889),
            port_webcontrol: Some(9880),
        }
    }

    #[test]
    fn core_response_has_expected_shape() {
        let resolution = CoreResolution {
            pair: PairCoreRtv::new(LocatorKind::Branch, "fb1f42c5-3e4c-4b9e-9dd4-bdb7ff8a6fa0", 2, 3),
            cores: vec![module("module test")],
            rtv: module("rtv test"),
        };

        let value = serde_json::to_value(CoreResponse::from(&resolution)).unwrap();
        assert_eq!(
            value,
            json!({
                "result": "ok",
                "core": { "id": 1, "desc": "module test" },
                "rtv": { "id": 1, "desc": "rtv test" },
                "elements": [{
                    "core_id": 1,
                    "core": 9889,
                    "webcontrol": 9880,
                    "desc": "module test",
                    "type": { "id": 1, "desc": "module description" },
                    "ip": "ip",
                    "port": { "http": 80, "https": 443 }
                }]
            })
        );
    }

    #[test]
    fn vacenters_response_lists_elements() {
        let list = VaCenterList {
            user_guid: "35c166d9-f30a-4dad-b5e4-27a4d205d392".to_string(),
            vacenter_list: vec![VaCenter {
                guid: "51a0f468-b179-403b-b8b9-338c8f332792".to_string(),
                name: "test".to_string(),
            }],
        };
        let value = serde_json::to_value(VaCentersResponse::from(list)).unwrap();
        assert_eq!(
            value,
            json!({
                "result": "ok",
                "user_guid": "35c166d9-f30a-4dad-b5e4-27a4d205d392",
                "elements": [{ "guid": "51a0f468-b179-403b-b8b9-338c8f332792", "name": "test" }]
            })
        );
    }
}
