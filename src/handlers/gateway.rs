use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Response,
};
use std::str::FromStr;
use tracing::{error, info};

use crate::api::{is_valid_guid, render, CoreResponse, GatewayRequest, VaCentersResponse};
use crate::database::models::LocatorKind;
use crate::error::ApiError;
use super::AppState;

/// Events understood by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    CoreByCampaign,
    CoreByBranch,
    CoreByVaCenter,
    VaCentersByUser,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::CoreByCampaign => "get_core_by_campaign",
            Event::CoreByBranch => "get_core_by_branch",
            Event::CoreByVaCenter => "get_core_by_vacenter",
            Event::VaCentersByUser => "get_vacenters_by_user",
        }
    }

    /// Locator kind resolved by the `get_core_by_*` events
    pub fn locator_kind(&self) -> Option<LocatorKind> {
        match self {
            Event::CoreByCampaign => Some(LocatorKind::Campaign),
            Event::CoreByBranch => Some(LocatorKind::Branch),
            Event::CoreByVaCenter => Some(LocatorKind::VaCenter),
            Event::VaCentersByUser => None,
        }
    }
}

impl FromStr for Event {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "get_core_by_campaign" => Ok(Event::CoreByCampaign),
            "get_core_by_branch" => Ok(Event::CoreByBranch),
            "get_core_by_vacenter" => Ok(Event::CoreByVaCenter),
            "get_vacenters_by_user" => Ok(Event::VaCentersByUser),
            other => Err(ApiError::InvalidEvent(other.to_string())),
        }
    }
}

/// GET|POST / - dispatch the event named in the request data
pub async fn handle_event(
    State(state): State<AppState>,
    Extension(request): Extension<GatewayRequest>,
) -> Response {
    match dispatch(&state, &request).await {
        Ok(response) => response,
        Err(api_error) => render(&request, api_error.status_code(), &api_error.to_json()),
    }
}

async fn dispatch(state: &AppState, request: &GatewayRequest) -> Result<Response, ApiError> {
    let (event_name, guid) = match (request.event(), request.guid()) {
        (Some(event), Some(guid)) => (event, guid),
        _ => {
            let api_error = ApiError::MissingParameters(request.data.to_string());
            error!("{}", api_error);
            return Err(api_error);
        }
    };

    if !is_valid_guid(guid) {
        let api_error = ApiError::WrongGuid(guid.to_string());
        error!("{}", api_error);
        return Err(api_error);
    }

    let event = Event::from_str(event_name).map_err(|api_error| {
        error!("Invalid event {}", event_name);
        api_error
    })?;

    match event.locator_kind() {
        Some(kind) => {
            let resolution = state.locator.resolve_core(kind, guid).await.map_err(|e| {
                error!("{} {} not found: {}", event.as_str(), guid, e);
                ApiError::from_lookup(e, guid)
            })?;
            info!(
                "{} guid={} core={} rtv={}",
                event.as_str(),
                guid,
                resolution.pair.core_id,
                resolution.pair.rtv_id
            );
            Ok(render(request, StatusCode::OK, &CoreResponse::from(&resolution)))
        }
        None => {
            let list = state.locator.vacenters_by_user(guid).await.map_err(|e| {
                error!("{} {} not found: {}", event.as_str(), guid, e);
                ApiError::from_lookup(e, guid)
            })?;
            info!("{} guid={} vacenters={}", event.as_str(), guid, list.vacenter_list.len());
            Ok(render(request, StatusCode::OK, &VaCentersResponse::from(list)))
        }
    }
}
