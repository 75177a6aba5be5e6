pub mod format;
pub mod request;
pub mod response;

pub use format::render;
pub use request::{is_valid_guid, GatewayRequest, RequestError, RequestFormat};
pub use response::{CoreResponse, KoResponse, VaCentersResponse};
