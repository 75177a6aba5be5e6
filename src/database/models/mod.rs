pub mod locator;
pub mod module;
pub mod vacenter;

pub use locator::{LocatorKind, PairCoreRtv};
pub use module::{CoreModule, RtvModule, ServerTypeId, RTV_MODULE_TYPE_DESC, RTV_MODULE_TYPE_ID};
pub use vacenter::{VaCenter, VaCenterList};
