pub mod locator_service;

pub use locator_service::{CoreResolution, LocatorService};
