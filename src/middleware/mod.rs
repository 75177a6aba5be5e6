pub mod request_data;

pub use request_data::request_data_middleware;
