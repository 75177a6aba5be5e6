pub mod api;
pub mod app;
pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;

pub use app::app;

#[cfg(test)]
pub mod testing;
