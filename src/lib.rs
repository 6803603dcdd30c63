// Farmboard - discussion board with a livestock production dashboard

pub mod app_state;
pub mod charts;
pub mod config;
pub mod database;
pub mod error;
pub mod farm_map;
pub mod models;
pub mod report;
pub mod routes;

// Re-exports for convenience
pub use error::{AppError, AppResult};
