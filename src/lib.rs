pub mod clickup;
pub mod config;
pub mod models;
pub mod pipeline;
pub mod render;
pub mod report;
pub mod store;
