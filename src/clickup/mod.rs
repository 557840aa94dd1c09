//! ClickUp API access.

pub mod client;
mod types;

pub use client::{ClickUpClient, ClientError, Endpoint};
pub use types::*;
