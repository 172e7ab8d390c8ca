//! HTTP service for weekly course surveys.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod repository;

pub use api::{AppState, create_router};
pub use config::ServerConfig;
