//! Noteleaf profile HTTP API service.
//!
//! This crate provides the HTTP API for noteleaf profiles and gamification,
//! including:
//!
//! - Profile management and username reservation
//! - Action recording (points, streaks, activity history)
//! - Achievement catalog and unlocks
//!
//! # Authentication
//!
//! The service supports two authentication methods:
//!
//! 1. **User JWT tokens** - For end-user requests (profile, username,
//!    history)
//! 2. **Service API keys** - For service-to-service requests (the generation
//!    pipeline reporting completed actions)

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers need async for routing consistency

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
