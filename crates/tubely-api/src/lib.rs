//! Tubely API
//!
//! HTTP surface of the media upload service: bearer-token authentication, the
//! thumbnail and video upload pipelines, and serving of locally stored assets.

pub mod auth;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod services;
pub mod setup;
pub mod state;
pub mod telemetry;
pub mod utils;
