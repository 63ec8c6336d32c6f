//! Command line client for the Rekono REST API.
//!
//! # Modules
//!
//! - `transport`: HTTP execution with retries
//! - `endpoint`: canonical `/api/.../` paths
//! - `client`: authenticated requests and pagination
//! - `normalize`: flattening responses into one JSON value
//! - `format`: rendering and saving output
//! - `commands`: the entity registry and the clap command tree
//! - `actions`: planning and sending the request of a command

pub mod actions;
pub mod auth;
pub mod client;
pub mod commands;
pub mod configuration;
pub mod context;
pub mod endpoint;
pub mod error;
pub mod exit_codes;
pub mod format;
pub mod model;
pub mod normalize;
pub mod transport;
