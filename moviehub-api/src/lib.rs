//! # MovieHub API Server Library
//!
//! This library provides the HTTP layer of the MovieHub server.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Extractors with API-formatted rejections
//! - `middleware`: Authentication gates and development error detail
//! - `routes`: API route handlers
//! - `telemetry`: Tracing subscriber setup
//! - `validation`: Custom request field validators

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod telemetry;
pub mod validation;
