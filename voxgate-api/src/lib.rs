//! # VoxGate API Server Library
//!
//! This library provides the core functionality for the VoxGate API server,
//! a gateway that fronts a third-party speech synthesis provider with
//! accounts, task tracking, and provider callbacks.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
