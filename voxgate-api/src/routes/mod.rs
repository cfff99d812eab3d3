/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login)
/// - `user`: Profile endpoint with provider account info
/// - `voices`: Provider voice catalog
/// - `tasks`: Synthesis task endpoints (create, list, detail, delete, check-status)
/// - `webhook`: Provider completion callback
/// - `admin`: User and task management endpoints
/// - `proxy`: Audio relay

pub mod admin;
pub mod auth;
pub mod health;
pub mod proxy;
pub mod tasks;
pub mod user;
pub mod voices;
pub mod webhook;
