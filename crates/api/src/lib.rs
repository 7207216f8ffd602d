//! HTTP API: routing, request/response mapping and per-request middleware.

pub mod app;
pub mod middleware;
