//! LeadTrack Backend Library
//!
//! Sales-lead tracking API: agents, leads and comments behind JWT auth.
//! Exposes the router and its building blocks for the binary and tests.

pub mod api;
pub mod auth;
pub mod config;
pub mod middleware;
pub mod models;
pub mod populate;
pub mod store;
