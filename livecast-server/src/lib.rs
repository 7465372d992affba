//! Livecast Server Library
//!
//! This module exports the server components for testing and reuse.

pub mod config;
pub mod handlers;
pub mod routes;
pub mod state;
