//! linkmark: a personal bookmark manager core.
//!
//! Ingests URLs into enriched bookmarks (title, favicon, AI summary), stores
//! them per user with tags and hierarchical categories, and serves them over
//! a line-delimited JSON-RPC surface.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod database;
pub mod managers;
pub mod services;
pub mod rpc_handler;
pub mod types;
