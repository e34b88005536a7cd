//! # LMS Shared Library
//!
//! Domain types, persistence and authentication primitives used by the
//! `lms-api` server.
//!
//! ## Module Organization
//!
//! - `models`: database models and their queries
//! - `store`: persistence gateway (`PgStore`, `MemoryStore`)
//! - `db`: connection pool and migrations
//! - `auth`: password hashing, JWT and guard strategies

pub mod auth;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
