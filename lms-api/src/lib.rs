//! # Courseware LMS API Library
//!
//! - `app`: application state and router
//! - `config`: environment configuration
//! - `envelope`: success response envelope
//! - `error`: error type and HTTP mapping
//! - `extract`: validating extractors and the guarded caller
//! - `middleware`: route guards and security headers
//! - `routes`: HTTP handlers
//! - `services`: domain rules over the store gateway

pub mod app;
pub mod config;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod services;
