//! # Trackle Shared Library
//!
//! Common types, models, and utilities shared across Trackle services.
//!
//! This crate provides:
//! - Database models and query helpers (users, projects, tasks)
//! - Authentication primitives (JWT issuing/validation, password hashing)
//! - Database pool management and migrations

pub mod auth;
pub mod db;
pub mod models;

/// Shared library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
