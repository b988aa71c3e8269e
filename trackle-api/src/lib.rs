//! # Trackle API Server Library
//!
//! Axum-based REST API for the Trackle task tracker. Users register and
//! log in with JWT sessions, group their work into a small number of
//! projects, and move tasks through a todo / in-progress / completed
//! lifecycle. Every endpoint answers with the same response envelope:
//! `{ statusCode, data, message, success }`.

pub mod app;
pub mod avatar;
pub mod config;
pub mod error;
pub mod middleware;
pub mod response;
pub mod routes;
