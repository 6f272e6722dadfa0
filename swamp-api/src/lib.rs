//! # SwampScheduler API Server Library
//!
//! REST backend for SwampScheduler: personal tasks, XP and achievements,
//! pomodoro sessions, shared boards and completion analytics.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Extractors whose rejections use the JSON error shape
//! - `middleware`: Security headers and bearer-token authentication
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
