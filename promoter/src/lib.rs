//! Promoter Library
//!
//! Core modules for the bundle promotion agent.

pub mod app;
pub mod deploy;
pub mod errors;
pub mod http;
pub mod logs;
pub mod models;
pub mod settings;
pub mod utils;
