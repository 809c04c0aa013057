//! HTTP client for the hosting platform API

pub mod client;
