//! Data models for the promoter agent

pub mod request;
pub mod version;
