//! Deployment pipeline: platform capabilities, processing monitor,
//! and the stage orchestrator

pub mod monitor;
pub mod pipeline;
pub mod platform;
