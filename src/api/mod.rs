//! HTTP client for the remote scoring service.

pub mod client;

pub use client::{Analysis, AnalysisClient};
