//! FoodEvents Common Library
//!
//! Shared code for the FoodEvents services including:
//! - The adverse-event query pipeline (extraction, fetch, compaction, synthesis)
//! - Text generation client abstraction
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod config;
pub mod errors;
pub mod llm;
pub mod metrics;
pub mod pipeline;

// Re-export commonly used types
pub use crate::config::AppConfig;
pub use crate::errors::{AppError, Result};
pub use crate::llm::TextGenerator;
pub use crate::pipeline::{QueryOutcome, QueryPipeline};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Human-readable project name
pub const PROJECT_NAME: &str = "FDA Food Adverse Event AI Agent";
