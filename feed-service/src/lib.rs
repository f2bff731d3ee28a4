//! Orchestration services for the news feed engine
//!
//! This crate wires the pure ranking pipeline to the outside world: the
//! per-request feed builder, the AI analysis boundary with its heuristic
//! fallback, and the scheduled refresh service with its skip-if-busy guard.

pub mod analysis;
pub mod pipeline;
pub mod refresh;

pub use analysis::{AnalysisClient, AnalysisClientConfig, AnalysisResult};
pub use pipeline::FeedPipeline;
pub use refresh::{RefreshConfig, RefreshGuard, RefreshPermit, RefreshService};
