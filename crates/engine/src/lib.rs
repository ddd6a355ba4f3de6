pub mod classify;
pub mod execute;
pub mod generate;
pub mod history;
pub mod pipeline;
pub mod plan;
pub mod policy;
pub mod redact;
pub mod telemetry;

// Re-exports for convenience.
pub use execute::Executor;
pub use generate::Generator;
pub use history::SessionStore;
pub use pipeline::Pipeline;
pub use telemetry::{AnalyticsSink, RestAnalyticsSink, Telemetry};
