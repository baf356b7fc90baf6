pub mod inbound;
pub mod outbound;
pub mod templating;

// Re-export commonly used outbound adapters at the adapters level
pub use outbound::completion;
pub use outbound::telemetry;
