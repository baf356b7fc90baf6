//! Driven adapters: implementations of the outbound ports in `core::ports`.

pub mod completion;
pub mod telemetry;
