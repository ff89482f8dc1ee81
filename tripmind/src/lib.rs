//! Socket agent for a strategy-game engine.
//!
//! The engine connects, narrates every change to its world state one line at a
//! time, and occasionally asks for a move. [`Session`] keeps a
//! [`WorldGraph`](tripmind_core::WorldGraph) in step with the narration,
//! answers move prompts with a sampled legal move, and records purchase
//! decisions as training data.

pub mod config;
pub mod dataset;
pub mod protocol;
pub mod session;

pub use config::ServeConfig;
pub use dataset::{DatasetError, DatasetRecorder, PurchaseRecord};
pub use protocol::{route, Inbound, Response};
pub use session::Session;
