//! Document lifecycle engine for the Camara training itinerary: tracks
//! participants through a fixed three-phase program, issues the legally
//! binding annex documents each phase requires, accepts role-gated
//! signatures, and materializes every document as a deterministic,
//! fingerprinted PDF (with ZIP bundling for batch export).
//!
//! Transport, persistence and authentication are external: callers hand
//! the engine an already-authenticated [`AuthenticatedActor`] and invoke
//! operations on [`Engine`].

pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod store;
pub mod telemetry;

pub use engine::Engine;
pub use error::{EngineError, EngineResult};
pub use store::models::AuthenticatedActor;
pub use store::MemoryStore;
