//! Shared test utilities for repo-analyst integration tests.
//!
//! - `TestHarness` wires a store, a worker pool and a dispatcher over stubs
//! - stub `RepositoryFetcher`s and a scripted `SummarizationBackend`

pub mod harness;
pub mod stubs;

pub use harness::{status_rank, TestHarness};
pub use stubs::{Gate, ScriptedBackend, StubFetcher};
