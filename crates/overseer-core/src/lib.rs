pub mod checklist;
pub mod config;
pub mod error;
pub mod grammar;
pub mod index;
pub mod io;
pub mod lifecycle;
pub mod orchestrator;
pub mod paths;
pub mod phase_doc;
pub mod store;
pub mod timestamp;
pub mod types;

pub use error::{OverseerError, Result};
