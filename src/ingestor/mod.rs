//! Ingestion boundary between backend payloads and the guide core

pub mod normalize;

pub use normalize::{NormalizeReport, RawProgram, normalize_programs};
