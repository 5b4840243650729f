//! Core of a similarity index: records items described by multi-band
//! MinHash signatures, indexes them for approximate nearest-neighbor recall
//! by shared hash buckets, and scores candidates by a banded similarity
//! metric.
//!
//! The MinHash extraction that produces signatures, the RPC/script
//! transport that ships arguments, and the key-value store itself are all
//! external collaborators; this crate only owns the indexing scheme, the
//! candidate retrieval/ranking pipeline, and the argument/command layer on
//! top of them.

pub mod args;
pub mod candidate_index;
pub mod codec;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod frequency;
pub mod limits;
pub mod ordered;
pub mod signature;
pub mod similarity;
pub mod storage;
pub mod telemetry;
pub mod windowed_set;

pub use config::Configuration;
pub use engine::{Engine, Output, Score};
pub use error::EngineError;
pub use limits::RuntimeLimits;
