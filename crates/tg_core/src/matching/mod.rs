//! Free-text name resolution.
//!
//! Resolves a teammate/avoid request string to a canonical roster member,
//! tolerant of nicknames, typos and concatenation, with a confidence score
//! driving the acceptance policy downstream.

pub mod nicknames;
pub mod phonetic;
mod resolver;

pub use resolver::{normalize, score_pair, MatchConfidence, NameMatch, NameResolver, NameScore};

/// Score at or above which a resolution is auto-accepted by the pipeline.
pub const ACCEPT_THRESHOLD: f64 = 0.8;
