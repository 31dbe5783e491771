//! Duplicate detection pipeline.
//!
//! Classification is tiered, cheapest check first:
//! 1. **Exact match**: SHA-256 hash of the normalized content against the
//!    fingerprint index
//! 2. **Near-duplicate**: best candidate similarity score against a
//!    configurable threshold
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     DuplicateDetector                        │
//! │  ┌────────────┐   ┌──────────────────┐   ┌────────────────┐  │
//! │  │ Normalizer │ → │ FingerprintIndex │ → │ Similarity     │  │
//! │  │ + Hasher   │   │ exact lookup     │   │ Scorer         │  │
//! │  └────────────┘   └──────────────────┘   └────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The detector only classifies; applying a classification (insert, skip,
//! merge) is the orchestrator's job, so classification stays pure and
//! order-independent for exact duplicates.

mod detector;
mod hasher;
mod index;
mod merge;
mod normalizer;
mod scorer;

pub use detector::{Classification, DuplicateDetector};
pub use hasher::ContentHasher;
pub use index::{CandidateStrategy, FingerprintIndex};
pub use merge::merge_into;
pub use normalizer::normalize;
pub use scorer::{LexicalScorer, SimilarityScorer};
