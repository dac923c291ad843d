//! Quality-aware feature counting for FASTQ screening experiments.
//!
//! readtally turns raw high-throughput sequencing files into per-feature
//! abundance tables: each read is trimmed to its payload window (fixed
//! offset or anchor-derived), gated on per-base quality, and matched
//! against a small set of reference sequences within a configurable
//! mismatch budget. Expensive match conclusions are cached and shared
//! across a file-granular worker pool, with cache growth throttled under
//! memory pressure, so file sets far larger than memory stream through in
//! batches.
//!
//! The outer surfaces — parameter entry, file discovery, multi-sample
//! table assembly, plotting — are deliberately not part of this crate;
//! callers hand [`run`] a file list, a [`FeatureTable`] and a [`Config`]
//! and consume the per-file reports it writes.

mod cache;
mod config;
mod encode;
mod error;
mod extract;
mod features;
mod output;
mod quality;
mod scheduler;
mod stream;

pub use cache::{MatchCache, MemoryGate};
pub use config::{Config, Mode};
pub use encode::{encode, find_anchor, scan_features, within_mismatch};
pub use error::{Error, FeatureError, Result, ScheduleError};
pub use extract::Trimmer;
pub use features::{Feature, FeatureTable};
pub use output::{human_duration, sample_stem, write_report};
pub use quality::QualityGate;
pub use scheduler::{run, WARMUP_READ_CAP};
pub use stream::{process_file, FileReport, RunStats, GATE_RECHECK_INTERVAL};
