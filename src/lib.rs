//! Statistical schema summaries for streams of JSON objects.
//!
//! Scan concatenated JSON objects, fold every scalar leaf into a tree keyed
//! by path, then collapse each node's raw samples into compact digests:
//! visit frequencies, key frequencies, array widths, numeric ranges with
//! rank-bucketed histograms, top-K strings, and boolean/null tallies.
//!
//! ```
//! use json_digest::{summarize, SummarizeOptions, report::NoopReporter};
//!
//! let data = br#"{"a":1} {"a":2}"#;
//! let sum = summarize(data, &SummarizeOptions::default(), &mut NoopReporter).unwrap();
//! assert_eq!(sum.root.freq, 2);
//! assert_eq!(sum.root.children[0].freq, 2);
//! ```
pub mod cli;
pub mod error;
pub mod jq_exec;
pub mod path_de;
pub mod render;
pub mod report;
pub mod scan;
pub mod summary;
pub mod tree;

pub use error::{Error, Result};
pub use summary::{Digest, Summary, SummaryNode};
pub use tree::TreeBuilder;

use report::Reporter;

// ------------------------------- Policy ----------------------------------- //

/// Histogram buckets requested per numeric node.
pub const DEFAULT_BUCKET_COUNT: usize = 10;
/// Most frequent strings kept per string node.
pub const DEFAULT_TOP_COUNT: usize = 10;
/// Deepest container nesting accepted from the scanner.
pub const DEFAULT_MAX_DEPTH: usize = 99;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummarizeOptions {
    pub bucket_count: usize,
    pub top_count: usize,
    pub max_depth: usize,
}

impl Default for SummarizeOptions {
    fn default() -> Self {
        Self {
            bucket_count: DEFAULT_BUCKET_COUNT,
            top_count: DEFAULT_TOP_COUNT,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

// ------------------------------- Front API -------------------------------- //

/// Summarize every object in `data`. Any scan error aborts the whole run.
pub fn summarize(
    data: &[u8],
    options: &SummarizeOptions,
    reporter: &mut dyn Reporter,
) -> Result<Summary> {
    let mut builder = TreeBuilder::new(options.clone());
    let documents = builder.scan_bytes(data, reporter)?;
    log::info!("read {documents} objects ({} bytes)", data.len());
    Ok(builder.finish(reporter))
}
