//! Segment download pipeline.
//!
//! Both drivers consume the ordered segment URI list of one rendition and
//! write the fetched bytes to a single sink in that order. The parallel
//! driver fetches with a bounded worker pool and reorders completions before
//! the write; the sequential driver is the `workers == 0` path.

mod parallel;
mod sequential;

pub(crate) use parallel::ParallelDownloader;
pub(crate) use sequential::SequentialDownloader;
