//! Job postings: fetching, parsing, HTML cleanup

pub mod posting;
pub mod source;

pub use posting::JobPosting;
pub use source::{FileJobSource, JobSource, RemotiveClient};
