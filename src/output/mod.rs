//! Report types and their console/JSON renderings

pub mod formatter;
pub mod report;

pub use formatter::{formatter_for, save_report_to_file, OutputFormatter};
pub use report::{GapReport, SkillsReport};
