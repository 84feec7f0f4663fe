//! Report rendering for the command-line front-end.
//!
//! # Submodules
//!
//! - [`json`]: Writes an [`InsightReport`](crate::models::InsightReport) to a JSON file
//! - [`markdown`]: Renders a report as Markdown for reading in a terminal
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! ├── acme_20250506T081500Z.json
//! └── globex_20250506T091012Z.json
//! ```

pub mod json;
pub mod markdown;
