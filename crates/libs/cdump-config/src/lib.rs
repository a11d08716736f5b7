//! Configuration for cdump.
//!
//! Two kinds of configuration live here:
//!
//! - [`JobSpec`]: one dump job, parsed leniently from the JSON document a
//!   container carries in its metadata label.
//! - [`Settings`]: how cdump reaches the container runtime, loaded from an
//!   optional TOML file.
//!
//! # Usage
//!
//! ```rust
//! use cdump_config::parse_jobs;
//! use serde_json::json;
//!
//! let document = json!({"jobs": [{"command": ["pg_dumpall"], "schedules": "daily", "keep": 7}]});
//! let jobs = parse_jobs("db", &document);
//! assert_eq!(jobs.len(), 1);
//! assert!(jobs[0].in_schedule("daily"));
//! ```

pub mod error;
pub mod job;
mod lenient;
pub mod prelude;
pub mod settings;

pub use job::{JobSpec, parse_jobs};
pub use settings::Settings;
