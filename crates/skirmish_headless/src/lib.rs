//! Headless battle runner for grid skirmishes.
//!
//! Wraps `skirmish_core` with everything a command-line run needs:
//!
//! - **Scenario loading**: battlefield text files and RON rule files
//! - **Parallel batches**: calibration, audits and replays on a rayon pool
//! - **Reports**: JSON output for both answers of a battlefield
//!
//! # Example
//!
//! ```bash
//! cargo run -p skirmish_headless -- solve --map battle.txt
//! ```

pub mod batch;
pub mod error;
pub mod logging;
pub mod report;
pub mod scenario;

pub use batch::{audit_parallel, calibrate_parallel, verify_parallel, VerifyReport};
pub use error::{HeadlessError, Result};
pub use logging::log_filter;
pub use report::{solve, SolveReport};
pub use scenario::{load_config, Scenario, ScenarioError};
