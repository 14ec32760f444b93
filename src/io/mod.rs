//! Session input and rating output
//!
//! CSV session loading on the way in; history CSV, JSON report and the rating
//! chart on the way out.

pub mod export;
pub mod loader;
pub mod plot;

pub use export::{render_history_csv, render_report_json, write_history_csv, write_report_json};
pub use loader::{load_sessions, parse_sessions, read_records, LoaderOptions, SessionTable};
pub use plot::write_history_plot;
