//! Round log persistence and offline reporting

pub mod csv_log;
pub mod plots;
pub mod summary;

pub use csv_log::{log_path, read_rounds, write_rounds};
pub use plots::render_all;
pub use summary::{collect, CostRow, ReportData, RunLog};
