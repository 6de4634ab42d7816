pub mod config;
pub mod preview;
pub mod scan;

pub use preview::{start_preview, TerminalSink};
pub use scan::ScanService;
