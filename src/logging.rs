use std::path::Path;

use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};

use crate::eval::{Disposition, ScanResult};

/// Route `log` records to the scan log file, appending.
///
/// Best-effort: if the file cannot be opened or a logger is already
/// installed, returns false and logging stays off. A scan must never fail
/// because its log is unavailable.
pub fn init(path: &Path, level: &str) -> bool {
    if let Some(dir) = path.parent() {
        let _ = std::fs::create_dir_all(dir);
    }
    let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
    else {
        return false;
    };

    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();

    WriteLogger::init(parse_level(level), config, file).is_ok()
}

/// Unknown names fall back to `info`.
pub fn parse_level(level: &str) -> LevelFilter {
    level.trim().parse().unwrap_or(LevelFilter::Info)
}

/// Record one scan decision: order id, disposition, compact scan result.
pub fn log_scan(order_id: u64, disposition: Disposition, scan: &ScanResult) {
    log::info!(
        "order {order_id}\t{decision}\t{scan}",
        decision = disposition.label(),
        scan = scan.to_annotation(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level(" WARN "), LevelFilter::Warn);
        assert_eq!(parse_level("loud"), LevelFilter::Info);
    }
}
