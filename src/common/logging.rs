use env_logger::Builder;
use log::{LevelFilter, Record};
use std::io::Write;

/// Initialize the logging system with timestamp, level, source location and message formatting.
///
/// INFO level by default; `RUST_LOG` overrides it.
/// Format: `[YYYY-MM-DD HH:MM:SS] [LEVEL] [file:line] message`
pub fn init_logger() {
    Builder::new()
        .format(|buf, record| writeln!(buf, "{}", format_record(record)))
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();
}

fn format_record(record: &Record) -> String {
    format!(
        "[{}] [{}] [{}:{}] {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        record.level(),
        record.file().unwrap_or("unknown"),
        record.line().unwrap_or(0),
        record.args()
    )
}
