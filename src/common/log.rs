//! Logging utilities
//!
//! Console logging via `env_logger`, with an optional tee of every line into
//! a persistent log file. Components log through the `log` facade only; there
//! is no process-wide custom logger to thread around.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

/// Writes each log line to stderr and appends it to the log file.
struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

/// Initialize the logging system
///
/// # Parameters
///
/// * `level` - Default log level, overridable with `RUST_LOG`
/// * `log_file` - Optional file that receives a timestamped copy of every line
pub fn init_logger(level: &str, log_file: Option<&Path>) {
    let env = env_logger::Env::default().filter_or("RUST_LOG", level);
    let mut builder = env_logger::Builder::from_env(env);

    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{}] {:<5} {}",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            record.level(),
            record.args()
        )
    });

    if let Some(path) = log_file {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(TeeWriter { file })));
            }
            Err(e) => {
                eprintln!("Failed to open log file {}: {}", path.display(), e);
            }
        }
    }

    // try_init so repeated calls (e.g. from tests) are harmless
    let _ = builder.try_init();
}
