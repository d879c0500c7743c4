use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use env_logger::{Env, Target};
use log::info;

/// Mirrors log output to stderr and a log file.
struct TeeWriter<W> {
    file: W,
}

impl<W: Write> Write for TeeWriter<W> {
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

pub fn log_file_name(started: NaiveDateTime) -> String {
    format!("ll-{}.log.txt", started.format("%Y-%m-%dT%H-%M-%S"))
}

fn open_log_file(logs_dir: &Path) -> io::Result<(PathBuf, File)> {
    fs::create_dir_all(logs_dir)?;
    let path = logs_dir.join(log_file_name(Local::now().naive_local()));
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((path, file))
}

/// Install the global logger. `RUST_LOG` overrides the default `info` filter.
///
/// Falls back to stderr only when the log file cannot be opened.
pub fn init(logs_dir: &Path) -> Option<PathBuf> {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));

    let log_path = match open_log_file(logs_dir) {
        Ok((path, file)) => {
            builder.target(Target::Pipe(Box::new(TeeWriter { file })));
            Some(path)
        }
        Err(err) => {
            eprintln!(
                "Could not open a log file in {}: {err}. Logging to stderr.",
                logs_dir.display()
            );
            None
        }
    };
    builder.init();

    if let Some(path) = &log_path {
        info!("logging to file: {}", path.display());
    }
    log_path
}
