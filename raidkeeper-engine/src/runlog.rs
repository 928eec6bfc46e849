//! The per-run log: console echo plus a durable file.
//!
//! Truncated at the start of every run. Section headers and all captured
//! step output land here; the report body is read back from it at the end.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

use raidkeeper_core::Job;

use crate::error::{run_log_err, RunError};
use crate::tee::TeeWriter;

pub struct RunLog {
    path: PathBuf,
    out: TeeWriter<File, Box<dyn Write + Send>>,
}

impl RunLog {
    /// Create (or truncate) the log at `path`, echoing to `console`.
    pub fn create(path: &Path, console: Box<dyn Write + Send>) -> Result<Self, RunError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| run_log_err(dir, e))?;
        }
        let file = File::create(path).map_err(|e| run_log_err(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            out: TeeWriter::new(file, console),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Section header written before each step's output.
    pub fn header(&mut self, job: Job) -> io::Result<()> {
        let now = Local::now().format("%Y-%m-%d %H:%M:%S");
        writeln!(self.out, "\n### {} [{now}]", job.label())?;
        self.out.flush()
    }

    /// A single free-form line.
    pub fn line(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }

    /// Everything written so far.
    pub fn transcript(&mut self) -> Result<String, RunError> {
        self.out.flush().map_err(|e| run_log_err(&self.path, e))?;
        let bytes = std::fs::read(&self.path).map_err(|e| run_log_err(&self.path, e))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl Write for RunLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.out.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn truncates_and_reads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("logs/last_run.log");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "stale content from the previous run\n").unwrap();

        let mut log = RunLog::create(&path, Box::new(io::sink())).unwrap();
        log.header(Job::Diff).unwrap();
        log.write_all(b"   3 removed\n").unwrap();
        let text = log.transcript().unwrap();

        assert!(!text.contains("stale"));
        assert!(text.contains("### DIFF ["));
        assert!(text.ends_with("   3 removed\n"));
    }

    #[test]
    fn creates_missing_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state/run.log");
        let mut log = RunLog::create(&path, Box::new(io::sink())).unwrap();
        log.line("hello").unwrap();
        assert_eq!(log.transcript().unwrap(), "hello\n");
        assert_eq!(log.path(), path.as_path());
    }
}
