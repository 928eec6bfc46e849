//! Real array-tool processes.
//!
//! Each invocation spawns the binary with piped stdout and stderr and
//! drains both concurrently on a current-thread runtime, forwarding every
//! line to the run log as it arrives. A log sink that stops accepting
//! writes is dropped for the rest of the step; the process still runs to
//! completion and its output is still captured.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::runtime::Runtime;

use raidkeeper_engine::{ArrayTool, ToolOutput};

use crate::error::ExecError;

pub struct ProcessArrayTool {
    binary: PathBuf,
    runtime: Runtime,
}

impl ProcessArrayTool {
    pub fn new(binary: impl Into<PathBuf>) -> Result<Self, ExecError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_io()
            .build()
            .map_err(ExecError::Runtime)?;
        Ok(Self {
            binary: binary.into(),
            runtime,
        })
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl ArrayTool for ProcessArrayTool {
    fn invoke(&mut self, args: &[String], log: &mut dyn Write) -> io::Result<ToolOutput> {
        self.runtime.block_on(run_process(&self.binary, args, log))
    }
}

async fn run_process(
    binary: &Path,
    args: &[String],
    log: &mut dyn Write,
) -> io::Result<ToolOutput> {
    let mut child = Command::new(binary)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "stdout not captured"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "stderr not captured"))?;
    let mut out = BufReader::new(stdout).split(b'\n');
    let mut err = BufReader::new(stderr).split(b'\n');

    let mut sink = LogSink::new(log);
    let mut captured = String::new();
    let (mut out_done, mut err_done) = (false, false);
    while !(out_done && err_done) {
        tokio::select! {
            seg = out.next_segment(), if !out_done => match seg? {
                Some(bytes) => forward(&bytes, &mut captured, &mut sink),
                None => out_done = true,
            },
            seg = err.next_segment(), if !err_done => match seg? {
                Some(bytes) => forward(&bytes, &mut captured, &mut sink),
                None => err_done = true,
            },
        }
    }

    let status = child.wait().await?;
    sink.flush();
    Ok(ToolOutput {
        exit_status: status.code(),
        output: captured,
    })
}

/// Run-log writer that goes quiet after its first failure.
struct LogSink<'a> {
    log: &'a mut dyn Write,
    failed: bool,
}

impl<'a> LogSink<'a> {
    fn new(log: &'a mut dyn Write) -> Self {
        Self { log, failed: false }
    }

    fn line(&mut self, line: &str) {
        if !self.failed {
            let res = writeln!(self.log, "{line}");
            self.check(res);
        }
    }

    fn flush(&mut self) {
        if !self.failed {
            let res = self.log.flush();
            self.check(res);
        }
    }

    fn check(&mut self, res: io::Result<()>) {
        if let Err(err) = res {
            tracing::warn!(error = %err, "run log stopped accepting output, still capturing");
            self.failed = true;
        }
    }
}

fn forward(bytes: &[u8], captured: &mut String, sink: &mut LogSink<'_>) {
    let line = String::from_utf8_lossy(bytes);
    let line = line.strip_suffix('\r').unwrap_or(&line);
    captured.push_str(line);
    captured.push('\n');
    sink.line(line);
}
