//! Converts SVG sheets to other formats through a long-running `inkscape --shell`.
use std::io::{self, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};

/// How long [`InkscapeConverter::close`] waits for the process to exit before killing it.
pub const CLOSE_TIMEOUT: Duration = Duration::from_secs(15);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A shell-mode Inkscape process. Conversions are queued and run asynchronously
/// by Inkscape; [`close`](Self::close) waits for the queue to drain.
pub struct InkscapeConverter {
    child: Child,
    stdin: Option<ChildStdin>,
}

impl InkscapeConverter {
    /// Starts `inkscape --shell` from the `PATH`.
    pub fn start() -> io::Result<Self> {
        let mut command = Command::new("inkscape");
        command.arg("--shell");
        Self::spawn(command)
    }

    /// Starts a converter from a prepared command, which must read shell
    /// requests on stdin. Its output is discarded.
    pub fn spawn(mut command: Command) -> io::Result<Self> {
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        let stdin = child.stdin.take();
        debug!("Started converter process {}", child.id());
        Ok(Self { child, stdin })
    }

    fn send(&mut self, request: &str) -> io::Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "converter is closed"))?;
        stdin.write_all(request.as_bytes())?;
        stdin.flush()
    }

    /// Queues the conversion of `input` to `output`; the format follows the output extension.
    /// Does not wait for the conversion to finish.
    ///
    /// Paths containing `;` or a line break cannot be expressed as a shell request
    /// and are rejected with [`io::ErrorKind::InvalidInput`].
    pub fn convert(&mut self, input: &Path, output: &Path) -> io::Result<()> {
        let input = request_path(input)?;
        let output = request_path(output)?;
        debug!("Converting '{}' to '{}'", input, output);
        self.send(&format!(
            "file-open:{};export-filename:{};export-do;\r\n",
            input, output
        ))
    }

    /// Asks the process to quit and waits up to [`CLOSE_TIMEOUT`], killing it after that.
    pub fn close(&mut self) -> io::Result<()> {
        if self.stdin.is_none() {
            return Ok(());
        }
        // the process may already be gone; waiting below reports its state
        let _ = self.send("quit\r\n");
        self.stdin = None;

        let deadline = Instant::now() + CLOSE_TIMEOUT;
        while Instant::now() < deadline {
            if self.child.try_wait()?.is_some() {
                return Ok(());
            }
            thread::sleep(POLL_INTERVAL);
        }
        warn!(
            "Converter process {} did not exit within {:?}, killing it",
            self.child.id(),
            CLOSE_TIMEOUT
        );
        self.child.kill()?;
        self.child.wait()?;
        Ok(())
    }
}

fn request_path(path: &Path) -> io::Result<String> {
    let text = path.display().to_string();
    if text.contains([';', '\n', '\r']) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("path '{}' cannot be passed to the converter shell", text.escape_debug()),
        ));
    }
    Ok(text)
}

impl Drop for InkscapeConverter {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to close converter: {}", e);
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_sends_shell_requests() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("requests.txt");
        let mut command = Command::new("sh");
        command.arg("-c").arg(format!("cat > '{}'", log.display()));

        let mut converter = InkscapeConverter::spawn(command).unwrap();
        converter
            .convert(Path::new("sheet.svg"), Path::new("sheet.pdf"))
            .unwrap();
        converter.close().unwrap();

        let requests = fs::read_to_string(&log).unwrap();
        assert_eq!(
            requests,
            "file-open:sheet.svg;export-filename:sheet.pdf;export-do;\r\nquit\r\n"
        );
    }

    #[test]
    fn test_rejects_paths_that_break_requests() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("requests.txt");
        let mut command = Command::new("sh");
        command.arg("-c").arg(format!("cat > '{}'", log.display()));

        let mut converter = InkscapeConverter::spawn(command).unwrap();
        for (input, output) in [("a;export-do.svg", "a.pdf"), ("a.svg", "b\nquit.pdf"), ("a.svg", "c\r.pdf")] {
            let result = converter.convert(Path::new(input), Path::new(output));
            assert_eq!(result.unwrap_err().kind(), io::ErrorKind::InvalidInput);
        }
        converter.close().unwrap();

        assert_eq!(fs::read_to_string(&log).unwrap(), "quit\r\n");
    }

    #[test]
    fn test_convert_after_close_fails() {
        let mut converter = InkscapeConverter::spawn(Command::new("cat")).unwrap();
        converter.close().unwrap();
        converter.close().unwrap();
        let result = converter.convert(Path::new("a.svg"), Path::new("a.pdf"));
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::BrokenPipe);
    }
}
