//! Interpreter subprocess execution
//!
//! The child never shares the caller's console: stdin is null and both
//! output streams are piped into memory. The two pipes are drained by
//! separate tasks while the child runs, so a child filling its stderr pipe
//! cannot block on us waiting for stdout.

use std::borrow::Cow;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;

use crate::common::{Error, Result};

use super::compare::split_lines;

/// Everything captured from one interpreter run
#[derive(Debug, Clone)]
pub struct RunResult {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// `None` when the child was terminated by a signal
    pub exit_code: Option<i32>,
    pub duration: Duration,
}

impl RunResult {
    /// Captured stdout split into raw lines, see [`split_lines`]
    pub fn stdout_lines(&self) -> impl Iterator<Item = &[u8]> {
        split_lines(&self.stdout)
    }

    /// Captured stdout as text (invalid UTF-8 is replaced)
    pub fn stdout_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    /// Captured stderr as text (invalid UTF-8 is replaced)
    pub fn stderr_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }

    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Resolve the interpreter path
///
/// An existing file is used as is (made absolute so it is never looked up on
/// PATH by accident). A bare name is searched for on PATH.
pub fn resolve_executable(path: &Path) -> Result<PathBuf> {
    if path.is_file() {
        return path
            .canonicalize()
            .map_err(|e| Error::launch_failure(path, e));
    }

    let is_bare_name = path.components().count() == 1 && !path.is_absolute();
    if is_bare_name {
        return which::which(path).map_err(|e| Error::launch_failure(path, e));
    }

    Err(Error::launch_failure(path, "no such file"))
}

/// Run `executable` with `args` and capture its output
///
/// Blocks until the child exits and both pipes are closed. With a `timeout`,
/// a run still going when it expires is killed and reaped, and
/// `Error::Timeout` is returned.
pub async fn run(executable: &Path, args: &[String], timeout: Option<Duration>) -> Result<RunResult> {
    tracing::debug!(executable = %executable.display(), ?args, "Spawning interpreter");
    let started = Instant::now();

    let mut child = Command::new(executable)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| Error::launch_failure(executable, e))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| Error::launch_failure(executable, "stdout was not captured"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| Error::launch_failure(executable, "stderr was not captured"))?;

    let mut stdout_task = tokio::spawn(drain(stdout));
    let mut stderr_task = tokio::spawn(drain(stderr));

    // A descendant of the interpreter can keep the pipes open after the
    // interpreter itself exits, so the deadline covers the drains too.
    let collect = async {
        let status = child.wait().await?;
        let stdout = join_drain(&mut stdout_task).await?;
        let stderr = join_drain(&mut stderr_task).await?;
        Ok::<_, Error>((status, stdout, stderr))
    };

    let collected = match timeout {
        Some(limit) => tokio::time::timeout_at(tokio::time::Instant::now() + limit, collect)
            .await
            .ok(),
        None => Some(collect.await),
    };

    let Some(collected) = collected else {
        let limit = timeout.unwrap_or_default();
        tracing::warn!(
            pid = child.id(),
            timeout_secs = limit.as_secs_f64(),
            "Interpreter timed out, killing it"
        );
        // kill() also waits, so the child is reaped here. It fails only when
        // the child has already been reaped.
        if let Err(e) = child.kill().await {
            tracing::debug!(error = %e, "Interpreter already exited");
        }
        stdout_task.abort();
        stderr_task.abort();
        return Err(Error::Timeout {
            secs: limit.as_secs_f64(),
        });
    };
    let (status, stdout, stderr) = collected?;

    let result = RunResult {
        stdout,
        stderr,
        exit_code: status.code(),
        duration: started.elapsed(),
    };

    tracing::debug!(
        exit_code = ?result.exit_code,
        stdout_bytes = result.stdout.len(),
        stderr_bytes = result.stderr.len(),
        elapsed_ms = result.duration.as_millis() as u64,
        "Interpreter finished"
    );

    Ok(result)
}

/// Read a pipe to EOF
async fn drain<R: AsyncRead + Unpin>(mut reader: R) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).await?;
    Ok(buf)
}

async fn join_drain(task: &mut JoinHandle<io::Result<Vec<u8>>>) -> Result<Vec<u8>> {
    let bytes = task.await.map_err(io::Error::other)??;
    Ok(bytes)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".to_string(), script.to_string()]
    }

    #[tokio::test]
    async fn test_captures_both_streams() {
        let result = run(Path::new("/bin/sh"), &sh("echo out; echo err >&2; exit 3"), None)
            .await
            .unwrap();
        assert_eq!(result.stdout_text(), "out\n");
        assert_eq!(result.stderr_text(), "err\n");
        assert_eq!(result.exit_code, Some(3));
        assert!(!result.success());
    }

    #[tokio::test]
    async fn test_arguments_are_not_shell_split() {
        let args = vec![
            "-c".to_string(),
            "printf '%s\\n' \"$1\"".to_string(),
            "sh".to_string(),
            "two words; echo injected".to_string(),
        ];
        let result = run(Path::new("/bin/sh"), &args, None).await.unwrap();
        assert_eq!(result.stdout_text(), "two words; echo injected\n");
    }

    #[tokio::test]
    async fn test_large_output_on_both_pipes_does_not_deadlock() {
        // 1 MiB per stream, well past any pipe buffer
        let script = "head -c 1048576 /dev/zero >&2; head -c 1048576 /dev/zero";
        let result = run(Path::new("/bin/sh"), &sh(script), Some(Duration::from_secs(30)))
            .await
            .unwrap();
        assert_eq!(result.stdout.len(), 1 << 20);
        assert_eq!(result.stderr.len(), 1 << 20);
    }

    #[tokio::test]
    async fn test_timeout_kills_child() {
        let started = Instant::now();
        let err = run(Path::new("/bin/sh"), &sh("sleep 30"), Some(Duration::from_millis(200)))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_timeout_covers_pipes_held_by_descendants() {
        let started = Instant::now();
        let err = run(
            Path::new("/bin/sh"),
            &sh("sleep 5 & echo hi"),
            Some(Duration::from_millis(300)),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_stdout_lines_are_raw_bytes() {
        let result = run(Path::new("/bin/sh"), &sh("printf 'a\\r\\n\\377\\n'"), None)
            .await
            .unwrap();
        let lines: Vec<&[u8]> = result.stdout_lines().collect();
        assert_eq!(lines, vec![&b"a"[..], &b"\xff"[..]]);
    }

    #[tokio::test]
    async fn test_missing_executable_is_launch_failure() {
        let err = run(Path::new("/nonexistent/mvm"), &[], None).await.unwrap_err();
        assert!(matches!(err, Error::LaunchFailure { .. }));
    }

    #[test]
    fn test_resolve_executable() {
        assert!(resolve_executable(Path::new("sh")).is_ok());
        assert!(matches!(
            resolve_executable(Path::new("./no/such/mvm")),
            Err(Error::LaunchFailure { .. })
        ));
        assert!(matches!(
            resolve_executable(Path::new("surely-not-an-installed-interpreter")),
            Err(Error::LaunchFailure { .. })
        ));
    }
}
