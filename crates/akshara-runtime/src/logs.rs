use crate::process::describe;
use crate::RuntimeError;
use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, trace};

/// Background consumer of container output.
///
/// Each line is emitted as a `debug` event tagged with the service that
/// produced it. Dropping the follower kills the underlying process.
pub struct LogFollower {
    project: String,
    child: Option<Child>,
    reader: Option<JoinHandle<()>>,
    forwarded: Arc<AtomicUsize>,
}

impl LogFollower {
    /// Spawn `cmd` and forward its stdout.
    pub fn spawn(project: &str, mut cmd: Command) -> Result<Self, RuntimeError> {
        debug!("following logs: {}", describe(&cmd));
        let mut child = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RuntimeError::Parse("log follower has no stdout".to_owned()))?;
        let mut follower = Self::from_reader(project, stdout);
        follower.child = Some(child);
        Ok(follower)
    }

    /// Forward lines from an arbitrary reader until it reaches end of file.
    pub fn from_reader<R: Read + Send + 'static>(project: &str, source: R) -> Self {
        let forwarded = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&forwarded);
        let project_name = project.to_owned();
        let reader = std::thread::spawn(move || {
            for line in BufReader::new(source).lines() {
                let Ok(line) = line else { break };
                let (service, message) = split_service_prefix(&line);
                debug!(project = %project_name, service, "{message}");
                counter.fetch_add(1, Ordering::Relaxed);
            }
            trace!(project = %project_name, "log stream closed");
        });
        Self {
            project: project.to_owned(),
            child: None,
            reader: Some(reader),
            forwarded,
        }
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    /// Number of lines forwarded so far.
    pub fn forwarded(&self) -> usize {
        self.forwarded.load(Ordering::Relaxed)
    }

    pub fn is_finished(&self) -> bool {
        self.reader.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Kill the log process and wait for the reader thread to drain.
    pub fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(reader) = self.reader.take() {
            // Readers without a child end on their own EOF; don't block on them.
            if reader.is_finished() {
                let _ = reader.join();
            }
        }
    }
}

impl Drop for LogFollower {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Split compose's `service-1  | message` prefix.
fn split_service_prefix(line: &str) -> (&str, &str) {
    match line.split_once(" | ") {
        Some((prefix, message)) => {
            let name = prefix.trim();
            // Strip the replica suffix: `front-1` -> `front`.
            let service = match name.rsplit_once('-') {
                Some((base, idx)) if idx.chars().all(|c| c.is_ascii_digit()) => base,
                _ => name,
            };
            (service, message)
        }
        None => ("-", line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::{Duration, Instant};

    #[test]
    fn splits_service_prefix() {
        assert_eq!(
            split_service_prefix("front-1  | Listening at: http://0.0.0.0:8085"),
            ("front", "Listening at: http://0.0.0.0:8085")
        );
        assert_eq!(split_service_prefix("back | ok"), ("back", "ok"));
        assert_eq!(split_service_prefix("no prefix"), ("-", "no prefix"));
    }

    #[test]
    fn forwards_every_line() {
        let input = "front-1 | a\nback-1 | b\nfonts-1 | c\n";
        let follower = LogFollower::from_reader("p", Cursor::new(input.as_bytes().to_vec()));
        let start = Instant::now();
        while !follower.is_finished() && start.elapsed() < Duration::from_secs(5) {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(follower.forwarded(), 3);
        assert_eq!(follower.project(), "p");
    }

    #[cfg(unix)]
    #[test]
    fn drop_kills_process() {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "while true; do echo 'x | tick'; sleep 0.01; done"]);
        let follower = LogFollower::spawn("p", cmd).unwrap();
        std::thread::sleep(Duration::from_millis(50));
        drop(follower);
    }
}
