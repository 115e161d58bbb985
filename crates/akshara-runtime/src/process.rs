use crate::context::{Context, POLL_INTERVAL};
use crate::RuntimeError;
use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use tracing::debug;

/// Captured stdout of a successful command. Stderr only surfaces through
/// [`RuntimeError::CommandFailed`].
#[derive(Debug)]
pub(crate) struct CommandOutput {
    pub stdout: String,
}

#[derive(Clone, Copy)]
enum Stream {
    Stdout,
    Stderr,
}

/// Render a command line for logs and error messages.
pub(crate) fn describe(cmd: &Command) -> String {
    let mut parts = vec![cmd.get_program().to_string_lossy().into_owned()];
    parts.extend(cmd.get_args().map(|a| a.to_string_lossy().into_owned()));
    parts.join(" ")
}

/// Run a command to completion, killing it if `ctx` ends first.
///
/// Every output line (stdout and stderr, split on `\n` and `\r`) is passed to
/// `on_line` as it arrives. A non-zero exit status is reported as
/// [`RuntimeError::CommandFailed`].
pub(crate) fn run(
    mut cmd: Command,
    ctx: &Context,
    mut on_line: Option<&mut dyn FnMut(&str)>,
) -> Result<CommandOutput, RuntimeError> {
    ctx.check()?;
    let command = describe(&cmd);
    debug!("running {command}");

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| RuntimeError::CommandFailed {
            command: command.clone(),
            code: None,
            stderr: e.to_string(),
        })?;

    let (tx, rx) = mpsc::channel();
    if let Some(out) = child.stdout.take() {
        spawn_reader(out, Stream::Stdout, tx.clone());
    }
    if let Some(err) = child.stderr.take() {
        spawn_reader(err, Stream::Stderr, tx);
    }

    let mut stdout = String::new();
    let mut stderr = String::new();
    let mut collect = |stream: Stream, line: String| {
        if let Some(cb) = on_line.as_mut() {
            cb(&line);
        }
        let buf = match stream {
            Stream::Stdout => &mut stdout,
            Stream::Stderr => &mut stderr,
        };
        buf.push_str(&line);
        buf.push('\n');
    };

    loop {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok((stream, line)) => collect(stream, line),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                if let Some(reason) = ctx.err() {
                    kill(&mut child, &command);
                    return Err(RuntimeError::Canceled(reason));
                }
            }
            // Both pipes closed: the process has exited or closed its output.
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if let Some(reason) = ctx.err() {
            kill(&mut child, &command);
            return Err(RuntimeError::Canceled(reason));
        }
        std::thread::sleep(POLL_INTERVAL);
    };

    if status.success() {
        Ok(CommandOutput { stdout })
    } else {
        Err(RuntimeError::CommandFailed {
            command,
            code: status.code(),
            stderr: stderr.trim().to_owned(),
        })
    }
}

fn spawn_reader<R: Read + Send + 'static>(
    source: R,
    stream: Stream,
    tx: mpsc::Sender<(Stream, String)>,
) {
    std::thread::spawn(move || {
        let mut reader = BufReader::new(source);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    let text = String::from_utf8_lossy(&buf);
                    for line in text.split(['\n', '\r']).filter(|l| !l.trim().is_empty()) {
                        if tx.send((stream, line.to_owned())).is_err() {
                            return;
                        }
                    }
                }
            }
        }
    });
}

fn kill(child: &mut Child, command: &str) {
    debug!("killing {command}");
    let _ = child.kill();
    let _ = child.wait();
}
