use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, ScopedJoinHandle};

use tracing::{debug, warn};

use super::ShellCommandResult;
use crate::error::{Error, Result};

pub const DEFAULT_SHELL: &str = "/bin/sh";

#[derive(Debug, Clone, PartialEq)]
pub enum CommandType {
    /// A command string interpreted by `shell -c`
    Shell,
    /// A program and its argument vector, started without a shell
    Program,
}

#[derive(Debug, Clone)]
pub struct ShellCommand {
    pub command_type: CommandType,
    /// For `Shell`, the single command string; for `Program`, the program
    /// followed by its arguments
    pub args: Vec<String>,
    pub shell: String,
    /// Capture without echoing
    pub quiet: bool,
    pub working_dir: Option<PathBuf>,
    pub env: Vec<(String, String)>,
}

impl ShellCommand {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command_type: CommandType::Shell,
            args: vec![command.into()],
            shell: DEFAULT_SHELL.to_string(),
            quiet: false,
            working_dir: None,
            env: Vec::new(),
        }
    }

    pub fn program<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut all_args = vec![program.into()];
        all_args.extend(args.into_iter().map(Into::into));
        Self {
            command_type: CommandType::Program,
            args: all_args,
            ..Self::new(String::new())
        }
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn to_shell_command(&self) -> String {
        match self.command_type {
            CommandType::Shell => self.args.first().cloned().unwrap_or_default(),
            CommandType::Program => self
                .args
                .iter()
                .map(|arg| quote_arg(arg))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Run to completion, mirroring the child's stdout and stderr onto ours
    /// unless `quiet` is set.
    pub fn run(&self) -> Result<ShellCommandResult> {
        self.run_with_echo(io::stdout(), io::stderr())
    }

    /// Run to completion, echoing captured stdout lines into `out` and
    /// stderr lines into `err` as they arrive (nothing is written when
    /// `quiet` is set).
    ///
    /// Both pipes are drained on their own scoped thread while this thread
    /// waits on the child, so a child that fills one pipe while we would be
    /// blocked reading the other cannot stall. Both drains are joined before
    /// the result is built.
    pub fn run_with_echo<O, E>(&self, out: O, err: E) -> Result<ShellCommandResult>
    where
        O: Write + Send,
        E: Write + Send,
    {
        let command = self.to_shell_command();
        debug!("Spawning: {} (via {:?})", command, self.command_type);

        let mut child = self
            .build_process()?
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| Error::Spawn {
                command: command.clone(),
                source,
            })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let quiet = self.quiet;

        let (status, stdout_lines, stderr_lines) = thread::scope(|scope| {
            let stdout_drain = scope.spawn(move || drain_lines(stdout, out, quiet, "stdout"));
            let stderr_drain = scope.spawn(move || drain_lines(stderr, err, quiet, "stderr"));

            let status = child.wait();
            (status, join_drain(stdout_drain), join_drain(stderr_drain))
        });

        let exit_code = exit_code(status?);
        debug!(
            "`{}` exited with {} ({} stdout lines, {} stderr lines)",
            command,
            exit_code,
            stdout_lines.len(),
            stderr_lines.len()
        );

        Ok(ShellCommandResult::new(command, exit_code, stdout_lines, stderr_lines))
    }

    fn build_process(&self) -> Result<Command> {
        let mut cmd = match self.command_type {
            CommandType::Shell => {
                let mut cmd = Command::new(&self.shell);
                cmd.arg("-c").arg(self.to_shell_command());
                cmd
            }
            CommandType::Program => {
                let Some((program, args)) = self.args.split_first() else {
                    return Err(Error::Spawn {
                        command: String::new(),
                        source: io::Error::new(
                            io::ErrorKind::InvalidInput,
                            "No command specified",
                        ),
                    });
                };
                let mut cmd = Command::new(program);
                cmd.args(args);
                cmd
            }
        };

        if let Some(ref dir) = self.working_dir {
            cmd.current_dir(dir);
        }

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        Ok(cmd)
    }
}

/// Read `stream` line by line until EOF, echoing each line into `echo`
/// unless `quiet`.
fn drain_lines<R, W>(stream: Option<R>, mut echo: W, quiet: bool, name: &str) -> Vec<String>
where
    R: Read,
    W: Write,
{
    let Some(stream) = stream else {
        return Vec::new();
    };

    let mut reader = BufReader::new(stream);
    let mut lines = Vec::new();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                let line = decode_line(&buf);
                if !quiet {
                    writeln!(echo, "{line}").ok();
                    echo.flush().ok();
                }
                lines.push(line);
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!("Stopped reading child {}: {}", name, e);
                break;
            }
        }
    }

    lines
}

fn decode_line(buf: &[u8]) -> String {
    let line = buf.strip_suffix(b"\n").unwrap_or(buf);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}

fn join_drain(handle: ScopedJoinHandle<'_, Vec<String>>) -> Vec<String> {
    handle
        .join()
        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    -1
}

/// Quote `arg` for a POSIX shell, leaving plain words untouched.
pub fn quote_arg(arg: &str) -> String {
    let is_plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=,+@%".contains(c));

    if is_plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
