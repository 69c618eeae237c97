/// Outcome of one finished child process: its exit status and every line it
/// wrote, per stream, in the order the lines arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommandResult {
    command: String,
    exit_code: i32,
    stdout_lines: Vec<String>,
    stderr_lines: Vec<String>,
}

impl ShellCommandResult {
    pub(crate) fn new(
        command: String,
        exit_code: i32,
        stdout_lines: Vec<String>,
        stderr_lines: Vec<String>,
    ) -> Self {
        Self {
            command,
            exit_code,
            stdout_lines,
            stderr_lines,
        }
    }

    /// The command line as it was handed to the shell.
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    pub fn stdout_lines(&self) -> &[String] {
        &self.stdout_lines
    }

    pub fn stderr_lines(&self) -> &[String] {
        &self.stderr_lines
    }

    pub fn succeeded(&self) -> bool {
        self.exit_code == 0
    }
}
