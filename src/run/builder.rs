use std::{
    ffi::OsString,
    fs::File,
    io::{self, BufRead, BufReader, Read, Write},
    path::{Path, PathBuf},
    process::{Child, Command as StdCommand, Stdio},
    sync::mpsc,
    thread,
    time::{Duration, Instant},
};

use tracing::{debug, error, info};

use crate::{Error, Result};

/// Builder that mirrors `std::process::Command` but surfaces the knobs the
/// automation tools need.
#[derive(Debug, Clone)]
pub struct Exec {
    program: OsString,
    args: Vec<OsString>,
    env: Vec<(OsString, OsString)>,
    current_dir: Option<PathBuf>,
    merge_stderr: bool,
    stream: bool,
    quiet: bool,
    check: bool,
    log_to: Option<PathBuf>,
    kill_on_output: Option<String>,
    capture_tty: bool,
    dry_run: Option<bool>,
}

impl Exec {
    /// Creates a new command. Use [`exec`] for a terser helper.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
            current_dir: None,
            merge_stderr: true,
            stream: true,
            quiet: false,
            check: true,
            log_to: None,
            kill_on_output: None,
            capture_tty: false,
            dry_run: None,
        }
    }

    /// Runs `script` through the platform shell (`sh -c`).
    pub fn sh(script: impl AsRef<str>) -> Self {
        Exec::new("sh").arg("-c").arg(script.as_ref())
    }

    /// Adds a single argument.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Extends the command with multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Sets/overrides an environment variable.
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Sets the working directory.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Leaves stderr attached to the parent instead of folding it into the
    /// captured stream (folded is the default).
    pub fn merge_stderr(mut self, merge: bool) -> Self {
        self.merge_stderr = merge;
        self
    }

    /// Controls whether captured output is echoed to the parent's stdout
    /// while the command runs (on by default).
    pub fn stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Suppresses start/finish announcements and the stdout echo.
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self.stream = false;
        self
    }

    /// When disabled, a non-zero exit status is reported in [`RunOutput`]
    /// instead of becoming an [`Error::Command`].
    pub fn check(mut self, check: bool) -> Self {
        self.check = check;
        self
    }

    /// Tees output into `path` as it arrives; the file is truncated and its
    /// first line records the command.
    pub fn log_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_to = Some(path.into());
        self
    }

    /// Kills the child as soon as a captured line contains `needle`.
    pub fn kill_on_output(mut self, needle: impl Into<String>) -> Self {
        self.kill_on_output = Some(needle.into());
        self
    }

    /// Overrides the process-wide dry-run switch for this command.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = Some(dry_run);
        self
    }

    /// Wraps the command in `script -c` so tty-sniffing programs keep their
    /// streamed/colored output.
    pub fn capture_tty(mut self) -> Self {
        self.capture_tty = true;
        self
    }

    /// Renders the command for announcements and log headers.
    pub fn rendered(&self) -> String {
        let mut parts = vec![self.program.to_string_lossy().into_owned()];
        parts.extend(self.args.iter().map(|arg| arg.to_string_lossy().into_owned()));
        parts.join(" ")
    }

    /// Runs the command to completion, returning the captured output, exit
    /// code, and wall-clock duration.
    pub fn run(&self) -> Result<RunOutput> {
        if self.dry_run.unwrap_or_else(super::dry_run) {
            info!("(dry run) command: {}", self.rendered());
            return Ok(RunOutput {
                stdout: Vec::new(),
                code: 0,
                duration: Duration::ZERO,
            });
        }

        self.check_tty_wrappable()?;
        if !self.quiet {
            info!("running command: {}", self.rendered());
        }
        let start = Instant::now();

        let mut child = self.spawn_captured()?;
        let (tx, rx) = mpsc::channel::<Vec<u8>>();

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Io(io::Error::other("missing stdout pipe")))?;
        let stdout_tx = tx.clone();
        let stdout_reader = thread::spawn(move || forward_lines(stdout, stdout_tx));

        let stderr_reader = if self.merge_stderr {
            let stderr = child
                .stderr
                .take()
                .ok_or_else(|| Error::Io(io::Error::other("missing stderr pipe")))?;
            Some(thread::spawn(move || forward_lines(stderr, tx)))
        } else {
            drop(tx);
            None
        };

        let mut log_file = match &self.log_to {
            Some(path) => {
                let mut file = File::create(path)?;
                writeln!(file, "running command: {}", self.rendered())?;
                Some(file)
            }
            None => None,
        };

        let mut captured: Vec<u8> = Vec::new();
        let mut killed = false;
        for line in rx {
            if self.stream {
                let mut out = io::stdout().lock();
                out.write_all(&line)?;
                out.flush()?;
            }
            if let Some(file) = log_file.as_mut() {
                file.write_all(&line)?;
                file.flush()?;
            }
            captured.extend_from_slice(&line);

            if !killed {
                if let Some(needle) = &self.kill_on_output {
                    if String::from_utf8_lossy(&line).contains(needle.as_str()) {
                        debug!("kill marker {needle:?} seen, killing child");
                        let _ = child.kill();
                        killed = true;
                    }
                }
            }
        }

        let _ = stdout_reader.join();
        if let Some(handle) = stderr_reader {
            let _ = handle.join();
        }
        let status = child.wait()?;
        let duration = start.elapsed();

        if !self.quiet {
            info!("command finished in {:.2} seconds", duration.as_secs_f64());
        }

        if self.check && !status.success() {
            error!("command failed with {status}: {}", self.rendered());
            return Err(Error::Command {
                program: self.program.clone(),
                status,
                output: String::from_utf8_lossy(&captured).into_owned(),
            });
        }

        Ok(RunOutput {
            stdout: captured,
            code: status.code().unwrap_or(-1),
            duration,
        })
    }

    /// Runs quietly and returns stdout decoded as UTF-8 text.
    pub fn read(&self) -> Result<String> {
        let exec = self.clone().quiet();
        exec.run()?.stdout_text()
    }

    // `script -c` takes the command as one shell word; a single quote in it
    // would break out of the quoting.
    fn check_tty_wrappable(&self) -> Result<()> {
        if self.capture_tty && self.rendered().contains('\'') {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "cannot capture a tty for a command containing single quotes",
            )));
        }
        Ok(())
    }

    fn spawn_captured(&self) -> Result<Child> {
        let mut command = self.build_std_command();
        command.stdout(Stdio::piped());
        command.stderr(if self.merge_stderr {
            Stdio::piped()
        } else {
            Stdio::inherit()
        });
        command.stdin(Stdio::null());
        Ok(command.spawn()?)
    }

    pub(crate) fn build_std_command(&self) -> StdCommand {
        let mut command = if self.capture_tty {
            // `script` allocates a pty so the child believes it has a
            // terminal attached.
            let mut wrapped = StdCommand::new("script");
            wrapped.arg("-qec").arg(self.rendered()).arg("/dev/null");
            wrapped
        } else {
            let mut plain = StdCommand::new(&self.program);
            plain.args(&self.args);
            plain
        };
        command.envs(self.env.iter().cloned());
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        command
    }
}

fn forward_lines(reader: impl Read, tx: mpsc::Sender<Vec<u8>>) {
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(_) => {
                if tx.send(line.clone()).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    }
}

/// Helper to create an [`Exec`] from a program name.
pub fn exec(program: impl Into<OsString>) -> Exec {
    Exec::new(program)
}

/// Helper to run a script through the platform shell.
pub fn shell(script: impl AsRef<str>) -> Exec {
    Exec::sh(script)
}

/// Output of a finished command.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub stdout: Vec<u8>,
    pub code: i32,
    pub duration: Duration,
}

impl RunOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    pub fn stdout_text(&self) -> Result<String> {
        Ok(String::from_utf8(self.stdout.clone())?)
    }
}

impl Exec {
    /// Spawns the command detached, with output routed to `log_path` (or
    /// discarded when `None`).
    pub fn spawn_background(&self, log_path: Option<&Path>) -> Result<super::Background> {
        if self.dry_run.unwrap_or_else(super::dry_run) {
            info!("(dry run) background command: {}", self.rendered());
            return Ok(super::Background::dry());
        }
        self.check_tty_wrappable()?;
        info!("running command in background: {}", self.rendered());
        let mut command = self.build_std_command();
        match log_path {
            Some(path) => {
                let file = File::create(path)?;
                let err = file.try_clone()?;
                command.stdout(Stdio::from(file));
                command.stderr(Stdio::from(err));
            }
            None => {
                command.stdout(Stdio::null());
                command.stderr(Stdio::null());
            }
        }
        command.stdin(Stdio::null());
        Ok(super::Background::new(command.spawn()?))
    }
}
