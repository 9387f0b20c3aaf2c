// Subprocess plumbing shared by the toolchain probes and the compiler launch.

use std::ffi::OsStr;
use std::io::{self, BufRead, BufReader, Write};
use std::process::{Command, ExitStatus, Stdio};

use anyhow::{bail, Context};
use derive_builder::Builder;

/// Trait for types that can configure a `Command` before execution.
pub trait ShConfig {
    /// Apply configuration to the given `Command`.
    fn apply(&self, cmd: &mut Command);

    /// Whether the command line is logged below `info`.
    fn quiet(&self) -> bool {
        false
    }
}

impl<T: ShConfig + ?Sized> ShConfig for &T {
    fn apply(&self, cmd: &mut Command) {
        (*self).apply(cmd)
    }

    fn quiet(&self) -> bool {
        (*self).quiet()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamMode {
    Inherit,
    Pipe,
}

impl StreamMode {
    fn stdio(self) -> Stdio {
        match self {
            StreamMode::Inherit => Stdio::inherit(),
            StreamMode::Pipe => Stdio::piped(),
        }
    }
}

#[derive(Debug, Clone, Builder)]
#[builder(default)]
pub struct ShOptions {
    pub stdout: StreamMode,
    pub stderr: StreamMode,
    pub quiet: bool,
}

impl Default for ShOptions {
    fn default() -> Self {
        Self {
            stdout: StreamMode::Inherit,
            stderr: StreamMode::Inherit,
            quiet: false,
        }
    }
}

impl ShConfig for ShOptions {
    fn apply(&self, cmd: &mut Command) {
        cmd.stdout(self.stdout.stdio());
        cmd.stderr(self.stderr.stdio());
    }

    fn quiet(&self) -> bool {
        self.quiet
    }
}

pub struct ShOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Space-joined rendering of a command line, for logs and the echoed invocation.
pub fn render<I, S>(program: impl AsRef<OsStr>, args: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    std::iter::once(program.as_ref().to_string_lossy().into_owned())
        .chain(
            args.into_iter()
                .map(|a| a.as_ref().to_string_lossy().into_owned()),
        )
        .collect::<Vec<_>>()
        .join(" ")
}

fn log_command(line: &str, quiet: bool) {
    if quiet {
        log::debug!("[sh] {}", line);
    } else {
        log::info!("[sh] {}", line);
    }
}

/// Run `program` to completion; a non-zero exit is an error.
pub fn sh<P, I, S, O>(program: P, args: I, opts: O) -> anyhow::Result<ShOutput>
where
    P: AsRef<OsStr>,
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
    O: ShConfig,
{
    let args: Vec<S> = args.into_iter().collect();
    let line = render(&program, &args);
    log_command(&line, opts.quiet());

    let mut command = Command::new(&program);
    command.args(&args);
    opts.apply(&mut command);

    let output = command
        .output()
        .with_context(|| format!("failed to run `{line}`"))?;

    if !output.status.success() {
        bail!(
            "Command failed: {}\nExit code: {:?}\n{}",
            line,
            output.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&output.stderr).trim_end(),
        );
    }

    Ok(ShOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Spawn `command` with stdout and stderr joined on one pipe and copy its
/// output to `sink` line by line until the child exits.
pub fn stream_merged<W: Write>(mut command: Command, sink: &mut W) -> io::Result<ExitStatus> {
    let (reader, writer) = io::pipe()?;
    command.stdout(writer.try_clone()?).stderr(writer);

    let mut child = command.spawn()?;
    // The write ends held by `command` must close, or the reader never sees EOF.
    drop(command);

    let streamed = stream_lines(BufReader::new(reader), sink);
    let status = child.wait()?;
    streamed?;
    Ok(status)
}

/// Copy `reader` to `sink` one line at a time, flushing after each line.
/// Invalid UTF-8 is replaced; trailing whitespace is dropped.
pub fn stream_lines<R: BufRead, W: Write>(mut reader: R, sink: &mut W) -> io::Result<()> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf);
        writeln!(sink, "{}", line.trim_end())?;
        sink.flush()?;
    }
}
