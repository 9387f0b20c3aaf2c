use std::io;
use std::path::PathBuf;

use anyhow::Context;

use crate::bitcode::{carved_output_path, check_bitcode};
use crate::invocation::{CarveSpec, Invocation, PassOptions};
use crate::layout::InstallLayout;
use crate::mode::CarveMode;
use crate::sh::stream_merged;
use crate::toolchain::Probe;

/// One carving run, as requested on the command line.
#[derive(Debug, Clone)]
pub struct Request {
    pub input: PathBuf,
    pub mode: CarveMode,
    /// Passed to the compiler after the fixed flags. When empty, the module's
    /// own link requirements are used instead.
    pub extra_args: Vec<String>,
    pub pass: PassOptions,
    /// Carver install root; discovered from the executable when unset.
    pub root: Option<PathBuf>,
    pub dry_run: bool,
}

impl Request {
    pub fn new(input: impl Into<PathBuf>, mode: CarveMode) -> Self {
        Self {
            input: input.into(),
            mode,
            extra_args: Vec::new(),
            pass: PassOptions::default(),
            root: None,
            dry_run: false,
        }
    }
}

/// How the compiler child ended. `code` is `None` when it was killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStatus {
    pub code: Option<i32>,
}

impl RunStatus {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Exit code the driver itself should terminate with.
    pub fn exit_code(&self) -> i32 {
        self.code.unwrap_or(1)
    }
}

#[derive(Debug, Clone)]
pub struct Outcome {
    pub invocation: Invocation,
    /// `None` for a dry run.
    pub status: Option<RunStatus>,
}

/// Runs a compiler invocation to completion.
pub trait Launcher {
    fn launch(&mut self, invocation: &Invocation) -> anyhow::Result<RunStatus>;
}

/// Spawns the compiler and forwards its combined output to stdout.
#[derive(Debug, Default)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(&mut self, invocation: &Invocation) -> anyhow::Result<RunStatus> {
        let status = stream_merged(invocation.command(), &mut io::stdout().lock())
            .with_context(|| format!("failed to run {}", invocation.program.display()))?;
        Ok(RunStatus {
            code: status.code(),
        })
    }
}

pub struct Driver<P, L> {
    probe: P,
    launcher: L,
}

impl<P: Probe, L: Launcher> Driver<P, L> {
    pub fn new(probe: P, launcher: L) -> Self {
        Self { probe, launcher }
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    pub fn run(&mut self, req: &Request) -> anyhow::Result<Outcome> {
        check_bitcode(&req.input)?;

        let ld_path = self.probe.ld_path()?;

        let layout = match req.root {
            Some(ref root) => InstallLayout::new(root),
            None => InstallLayout::from_current_exe()?,
        };
        layout.verify(req.mode)?;
        log::debug!("carver root {}", layout.root().display());

        let output = carved_output_path(&req.input);

        let extra_args = if req.extra_args.is_empty() {
            self.probe.link_options(&req.input)?
        } else {
            req.extra_args.clone()
        };

        let clang_version = self.probe.clang_version()?;
        if !clang_version.has_legacy_pass_manager() {
            log::warn!(
                "clang {} has no legacy pass manager; the carving plugin will likely not load",
                clang_version
            );
        }

        let invocation = Invocation::carve(&CarveSpec {
            clang: self.probe.compiler(),
            ld_path: &ld_path,
            clang_version,
            layout: &layout,
            mode: req.mode,
            input: &req.input,
            output: &output,
            pass: &req.pass,
            extra_args: &extra_args,
        });

        println!("{}", invocation.display());

        if req.dry_run {
            return Ok(Outcome {
                invocation,
                status: None,
            });
        }

        let status = self.launcher.launch(&invocation)?;
        if status.success() {
            log::info!("wrote {}", output.display());
        } else {
            log::error!(
                "{} exited with {}",
                invocation.program.display(),
                describe(status.code)
            );
        }

        Ok(Outcome {
            invocation,
            status: Some(status),
        })
    }
}

fn describe(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

