//! Host toolchain probing: linker location, clang version and the link
//! requirements recorded inside a bitcode module.

mod clang;
mod link_options;
mod linker;

use std::path::{Path, PathBuf};

use anyhow::Context;

pub use clang::{parse_clang_version, ClangVersion};
pub use link_options::parse_link_options;
pub use linker::{resolve_ld_path, search_linker, LD_CANDIDATES};

use crate::sh::{sh, ShOptionsBuilder, StreamMode};

/// Environment queries the driver needs before it can build the compiler
/// command line.
pub trait Probe {
    /// Compiler the version is probed from and the carving build runs with.
    fn compiler(&self) -> &Path;

    fn ld_path(&self) -> anyhow::Result<PathBuf>;

    fn clang_version(&self) -> anyhow::Result<ClangVersion>;

    /// Link flags the module itself asks for (dependent libraries and
    /// embedded linker options).
    fn link_options(&self, module: &Path) -> anyhow::Result<Vec<String>>;
}

/// Probes the real host by running the tools.
#[derive(Debug, Clone)]
pub struct SystemProbe {
    pub clang: PathBuf,
    pub llvm_dis: PathBuf,
    pub ld_override: Option<PathBuf>,
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self {
            clang: PathBuf::from("clang++"),
            llvm_dis: PathBuf::from("llvm-dis"),
            ld_override: None,
        }
    }
}

impl Probe for SystemProbe {
    fn compiler(&self) -> &Path {
        &self.clang
    }

    fn ld_path(&self) -> anyhow::Result<PathBuf> {
        Ok(resolve_ld_path(self.ld_override.as_deref())?)
    }

    fn clang_version(&self) -> anyhow::Result<ClangVersion> {
        let opts = ShOptionsBuilder::default()
            .stdout(StreamMode::Pipe)
            .stderr(StreamMode::Pipe)
            .quiet(true)
            .build()?;
        let out = sh(&self.clang, ["--version"], opts)
            .with_context(|| format!("probing {}", self.clang.display()))?;
        let version = parse_clang_version(&out.stdout)?;
        log::info!("{} is clang {}", self.clang.display(), version);
        Ok(version)
    }

    fn link_options(&self, module: &Path) -> anyhow::Result<Vec<String>> {
        // Diagnostics go straight to the terminal; only the IR is captured.
        let opts = ShOptionsBuilder::default()
            .stdout(StreamMode::Pipe)
            .quiet(true)
            .build()?;
        let out = sh(
            &self.llvm_dis,
            [module.as_os_str(), "-o".as_ref(), "-".as_ref()],
            opts,
        )
        .with_context(|| format!("disassembling {}", module.display()))?;
        let opts = parse_link_options(&out.stdout);
        log::info!("link options from {}: {:?}", module.display(), opts);
        Ok(opts)
    }
}
