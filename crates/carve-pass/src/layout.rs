use std::path::{Path, PathBuf};

use crate::error::CarveError;
use crate::mode::CarveMode;

/// Static runtime the carved module links against.
pub const RUNTIME_ARCHIVE: &str = "fa_carver.a";

/// Directory tree of an installed carver: plugins and runtime under `lib/`,
/// runtime headers under `include/`.
#[derive(Debug, Clone)]
pub struct InstallLayout {
    root: PathBuf,
}

impl InstallLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Nearest directory at or above `start` (or its parent, for a file)
    /// holding `lib/fa_carver.a`.
    pub fn discover(start: &Path) -> Result<Self, CarveError> {
        let marker = Path::new("lib").join(RUNTIME_ARCHIVE);
        let from = if start.is_dir() {
            start
        } else {
            start.parent().unwrap_or(start)
        };

        from.ancestors()
            .find(|dir| dir.join(&marker).is_file())
            .map(Self::new)
            .ok_or_else(|| CarveError::RootNotFound(start.to_path_buf()))
    }

    /// Resolves against the running executable (`<root>/bin/carve-pass`).
    pub fn from_current_exe() -> anyhow::Result<Self> {
        let exe = std::env::current_exe()?;
        let exe = exe.canonicalize().unwrap_or(exe);
        Ok(Self::discover(&exe)?)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn lib_dir(&self) -> PathBuf {
        self.root.join("lib")
    }

    pub fn include_dir(&self) -> PathBuf {
        self.root.join("include")
    }

    pub fn plugin(&self, mode: CarveMode) -> PathBuf {
        self.lib_dir().join(mode.plugin_file_name())
    }

    pub fn runtime_archive(&self) -> PathBuf {
        self.lib_dir().join(RUNTIME_ARCHIVE)
    }

    /// Linker spec picking the archive by exact file name.
    pub fn runtime_link_spec(&self) -> String {
        format!("-l:{RUNTIME_ARCHIVE}")
    }

    pub fn verify(&self, mode: CarveMode) -> Result<(), CarveError> {
        for path in [self.plugin(mode), self.runtime_archive()] {
            if !path.is_file() {
                return Err(CarveError::MissingArtifact(path));
            }
        }
        Ok(())
    }
}
