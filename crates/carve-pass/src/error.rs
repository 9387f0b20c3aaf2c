use std::path::PathBuf;

use thiserror::Error;

/// Failures the driver reports before (or instead of) launching the compiler.
#[derive(Debug, Error)]
pub enum CarveError {
    #[error("{}: not a valid bitcode module ({reason})", path.display())]
    InvalidBitcode { path: PathBuf, reason: String },

    #[error("missing carver artifact: {}", .0.display())]
    MissingArtifact(PathBuf),

    #[error("carver install root not found (searched upward from {}); pass --root or set CARVE_ROOT", .0.display())]
    RootNotFound(PathBuf),

    #[error("{0} not found on PATH")]
    ToolNotFound(String),

    #[error("could not determine clang version from `{0}`")]
    UnknownClangVersion(String),
}
