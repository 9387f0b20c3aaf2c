use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::error::CarveError;

/// Linkers tried in order when no override is given.
pub const LD_CANDIDATES: &[&str] = &["ld.lld", "ld"];

/// Path handed to clang's `--ld-path=`. An explicit override is used as is.
pub fn resolve_ld_path(override_path: Option<&Path>) -> Result<PathBuf, CarveError> {
    if let Some(path) = override_path {
        if !path.exists() {
            log::warn!("linker override {} does not exist", path.display());
        }
        return Ok(path.to_path_buf());
    }

    let cwd = std::env::current_dir().unwrap_or_default();
    search_linker(std::env::var_os("PATH"), &cwd)
}

/// First of [`LD_CANDIDATES`] found on the `PATH`-style list `paths`.
pub fn search_linker<P: AsRef<OsStr>>(
    paths: Option<P>,
    cwd: &Path,
) -> Result<PathBuf, CarveError> {
    for cand in LD_CANDIDATES {
        if let Ok(path) = which::which_in(cand, paths.as_ref(), cwd) {
            log::debug!("using linker {}", path.display());
            return Ok(path);
        }
    }

    Err(CarveError::ToolNotFound(LD_CANDIDATES.join(" or ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins() {
        let ld = resolve_ld_path(Some(Path::new("/opt/llvm/bin/ld.lld"))).unwrap();
        assert_eq!(ld, PathBuf::from("/opt/llvm/bin/ld.lld"));
    }

    #[cfg(unix)]
    fn install_tool(dir: &Path, name: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, b"#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn search_prefers_lld_then_falls_back_to_ld() {
        let gnu = tempfile::tempdir().unwrap();
        let llvm = tempfile::tempdir().unwrap();
        let ld = install_tool(gnu.path(), "ld");

        let found = search_linker(Some(gnu.path()), gnu.path()).unwrap();
        assert_eq!(found.canonicalize().unwrap(), ld.canonicalize().unwrap());

        let lld = install_tool(llvm.path(), "ld.lld");
        let both = std::env::join_paths([gnu.path(), llvm.path()]).unwrap();
        let found = search_linker(Some(&both), gnu.path()).unwrap();
        assert_eq!(found.canonicalize().unwrap(), lld.canonicalize().unwrap());
    }

    #[test]
    fn search_reports_missing_linker() {
        let empty = tempfile::tempdir().unwrap();
        match search_linker(Some(empty.path()), empty.path()) {
            Err(CarveError::ToolNotFound(name)) => assert_eq!(name, "ld.lld or ld"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
