use std::fmt;

use crate::error::CarveError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClangVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ClangVersion {
    /// Last major release that still ships the legacy pass manager.
    pub const LAST_LEGACY_PM: u32 = 15;

    /// Flag forcing the legacy pass manager, which `-Xclang -load` plugins need.
    /// Clang 15 renamed it; earlier releases use the negative form.
    pub fn legacy_pass_manager_flag(&self) -> &'static str {
        if self.major == 15 {
            "-flegacy-pass-manager"
        } else {
            "-fno-experimental-new-pass-manager"
        }
    }

    pub fn has_legacy_pass_manager(&self) -> bool {
        self.major <= Self::LAST_LEGACY_PM
    }
}

impl fmt::Display for ClangVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Parse `clang --version` output, e.g. `Ubuntu clang version 14.0.0-1ubuntu1`.
pub fn parse_clang_version(output: &str) -> Result<ClangVersion, CarveError> {
    const MARKER: &str = "clang version ";

    let unknown = || {
        CarveError::UnknownClangVersion(output.lines().next().unwrap_or_default().to_string())
    };

    let rest = output
        .lines()
        .find_map(|line| line.find(MARKER).map(|i| &line[i + MARKER.len()..]))
        .ok_or_else(unknown)?;
    let token = rest.split_whitespace().next().ok_or_else(unknown)?;
    // 14.0.0-1ubuntu1, 18.1.8+libcxx
    let numeric = token
        .split(|c: char| c == '-' || c == '+')
        .next()
        .unwrap_or(token);

    let mut parts = numeric.split('.').map(str::parse::<u32>);
    let major = match parts.next() {
        Some(Ok(major)) => major,
        _ => return Err(unknown()),
    };
    let minor = parts.next().and_then(Result::ok).unwrap_or(0);
    let patch = parts.next().and_then(Result::ok).unwrap_or(0);

    Ok(ClangVersion {
        major,
        minor,
        patch,
    })
}
