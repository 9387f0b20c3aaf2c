//! Input module checks and carved-artifact naming.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::CarveError;

/// Extension given to the instrumented output.
pub const CARVED_EXTENSION: &str = "carv";

const RAW_MAGIC: [u8; 4] = [b'B', b'C', 0xC0, 0xDE];
// 0x0B17C0DE, stored little-endian.
const WRAPPER_MAGIC: [u8; 4] = [0xDE, 0xC0, 0x17, 0x0B];

/// Succeeds when `path` is a regular file starting with an LLVM bitcode magic.
pub fn check_bitcode(path: &Path) -> Result<(), CarveError> {
    let invalid = |reason: String| CarveError::InvalidBitcode {
        path: path.to_path_buf(),
        reason,
    };

    let meta = std::fs::metadata(path).map_err(|e| invalid(e.to_string()))?;
    if !meta.is_file() {
        return Err(invalid("not a regular file".into()));
    }

    let mut magic = [0u8; 4];
    File::open(path)
        .and_then(|mut f| f.read_exact(&mut magic))
        .map_err(|e| invalid(format!("cannot read header: {e}")))?;

    if magic == RAW_MAGIC || magic == WRAPPER_MAGIC {
        log::debug!("{} looks like bitcode", path.display());
        Ok(())
    } else {
        Err(invalid(format!("unexpected magic {magic:02x?}")))
    }
}

/// `dir/name.bc` -> `dir/name.carv`. Only the last extension of the file name
/// is replaced; a name without one gains `.carv`.
pub fn carved_output_path(input: &Path) -> PathBuf {
    input.with_extension(CARVED_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(".bc").tempfile().unwrap();
        f.write_all(bytes).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn accepts_raw_and_wrapped_bitcode() {
        let raw = write_temp(&[b'B', b'C', 0xC0, 0xDE, 0x35, 0x14]);
        check_bitcode(raw.path()).unwrap();

        let wrapped = write_temp(&[0xDE, 0xC0, 0x17, 0x0B, 0, 0, 0, 0]);
        check_bitcode(wrapped.path()).unwrap();
    }

    #[test]
    fn rejects_text_short_and_missing_files() {
        let text = write_temp(b"int main() { return 0; }\n");
        assert!(matches!(
            check_bitcode(text.path()),
            Err(CarveError::InvalidBitcode { .. })
        ));

        let short = write_temp(b"BC");
        assert!(check_bitcode(short.path()).is_err());

        let dir = tempfile::tempdir().unwrap();
        assert!(check_bitcode(dir.path()).is_err());
        assert!(check_bitcode(&dir.path().join("nope.bc")).is_err());
    }

    #[test]
    fn output_path_replaces_final_extension() {
        assert_eq!(
            carved_output_path(Path::new("main.bc")),
            PathBuf::from("main.carv")
        );
        assert_eq!(
            carved_output_path(Path::new("build/lib.v1/app.opt.bc")),
            PathBuf::from("build/lib.v1/app.opt.carv")
        );
        assert_eq!(
            carved_output_path(Path::new("../bin/app")),
            PathBuf::from("../bin/app.carv")
        );
    }
}
