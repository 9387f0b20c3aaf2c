use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::layout::InstallLayout;
use crate::mode::CarveMode;
use crate::sh;
use crate::toolchain::ClangVersion;

/// Options understood by the carving plugins themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassOptions {
    /// Save carving state at every load instruction.
    pub crash: bool,
    /// File listing the functions to carve.
    pub targets: Option<PathBuf>,
    /// Have the plugin dump the instrumented IR (`DUMP_IR=1`).
    pub dump_ir: bool,
}

/// Everything needed to lay out the compiler command line.
#[derive(Debug, Clone)]
pub struct CarveSpec<'a> {
    pub clang: &'a Path,
    pub ld_path: &'a Path,
    pub clang_version: ClangVersion,
    pub layout: &'a InstallLayout,
    pub mode: CarveMode,
    pub input: &'a Path,
    pub output: &'a Path,
    pub pass: &'a PassOptions,
    pub extra_args: &'a [String],
}

/// A fully resolved compiler command. The child inherits the driver's
/// environment plus `envs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub envs: Vec<(OsString, OsString)>,
}

impl Invocation {
    pub fn carve(spec: &CarveSpec<'_>) -> Self {
        let mut ld_flag = OsString::from("--ld-path=");
        ld_flag.push(spec.ld_path);

        let mut args: Vec<OsString> = vec![
            ld_flag,
            spec.clang_version.legacy_pass_manager_flag().into(),
            "-ggdb".into(),
            "-O0".into(),
            "-Xclang".into(),
            "-load".into(),
            "-Xclang".into(),
            spec.layout.plugin(spec.mode).into(),
            "-fPIC".into(),
        ];

        if spec.pass.crash {
            args.push("-mllvm".into());
            args.push("-crash".into());
        }
        if let Some(ref targets) = spec.pass.targets {
            let mut opt = OsString::from("-target=");
            opt.push(targets);
            args.push("-mllvm".into());
            args.push(opt);
        }

        let tail: [OsString; 8] = [
            "-I".into(),
            spec.layout.include_dir().into(),
            "-o".into(),
            spec.output.into(),
            "-L".into(),
            spec.layout.lib_dir().into(),
            spec.input.into(),
            spec.layout.runtime_link_spec().into(),
        ];
        args.extend(tail);
        args.extend(spec.extra_args.iter().map(OsString::from));

        let mut envs: Vec<(OsString, OsString)> = Vec::new();
        if spec.pass.dump_ir {
            envs.push(("DUMP_IR".into(), "1".into()));
        }

        Self {
            program: spec.clang.to_path_buf(),
            args,
            envs,
        }
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        for (k, v) in &self.envs {
            cmd.env(k, v);
        }
        cmd
    }

    pub fn display(&self) -> String {
        sh::render(&self.program, &self.args)
    }

    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    pub fn env(&self, key: &str) -> Option<&OsStr> {
        self.envs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_os_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(pass: &PassOptions, extra: &[String], major: u32) -> Invocation {
        let layout = InstallLayout::new("/opt/carver");
        Invocation::carve(&CarveSpec {
            clang: Path::new("clang++"),
            ld_path: Path::new("/usr/bin/ld.lld"),
            clang_version: ClangVersion {
                major,
                minor: 0,
                patch: 0,
            },
            layout: &layout,
            mode: CarveMode::FuncArgs,
            input: Path::new("work/main.bc"),
            output: Path::new("work/main.carv"),
            pass,
            extra_args: extra,
        })
    }

    #[test]
    fn fixed_flags_in_order() {
        let inv = build(&PassOptions::default(), &[], 15);
        assert_eq!(inv.program, PathBuf::from("clang++"));
        assert_eq!(
            inv.args_lossy(),
            vec![
                "--ld-path=/usr/bin/ld.lld",
                "-flegacy-pass-manager",
                "-ggdb",
                "-O0",
                "-Xclang",
                "-load",
                "-Xclang",
                "/opt/carver/lib/carve_func_args_pass.so",
                "-fPIC",
                "-I",
                "/opt/carver/include",
                "-o",
                "work/main.carv",
                "-L",
                "/opt/carver/lib",
                "work/main.bc",
                "-l:fa_carver.a",
            ]
        );
        assert!(inv.envs.is_empty());
    }

    #[test]
    fn extra_args_follow_verbatim() {
        let extra = vec!["-lpthread".to_string(), "-Wl,--as-needed".to_string()];
        let inv = build(&PassOptions::default(), &extra, 14);
        let args = inv.args_lossy();
        assert_eq!(args[1], "-fno-experimental-new-pass-manager");
        let runtime = args.iter().position(|a| a == "-l:fa_carver.a").unwrap();
        assert_eq!(&args[runtime + 1..], &extra[..]);
        assert_eq!(
            inv.display(),
            format!("clang++ {}", args.join(" "))
        );
    }

    #[test]
    fn pass_options_map_to_mllvm_and_env() {
        let pass = PassOptions {
            crash: true,
            targets: Some(PathBuf::from("targets.txt")),
            dump_ir: true,
        };
        let inv = build(&pass, &[], 15);
        let args = inv.args_lossy();
        let fpic = args.iter().position(|a| a == "-fPIC").unwrap();
        assert_eq!(
            &args[fpic + 1..fpic + 5],
            &["-mllvm", "-crash", "-mllvm", "-target=targets.txt"]
        );
        assert_eq!(inv.env("DUMP_IR"), Some(OsStr::new("1")));
    }
}
