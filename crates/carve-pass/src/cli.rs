use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{ArgAction, CommandFactory, Parser, ValueEnum};

use crate::driver::Request;
use crate::invocation::PassOptions;
use crate::mode::CarveMode;
use crate::toolchain::SystemProbe;

/// carve-pass command-line interface
#[derive(Parser, Debug)]
#[command(
    name = "carve-pass",
    version,
    about = "Compile a bitcode module with a carving plugin into a .carv artifact",
    arg_required_else_help = true,
    after_help = "Driver options go before <MODE>. Everything after <MODE> is passed \
                  to the compiler unchanged."
)]
pub struct Cli {
    /// Carver install root holding lib/ and include/
    #[arg(long, env = "CARVE_ROOT", value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// C++ compiler driver to invoke
    #[arg(long, env = "CARVE_CLANG", default_value = "clang++", value_name = "PROG")]
    pub clang: PathBuf,

    /// Linker handed to the compiler via --ld-path (default: ld.lld or ld from PATH)
    #[arg(long = "ld-path", env = "CARVE_LD_PATH", value_name = "PATH")]
    pub ld_path: Option<PathBuf>,

    /// Disassembler used to read link options recorded in the module
    #[arg(long, env = "CARVE_LLVM_DIS", default_value = "llvm-dis", value_name = "PROG")]
    pub llvm_dis: PathBuf,

    /// Have the plugin dump the instrumented IR
    #[arg(long)]
    pub dump_ir: bool,

    /// Save carving state at every load instruction
    #[arg(long)]
    pub crash: bool,

    /// File listing the functions to carve
    #[arg(long, value_name = "FILE")]
    pub targets: Option<PathBuf>,

    /// Print the compiler command without running it
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Bitcode module to carve
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Carving plugin to load (func_args, complex_types), then extra compiler
    /// arguments passed verbatim (default: the module's link options)
    // One trailing positional, so nothing after the mode is read as a driver flag.
    #[arg(
        value_name = "MODE",
        required = true,
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    mode_and_args: Vec<String>,
}

impl Cli {
    /// Parse and check the carving mode; errors render and exit like any
    /// other clap usage error.
    pub fn try_parse_checked<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli = Self::try_parse_from(args)?;
        cli.mode()?;
        Ok(cli)
    }

    pub fn mode(&self) -> Result<CarveMode, clap::Error> {
        let raw = self.mode_and_args.first().map(String::as_str).unwrap_or_default();
        CarveMode::from_str(raw, false).map_err(|_| {
            let accepted = CarveMode::value_variants()
                .iter()
                .map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            Self::command().error(
                ErrorKind::InvalidValue,
                format!("invalid value '{raw}' for '<MODE>' [possible values: {accepted}]"),
            )
        })
    }

    /// Compiler arguments following the mode, exactly as given.
    pub fn compile_args(&self) -> &[String] {
        self.mode_and_args.get(1..).unwrap_or_default()
    }

    /// Default `log` filter for the requested verbosity.
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }

    pub fn probe(&self) -> SystemProbe {
        SystemProbe {
            clang: self.clang.clone(),
            llvm_dis: self.llvm_dis.clone(),
            ld_override: self.ld_path.clone(),
        }
    }

    pub fn into_request(self) -> Result<Request, clap::Error> {
        let mode = self.mode()?;
        let extra_args = self.compile_args().to_vec();
        Ok(Request {
            input: self.input,
            mode,
            extra_args,
            pass: PassOptions {
                crash: self.crash,
                targets: self.targets,
                dump_ir: self.dump_ir,
            },
            root: self.root,
            dry_run: self.dry_run,
        })
    }
}
