//! Driver that compiles an LLVM bitcode module with one of the carving
//! plugins loaded, producing an instrumented `.carv` artifact.

pub mod bitcode;
pub mod cli;
pub mod driver;
pub mod error;
pub mod invocation;
pub mod layout;
pub mod mode;
pub mod sh;
pub mod toolchain;

pub use driver::{Driver, Launcher, Outcome, Request, RunStatus, SystemLauncher};
pub use error::CarveError;
pub use invocation::{Invocation, PassOptions};
pub use mode::CarveMode;
