use std::fmt;

use clap::ValueEnum;

/// Which carving plugin gets loaded into the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CarveMode {
    /// Carve the arguments of each function call
    #[value(name = "func_args")]
    FuncArgs,
    /// Carve complex (aggregate and pointer) types
    #[value(name = "complex_types")]
    ComplexTypes,
}

impl CarveMode {
    pub fn as_str(self) -> &'static str {
        match self {
            CarveMode::FuncArgs => "func_args",
            CarveMode::ComplexTypes => "complex_types",
        }
    }

    /// File name of the plugin under `<root>/lib`.
    pub fn plugin_file_name(self) -> &'static str {
        match self {
            CarveMode::FuncArgs => "carve_func_args_pass.so",
            CarveMode::ComplexTypes => "carve_type_pass.so",
        }
    }
}

impl fmt::Display for CarveMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exact_names_only() {
        assert_eq!(
            CarveMode::from_str("func_args", false).unwrap(),
            CarveMode::FuncArgs
        );
        assert_eq!(
            CarveMode::from_str("complex_types", false).unwrap(),
            CarveMode::ComplexTypes
        );
        assert!(CarveMode::from_str("func-args", false).is_err());
        assert!(CarveMode::from_str("FUNC_ARGS", false).is_err());
    }

    #[test]
    fn plugin_names() {
        assert_eq!(
            CarveMode::FuncArgs.plugin_file_name(),
            "carve_func_args_pass.so"
        );
        assert_eq!(CarveMode::ComplexTypes.plugin_file_name(), "carve_type_pass.so");
    }
}
