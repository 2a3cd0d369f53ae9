//! CLI module for cxxmate
//!
//! Provides command-line interface using clap derive macros.

pub mod commands;
pub mod location;
pub mod output;
pub mod response;

pub use location::ParsedLocation;
pub use output::OutputContext;

use clap::{Parser, Subcommand};

use commands::{
    accessors::AccessorsArgs, config::ConfigArgs, define::DefineArgs, guard::GuardArgs,
    include::IncludeArgs, method::MethodArgs, pair::PairArgs, symbols::SymbolsArgs,
};

const LONG_ABOUT: &str = r#"
cxxmate - where new C/C++ code should go

cxxmate asks clangd for the outline of a file and answers structural questions
with text heuristics: does this header have a guard, where do new includes go,
what would the accessors of this member be called, where should the
out-of-line definition of this method live.

EXAMPLES:
  cxxmate symbols src/widget.h
  cxxmate guard include/widget.hpp
  cxxmate include src/widget.cpp
  cxxmate accessors src/widget.h:12:9
  cxxmate method src/widget.h:5:7 --after setWidth
  cxxmate define src/widget.h:8:10
  cxxmate pair src/widget.h

Positions are 1-indexed (file:line:column).
"#;

/// cxxmate - heuristic C/C++ structure model
#[derive(Parser, Debug)]
#[command(name = "cxxmate")]
#[command(author, version, about, long_about = LONG_ABOUT)]
#[command(propagate_version = true)]
#[command(after_help = "Use 'cxxmate <COMMAND> --help' for more information about a command.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output (show debug info)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Semantic symbol tree of a file
    Symbols(SymbolsArgs),

    /// Header guard status and insertion point
    Guard(GuardArgs),

    /// Insertion points for new #include lines
    Include(IncludeArgs),

    /// Insertion point for a new method in a class
    Method(MethodArgs),

    /// Getter/setter names and insertion points for a member variable
    Accessors(AccessorsArgs),

    /// Where the definition of a declared function should go
    Define(DefineArgs),

    /// Matching header or source file
    Pair(PairArgs),

    /// Configuration management
    Config(ConfigArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_method_command() {
        let cli = Cli::try_parse_from([
            "cxxmate",
            "method",
            "src/widget.h:5:7",
            "--after",
            "setWidth",
            "--getter",
            "-v",
        ])
        .unwrap();
        assert!(cli.verbose);
        let Commands::Method(args) = cli.command else {
            panic!("expected method command");
        };
        assert_eq!(args.location, "src/widget.h:5:7");
        assert_eq!(args.after.as_deref(), Some("setWidth"));
        assert!(args.getter);
    }

    #[test]
    fn test_parse_define_with_target() {
        let cli = Cli::try_parse_from(["cxxmate", "define", "a.h:3:10", "-t", "a.cpp"]).unwrap();
        let Commands::Define(args) = cli.command else {
            panic!("expected define command");
        };
        assert_eq!(args.target.as_deref(), Some("a.cpp"));
    }

    #[test]
    fn test_parse_config_path() {
        let cli = Cli::try_parse_from(["cxxmate", "config", "path", "--global"]).unwrap();
        assert!(matches!(cli.command, Commands::Config(_)));
        assert!(Cli::try_parse_from(["cxxmate", "pair"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
