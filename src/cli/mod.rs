use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

mod commands;
mod errors;

pub use commands::{CheckCommand, CleanCommand, PlanCommand, Session};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[clap(flatten)]
    pub rules: RuleArgs,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct RuleArgs {
    /// Rule file. Defaults to `rules_file` from the config, then sweep.rules
    #[clap(short, long, global = true)]
    pub rules: Option<PathBuf>,

    /// Config file. Defaults to sweep.yaml in the current directory, if present
    #[clap(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Extra ignore pattern, can be repeated
    #[clap(long = "ignore", global = true)]
    pub ignore: Vec<String>,

    /// Extra skip pattern, can be repeated
    #[clap(long = "skip", global = true)]
    pub skip: Vec<String>,

    /// Run even if some rule would delete something dangerous
    #[clap(long, global = true, default_value = "false")]
    pub no_validate: bool,

    /// Debug logging
    #[clap(short, long, global = true, default_value = "false")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List what would be deleted
    Plan {
        /// Base directories (default: current directory)
        dirs: Vec<PathBuf>,

        /// Print the plan as JSON
        #[clap(long, default_value = "false")]
        json: bool,
    },

    /// Delete everything the rules select
    Clean {
        /// Base directories (default: current directory)
        dirs: Vec<PathBuf>,

        /// Don't ask for confirmation
        #[clap(short, long, default_value = "false")]
        yes: bool,

        /// Print the deletion report as JSON
        #[clap(long, default_value = "false")]
        json: bool,
    },

    /// Parse and validate the rule file without touching the filesystem
    Check {
        /// Print rules and validation result as JSON
        #[clap(long, default_value = "false")]
        json: bool,
    },
}
