pub mod describe;
pub mod targets;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pulpvp")]
#[command(about = "Assemble and inspect PULP virtual boards.")]
pub struct CommandLine {
    /// Reduce output, repeat to reduce further
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub quiet: u8,

    /// Show diagnostics, repeat for more detail
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the targets that can be selected
    #[command(alias = "t")]
    Targets,
    /// Build a target and show the board behind it
    #[command(alias = "d")]
    Describe {
        /// Name of the target to build
        #[arg(short, long)]
        target: String,
        /// Board option, as <path>=<value>
        #[arg(long = "config-opt", value_name = "PATH=VALUE")]
        config_opts: Vec<String>,
        /// Board argument, as <name>=<value>
        #[arg(long = "arg", value_name = "NAME=VALUE")]
        args: Vec<String>,
    },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
