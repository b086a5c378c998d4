mod commands;
mod terminal;

use commands::{CommandLine, Commands, describe, targets};
use pulp_common::config::Config;
use pulp_core::registry::TargetRegistry;
use terminal::{logging, print};

fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.quiet, commands.verbose);

    let cfg = Config {
        quiet: commands.quiet,
    };
    let registry = TargetRegistry::with_builtin_targets()?;

    match commands.command {
        Commands::Targets => {
            print::header("available targets", cfg.quiet);
            targets::targets(&registry, &cfg)
        }
        Commands::Describe {
            target,
            config_opts,
            args,
        } => {
            print::header("assembling target", cfg.quiet);
            describe::describe(&registry, &target, &config_opts, &args, &cfg)
        }
    }
}
