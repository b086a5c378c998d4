use colored::*;

use crate::terminal::{colors, print};
use pulp_common::{config::Config, success};
use pulp_core::registry::TargetRegistry;

pub fn targets(registry: &TargetRegistry, cfg: &Config) -> anyhow::Result<()> {
    if registry.is_empty() {
        print::centerln(&"no targets registered".red().to_string());
        return Ok(());
    }

    let key_width: usize = registry.names().map(str::len).max().unwrap_or(0);

    for (name, label) in registry.labels() {
        match cfg.quiet {
            0 => print::field(name, label, key_width),
            _ => print::print(&name.color(colors::PRIMARY).to_string()),
        }
    }

    if cfg.quiet == 0 {
        print::rule();
    }
    success!("{} target(s) available", registry.len());
    Ok(())
}
