use anyhow::Context;
use colored::*;

use crate::pprint;
use crate::terminal::{
    colors,
    format::{self, Detail},
    print,
};
use pulp_common::{args::ArgParser, config::Config, options::Options, success};
use pulp_core::board::Board;
use pulp_core::registry::TargetRegistry;
use pulp_core::targets::VirtualTarget;

pub fn describe(
    registry: &TargetRegistry,
    name: &str,
    config_opts: &[String],
    args: &[String],
    cfg: &Config,
) -> anyhow::Result<()> {
    let options = Options::from_pairs(config_opts).context("parsing --config-opt values")?;
    let mut parser = ArgParser::from_pairs(args).context("parsing --arg values")?;

    let target = registry
        .create(name, &mut parser, &options)
        .with_context(|| format!("building target '{name}'"))?;
    parser.check_unknown()?;

    success!("{}", target.describe());

    match cfg.quiet {
        0 => print_target(target.as_ref(), &parser),
        1 => print::field("target", target.describe(), 6),
        _ => {}
    }
    Ok(())
}

fn print_target(target: &dyn VirtualTarget, parser: &ArgParser) {
    let board: &dyn Board = target.board();
    let chip = board.chip();

    print::field("target", target.describe(), 8);
    print::field("board", board.to_string(), 8);
    print::field("platform", board.platform().to_string().color(colors::ACCENT), 8);
    pprint!();

    let chip_rows: Vec<Detail> = vec![
        ("clusters".to_string(), chip.nb_cluster.to_string().normal()),
        ("cores per cluster".to_string(), chip.nb_pe.to_string().normal()),
        ("l1 size".to_string(), format::size(chip.l1_size).color(colors::SIZE)),
        ("l2 size".to_string(), format::size(chip.l2_size).color(colors::SIZE)),
        ("neureka".to_string(), chip.neureka.to_string().normal()),
    ];
    print::section(0, "chip", &chip_rows);
    pprint!();

    let arguments: Vec<Detail> = parser
        .arguments()
        .map(|(spec, value)| format::argument_to_detail(spec, value))
        .collect();
    print::section(1, "arguments", &arguments);
    pprint!();

    let regions: Vec<Detail> = board.memory_map().iter().map(format::region_to_detail).collect();
    print::section(2, "memory map", &regions);
    pprint!();

    let components: Vec<Detail> = board.components().iter().map(format::component_to_detail).collect();
    print::section(3, "components", &components);
    print::rule();
}
