#![cfg(test)]
use pulp_common::args::ArgParser;
use pulp_common::error::BoardError;
use pulp_common::options::Options;
use pulp_core::board::{Board, ComponentKind, Platform};
use pulp_core::boards::extended_pulp::{ExtendedPulpBoard, NEUREKA_OFFSET};
use pulp_core::models::cluster_ctrl::{self, ClusterCtrl};
use pulp_core::models::io::{IoReqStatus, IoSlave};
use pulp_core::models::neureka::RegConfig;
use pulp_core::registry::TargetRegistry;
use pulp_core::targets::{TargetDescriptor, extended_pulp};
use rand::Rng;

const LABEL: &str = "Extended pulp virtual board";

/// Default options, built through the registry the way the CLI does it.
#[test]
fn registry_builds_target_with_defaults() -> anyhow::Result<()> {
    let registry = TargetRegistry::with_builtin_targets()?;
    assert!(registry.contains(extended_pulp::Target::NAME));

    let mut parser = ArgParser::new();
    let target = registry.create("extended-pulp", &mut parser, &Options::new())?;
    parser.check_unknown()?;

    assert_eq!(target.describe(), LABEL);
    assert_eq!(target.board().name(), ExtendedPulpBoard::NAME);
    assert_eq!(target.board().platform(), Platform::Gvsoc);
    assert_eq!(target.board().chip().nb_cluster, 1);
    assert_eq!(target.board().chip().nb_pe, 8);
    Ok(())
}

#[test]
fn registry_lookup_ignores_case() -> anyhow::Result<()> {
    let registry = TargetRegistry::with_builtin_targets()?;
    let target = registry.create(" Extended-PULP ", &mut ArgParser::new(), &Options::new())?;
    assert_eq!(target.to_string(), LABEL);
    Ok(())
}

#[test]
fn unknown_target_is_reported() -> anyhow::Result<()> {
    let registry = TargetRegistry::with_builtin_targets()?;
    let result = registry.create("pulp-open", &mut ArgParser::new(), &Options::new());
    assert!(matches!(result, Err(BoardError::UnknownTarget(name)) if name == "pulp-open"));
    Ok(())
}

#[test]
fn options_reach_the_board_unchanged() -> anyhow::Result<()> {
    let mut rng = rand::rng();
    let registry = TargetRegistry::with_builtin_targets()?;

    for _ in 0..16 {
        let nb_cluster: u32 = rng.random_range(1..=16);
        let nb_pe: u32 = rng.random_range(1..=32);
        let neureka: bool = rng.random();
        let options = Options::from_pairs([
            format!("soc/nb_cluster={nb_cluster}"),
            format!("cluster/nb_pe={nb_pe}"),
            format!("cluster/neureka={neureka}"),
            "custom/untouched=value".to_string(),
        ])?;

        let target = registry.create("extended-pulp", &mut ArgParser::new(), &options)?;
        let board = target.board();

        assert_eq!(board.options(), &options);
        assert_eq!(board.chip().nb_cluster, nb_cluster);
        assert_eq!(board.chip().nb_pe, nb_pe);
        assert_eq!(board.chip().neureka, neureka);

        let per_cluster = if neureka { 2 } else { 1 };
        assert_eq!(board.components().len(), (nb_cluster * per_cluster) as usize);
        assert_eq!(board.memory_map().len(), 1 + (nb_cluster * (per_cluster + 1)) as usize);
    }
    Ok(())
}

#[test]
fn arguments_reach_the_board() -> anyhow::Result<()> {
    let registry = TargetRegistry::with_builtin_targets()?;
    let mut parser = ArgParser::from_pairs(["binary=app.elf", "--platform=rtl"])?;

    let target = registry.create("extended-pulp", &mut parser, &Options::new())?;
    parser.check_unknown()?;

    assert_eq!(target.board().binary(), Some("app.elf"));
    assert_eq!(target.board().platform(), Platform::Rtl);
    Ok(())
}

#[test]
fn board_errors_propagate_unchanged() -> anyhow::Result<()> {
    let registry = TargetRegistry::with_builtin_targets()?;
    let options = Options::from_pairs(["cluster/nb_pe=64"])?;

    let base = ExtendedPulpBoard::new(&mut ArgParser::new(), &options)
        .err()
        .ok_or_else(|| anyhow::anyhow!("board accepted 64 cores"))?;
    let through_target = registry
        .create("extended-pulp", &mut ArgParser::new(), &options)
        .err()
        .ok_or_else(|| anyhow::anyhow!("target accepted 64 cores"))?;

    assert_eq!(base, through_target);
    assert!(matches!(through_target, BoardError::InvalidOption { ref key, .. } if key == "cluster/nb_pe"));
    Ok(())
}

#[test]
fn invalid_platform_is_rejected() -> anyhow::Result<()> {
    let registry = TargetRegistry::with_builtin_targets()?;
    let mut parser = ArgParser::from_pairs(["platform=fpga"])?;

    let result = registry.create("extended-pulp", &mut parser, &Options::new());
    assert!(matches!(result, Err(BoardError::InvalidArgument { ref name, .. }) if name == "platform"));
    Ok(())
}

#[test]
fn undeclared_arguments_are_rejected_after_construction() -> anyhow::Result<()> {
    let registry = TargetRegistry::with_builtin_targets()?;
    let mut parser = ArgParser::from_pairs(["binary=app.elf", "trace=insn"])?;

    registry.create("extended-pulp", &mut parser, &Options::new())?;
    assert_eq!(parser.check_unknown(), Err(BoardError::UnknownArgument("trace".into())));
    Ok(())
}

#[test]
fn cluster_controller_boots_cores_of_the_board() -> anyhow::Result<()> {
    let options = Options::from_pairs(["soc/nb_cluster=2", "cluster/nb_pe=4"])?;
    let board = ExtendedPulpBoard::new(&mut ArgParser::new(), &options)?;

    assert!(board.cluster_ctrl(2).is_none());
    let mut ctrl: ClusterCtrl = board
        .cluster_ctrl(1)
        .ok_or_else(|| anyhow::anyhow!("missing controller for cluster 1"))?;
    assert_eq!(ctrl.nb_core(), 4);

    let periph = ExtendedPulpBoard::cluster_peripherals(1);
    let region = board
        .region_at(periph)
        .ok_or_else(|| anyhow::anyhow!("controller not mapped"))?;
    assert_eq!(region.name, "cluster1/cluster_ctrl");

    assert_eq!(ctrl.read_word(cluster_ctrl::bootaddr(3)), Ok(cluster_ctrl::BOOTADDR_RESET));
    assert_eq!(ctrl.write_word(cluster_ctrl::bootaddr(3), 0x1C00_8080), IoReqStatus::Ok);
    assert_eq!(ctrl.bootaddr(3), Some(0x1C00_8080));
    assert_eq!(ctrl.write_word(cluster_ctrl::FETCH_EN, 0xF), IoReqStatus::Ok);
    assert_eq!(ctrl.read_word(cluster_ctrl::FETCH_EN), Ok(0xF));

    // Cross-trigger: one masked core halting stops the others
    ctrl.write_word(cluster_ctrl::DBG_HALT_MASK, 0b0110);
    ctrl.halt_status_sync(1, true);
    assert_eq!(ctrl.read_word(cluster_ctrl::DBG_STATUS), Ok(0b0110));
    Ok(())
}

#[test]
fn neureka_follows_board_configuration() -> anyhow::Result<()> {
    let enabled = ExtendedPulpBoard::new(&mut ArgParser::new(), &Options::new())?;
    let disabled = ExtendedPulpBoard::new(
        &mut ArgParser::new(),
        &Options::from_pairs(["cluster/neureka=false"])?,
    )?;

    assert!(disabled.neureka(0).is_none());
    assert!(
        !disabled
            .components()
            .iter()
            .any(|c| c.kind == ComponentKind::Neureka)
    );

    let neureka_base = ExtendedPulpBoard::cluster_peripherals(0) + NEUREKA_OFFSET;
    assert!(
        enabled
            .components()
            .iter()
            .any(|c| c.kind == ComponentKind::Neureka && c.base == neureka_base)
    );

    let mut control = enabled
        .neureka(0)
        .ok_or_else(|| anyhow::anyhow!("missing neureka"))?;
    control.set_config(RegConfig {
        kin_tile_count: 2,
        kout_tile_count: 2,
        hout_tile_count: 1,
        wout_tile_count: 3,
        ..RegConfig::default()
    });

    let mut tiles = 1;
    loop {
        control.check_tile_status();
        if control.tiles.finish {
            break;
        }
        control.update_tile_index();
        tiles += 1;
        assert!(tiles <= 12, "tiling did not terminate");
    }
    assert_eq!(tiles, 12);
    Ok(())
}
