use std::fmt;

use pulp_common::args::ArgParser;
use pulp_common::error::BoardError;
use pulp_common::options::Options;

use crate::board::Board;
use crate::boards::ExtendedPulpBoard;
use crate::targets::{TargetDescriptor, VirtualTarget};

/// Extended pulp board.
pub struct Target {
    board: ExtendedPulpBoard,
}

impl Target {
    pub fn new(parser: &mut ArgParser, options: &Options) -> Result<Self, BoardError> {
        let board = ExtendedPulpBoard::new(parser, options)?;
        Ok(Self { board })
    }

    pub fn base(&self) -> &ExtendedPulpBoard {
        &self.board
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::LABEL)
    }
}

impl VirtualTarget for Target {
    fn board(&self) -> &dyn Board {
        &self.board
    }
}

impl TargetDescriptor for Target {
    const NAME: &'static str = "extended-pulp";
    const LABEL: &'static str = "Extended pulp virtual board";
    const IS_TARGET: bool = true;

    fn construct(parser: &mut ArgParser, options: &Options) -> Result<Self, BoardError> {
        Self::new(parser, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    const LABEL: &str = "Extended pulp virtual board";

    #[test]
    fn test_label_is_constant() {
        let target = Target::new(&mut ArgParser::new(), &Options::new()).unwrap();
        assert_eq!(target.to_string(), LABEL);
        assert_eq!(target.describe(), LABEL);

        let options = Options::from_pairs(["soc/nb_cluster=4", "cluster/nb_pe=2", "cluster/neureka=0"]).unwrap();
        let target = Target::new(&mut ArgParser::new(), &options).unwrap();
        assert_eq!(target.describe(), LABEL);
    }

    #[test]
    fn test_marker_is_set() {
        assert!(Target::IS_TARGET);
        assert_eq!(Target::NAME, "extended-pulp");
        assert_eq!(Target::LABEL, LABEL);
    }

    #[test]
    fn test_forwards_options_unchanged() {
        let mut rng = rand::rng();

        for _ in 0..32 {
            let nb_cluster: u32 = rng.random_range(1..=16);
            let nb_pe: u32 = rng.random_range(1..=32);
            let options = Options::from_pairs([
                format!("soc/nb_cluster={nb_cluster}"),
                format!("cluster/nb_pe={nb_pe}"),
                "custom/untouched=value".to_string(),
            ])
            .unwrap();

            let target = Target::new(&mut ArgParser::new(), &options).unwrap();
            let direct = ExtendedPulpBoard::new(&mut ArgParser::new(), &options).unwrap();

            assert_eq!(target.board().options(), &options);
            assert_eq!(target.board().chip(), direct.chip());
            assert_eq!(target.board().memory_map(), direct.memory_map());
            assert_eq!(target.board().components(), direct.components());
        }
    }

    #[test]
    fn test_forwards_parser() {
        let mut parser = ArgParser::from_pairs(["binary=app.elf"]).unwrap();
        let target = Target::new(&mut parser, &Options::new()).unwrap();

        assert_eq!(target.board().binary(), Some("app.elf"));
        assert!(parser.is_declared("binary"));
        assert!(parser.is_declared("platform"));
    }

    #[test]
    fn test_base_failure_propagates_unchanged() {
        let options = Options::from_pairs(["cluster/nb_pe=0"]).unwrap();

        let expected = ExtendedPulpBoard::new(&mut ArgParser::new(), &options).err();
        let actual = Target::new(&mut ArgParser::new(), &options).err();

        assert!(expected.is_some());
        assert_eq!(actual, expected);
    }
}
