mod common;
use common::*;

#[cfg(test)]
mod cutoff
{
    use super::*;
    use stubs::{line, mate_line};
    use treepos::prelude::*;

    fn lines() -> Vec<ResultLine>
    {
        vec![line("e2e4", 40), line("d2d4", 30), line("c2c4", -5), line("g1f3", 10)]
    }

    fn firsts(lines: &[ResultLine]) -> Vec<&str>
    {
        lines.iter().filter_map(ResultLine::first).collect()
    }

    #[test]
    fn basic()
    {
        let _setup = setup::setup();
        let cutoff = "30".parse::<Cutoff>().unwrap();

        for side in [Side::White, Side::Black]
        {
            let kept = cutoff.retain_lines(lines(), side, 1);
            assert_eq!(firsts(&kept), vec!["e2e4", "d2d4", "g1f3"]);
        }
    }

    #[test]
    fn best_line_always_kept()
    {
        let _setup = setup::setup();
        let cutoff = "0".parse::<Cutoff>().unwrap();

        let kept = cutoff.retain_lines(lines(), Side::White, 1);
        assert_eq!(firsts(&kept), vec!["e2e4"]);
        assert!(cutoff.retain_lines(Vec::new(), Side::White, 1).is_empty());
    }

    #[test]
    fn mates()
    {
        let _setup = setup::setup();
        let cutoff = "1000".parse::<Cutoff>().unwrap();

        let mating = vec![mate_line("d1h5", 2), mate_line("d1f3", 2), mate_line("d1g4", 3), line("e2e4", 900)];
        assert_eq!(firsts(&cutoff.retain_lines(mating, Side::White, 10)), vec!["d1h5", "d1f3"]);

        let mixed = vec![line("e2e4", 900), mate_line("d1h5", 2), line("d2d4", 850)];
        assert_eq!(firsts(&cutoff.retain_lines(mixed, Side::White, 10)), vec!["e2e4", "d2d4"]);
    }

    #[test]
    fn one_side()
    {
        let _setup = setup::setup();
        let cutoff = "30W".parse::<Cutoff>().unwrap();

        assert_eq!(cutoff.retain_lines(lines(), Side::White, 1).len(), 3);
        assert_eq!(cutoff.retain_lines(lines(), Side::Black, 1).len(), 4);
        assert_eq!(cutoff.rule_for(Side::Black), None);
    }

    #[test]
    fn move_range()
    {
        let _setup = setup::setup();
        let until = "30u5".parse::<Cutoff>().unwrap();
        let after = "30a10".parse::<Cutoff>().unwrap();
        let between = "30u12a10".parse::<Cutoff>().unwrap();

        assert_eq!(until.retain_lines(lines(), Side::White, 5).len(), 3);
        assert_eq!(until.retain_lines(lines(), Side::White, 6).len(), 4);

        assert_eq!(after.retain_lines(lines(), Side::White, 9).len(), 4);
        assert_eq!(after.retain_lines(lines(), Side::White, 10).len(), 3);

        assert_eq!(between.retain_lines(lines(), Side::Black, 9).len(), 4);
        assert_eq!(between.retain_lines(lines(), Side::Black, 11).len(), 3);
        assert_eq!(between.retain_lines(lines(), Side::Black, 13).len(), 4);
    }

    #[test]
    fn paired()
    {
        let _setup = setup::setup();
        let cutoff = "5W50u3b".parse::<Cutoff>().unwrap();

        assert_eq!(cutoff.rule_for(Side::White), Some((5, None, None)));
        assert_eq!(cutoff.rule_for(Side::Black), Some((50, Some(3), None)));
        assert_eq!(firsts(&cutoff.retain_lines(lines(), Side::White, 1)), vec!["e2e4"]);
        assert_eq!(cutoff.retain_lines(lines(), Side::Black, 1).len(), 4);
    }

    #[test]
    fn composes_with_threshold()
    {
        let _setup = setup::setup();
        let pruning = Pruning::new()
            .with("30".parse::<Cutoff>().unwrap())
            .with("1".parse::<Threshold>().unwrap());

        assert_eq!(pruning.len(), 2);
        assert_eq!(pruning.retain_lines(lines(), Side::White, 1).len(), 3);
        assert!(pruning.stop_recursion(Score::Cp(150)));
        assert!(!pruning.stop_recursion(Score::Cp(50)));
    }

    #[test]
    fn malformed()
    {
        let _setup = setup::setup();
        for expr in ["", "W", "30x", "30W40W", "30Bu5", "a10", "-30"]
        {
            let err = expr.parse::<Cutoff>().unwrap_err();
            assert_eq!(err.kind, Kind::ParseError, "{expr} should not parse");
        }
    }
}
