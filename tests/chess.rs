mod common;
use common::*;

#[cfg(test)]
mod chess
{
    use super::*;
    use treepos::prelude::*;

    const START: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    #[test]
    fn plays_moves()
    {
        let _setup = setup::setup();
        let rules = ChessRules;
        let start = rules.normalize(START).unwrap();

        assert_eq!(rules.side_to_move(&start).unwrap(), Side::White);
        assert_eq!(rules.move_number(&start).unwrap(), 1);

        let e4 = rules.play(&start, "e2e4").unwrap();
        assert_eq!(e4.text(), "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1");
        assert_eq!(rules.side_to_move(&e4).unwrap(), Side::Black);

        let e5 = rules.play(&e4, "e7e5").unwrap();
        assert_eq!(rules.move_number(&e5).unwrap(), 2);
        assert!(!rules.is_terminal(&e5).unwrap());
    }

    #[test]
    fn transpositions_share_a_digest()
    {
        let _setup = setup::setup();
        let rules = ChessRules;
        let start = rules.normalize(START).unwrap();

        let play = |moves: &[&str]| moves.iter().try_fold(start.clone(), |p, mv| rules.play(&p, mv)).unwrap();
        let a = play(&["g1f3", "g8f6", "b1c3"]);
        let b = play(&["b1c3", "g8f6", "g1f3"]);
        assert_eq!(a.digest(), b.digest());
    }

    #[test]
    fn rejects_illegal_moves()
    {
        let _setup = setup::setup();
        let rules = ChessRules;
        let start = rules.normalize(START).unwrap();

        for mv in ["e2e5", "e7e5", "zz", ""]
        {
            assert_eq!(rules.play(&start, mv).unwrap_err().kind, Kind::IllegalMove, "{mv}");
        }
        assert_eq!(rules.normalize("not a position").unwrap_err().kind, Kind::ParseError);
    }

    #[test]
    fn game_over()
    {
        let _setup = setup::setup();
        let rules = ChessRules;

        let mated = rules.normalize("rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
        assert!(rules.is_terminal(&mated).unwrap());

        let stalemate = rules.normalize("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(rules.is_terminal(&stalemate).unwrap());

        let fifty = rules.normalize("4k3/8/8/8/8/8/4P3/4K3 w - - 100 80").unwrap();
        assert!(rules.is_terminal(&fifty).unwrap());
    }

    #[test]
    fn repetitions_ignore_move_counters()
    {
        let _setup = setup::setup();
        let rules = ChessRules;
        let start = rules.normalize(START).unwrap();

        let back = ["g1f3", "g8f6", "f3g1", "f6g8"]
            .iter()
            .try_fold(start.clone(), |p, mv| rules.play(&p, mv))
            .unwrap();

        assert_ne!(back.digest(), start.digest());
        assert_eq!(rules.repetition_key(&back), rules.repetition_key(&start));

        let moved = rules.play(&start, "g1f3").unwrap();
        assert_ne!(rules.repetition_key(&moved), rules.repetition_key(&start));
    }

    #[test]
    fn position_files()
    {
        let _setup = setup::setup();

        assert_eq!(extract_fen(&format!("{START} ; opening")), Some(START));
        assert_eq!(extract_fen("# just a comment"), None);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("positions.epd");
        std::fs::write(&path, format!("# test set\n{START}\n\nid \"kiwi\" 8/8/8/8/8/8/4P3/4K2k w - - 0 1 c0 \"x\"\n")).unwrap();

        let positions = read_positions(&path).unwrap();
        assert_eq!(positions, vec![START.to_string(), "8/8/8/8/8/8/4P3/4K2k w - - 0 1".to_string()]);

        assert_eq!(read_positions(&dir.path().join("missing.epd")).unwrap_err().kind, Kind::IoError);
    }
}
