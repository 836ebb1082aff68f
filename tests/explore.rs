mod common;
use common::*;

#[cfg(test)]
mod explore
{
    use super::*;
    use stubs::{line, StubEngine, StubRules};
    use treepos::prelude::*;

    const LIMIT: Limit = Limit::Nodes(1000);

    fn run(engine: &mut StubEngine, schedule: &Schedule, policy: &dyn PruningPolicy, cache: Option<&Cache>) -> Result<(SessionTree, Session)>
    {
        let mut explorator = Explorator::new(engine, &StubRules, schedule, policy, LIMIT);
        if let Some(cache) = cache
        {
            explorator = explorator.with_cache(cache);
        }

        let tree = explorator.explore(&Position::new(""), schedule.max_depth());
        let session = explorator.session().cloned().unwrap();
        tree.map(|tree| (tree, session))
    }

    #[test]
    fn end_to_end()
    {
        let _setup = setup::setup();
        let mut engine = StubEngine::constant(vec![line("a", 100), line("b", 50)]);
        let schedule = Schedule::new("2", 2).unwrap();

        let (tree, session) = run(&mut engine, &schedule, &Pruning::new(), None).unwrap();

        assert_eq!(tree.len(), 3);
        assert!(tree.iter().all(|(_, lines)| lines.len() == 2));
        assert_eq!(tree.root(), Position::new("").digest());
        assert_eq!(session.visited, 3);
        assert_eq!(session.visited, session.total);
        assert_eq!(session.searches, 3);
        assert_eq!(engine.searched.len(), 3);
        assert!(engine.budgets.iter().all(|b| *b == SearchBudget::new(LIMIT, 2)));
    }

    #[test]
    fn scores_are_stored_from_white()
    {
        let _setup = setup::setup();
        let mut engine = StubEngine::constant(vec![line("a", 100), line("b", 50)]);
        let schedule = Schedule::new("2", 2).unwrap();

        let (tree, _) = run(&mut engine, &schedule, &Pruning::new(), None).unwrap();

        let root = tree.get(&Position::new("").digest()).unwrap();
        assert_eq!(root[0].score, Score::Cp(100));
        let reply = tree.get(&Position::new("a").digest()).unwrap();
        assert_eq!(reply[0].score, Score::Cp(-100));
    }

    #[test]
    fn transpositions_are_searched_once()
    {
        let _setup = setup::setup();
        let mut engine = StubEngine::constant(vec![line("x", 10), line("y", 0)]);
        let schedule = Schedule::new("2", 3).unwrap();

        let (tree, session) = run(&mut engine, &schedule, &Pruning::new(), None).unwrap();

        assert_eq!(engine.searched.len(), 6);
        assert_eq!(tree.len(), 6);
        assert_eq!(session.transpositions, 1);
        assert_eq!(session.visited, 7);
        assert_eq!(session.visited, session.total);
        assert_eq!(engine.searched.iter().filter(|p| p.text() == "x,y").count(), 1);
    }

    #[test]
    fn threshold_stops_descent()
    {
        let _setup = setup::setup();
        let mut engine = StubEngine::constant(vec![line("a", 500), line("b", 10)]);
        let schedule = Schedule::new("2", 2).unwrap();
        let pruning = Pruning::new().with("1".parse::<Threshold>().unwrap());

        let (tree, session) = run(&mut engine, &schedule, &pruning, None).unwrap();

        assert_eq!(engine.searched.len(), 2);
        assert!(tree.contains(&Position::new("b").digest()));
        assert!(!tree.contains(&Position::new("a").digest()));
        assert_eq!(session.visited, session.total);
    }

    #[test]
    fn terminal_positions_are_not_searched()
    {
        let _setup = setup::setup();
        let mut engine = StubEngine::constant(vec![line("mate", 900), line("b", 10)]);
        let schedule = Schedule::new("2", 3).unwrap();

        let (_, session) = run(&mut engine, &schedule, &Pruning::new(), None).unwrap();

        assert!(engine.searched.iter().all(|p| !p.text().contains("mate")));
        assert_eq!(engine.searched.len(), 3);
        assert_eq!(session.visited, session.total);
    }

    #[test]
    fn cutoff_drops_lines()
    {
        let _setup = setup::setup();
        let mut engine = StubEngine::constant(vec![line("a", 100), line("b", 50)]);
        let schedule = Schedule::new("2", 2).unwrap();
        let pruning = Pruning::new().with("30".parse::<Cutoff>().unwrap());

        let (tree, session) = run(&mut engine, &schedule, &pruning, None).unwrap();

        assert_eq!(tree.get(&Position::new("").digest()).unwrap().len(), 1);
        assert_eq!(engine.searched.len(), 2);
        assert_eq!(session.visited, session.total);
    }

    #[test]
    fn fewer_lines_than_requested()
    {
        let _setup = setup::setup();
        let mut engine = StubEngine::constant(vec![line("a", 100), line("b", 50)]);
        let schedule = Schedule::new("3", 2).unwrap();

        let (tree, session) = run(&mut engine, &schedule, &Pruning::new(), None).unwrap();

        assert_eq!(tree.len(), 3);
        assert_eq!(session.visited, 3);
        assert_eq!(session.total, 3);
    }

    #[test]
    fn schedule_bounds_lines_per_side()
    {
        let _setup = setup::setup();
        let mut engine = StubEngine::constant(vec![line("a", 30), line("b", 20), line("c", 10)]);
        let schedule = Schedule::new("3W1b", 3).unwrap();

        let (tree, session) = run(&mut engine, &schedule, &Pruning::new(), None).unwrap();

        assert_eq!(tree.get(&Position::new("").digest()).unwrap().len(), 3);
        assert_eq!(tree.get(&Position::new("a").digest()).unwrap().len(), 1);
        assert!(engine.budgets.iter().all(|b| b.lines == 3));
        assert_eq!(session.visited, session.total);
    }

    #[test]
    fn illegal_moves_are_fatal()
    {
        let _setup = setup::setup();
        let mut engine = StubEngine::new(|position| match position.text()
        {
            | "" => vec![line("a", 10)],
            | _ => vec![line("illegal", 10)],
        });
        let schedule = Schedule::new("1", 3).unwrap();

        let err = run(&mut engine, &schedule, &Pruning::new(), None).unwrap_err();
        assert_eq!(err.kind, Kind::IllegalMove);
        assert!(err.fatal());
    }

    #[test]
    fn repetition_draws_end_the_line()
    {
        let _setup = setup::setup();
        let rules = ChessRules;
        let root = rules
            .normalize("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
            .unwrap();

        // Both knights hop out and back forever.
        let mut engine = StubEngine::new(|position| {
            let fields: Vec<&str> = position.text().split(' ').collect();
            let mv = match (fields[1], fields[0].contains("5N2"), fields[0].contains("5n2"))
            {
                | ("w", true, _) => "f3g1",
                | ("w", false, _) => "g1f3",
                | (_, _, true) => "f6g8",
                | _ => "g8f6",
            };
            vec![line(mv, 0)]
        });
        let schedule = Schedule::new("1", 10).unwrap();

        let pruning = Pruning::new();
        let mut explorator = Explorator::new(&mut engine, &rules, &schedule, &pruning, LIMIT);
        let tree = explorator.explore(&root, 10).unwrap();
        let session = explorator.session().cloned().unwrap();

        // The start position comes back after four and eight plies; the second return is the third occurrence.
        assert_eq!(tree.len(), 8);
        assert_eq!(session.searches, 8);
        assert_eq!(session.visited, session.total);
        assert_eq!(engine.searched.len(), 8);
    }

    #[test]
    fn cache_answers_second_run()
    {
        let _setup = setup::setup();
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::new("Stub 1.0", EngineOptions::new());
        let cache = Cache::open(&dir.path().join("cache.db"), &config, 1).unwrap();
        let schedule = Schedule::new("2", 2).unwrap();
        let lines = vec![line("a", 100), line("b", 50)];

        let mut engine = StubEngine::constant(lines.clone());
        let (first, _) = run(&mut engine, &schedule, &Pruning::new(), Some(&cache)).unwrap();

        // This engine never finishes on its own, so every position must come from the cache.
        let mut engine = StubEngine::constant(lines).holding();
        let (second, session) = run(&mut engine, &schedule, &Pruning::new(), Some(&cache)).unwrap();

        assert_eq!(first, second);
        assert_eq!(session.cache_hits, 3);
        assert_eq!(session.searches, 0);
        assert_eq!(engine.stops, 3);
        assert_eq!(session.visited, session.total);

        cache.close().unwrap();
    }

    #[test]
    fn export_writes_every_line()
    {
        let _setup = setup::setup();
        let mut engine = StubEngine::constant(vec![line("a c", 100), line("b", 50)]);
        let schedule = Schedule::new("2", 2).unwrap();
        let (tree, _) = run(&mut engine, &schedule, &Pruning::new(), None).unwrap();

        let mut out = Vec::new();
        write_tree(&tree, &Position::new(""), &StubRules, 2, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let rows: Vec<&str> = text.lines().collect();

        assert_eq!(rows.len(), 7);
        assert_eq!(rows[1], "  a (+1.00) c");
        assert_eq!(rows[2], "    a (-1.00) c");
        assert_eq!(rows[4], "  b (+0.50)");
    }
}
