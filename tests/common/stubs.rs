use std::time::Duration;

use itertools::Itertools;
use treepos::prelude::*;

/// Rules over made-up positions: a position is the sorted list of moves played to reach it.
///
/// Move order does not matter, so different move orders transpose. A move named `illegal` cannot be played, and any
/// position containing a move with `mate` in its name is over.
pub struct StubRules;

impl StubRules
{
    fn moves(position: &Position) -> Vec<&str>
    {
        position.text().split(',').filter(|m| !m.is_empty()).collect()
    }
}

impl Rules for StubRules
{
    fn side_to_move(&self, position: &Position) -> Result<Side>
    {
        Ok(match StubRules::moves(position).len() % 2
        {
            | 0 => Side::White,
            | _ => Side::Black,
        })
    }

    fn move_number(&self, position: &Position) -> Result<u32>
    {
        Ok(StubRules::moves(position).len() as u32 / 2 + 1)
    }

    fn play(&self, position: &Position, mv: &str) -> Result<Position>
    {
        if mv == "illegal"
        {
            return Err(Error::new(Kind::IllegalMove, format!("{mv} in {position}")));
        }

        let mut moves = StubRules::moves(position);
        moves.push(mv);
        Ok(Position::new(moves.into_iter().sorted().join(",")))
    }

    fn is_terminal(&self, position: &Position) -> Result<bool>
    {
        Ok(position.text().contains("mate"))
    }
}

type Script = Box<dyn FnMut(&Position) -> Vec<ResultLine> + Send>;

/// An engine whose answers come from a closure, recording how it was driven.
pub struct StubEngine
{
    script:       Script,
    hold:         bool,
    current:      Option<Vec<ResultLine>>,
    stopping:     bool,
    pub nodes:    u64,
    pub searched: Vec<Position>,
    pub budgets:  Vec<SearchBudget>,
    pub stops:    usize,
}

impl StubEngine
{
    /// An engine that finishes every search at the first poll.
    pub fn new(script: impl FnMut(&Position) -> Vec<ResultLine> + Send + 'static) -> StubEngine
    {
        StubEngine {
            script:   Box::new(script),
            hold:     false,
            current:  None,
            stopping: false,
            nodes:    1000,
            searched: Vec::new(),
            budgets:  Vec::new(),
            stops:    0,
        }
    }

    /// An engine that answers the same lines everywhere.
    pub fn constant(lines: Vec<ResultLine>) -> StubEngine
    {
        StubEngine::new(move |_| lines.clone())
    }

    /// Keeps every search running until it is stopped.
    pub fn holding(mut self) -> StubEngine
    {
        self.hold = true;
        self
    }

    fn report(&self) -> SearchReport
    {
        SearchReport {
            lines:   self.current.clone().unwrap_or_default(),
            nodes:   self.nodes,
            nps:     self.nodes * 10,
            elapsed: Duration::from_millis(100),
            depth:   10,
        }
    }
}

impl Engine for StubEngine
{
    fn name(&self) -> &str
    {
        "Stub 1.0"
    }

    fn start(&mut self, position: &Position, budget: &SearchBudget) -> Result<()>
    {
        let lines = (self.script)(position).into_iter().take(budget.lines).collect();
        self.current = Some(lines);
        self.stopping = false;
        self.searched.push(position.clone());
        self.budgets.push(*budget);
        Ok(())
    }

    fn poll(&mut self, wait: Duration) -> Result<SearchStatus>
    {
        if self.current.is_none()
        {
            return Err(Error::new(Kind::InternalError, "polled an idle stub engine".into()));
        }

        if self.hold && !self.stopping
        {
            std::thread::sleep(wait.min(Duration::from_millis(1)));
            return Ok(SearchStatus::Running(self.report()));
        }

        let report = self.report();
        self.current = None;
        Ok(SearchStatus::Finished(report))
    }

    fn stop(&mut self) -> Result<()>
    {
        self.stops += 1;
        self.stopping = true;
        Ok(())
    }
}

/// A line of the given moves, scored in centipawns.
pub fn line(moves: &str, cp: i32) -> ResultLine
{
    ResultLine::new(moves.split_whitespace(), Score::Cp(cp))
}

/// A line of the given moves, scored as a mate.
pub fn mate_line(moves: &str, n: i32) -> ResultLine
{
    ResultLine::new(moves.split_whitespace(), Score::Mate(n))
}
