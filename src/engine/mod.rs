mod budget;
mod config;
mod info;
mod line;
mod score;
mod uci;

use std::time::Duration;

pub use budget::{format_nodes, format_nodes_with, Limit, SearchBudget};
pub use config::{is_multipv, EngineConfig, EngineOptions};
pub use info::{InfoLine, InfoSnapshot};
pub use line::ResultLine;
pub use score::Score;
pub use uci::UciEngine;

use crate::prelude::*;

/// A position searcher that runs one search at a time in the background.
pub trait Engine
{
    /// The engine's self-reported identity.
    fn name(&self) -> &str;

    /// Starts searching `position` for `budget.lines` ranked lines under `budget.limit`.
    fn start(&mut self, position: &Position, budget: &SearchBudget) -> Result<()>;

    /// Waits at most `wait` for the current search to progress and reports where it stands.
    fn poll(&mut self, wait: Duration) -> Result<SearchStatus>;

    /// Asks the current search to finish early; it still has to be polled to completion.
    fn stop(&mut self) -> Result<()>;
}

#[derive(Clone, Debug, PartialEq)]
pub enum SearchStatus
{
    Running(SearchReport),
    Finished(SearchReport),
}

impl SearchStatus
{
    pub fn report(&self) -> &SearchReport
    {
        match self
        {
            | Self::Running(report) | Self::Finished(report) => report,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
/// What a search has produced so far. Line scores are relative to the side to move.
pub struct SearchReport
{
    pub lines:   Vec<ResultLine>,
    pub nodes:   u64,
    pub nps:     u64,
    pub elapsed: Duration,
    pub depth:   u32,
}

impl SearchReport
{
    /// The reported lines with white-perspective scores, leaving out any line without moves.
    pub fn normalized(&self, side: Side) -> Vec<ResultLine>
    {
        self.lines
            .iter()
            .filter(|line| !line.moves.is_empty())
            .map(|line| line.from_side(side))
            .collect()
    }
}

impl From<&InfoSnapshot> for SearchReport
{
    fn from(snapshot: &InfoSnapshot) -> Self
    {
        SearchReport {
            lines:   snapshot.lines(),
            nodes:   snapshot.nodes,
            nps:     snapshot.nps,
            elapsed: Duration::from_millis(snapshot.time),
            depth:   snapshot.depth,
        }
    }
}
