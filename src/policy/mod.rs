mod cutoff;
mod schedule;
mod threshold;

pub use cutoff::Cutoff;
pub use schedule::Schedule;
pub use threshold::Threshold;

use crate::prelude::*;

/// A rule that decides which lines the explorer keeps and where it stops descending.
///
/// Both hooks default to keeping everything, so a policy only overrides the one it cares about.
pub trait PruningPolicy: Send + Sync
{
    /// Whether a line with this white-perspective score should not be explored any further.
    fn stop_recursion(&self, _score: Score) -> bool
    {
        false
    }

    /// Filters the resolved lines of a position, best first, before they are stored and explored.
    fn retain_lines(&self, lines: Vec<ResultLine>, _side: Side, _move_number: u32) -> Vec<ResultLine>
    {
        lines
    }
}

#[derive(Default)]
/// Several policies applied together: recursion stops if any of them says so, and filters run in order.
pub struct Pruning
{
    policies: Vec<Box<dyn PruningPolicy>>,
}

impl Pruning
{
    pub fn new() -> Pruning
    {
        Pruning::default()
    }

    pub fn with(mut self, policy: impl PruningPolicy + 'static) -> Pruning
    {
        self.policies.push(Box::new(policy));
        self
    }

    pub fn len(&self) -> usize
    {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.policies.is_empty()
    }
}

impl std::fmt::Debug for Pruning
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("Pruning").field("policies", &self.policies.len()).finish()
    }
}

impl PruningPolicy for Pruning
{
    fn stop_recursion(&self, score: Score) -> bool
    {
        self.policies.iter().any(|policy| policy.stop_recursion(score))
    }

    fn retain_lines(&self, lines: Vec<ResultLine>, side: Side, move_number: u32) -> Vec<ResultLine>
    {
        self.policies
            .iter()
            .fold(lines, |lines, policy| policy.retain_lines(lines, side, move_number))
    }
}
