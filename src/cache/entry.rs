use crate::prelude::*;

#[derive(Clone, Debug, PartialEq)]
/// One stored search result for a position, with the budget it was produced under.
pub struct StoredEntry
{
    pub budget: SearchBudget,
    pub nodes:  u64,
    pub lines:  Vec<ResultLine>,
}

#[derive(Clone, Debug, PartialEq)]
/// A stored result that answers a lookup, already cut down to the requested line count.
pub struct CacheHit
{
    pub budget: SearchBudget,
    pub nodes:  u64,
    pub lines:  Vec<ResultLine>,
}

/// Picks the entry that best answers `requested`: one whose budget satisfies it, preferring the most nodes searched.
pub fn select_best(entries: &[StoredEntry], requested: &SearchBudget) -> Option<CacheHit>
{
    let best = entries
        .iter()
        .filter(|entry| entry.budget.satisfies(requested))
        .max_by_key(|entry| entry.nodes)?;

    Some(CacheHit {
        budget: best.budget,
        nodes:  best.nodes,
        lines:  best.lines.iter().take(requested.lines).cloned().collect(),
    })
}
