use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
/// A ranked line reported for a position: its moves in engine notation and their evaluation.
pub struct ResultLine
{
    pub moves: Vec<String>,
    pub score: Score,
}

impl ResultLine
{
    pub fn new<S: Into<String>>(moves: impl IntoIterator<Item = S>, score: Score) -> ResultLine
    {
        ResultLine {
            moves: moves.into_iter().map(Into::into).collect(),
            score,
        }
    }

    /// The move leading out of the position, if the line has one.
    pub fn first(&self) -> Option<&str>
    {
        self.moves.first().map(String::as_str)
    }

    /// The same line with its score seen from white, given the side that was to move.
    pub fn from_side(&self, side: Side) -> ResultLine
    {
        ResultLine {
            moves: self.moves.clone(),
            score: self.score.from_side(side),
        }
    }
}

impl std::fmt::Display for ResultLine
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        write!(f, "({}) {}", self.score, self.moves.iter().join(" "))
    }
}
