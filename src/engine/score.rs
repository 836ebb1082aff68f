use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::prelude::*;

lazy_static! {
    static ref MATE: Regex = Regex::new(r"^(?<sign>[+-]?)[mM]#?(?<plies>\d+)$").unwrap();
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// An evaluation, either in centipawns or as a signed mate-in-N.
///
/// Engines report scores from the side to move's perspective; everything past the engine boundary holds white's.
pub enum Score
{
    Cp(i32),
    Mate(i32),
}

impl Score
{
    /// The pawn value a mate is compared as.
    pub const MATE_PAWNS: f64 = 128.0;

    /// Turns a score relative to `side` into a score from white's perspective.
    pub fn from_side(self, side: Side) -> Score
    {
        match self
        {
            | Self::Cp(cp) => Self::Cp(cp * side.sign()),
            | Self::Mate(n) => Self::Mate(n * side.sign()),
        }
    }

    /// The score in pawns, where a mate counts as a fixed magnitude signed by the mating side.
    pub fn pawns(&self) -> f64
    {
        match self
        {
            | Self::Cp(cp) => *cp as f64 / 100.0,
            | Self::Mate(n) if *n < 0 => -Self::MATE_PAWNS,
            | Self::Mate(_) => Self::MATE_PAWNS,
        }
    }
}

impl std::fmt::Display for Score
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        match self
        {
            | Self::Cp(cp) => write!(f, "{:+.2}", *cp as f64 / 100.0),
            | Self::Mate(n) if *n < 0 => write!(f, "-M{}", n.unsigned_abs()),
            | Self::Mate(n) => write!(f, "+M{}", n),
        }
    }
}

impl FromStr for Score
{
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err>
    {
        let s = s.trim();

        if let Some(caps) = MATE.captures(s)
        {
            let Ok(plies) = caps["plies"].parse::<i32>()
            else
            {
                return Err(Error::for_parse::<Self>(s.into()));
            };

            let sign = if &caps["sign"] == "-" { -1 } else { 1 };
            return Ok(Self::Mate(sign * plies));
        }

        let Ok(pawns) = s.parse::<f64>()
        else
        {
            return Err(Error::for_parse::<Self>(s.into()));
        };

        if !pawns.is_finite()
        {
            return Err(Error::for_parse::<Self>(s.into()));
        }

        Ok(Self::Cp((pawns * 100.0).round() as i32))
    }
}
