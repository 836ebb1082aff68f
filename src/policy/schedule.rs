use lazy_static::lazy_static;
use regex::Regex;

use crate::prelude::*;

lazy_static! {
    static ref CONSTANT: Regex = Regex::new(r"^(?<base>\d+)$").unwrap();
    static ref STEPPED: Regex = Regex::new(r"^(?<base>\d+)(?<inc>[+-]\d+)[/e]?(?<every>\d*)[mM]?$").unwrap();
    static ref COMPOSED: Regex = Regex::new(
        r"^(?<lhs>\d+(?:[+-]\d+[/e]?\d*[mM]?)?)(?<lside>[WwBb])(?<rhs>\d+(?:[+-]\d+[/e]?\d*[mM]?)?)(?<rside>[WwBb])$"
    )
    .unwrap();
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// How one side's line count evolves: start at `base`, then add `inc` every `every` moves.
struct Progression
{
    base:  i64,
    inc:   i64,
    every: i64,
}

impl Progression
{
    /// The line count `plies` plies below the root, or nothing if it does not fit.
    fn lines_after(&self, plies: i64) -> Option<usize>
    {
        let steps = plies / self.every.saturating_mul(2);
        let lines = steps.checked_mul(self.inc)?.checked_add(self.base)?;
        usize::try_from(lines.max(1)).ok()
    }
}

impl FromStr for Progression
{
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err>
    {
        let bad = || Error::for_parse::<Schedule>(s.into());

        if let Some(caps) = CONSTANT.captures(s)
        {
            let base = caps["base"].parse::<i64>().map_err(|_| bad())?;
            return Ok(Progression { base, inc: 0, every: 1 });
        }

        let Some(caps) = STEPPED.captures(s)
        else
        {
            return Err(bad());
        };

        let base = caps["base"].parse::<i64>().map_err(|_| bad())?;
        let inc = caps["inc"].parse::<i64>().map_err(|_| bad())?;
        let every = match &caps["every"]
        {
            | "" => 1,
            | every => every.parse::<i64>().map_err(|_| bad())?,
        };

        if every < 1
        {
            return Err(bad());
        }

        Ok(Progression { base, inc, every })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// The number of lines explored per position, by side to move and plies remaining.
///
/// The table is computed once for a maximum depth. For every ply `d` in `1..=max_depth`, the branch factor is
/// `max(base + floor((max_depth - d) / (2 * every)) * inc, 1)`, and the worst-case number of searched positions is
/// `1 + branch(side, d) * worst(opponent, d - 1)` with `worst(side, 1) = 1`.
pub struct Schedule
{
    expr:      String,
    max_depth: usize,
    branch:    [Vec<usize>; 2],
    worst:     [Vec<u64>; 2],
}

impl Schedule
{
    pub fn new(expr: &str, max_depth: u32) -> Result<Schedule>
    {
        let expr = expr.trim();
        let [white, black] = Schedule::parse(expr)?;
        let max_depth = max_depth as usize;

        // Index 0 is the identity for depth 0.
        let mut branch = [vec![1usize; max_depth + 1], vec![1usize; max_depth + 1]];
        for (table, progression) in branch.iter_mut().zip([white, black])
        {
            for (d, slot) in table.iter_mut().enumerate().skip(1)
            {
                *slot = progression
                    .lines_after((max_depth - d) as i64)
                    .ok_or_else(|| Error::for_parse::<Schedule>(expr.into()))?;
            }
        }

        let mut worst = [vec![1u64; max_depth + 1], vec![1u64; max_depth + 1]];
        for d in 2 ..= max_depth
        {
            for side in [Side::White, Side::Black]
            {
                let child = worst[side.flip().index()][d - 1];
                worst[side.index()][d] = (branch[side.index()][d] as u64).saturating_mul(child).saturating_add(1);
            }
        }

        Ok(Schedule {
            expr: expr.to_string(),
            max_depth,
            branch,
            worst,
        })
    }

    fn parse(expr: &str) -> Result<[Progression; 2]>
    {
        if expr.is_empty()
        {
            return Err(Error::for_parse::<Schedule>(expr.into()));
        }

        if let Ok(single) = expr.parse::<Progression>()
        {
            return Ok([single, single]);
        }

        let Some(caps) = COMPOSED.captures(expr)
        else
        {
            return Err(Error::for_parse::<Schedule>(expr.into()));
        };

        let lhs = caps["lhs"].parse::<Progression>()?;
        let rhs = caps["rhs"].parse::<Progression>()?;
        match (caps["lside"].parse::<Side>()?, caps["rside"].parse::<Side>()?)
        {
            | (Side::White, Side::Black) => Ok([lhs, rhs]),
            | (Side::Black, Side::White) => Ok([rhs, lhs]),
            | _ => Err(Error::for_parse::<Schedule>(expr.into())),
        }
    }

    fn clamp(&self, depth: i32) -> usize
    {
        (depth.max(0) as usize).min(self.max_depth)
    }

    /// The number of lines to explore for `side` with `depth` plies remaining.
    pub fn branch_factor(&self, side: Side, depth: i32) -> usize
    {
        self.branch[side.index()][self.clamp(depth)]
    }

    /// The largest number of positions a search from here could visit, this one included.
    pub fn worst_case_nodes(&self, side: Side, depth: i32) -> u64
    {
        self.worst[side.index()][self.clamp(depth)]
    }

    /// The largest branch factor at any depth for either side.
    pub fn max_branch_factor(&self) -> usize
    {
        self.branch.iter().flatten().copied().max().unwrap_or(1)
    }

    pub fn max_depth(&self) -> u32
    {
        self.max_depth as u32
    }

    /// The expression in a form fit for file names.
    pub fn file_tag(&self) -> String
    {
        self.expr
            .replace('/', "e")
            .to_lowercase()
            .replace('w', "W")
            .replace('b', "B")
    }
}

impl std::fmt::Display for Schedule
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        write!(f, "{}", self.expr)
    }
}
