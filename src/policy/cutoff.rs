use lazy_static::lazy_static;
use regex::Regex;

use crate::prelude::*;

const PART: &str = r"(\d+)(?:u(\d+))?(?:a(\d+))?";

lazy_static! {
    static ref UNTAGGED: Regex = Regex::new(&format!("^{PART}$")).unwrap();
    static ref TAGGED: Regex = Regex::new(&format!("^{PART}([WwBb])$")).unwrap();
    static ref PAIRED: Regex = Regex::new(&format!("^{PART}([WwBb]){PART}([WwBb])$")).unwrap();
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// A tolerance in centipawns, active between two optional move numbers.
struct Rule
{
    tolerance: i32,
    until:     Option<u32>,
    after:     Option<u32>,
}

impl Rule
{
    fn from_captures(caps: &regex::Captures, first: usize, expr: &str) -> Result<Rule>
    {
        let number = |i: usize| -> Result<Option<u32>> {
            caps.get(i)
                .map(|m| m.as_str().parse::<u32>().map_err(|_| Error::for_parse::<Cutoff>(expr.into())))
                .transpose()
        };

        let tolerance = number(first)?.ok_or_else(|| Error::for_parse::<Cutoff>(expr.into()))?;
        Ok(Rule {
            tolerance: tolerance as i32,
            until:     number(first + 1)?,
            after:     number(first + 2)?,
        })
    }

    fn active(&self, move_number: u32) -> bool
    {
        self.until.map_or(true, |until| move_number <= until) && self.after.map_or(true, |after| move_number >= after)
    }

    fn keeps(&self, best: Score, score: Score) -> bool
    {
        match (best, score)
        {
            | (Score::Mate(_), _) => best == score,
            | (Score::Cp(best), Score::Cp(cp)) => (best - cp).abs() <= self.tolerance,
            | (Score::Cp(_), Score::Mate(_)) => false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Drops lines whose score is too far from the best line's, per side and move range.
///
/// Expressions look like `INT[uINT][aINT]`, where the integer is a tolerance in centipawns, `uN` limits the cutoff to
/// moves up to N and `aN` to moves from N on. A trailing `W` or `B` restricts it to one side; two parts tagged with
/// opposite sides set both independently.
pub struct Cutoff
{
    rules: [Option<Rule>; 2],
}

impl Cutoff
{
    pub fn rule_for(&self, side: Side) -> Option<(i32, Option<u32>, Option<u32>)>
    {
        self.rules[side.index()].map(|rule| (rule.tolerance, rule.until, rule.after))
    }
}

impl PruningPolicy for Cutoff
{
    fn retain_lines(&self, lines: Vec<ResultLine>, side: Side, move_number: u32) -> Vec<ResultLine>
    {
        let Some(rule) = self.rules[side.index()].filter(|rule| rule.active(move_number))
        else
        {
            return lines;
        };

        let Some(best) = lines.first().map(|line| line.score)
        else
        {
            return lines;
        };

        lines.into_iter().filter(|line| rule.keeps(best, line.score)).collect()
    }
}

impl FromStr for Cutoff
{
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err>
    {
        let s = s.trim();

        if let Some(caps) = UNTAGGED.captures(s)
        {
            let rule = Rule::from_captures(&caps, 1, s)?;
            return Ok(Cutoff {
                rules: [Some(rule), Some(rule)],
            });
        }

        if let Some(caps) = TAGGED.captures(s)
        {
            let rule = Rule::from_captures(&caps, 1, s)?;
            let mut rules = [None, None];
            rules[caps[4].parse::<Side>()?.index()] = Some(rule);
            return Ok(Cutoff { rules });
        }

        if let Some(caps) = PAIRED.captures(s)
        {
            let (first, second) = (caps[4].parse::<Side>()?, caps[8].parse::<Side>()?);
            if first == second
            {
                return Err(Error::for_parse::<Self>(s.into()));
            }

            let mut rules = [None, None];
            rules[first.index()] = Some(Rule::from_captures(&caps, 1, s)?);
            rules[second.index()] = Some(Rule::from_captures(&caps, 5, s)?);
            return Ok(Cutoff { rules });
        }

        Err(Error::for_parse::<Self>(s.into()))
    }
}
