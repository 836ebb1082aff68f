use lazy_static::lazy_static;
use regex::Regex;

use crate::prelude::*;

const NUMBER: &str = r"(\d+(?:\.\d*)?)";
const SIDE: &str = r"([WwBb])";

lazy_static! {
    static ref BARE: Regex = Regex::new(&format!("^{NUMBER}$")).unwrap();
    static ref HALF: Regex = Regex::new(&format!("^{NUMBER}{SIDE}$")).unwrap();
    static ref FULL: Regex = Regex::new(&format!("^{NUMBER}{SIDE}{NUMBER}{SIDE}$")).unwrap();
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// A window of white-perspective scores, in pawns, outside of which exploration stops.
pub struct Threshold
{
    pub min: f64,
    pub max: f64,
}

impl Threshold
{
    const EPSILON: f64 = 1e-5;

    /// A threshold that never stops anything.
    pub fn unbounded() -> Threshold
    {
        Threshold {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }

    /// Whether a score in pawns lies outside the window.
    pub fn above_threshold(&self, pawns: f64) -> bool
    {
        self.min - pawns > Self::EPSILON || pawns - self.max > Self::EPSILON
    }
}

impl Default for Threshold
{
    fn default() -> Self
    {
        Threshold::unbounded()
    }
}

impl PruningPolicy for Threshold
{
    fn stop_recursion(&self, score: Score) -> bool
    {
        self.above_threshold(score.pawns())
    }
}

impl FromStr for Threshold
{
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err>
    {
        let bad = || Error::for_parse::<Self>(s.into());
        let pawns = |text: &str| text.parse::<f64>().map_err(|_| bad());
        let side = |text: &str| text.parse::<Side>();

        let s = s.trim();
        if s.is_empty()
        {
            return Ok(Threshold::unbounded());
        }

        if let Some(caps) = BARE.captures(s)
        {
            let x = pawns(&caps[1])?;
            return Ok(Threshold { min: -x, max: x });
        }

        if let Some(caps) = HALF.captures(s)
        {
            let x = pawns(&caps[1])?;
            return Ok(match side(&caps[2])?
            {
                | Side::White => Threshold {
                    min: f64::NEG_INFINITY,
                    max: x,
                },
                | Side::Black => Threshold {
                    min: -x,
                    max: f64::INFINITY,
                },
            });
        }

        if let Some(caps) = FULL.captures(s)
        {
            let (x, y) = (pawns(&caps[1])?, pawns(&caps[3])?);
            return match (side(&caps[2])?, side(&caps[4])?)
            {
                | (Side::White, Side::Black) => Ok(Threshold { min: -y, max: x }),
                | (Side::Black, Side::White) => Ok(Threshold { min: -x, max: y }),
                | _ => Err(bad()),
            };
        }

        Err(bad())
    }
}
