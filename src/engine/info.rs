use std::collections::BTreeMap;

use crate::prelude::*;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// The fields of one UCI `info` line that the explorer cares about.
pub struct InfoLine
{
    pub depth:   Option<u32>,
    pub multipv: Option<usize>,
    pub score:   Option<Score>,
    pub nodes:   Option<u64>,
    pub nps:     Option<u64>,
    pub time:    Option<u64>,
    pub pv:      Vec<String>,
}

impl FromStr for InfoLine
{
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err>
    {
        let mut tokens = s.split_whitespace();
        if tokens.next() != Some("info")
        {
            return Err(Error::for_parse::<Self>(s.into()));
        }

        let mut info = InfoLine::default();
        let bad = || Error::for_parse::<Self>(s.into());

        while let Some(token) = tokens.next()
        {
            match token
            {
                | "depth" => info.depth = Some(next_number(&mut tokens).ok_or_else(bad)?),
                | "multipv" => info.multipv = Some(next_number(&mut tokens).ok_or_else(bad)?),
                | "nodes" => info.nodes = Some(next_number(&mut tokens).ok_or_else(bad)?),
                | "nps" => info.nps = Some(next_number(&mut tokens).ok_or_else(bad)?),
                | "time" => info.time = Some(next_number(&mut tokens).ok_or_else(bad)?),
                | "score" =>
                {
                    let kind = tokens.next().ok_or_else(bad)?;
                    let value: i32 = next_number(&mut tokens).ok_or_else(bad)?;
                    info.score = match kind
                    {
                        | "cp" => Some(Score::Cp(value)),
                        | "mate" => Some(Score::Mate(value)),
                        | _ => return Err(bad()),
                    };
                }
                | "pv" =>
                {
                    info.pv = tokens.by_ref().map(String::from).collect();
                }
                // Everything after `string` is free text.
                | "string" => break,
                | _ => (),
            }
        }

        Ok(info)
    }
}

fn next_number<'a, T: FromStr>(tokens: &mut impl Iterator<Item = &'a str>) -> Option<T>
{
    tokens.next().and_then(|t| t.parse::<T>().ok())
}

#[derive(Clone, Debug, Default)]
/// The running state of one search, folded from its info lines.
///
/// Lines are kept per multipv index and stay relative to the side to move.
pub struct InfoSnapshot
{
    pub lines: BTreeMap<usize, ResultLine>,
    pub depth: u32,
    pub nodes: u64,
    pub nps:   u64,
    pub time:  u64,
}

impl InfoSnapshot
{
    /// Folds one engine output line into the snapshot, ignoring anything that is not a usable info line.
    pub fn update_from_line(&mut self, line: &str)
    {
        match line.parse::<InfoLine>()
        {
            | Ok(info) => self.update(info),
            | Err(err) => log::trace!("skipping engine output: {err}"),
        }
    }

    pub fn update(&mut self, info: InfoLine)
    {
        if let Some(depth) = info.depth
        {
            self.depth = self.depth.max(depth);
        }
        if let Some(nodes) = info.nodes
        {
            self.nodes = self.nodes.max(nodes);
        }
        if let Some(nps) = info.nps
        {
            self.nps = nps;
        }
        if let Some(time) = info.time
        {
            self.time = self.time.max(time);
        }

        let (Some(score), false) = (info.score, info.pv.is_empty())
        else
        {
            return;
        };

        let index = info.multipv.unwrap_or(1);
        self.lines.insert(index, ResultLine::new(info.pv, score));
    }

    /// The current lines, best first.
    pub fn lines(&self) -> Vec<ResultLine>
    {
        self.lines.values().cloned().collect()
    }
}
