use crate::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// The single stopping condition of one engine search.
pub enum Limit
{
    Nodes(u64),
    Time(u64),
    Depth(u64),
}

impl Limit
{
    /// Builds a limit from its stored kind and amount.
    pub fn from_parts(kind: &str, amount: u64) -> Result<Limit>
    {
        match kind
        {
            | "nodes" => Ok(Self::Nodes(amount)),
            | "msec" => Ok(Self::Time(amount)),
            | "plies" => Ok(Self::Depth(amount)),
            | _ => Err(Error::for_parse::<Self>(format!("{kind} {amount}"))),
        }
    }

    /// The value of the limit in its own unit.
    pub fn amount(&self) -> u64
    {
        match self
        {
            | Self::Nodes(n) | Self::Time(n) | Self::Depth(n) => *n,
        }
    }

    /// The UCI go command that searches under this limit.
    pub fn go_command(&self) -> String
    {
        match self
        {
            | Self::Nodes(n) => format!("go nodes {n}"),
            | Self::Time(ms) => format!("go movetime {ms}"),
            | Self::Depth(d) => format!("go depth {d}"),
        }
    }

    /// The stored name of this limit's kind.
    pub fn kind(&self) -> &'static str
    {
        match self
        {
            | Self::Nodes(_) => "nodes",
            | Self::Time(_) => "msec",
            | Self::Depth(_) => "plies",
        }
    }

    /// Whether a search run under this limit went at least as far as one under `requested`.
    ///
    /// Limits of different kinds never satisfy each other.
    pub fn satisfies(&self, requested: &Limit) -> bool
    {
        self.kind() == requested.kind() && self.amount() >= requested.amount()
    }

    /// A short form of the limit for file names (`10mn`, `5s`, `20d`).
    pub fn file_tag(&self) -> String
    {
        match self
        {
            | Self::Nodes(n) => format!("{}n", format_nodes_with(*n, 0)),
            | Self::Time(ms) if ms % 1000 == 0 => format!("{}s", ms / 1000),
            | Self::Time(ms) => format!("{ms}ms"),
            | Self::Depth(d) => format!("{d}d"),
        }
    }
}

impl std::fmt::Display for Limit
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        match self
        {
            | Self::Nodes(n) => write!(f, "{} nodes", format_nodes(*n)),
            | Self::Time(ms) if *ms < 1000 => write!(f, "{ms}ms"),
            | Self::Time(ms) => write!(f, "{}s", ms / 1000),
            | Self::Depth(d) => write!(f, "depth {d}"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// A limit together with the number of ranked lines asked of the engine.
pub struct SearchBudget
{
    pub limit: Limit,
    pub lines: usize,
}

impl SearchBudget
{
    pub fn new(limit: Limit, lines: usize) -> SearchBudget
    {
        SearchBudget { limit, lines }
    }

    /// Whether results produced under this budget can answer a request for `requested`.
    pub fn satisfies(&self, requested: &SearchBudget) -> bool
    {
        self.limit.satisfies(&requested.limit) && self.lines >= requested.lines
    }

    /// The same limit with a different line count.
    pub fn with_lines(&self, lines: usize) -> SearchBudget
    {
        SearchBudget { limit: self.limit, lines }
    }
}

impl std::fmt::Display for SearchBudget
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        write!(f, "{} x{}", self.limit, self.lines)
    }
}

/// Writes a node count compactly (`950`, `12.3k`, `4.0m`, `1.2g`, `3.1t`).
pub fn format_nodes(n: u64) -> String
{
    format_nodes_with(n, 1)
}

/// Writes a node count compactly with the given number of decimals.
pub fn format_nodes_with(n: u64, precision: usize) -> String
{
    const UNITS: [(f64, &str); 4] = [(1e12, "t"), (1e9, "g"), (1e6, "m"), (1e3, "k")];

    let value = n as f64;
    for (scale, suffix) in UNITS
    {
        if value >= scale
        {
            return format!("{:.*}{}", precision, value / scale, suffix);
        }
    }
    format!("{n}")
}
