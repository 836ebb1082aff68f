use crate::prelude::*;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// The sides in a game of chess.
pub enum Side
{
    White = 0,
    Black = 1,
}

impl Side
{
    /// Gets the other side.
    pub fn flip(&self) -> Self
    {
        match self
        {
            | Self::White => Self::Black,
            | Self::Black => Self::White,
        }
    }

    /// The index of this side into per-side tables.
    pub fn index(&self) -> usize
    {
        *self as usize
    }

    /// The sign that turns a score from this side's perspective into white's.
    pub fn sign(&self) -> i32
    {
        match self
        {
            | Self::White => 1,
            | Self::Black => -1,
        }
    }
}

impl std::fmt::Display for Side
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        let name = match self
        {
            | Self::White => "White",
            | Self::Black => "Black",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Side
{
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err>
    {
        match s
        {
            | "White" | "W" | "w" => Ok(Self::White),
            | "Black" | "B" | "b" => Ok(Self::Black),
            | _ => Err(Error::for_parse::<Self>(s.into())),
        }
    }
}
