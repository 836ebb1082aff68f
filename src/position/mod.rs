mod chess;
mod digest;
mod files;
mod rules;
mod side;

pub use chess::ChessRules;
pub use digest::Digest;
pub use files::{extract_fen, read_positions};
pub use rules::Rules;
pub use side::Side;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
/// A board state as its canonical string, alongside the digest that keys it in the cache and the session tree.
pub struct Position
{
    text:   String,
    digest: Digest,
}

impl Position
{
    /// Creates a position from its canonical text.
    pub fn new(text: impl Into<String>) -> Position
    {
        let text = text.into();
        let digest = Digest::of(&text);
        Position { text, digest }
    }

    pub fn digest(&self) -> Digest
    {
        self.digest
    }

    pub fn text(&self) -> &str
    {
        self.text.as_str()
    }
}

impl std::fmt::Display for Position
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        write!(f, "{}", self.text)
    }
}
