use crate::prelude::*;

/// The game-rules capability the explorer relies on without knowing anything about chess itself.
pub trait Rules
{
    /// Turns user-supplied text into the canonical position, so that transpositions share a digest.
    fn normalize(&self, text: &str) -> Result<Position>
    {
        Ok(Position::new(text.trim()))
    }

    /// Returns the side to move in this position.
    fn side_to_move(&self, position: &Position) -> Result<Side>;

    /// Returns the full-move number of this position, starting at 1.
    fn move_number(&self, position: &Position) -> Result<u32>;

    /// Plays a move given in engine notation, failing with an IllegalMove error if it cannot be played.
    fn play(&self, position: &Position, mv: &str) -> Result<Position>;

    /// Whether the game is over in this position.
    fn is_terminal(&self, position: &Position) -> Result<bool>;

    /// Identifies the position for repetition draws, where move counters do not matter.
    fn repetition_key(&self, position: &Position) -> Digest
    {
        position.digest()
    }
}
