use itertools::Itertools;
use shakmaty::{fen::Fen, uci::Uci, CastlingMode, Chess, Color, EnPassantMode, Position as _};

use crate::prelude::*;

#[derive(Clone, Copy, Debug, Default)]
/// Standard chess rules over FEN positions and UCI moves.
pub struct ChessRules;

impl ChessRules
{
    /// Half-moves without a capture or pawn move after which the game is drawn.
    const FIFTY_MOVE_HALFMOVES: u32 = 100;

    /// FEN fields that identify a position for repetitions: board, side, castling and en passant.
    const REPETITION_FIELDS: usize = 4;

    /// Loads the position into a playable board.
    fn board(&self, position: &Position) -> Result<Chess>
    {
        let fen = position
            .text()
            .parse::<Fen>()
            .map_err(|e| Error::new(Kind::ParseError, e.to_string()).chain_parse::<Position>(position.text().into()))?;

        fen.into_position::<Chess>(CastlingMode::Standard)
            .map_err(|e| Error::new(Kind::ParseError, e.to_string()).chain_parse::<Position>(position.text().into()))
    }

    /// Writes a board back into its canonical position.
    fn position(&self, board: Chess) -> Position
    {
        Position::new(Fen::from_position(board, EnPassantMode::Legal).to_string())
    }
}

impl Rules for ChessRules
{
    fn normalize(&self, text: &str) -> Result<Position>
    {
        let board = self.board(&Position::new(text.trim()))?;
        Ok(self.position(board))
    }

    fn side_to_move(&self, position: &Position) -> Result<Side>
    {
        Ok(match self.board(position)?.turn()
        {
            | Color::White => Side::White,
            | Color::Black => Side::Black,
        })
    }

    fn move_number(&self, position: &Position) -> Result<u32>
    {
        Ok(self.board(position)?.fullmoves().get())
    }

    fn play(&self, position: &Position, mv: &str) -> Result<Position>
    {
        let illegal = || Error::new(Kind::IllegalMove, format!("{} in {}", mv, position));

        let board = self.board(position)?;
        let uci = mv.parse::<Uci>().map_err(|_| illegal())?;
        let chess_move = uci.to_move(&board).map_err(|_| illegal())?;
        let next = board.play(&chess_move).map_err(|_| illegal())?;

        Ok(self.position(next))
    }

    fn is_terminal(&self, position: &Position) -> Result<bool>
    {
        let board = self.board(position)?;
        Ok(board.is_game_over() || board.halfmoves() >= Self::FIFTY_MOVE_HALFMOVES)
    }

    fn repetition_key(&self, position: &Position) -> Digest
    {
        let fields = position.text().split_whitespace().take(Self::REPETITION_FIELDS).join(" ");
        Digest::of(&fields)
    }
}
