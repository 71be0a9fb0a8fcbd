use crate::board::Board;
use crate::location::{Location, Move};
use crate::piece::{MoveResult, Piece};
use log::trace;

/// A speculative move that is undone when dropped, so the board is restored on every exit path.
pub struct Trial<'a> {
    board: &'a mut Board,
    piece: Piece,
    mv: Move,
    captured: Option<Piece>,
    crossed_river: bool,
}

impl<'a> Trial<'a> {
    /// Plays `piece` to `to` if the piece alone allows it, returning `None` and leaving the board
    /// untouched otherwise.
    pub fn begin(board: &'a mut Board, piece: Piece, to: Location) -> Option<Self> {
        let from = board.location_of(piece)?;
        let crossed_river = board.has_crossed_river(piece);

        let captured = match piece.move_to(board, to) {
            MoveResult::Rejected => return None,
            MoveResult::Moved => None,
            MoveResult::Captured(captured) => Some(captured),
        };

        Some(Self {
            board,
            piece,
            mv: Move { from, to },
            captured,
            crossed_river,
        })
    }

    pub fn board(&self) -> &Board {
        self.board
    }

    pub fn captured(&self) -> Option<Piece> {
        self.captured
    }
}

impl Drop for Trial<'_> {
    fn drop(&mut self) {
        let Move { from, to } = self.mv;
        self.piece.reverse_move(self.board, from, to, self.captured);
        self.board.restore_crossed_river(self.piece, self.crossed_river);
        trace!("rolled back trial move {}", self.mv);
    }
}
