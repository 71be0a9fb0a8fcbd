//! Rules engine for Xiangqi: board geometry, per-piece legality, check, checkmate and stalemate
//! detection, and turn arbitration between the red and black players.

pub mod board;
pub mod display_format;
pub mod game;
pub mod location;
pub mod piece;
pub mod player;
pub mod trial;

pub use board::Board;
pub use game::{Game, GameState, Rejection};
pub use location::{Location, Move};
pub use piece::{Piece, PieceKind, Side};
