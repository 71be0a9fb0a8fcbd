use crate::board::{Board, FenError};
use crate::display_format::DisplayFormat;
use crate::location::{Location, Move};
use crate::piece::{MoveResult, Piece, Side};
use crate::player::Player;
use log::{debug, info};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use thiserror::Error;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum GameState {
    Unfinished,
    RedWon,
    BlackWon,
}

/// How a finished game was decided.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Ending {
    Checkmate,
    Stalemate,
}

/// Why a move request was turned down.
#[derive(Error, Clone, Eq, PartialEq, Debug)]
pub enum Rejection {
    #[error("the game is already over")]
    GameOver,
    #[error("'{0}' is not a location on the board")]
    OffBoard(String),
    #[error("a piece cannot move to where it already stands")]
    NullMove,
    #[error("there is no piece on {0}")]
    EmptySource(Location),
    #[error("the piece on {0} belongs to {1}")]
    WrongOwner(Location, Side),
    #[error("the piece on {0} cannot move to {1}")]
    IllegalPath(Location, Location),
    #[error("moving {0} to {1} would leave the {2} general in check")]
    SelfCheck(Location, Location, Side),
}

impl GameState {
    fn won_by(side: Side) -> Self {
        match side {
            Side::Red => Self::RedWon,
            Side::Black => Self::BlackWon,
        }
    }

    pub fn winner(&self) -> Option<Side> {
        match self {
            Self::Unfinished => None,
            Self::RedWon => Some(Side::Red),
            Self::BlackWon => Some(Side::Black),
        }
    }

    pub fn is_finished(&self) -> bool {
        *self != Self::Unfinished
    }
}

impl Display for GameState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Unfinished => "UNFINISHED",
            Self::RedWon => "RED_WON",
            Self::BlackWon => "BLACK_WON",
        })
    }
}

impl Display for Ending {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Checkmate => "checkmate",
            Self::Stalemate => "stalemate",
        })
    }
}

#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    red: Player,
    black: Player,
    turn: Side,
    state: GameState,
    ending: Option<Ending>,
    history: Vec<(Move, Option<Piece>)>,
}

fn in_check(board: &Board, defender: &Player, attacker: &Player) -> bool {
    defender
        .general_location(board)
        .is_some_and(|general| !attacker.attacks_on(board, general).is_empty())
}

fn in_checkmate(board: &mut Board, defender: &Player, attacker: &Player) -> bool {
    let Some(general) = defender.general_location(board) else {
        return false;
    };
    let attacks = attacker.attacks_on(board, general);
    !attacks.is_empty() && defender.defend_all_checks(board, &attacks, attacker).is_empty()
}

fn in_stalemate(board: &mut Board, defender: &Player, attacker: &Player) -> bool {
    defender.general_location(board).is_some() && !defender.has_available_move(board, attacker)
}

impl Game {
    /// Starts from `board` with `turn` to move. A position where that side is already mated or
    /// stalemated is recorded as won by the other side.
    pub fn new(board: Board, turn: Side) -> Self {
        let mut game = Self {
            board,
            red: Player::new(Side::Red),
            black: Player::new(Side::Black),
            turn: turn.opponent(),
            state: GameState::Unfinished,
            ending: None,
            history: Vec::new(),
        };
        game.update_state();
        game.turn = turn;
        game
    }

    pub fn opening() -> Self {
        Self::new(Board::opening(), Side::Red)
    }

    pub fn from_fen(fen: &str, turn: Side) -> Result<Self, FenError> {
        Ok(Self::new(Board::from_fen(fen)?, turn))
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn player(&self, side: Side) -> &Player {
        match side {
            Side::Red => &self.red,
            Side::Black => &self.black,
        }
    }

    pub fn turn(&self) -> Side {
        self.turn
    }

    pub fn game_state(&self) -> GameState {
        self.state
    }

    pub fn ending(&self) -> Option<Ending> {
        self.ending
    }

    pub fn history(&self) -> &[(Move, Option<Piece>)] {
        &self.history
    }

    /// Hands the move to the other side without playing one.
    pub fn pass_turn(&mut self) {
        self.turn = self.turn.opponent();
    }

    /// Plays a move written as two positions such as `"h3"` and `"h10"`, returning whether it was accepted.
    pub fn make_move(&mut self, from: &str, to: &str) -> bool {
        let parse = |text: &str| text.parse::<Location>().map_err(|_| Rejection::OffBoard(text.to_string()));
        let result = parse(from).and_then(|from| Ok(Move { from, to: parse(to)? }));

        match result {
            Ok(mv) => self.play(mv).is_ok(),
            Err(rejection) => {
                debug!("rejected {from} {to}: {rejection}");
                false
            }
        }
    }

    pub fn play(&mut self, mv: Move) -> Result<MoveResult, Rejection> {
        let result = self.try_play(mv);
        match &result {
            Ok(result) => info!("{} played {mv} ({result:?})", self.turn.opponent()),
            Err(rejection) => debug!("rejected {mv} for {}: {rejection}", self.turn),
        }
        result
    }

    fn try_play(&mut self, mv: Move) -> Result<MoveResult, Rejection> {
        if self.state.is_finished() {
            return Err(Rejection::GameOver);
        }
        if mv.from == mv.to {
            return Err(Rejection::NullMove);
        }

        let (player, opponent) = match self.turn {
            Side::Red => (&self.red, &self.black),
            Side::Black => (&self.black, &self.red),
        };
        let result = player.move_piece(&mut self.board, mv.from, mv.to, opponent)?;

        self.history.push((mv, result.captured()));
        self.update_state();
        self.turn = self.turn.opponent();
        Ok(result)
    }

    /// Checks whether the side about to move has been mated or stalemated by the side that just moved.
    fn update_state(&mut self) {
        let (mover, next) = match self.turn {
            Side::Red => (&self.red, &self.black),
            Side::Black => (&self.black, &self.red),
        };

        let ending = if in_checkmate(&mut self.board, next, mover) {
            Ending::Checkmate
        } else if in_stalemate(&mut self.board, next, mover) {
            Ending::Stalemate
        } else {
            return;
        };

        self.state = GameState::won_by(self.turn);
        self.ending = Some(ending);
        info!("{} won by {ending} ({})", self.turn, self.state);
    }

    pub fn is_in_check(&self, side: Side) -> bool {
        in_check(&self.board, self.player(side), self.player(side.opponent()))
    }

    pub fn is_in_checkmate(&self, side: Side) -> bool {
        let mut board = self.board.clone();
        in_checkmate(&mut board, self.player(side), self.player(side.opponent()))
    }

    pub fn is_in_stalemate(&self, side: Side) -> bool {
        let mut board = self.board.clone();
        in_stalemate(&mut board, self.player(side), self.player(side.opponent()))
    }

    /// Legal moves for the side to move.
    pub fn available_moves(&self) -> HashSet<Move> {
        let mut board = self.board.clone();
        self.player(self.turn)
            .available_moves(&mut board, self.player(self.turn.opponent()))
    }

    pub fn display(&self, format: DisplayFormat) -> impl Display + '_ {
        struct Impl<'a>(&'a Game, DisplayFormat);
        return Impl(self, format);

        impl Impl<'_> {
            fn format_row(&self, f: &mut Formatter<'_>, y: i8) -> std::fmt::Result {
                let &Self(game, format) = self;
                let last = game.history.last().map(|&(mv, _)| mv);
                write!(f, "{:>2}", y + 1)?;

                for x in 0..Board::WIDTH {
                    let location = Location::from_xy(x, y).ok_or(std::fmt::Error)?;
                    let moved_to = last.is_some_and(|mv| mv.to == location);
                    let moved_from = last.is_some_and(|mv| mv.from == location);

                    match game.board[location] {
                        Some(piece) if format.colour && moved_to => {
                            write!(f, " \x1B[3m{}\x1B[0m", piece.display(format))?
                        }
                        Some(piece) => write!(f, " {}", piece.display(format))?,
                        None if moved_from => write!(f, " ╶╴")?,
                        None => write!(f, " ──")?,
                    }
                }
                Ok(())
            }

            fn format_captured(&self, f: &mut Formatter<'_>, side: Side) -> std::fmt::Result {
                let &Self(game, format) = self;
                let mut captured = game.player(side).captured(&game.board).peekable();
                if captured.peek().is_none() {
                    return Ok(());
                }
                write!(f, "{side} lost:")?;
                for piece in captured {
                    write!(f, " {}", piece.display(format))?;
                }
                writeln!(f)
            }
        }

        impl Display for Impl<'_> {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                let &Self(game, format) = self;

                if format.concise {
                    return write!(f, "{} {} {}", game.history.len(), game.turn, game.state);
                }

                for y in (0..Board::HEIGHT).rev() {
                    self.format_row(f, y)?;
                    writeln!(f)?;
                    if y == Board::HEIGHT / 2 {
                        writeln!(f, "  {}", "~".repeat(3 * Board::WIDTH as usize))?;
                    }
                }
                write!(f, "  ")?;
                for file in 'a'..='i' {
                    write!(f, " {file} ")?;
                }
                writeln!(f)?;

                self.format_captured(f, Side::Red)?;
                self.format_captured(f, Side::Black)?;

                if let Some(&(mv, _)) = game.history.last() {
                    write!(f, "({}) {mv} - ", game.history.len())?;
                }

                let general = |side| Piece::general(side).display(format);
                match (game.state.winner(), game.ending) {
                    (Some(winner), Some(ending)) => {
                        write!(f, "{} won by {ending}", general(winner))?;
                    }
                    (Some(winner), None) => write!(f, "{} won", general(winner))?,
                    (None, _) => {
                        let check = game.is_in_check(game.turn);
                        let status = if check { "in check" } else { "to play" };
                        write!(f, "{} {} {status}", general(game.turn), game.turn)?;
                    }
                }

                writeln!(f)
            }
        }
    }
}

impl Display for Game {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display(DisplayFormat::string()))
    }
}
