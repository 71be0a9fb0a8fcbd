use crate::board::{Board, Path};
use crate::game::Rejection;
use crate::location::{Location, Move};
use crate::piece::{MoveResult, Piece, Side};
use crate::trial::Trial;
use std::collections::HashSet;

/// A piece able to move onto a target, with the path it would take.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Attack {
    pub piece: Piece,
    pub path: Path,
}

/// One side of the game and the sixteen pieces it owns, captured or not.
#[derive(Clone, Debug)]
pub struct Player {
    side: Side,
    pieces: Vec<Piece>,
    general: Piece,
}

impl Player {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            pieces: Piece::all(side).collect(),
            general: Piece::general(side),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn general(&self) -> Piece {
        self.general
    }

    pub fn general_location(&self, board: &Board) -> Option<Location> {
        board.location_of(self.general)
    }

    pub fn captured<'a>(&'a self, board: &'a Board) -> impl Iterator<Item = Piece> + 'a {
        self.pieces
            .iter()
            .copied()
            .filter(|&piece| board.location_of(piece).is_none())
    }

    /// Moves the piece on `from` to `to` unless it is not ours, cannot go there, or the move would
    /// leave our general attacked.
    pub fn move_piece(
        &self,
        board: &mut Board,
        from: Location,
        to: Location,
        opponent: &Player,
    ) -> Result<MoveResult, Rejection> {
        let piece = board[from].ok_or(Rejection::EmptySource(from))?;
        if piece.side() != self.side {
            return Err(Rejection::WrongOwner(from, piece.side()));
        }
        if !piece.is_legal(board, to) {
            return Err(Rejection::IllegalPath(from, to));
        }
        if self.simulate_self_check(board, piece, to, opponent) {
            return Err(Rejection::SelfCheck(from, to, self.side));
        }
        Ok(piece.move_to(board, to))
    }

    /// Every piece of ours that could move onto `target` right now.
    pub fn attacks_on(&self, board: &Board, target: Location) -> Vec<Attack> {
        self.pieces
            .iter()
            .filter(|piece| piece.is_legal(board, target))
            .map(|&piece| Attack {
                piece,
                path: piece.path(board, target),
            })
            .collect()
    }

    /// Whether moving `piece` to `to` would leave our general attacked. A move the piece cannot make
    /// exposes nothing and yields `false`.
    pub fn simulate_self_check(&self, board: &mut Board, piece: Piece, to: Location, opponent: &Player) -> bool {
        let Some(trial) = Trial::begin(board, piece, to) else {
            return false;
        };
        let board = trial.board();
        self.general_location(board)
            .is_some_and(|general| !opponent.attacks_on(board, general).is_empty())
    }

    fn without_self_check(&self, board: &mut Board, candidates: HashSet<Move>, opponent: &Player) -> HashSet<Move> {
        let mut result = HashSet::with_capacity(candidates.len());
        for mv in candidates {
            let Some(piece) = board[mv.from] else {
                continue;
            };
            if !self.simulate_self_check(board, piece, mv.to, opponent) {
                result.insert(mv);
            }
        }
        result
    }

    /// Moves answering a single attack on our general: capturing the attacker, stepping onto its path,
    /// moving a screen of ours off a cannon's line, or moving the general itself.
    ///
    /// A screen contributes every move it has, not only those leaving the line, so the set may contain
    /// moves that do not lift the check on their own.
    pub fn defense_moves_against(&self, board: &mut Board, attack: &Attack, opponent: &Player) -> HashSet<Move> {
        let mut candidates = HashSet::new();
        let Some(target) = board.location_of(attack.piece) else {
            return candidates;
        };

        for &piece in &self.pieces {
            let Some(from) = board.location_of(piece) else {
                continue;
            };
            let blocks = attack.path.iter().map(|step| step.location);
            for to in std::iter::once(target).chain(blocks) {
                if piece.is_legal(board, to) {
                    candidates.insert(Move { from, to });
                }
            }
        }

        if let Some((_, before)) = attack.path.split_last() {
            for screen in before.iter().filter_map(|step| step.occupant) {
                if screen.side() == self.side {
                    candidates.extend(screen.possible_moves(board));
                }
            }
        }

        candidates.extend(self.general.possible_moves(board));

        self.without_self_check(board, candidates, opponent)
    }

    /// Moves that answer every attack at once. Empty when there is no attack or no common answer.
    pub fn defend_all_checks(&self, board: &mut Board, attacks: &[Attack], opponent: &Player) -> HashSet<Move> {
        let mut attacks = attacks.iter();
        let Some(first) = attacks.next() else {
            return HashSet::new();
        };

        let mut defenses = self.defense_moves_against(board, first, opponent);
        for attack in attacks {
            if defenses.is_empty() {
                break;
            }
            let other = self.defense_moves_against(board, attack, opponent);
            defenses.retain(|mv| other.contains(mv));
        }
        defenses
    }

    fn candidate_moves(&self, board: &Board) -> HashSet<Move> {
        self.pieces.iter().flat_map(|piece| piece.possible_moves(board)).collect()
    }

    /// Every move we could make that does not leave our general attacked.
    pub fn available_moves(&self, board: &mut Board, opponent: &Player) -> HashSet<Move> {
        let candidates = self.candidate_moves(board);
        self.without_self_check(board, candidates, opponent)
    }

    pub fn has_available_move(&self, board: &mut Board, opponent: &Player) -> bool {
        for mv in self.candidate_moves(board) {
            let Some(piece) = board[mv.from] else {
                continue;
            };
            if !self.simulate_self_check(board, piece, mv.to, opponent) {
                return true;
            }
        }
        false
    }
}
