use crate::board::{Board, Path};
use crate::display_format::{DisplayFormat, Glyphs};
use crate::location::{Location, Move};
use std::collections::HashSet;
use std::fmt::{Display, Formatter};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Side {
    Red,
    Black,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Red, Side::Black];

    pub fn opponent(self) -> Self {
        match self {
            Self::Red => Self::Black,
            Self::Black => Self::Red,
        }
    }

    pub fn is_red(self) -> bool {
        self == Self::Red
    }

    /// Direction of travel along a file when advancing towards the other side.
    pub fn forward(self) -> i8 {
        match self {
            Self::Red => 1,
            Self::Black => -1,
        }
    }

    /// Zero based rank of the back row.
    fn home_y(self) -> i8 {
        match self {
            Self::Red => 0,
            Self::Black => Board::HEIGHT - 1,
        }
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Red => "red",
            Self::Black => "black",
        })
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum PieceKind {
    General,
    Advisor,
    Elephant,
    Horse,
    Chariot,
    Cannon,
    Soldier,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Pattern {
    Orthogonal,
    Diagonal,
    LShaped,
}

/// Geometric limits checked by the shared legality routine.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Rules {
    pub pattern: Pattern,
    pub max_length: Option<usize>,
    /// Exact number of occupied cells the path must cross before its destination.
    pub jumps: usize,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        Self::General,
        Self::Advisor,
        Self::Elephant,
        Self::Horse,
        Self::Chariot,
        Self::Cannon,
        Self::Soldier,
    ];

    pub fn rules(self) -> Rules {
        let (pattern, max_length) = match self {
            Self::General => (Pattern::Orthogonal, Some(1)),
            Self::Advisor => (Pattern::Diagonal, Some(1)),
            Self::Elephant => (Pattern::Diagonal, Some(2)),
            Self::Horse => (Pattern::LShaped, Some(2)),
            Self::Chariot => (Pattern::Orthogonal, None),
            Self::Cannon => (Pattern::Orthogonal, None),
            Self::Soldier => (Pattern::Orthogonal, Some(1)),
        };
        Rules {
            pattern,
            max_length,
            jumps: 0,
        }
    }

    /// How many pieces of this kind each side starts with.
    pub fn count(self) -> u8 {
        self.opening_files().len() as u8
    }

    fn opening_files(self) -> &'static [i8] {
        match self {
            Self::General => &[4],
            Self::Advisor => &[3, 5],
            Self::Elephant => &[2, 6],
            Self::Horse => &[1, 7],
            Self::Chariot => &[0, 8],
            Self::Cannon => &[1, 7],
            Self::Soldier => &[0, 2, 4, 6, 8],
        }
    }

    /// Rows in front of the back row where this kind starts.
    fn opening_row(self) -> i8 {
        match self {
            Self::Cannon => 2,
            Self::Soldier => 3,
            _ => 0,
        }
    }

    /// Position of the first piece of this kind in the per-side identity table.
    fn offset(self) -> usize {
        Self::ALL
            .iter()
            .take_while(|&&kind| kind != self)
            .map(|kind| kind.count() as usize)
            .sum()
    }

    pub fn from_fen_char(value: char) -> Option<(Self, Side)> {
        let kind = match value.to_ascii_lowercase() {
            'k' => Self::General,
            'a' => Self::Advisor,
            'e' => Self::Elephant,
            'h' => Self::Horse,
            'r' => Self::Chariot,
            'c' => Self::Cannon,
            'p' => Self::Soldier,
            _ => return None,
        };
        let side = if value.is_ascii_uppercase() { Side::Red } else { Side::Black };
        Some((kind, side))
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum MoveResult {
    Rejected,
    Moved,
    Captured(Piece),
}

impl MoveResult {
    pub fn captured(&self) -> Option<Piece> {
        match *self {
            Self::Captured(piece) => Some(piece),
            _ => None,
        }
    }
}

/// Identity of one of the 32 pieces. Where it stands is tracked by the [`Board`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Piece {
    kind: PieceKind,
    side: Side,
    index: u8,
}

impl Piece {
    pub const PER_SIDE: usize = 16;
    pub const COUNT: usize = Self::PER_SIDE * 2;

    pub fn new(kind: PieceKind, side: Side, index: u8) -> Option<Self> {
        (index < kind.count()).then_some(Self { kind, side, index })
    }

    pub fn general(side: Side) -> Self {
        Self {
            kind: PieceKind::General,
            side,
            index: 0,
        }
    }

    /// Every piece of one side, general first.
    pub fn all(side: Side) -> impl Iterator<Item = Self> {
        PieceKind::ALL
            .into_iter()
            .flat_map(move |kind| (0..kind.count()).map(move |index| Self { kind, side, index }))
    }

    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn is_red(&self) -> bool {
        self.side.is_red()
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    /// Dense identifier in `0..Piece::COUNT`.
    pub fn id(&self) -> usize {
        let side = if self.is_red() { 0 } else { Self::PER_SIDE };
        side + self.kind.offset() + self.index as usize
    }

    pub fn opening_location(&self) -> Location {
        let x = self.kind.opening_files()[self.index as usize];
        let y = self.side.home_y() + self.side.forward() * self.kind.opening_row();
        // files and rows above are all on the board
        Location::from_xy(x, y).unwrap_or_default()
    }

    pub fn path(&self, board: &Board, to: Location) -> Path {
        let Some(from) = board.location_of(*self) else {
            return Path::new();
        };
        Self::path_for(board, self.kind.rules().pattern, from, to)
    }

    fn path_for(board: &Board, pattern: Pattern, from: Location, to: Location) -> Path {
        match pattern {
            Pattern::Orthogonal => board.path_orthogonal(from, to),
            Pattern::Diagonal => board.path_diagonal(from, to),
            Pattern::LShaped => board.path_l_shaped(from, to),
        }
    }

    /// Occupied cells along `path`, not counting its destination.
    pub fn jumps(path: &Path) -> usize {
        let Some((_, before)) = path.split_last() else {
            return 0;
        };
        before.iter().filter(|step| step.occupant.is_some()).count()
    }

    /// Whether this piece may move to `to`, ignoring whether the move exposes its own general.
    pub fn is_legal(&self, board: &Board, to: Location) -> bool {
        let Some(from) = board.location_of(*self) else {
            return false;
        };

        let mut rules = self.kind.rules();
        let mut flying = false;

        match self.kind {
            PieceKind::Advisor if !board.is_in_castle(self.side, to) => return false,
            PieceKind::General => {
                flying = self.is_flying_general(board, to);
                if flying {
                    rules.max_length = None;
                }
            }
            PieceKind::Cannon => {
                if board[to].is_some_and(|occupant| occupant.side != self.side) {
                    rules.jumps = 1;
                }
            }
            _ => {}
        }

        if !Self::is_legal_with(board, self.side, from, to, rules) {
            return false;
        }

        match self.kind {
            PieceKind::General => flying || board.is_in_castle(self.side, to),
            PieceKind::Elephant => board.is_within_river_limit(self.side, to.rank()),
            PieceKind::Soldier => {
                let advance = (to.y() - from.y()) * self.side.forward();
                if from.x() == to.x() && advance < 0 {
                    return false;
                }
                from.y() != to.y() || board.has_crossed_river(*self)
            }
            _ => true,
        }
    }

    /// Rules shared by every kind: the destination differs from the origin and is not held by a friend,
    /// and the path exists, fits the length limit and jumps exactly as often as allowed.
    fn is_legal_with(board: &Board, side: Side, from: Location, to: Location, rules: Rules) -> bool {
        if from == to {
            return false;
        }

        if board[to].is_some_and(|occupant| occupant.side == side) {
            return false;
        }

        let path = Self::path_for(board, rules.pattern, from, to);
        if path.is_empty() {
            return false;
        }

        if rules.max_length.is_some_and(|max| path.len() > max) {
            return false;
        }

        Self::jumps(&path) == rules.jumps
    }

    /// Whether this general could capture the other general at `to` along a clear file.
    pub fn is_flying_general(&self, board: &Board, to: Location) -> bool {
        if self.kind != PieceKind::General {
            return false;
        }
        let Some(from) = board.location_of(*self) else {
            return false;
        };
        if board.general_location(self.side.opponent()) != Some(to) || from.x() != to.x() {
            return false;
        }
        let path = board.path_orthogonal(from, to);
        !path.is_empty() && Self::jumps(&path) == 0
    }

    pub fn move_to(&self, board: &mut Board, to: Location) -> MoveResult {
        if !self.is_legal(board, to) {
            return MoveResult::Rejected;
        }
        let Some(from) = board.location_of(*self) else {
            return MoveResult::Rejected;
        };

        let captive = board[to];
        board.clear_position(from);
        board.place_piece(*self, to);

        if self.kind == PieceKind::Soldier && !board.is_within_river_limit(self.side, to.rank()) {
            board.mark_crossed_river(*self);
        }

        match captive {
            Some(captive) => {
                board.clear_piece_record(captive);
                MoveResult::Captured(captive)
            }
            None => MoveResult::Moved,
        }
    }

    /// Undoes a legal move of this piece from `from` to `to`. The piece must stand on `to`.
    pub fn reverse_move(&self, board: &mut Board, from: Location, to: Location, captured: Option<Piece>) {
        match captured {
            Some(captured) => board.place_piece(captured, to),
            None => board.clear_position(to),
        }
        board.place_piece(*self, from);
    }

    /// Moves that are legal for this piece alone, without screening for self-check.
    pub fn possible_moves(&self, board: &Board) -> HashSet<Move> {
        let Some(from) = board.location_of(*self) else {
            return HashSet::new();
        };
        board
            .available_destinations(self.side)
            .filter(|&to| self.is_legal(board, to))
            .map(|to| Move { from, to })
            .collect()
    }

    pub fn fen_char(&self) -> char {
        let result = match self.kind {
            PieceKind::General => 'k',
            PieceKind::Advisor => 'a',
            PieceKind::Elephant => 'e',
            PieceKind::Horse => 'h',
            PieceKind::Chariot => 'r',
            PieceKind::Cannon => 'c',
            PieceKind::Soldier => 'p',
        };
        if self.is_red() { result.to_ascii_uppercase() } else { result }
    }

    pub fn chinese_char(&self) -> char {
        match (self.side, self.kind) {
            (Side::Red, PieceKind::General) => '帥',
            (Side::Red, PieceKind::Advisor) => '仕',
            (Side::Red, PieceKind::Elephant) => '相',
            (Side::Red, PieceKind::Horse) => '傌',
            (Side::Red, PieceKind::Chariot) => '俥',
            (Side::Red, PieceKind::Cannon) => '炮',
            (Side::Red, PieceKind::Soldier) => '兵',
            (Side::Black, PieceKind::General) => '將',
            (Side::Black, PieceKind::Advisor) => '士',
            (Side::Black, PieceKind::Elephant) => '象',
            (Side::Black, PieceKind::Horse) => '馬',
            (Side::Black, PieceKind::Chariot) => '車',
            (Side::Black, PieceKind::Cannon) => '砲',
            (Side::Black, PieceKind::Soldier) => '卒',
        }
    }

    /// Two columns wide in either glyph set so board rows line up.
    pub fn display(&self, format: DisplayFormat) -> impl Display + use<> {
        let s = match format.glyphs {
            Glyphs::Chinese => self.chinese_char().to_string(),
            Glyphs::Letters => {
                let c = self.fen_char();
                format!("{c}{c}")
            }
        };
        if format.colour && self.is_red() {
            format!("\x1B[31m{s}\x1B[0m")
        } else {
            s
        }
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display(DisplayFormat::string()))
    }
}
