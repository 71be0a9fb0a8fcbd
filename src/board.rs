use crate::display_format::DisplayFormat;
use crate::location::Location;
use crate::piece::{Piece, PieceKind, Side};
use std::fmt::Formatter;
use std::ops::Index;
use thiserror::Error;

/// One cell along a path, paired with whatever stands on it.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Step {
    pub location: Location,
    pub occupant: Option<Piece>,
}

/// Cells from just after the origin up to and including the destination, in travel order.
pub type Path = Vec<Step>;

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum FenError {
    #[error("unknown piece character '{0}'")]
    Piece(char),
    #[error("rank {0} does not have exactly nine files")]
    Width(i8),
    #[error("expected ten ranks")]
    Height,
    #[error("too many pieces of kind {0:?} for {1}")]
    Count(PieceKind, Side),
    #[error("{0} has no general")]
    General(Side),
}

/// The grid is the source of truth for what occupies a cell; `locations` indexes the same
/// ownership by piece and is only ever updated together with the grid.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Board {
    cells: Vec<Option<Piece>>,
    locations: [Option<Location>; Piece::COUNT],
    crossed_river: [bool; Piece::COUNT],
}

impl Board {
    pub const WIDTH: i8 = 9;
    pub const HEIGHT: i8 = 10;

    pub fn new() -> Self {
        Self {
            cells: vec![None; (Self::WIDTH * Self::HEIGHT) as usize],
            locations: [None; Piece::COUNT],
            crossed_river: [false; Piece::COUNT],
        }
    }

    pub fn opening() -> Self {
        let mut board = Self::new();
        for side in Side::BOTH {
            for piece in Piece::all(side) {
                board.place_piece(piece, piece.opening_location());
            }
        }
        board
    }

    /// Reads a position written rank 10 first, e.g. `rheakaehr/9/1c5c1/...`.
    /// Pieces are numbered in reading order; those that do not appear start out captured.
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let mut board = Self::new();
        let mut counts = [0u8; Piece::COUNT];
        let placement = fen.split(' ').next().unwrap_or_default();

        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != Self::HEIGHT as usize {
            return Err(FenError::Height);
        }

        for (row, y) in rows.into_iter().zip((0..Self::HEIGHT).rev()) {
            let mut x: i8 = 0;
            for current in row.chars() {
                if let Some(skip) = current.to_digit(10) {
                    x = x
                        .checked_add(skip as i8)
                        .filter(|&x| x <= Self::WIDTH)
                        .ok_or(FenError::Width(y + 1))?;
                    continue;
                }

                let (kind, side) = PieceKind::from_fen_char(current).ok_or(FenError::Piece(current))?;
                let first = Piece::new(kind, side, 0).ok_or(FenError::Count(kind, side))?;
                let count = &mut counts[first.id()];
                let piece = Piece::new(kind, side, *count).ok_or(FenError::Count(kind, side))?;
                *count += 1;

                let location = Location::from_xy(x, y).ok_or(FenError::Width(y + 1))?;
                board.place_piece(piece, location);
                if kind == PieceKind::Soldier && !board.is_within_river_limit(side, location.rank()) {
                    board.mark_crossed_river(piece);
                }
                x += 1;
            }

            if x != Self::WIDTH {
                return Err(FenError::Width(y + 1));
            }
        }

        for side in Side::BOTH {
            if board.general_location(side).is_none() {
                return Err(FenError::General(side));
            }
        }

        Ok(board)
    }

    /// Puts `piece` on `location` and records it there. Whatever stood on `location` is overwritten
    /// on the grid but keeps its own record until [`Board::clear_piece_record`] is called.
    pub fn place_piece(&mut self, piece: Piece, location: Location) {
        self.cells[location.index()] = Some(piece);
        self.locations[piece.id()] = Some(location);
    }

    /// Empties a cell without touching any piece record, for the square a piece just left.
    pub fn clear_position(&mut self, location: Location) {
        self.cells[location.index()] = None;
    }

    /// Marks `piece` as captured. The grid is untouched since the captor now stands on its cell.
    pub fn clear_piece_record(&mut self, piece: Piece) {
        self.locations[piece.id()] = None;
    }

    pub fn location_of(&self, piece: Piece) -> Option<Location> {
        self.locations[piece.id()]
    }

    pub fn general_location(&self, side: Side) -> Option<Location> {
        self.location_of(Piece::general(side))
    }

    pub fn has_crossed_river(&self, piece: Piece) -> bool {
        self.crossed_river[piece.id()]
    }

    pub fn mark_crossed_river(&mut self, piece: Piece) {
        self.crossed_river[piece.id()] = true;
    }

    /// Only for rolling back a trial move that set the flag.
    pub(crate) fn restore_crossed_river(&mut self, piece: Piece, crossed: bool) {
        self.crossed_river[piece.id()] = crossed;
    }

    /// The nine points of the palace of `side`.
    pub fn castle(&self, side: Side) -> impl Iterator<Item = Location> + use<> {
        let rows = match side {
            Side::Red => 0..3,
            Side::Black => Self::HEIGHT - 3..Self::HEIGHT,
        };
        rows.flat_map(|y| (3..6).filter_map(move |x| Location::from_xy(x, y)))
    }

    pub fn is_in_castle(&self, side: Side, location: Location) -> bool {
        self.castle(side).any(|point| point == location)
    }

    /// Last rank before the river on the side of `side`.
    pub fn river_bank(&self, side: Side) -> i8 {
        match side {
            Side::Red => 5,
            Side::Black => 6,
        }
    }

    /// Whether `rank` is on the home side of the river for `side`.
    pub fn is_within_river_limit(&self, side: Side, rank: i8) -> bool {
        let bank = self.river_bank(side);
        match side {
            Side::Red => (1..=bank).contains(&rank),
            Side::Black => (bank..=Self::HEIGHT).contains(&rank),
        }
    }

    /// Every empty cell or cell held by the opponent of `side`.
    pub fn available_destinations(&self, side: Side) -> impl Iterator<Item = Location> + '_ {
        Location::iter().filter(move |&location| self[location].is_none_or(|piece| piece.side() != side))
    }

    pub fn path_orthogonal(&self, from: Location, to: Location) -> Path {
        if from == to || (from.x() != to.x() && from.y() != to.y()) {
            return Path::new();
        }
        self.walk(from, to)
    }

    pub fn path_diagonal(&self, from: Location, to: Location) -> Path {
        let dx = to.x() - from.x();
        let dy = to.y() - from.y();
        if dx == 0 || dx.abs() != dy.abs() {
            return Path::new();
        }
        self.walk(from, to)
    }

    /// One orthogonal step followed by one diagonal step continuing away from `from`.
    pub fn path_l_shaped(&self, from: Location, to: Location) -> Path {
        let dx = to.x() - from.x();
        let dy = to.y() - from.y();

        [(0, -1), (0, 1), (1, 0), (-1, 0)]
            .into_iter()
            .filter(|&(sx, sy)| (sx != 0 && dx == 2 * sx) || (sy != 0 && dy == 2 * sy))
            .filter_map(|(sx, sy)| from.shift_xy(sx, sy))
            .find_map(|intermediate| {
                let rest = self.path_diagonal(intermediate, to);
                if rest.len() != 1 {
                    return None;
                }
                let mut path = vec![self.step(intermediate)];
                path.extend(rest);
                Some(path)
            })
            .unwrap_or_default()
    }

    fn step(&self, location: Location) -> Step {
        Step {
            location,
            occupant: self[location],
        }
    }

    /// Straight walk from `from` to `to`, which must share a rank, a file or a diagonal.
    fn walk(&self, from: Location, to: Location) -> Path {
        let dx = (to.x() - from.x()).signum();
        let dy = (to.y() - from.y()).signum();

        let mut path = Path::new();
        let mut current = from;
        while current != to {
            let Some(next) = current.shift_xy(dx, dy) else {
                return Path::new();
            };
            path.push(self.step(next));
            current = next;
        }
        path
    }

    pub fn display(&self, format: DisplayFormat) -> impl std::fmt::Display + '_ {
        struct Impl<'a>(&'a Board, DisplayFormat);
        return Impl(self, format);

        impl std::fmt::Display for Impl<'_> {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                let &Self(board, format) = self;
                for y in (0..Board::HEIGHT).rev() {
                    write!(f, "{:>2}", y + 1)?;
                    for x in 0..Board::WIDTH {
                        let location = Location::from_xy(x, y).ok_or(std::fmt::Error)?;
                        match board[location] {
                            Some(piece) => write!(f, " {}", piece.display(format))?,
                            None => write!(f, " ──")?,
                        }
                    }
                    writeln!(f)?;
                    if y == Board::HEIGHT / 2 {
                        writeln!(f, "  {}", "~".repeat(3 * Board::WIDTH as usize))?;
                    }
                }
                write!(f, "  ")?;
                for file in 'a'..='i' {
                    write!(f, " {file} ")?;
                }
                writeln!(f)
            }
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<Location> for Board {
    type Output = Option<Piece>;
    fn index(&self, index: Location) -> &Self::Output {
        &self.cells[index.index()]
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display(DisplayFormat::string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> Location {
        s.parse().unwrap()
    }

    fn locations(path: &Path) -> Vec<String> {
        path.iter().map(|step| step.location.to_string()).collect()
    }

    #[test]
    fn opening_matches_notation() {
        let fen = "rheakaehr/9/1c5c1/p1p1p1p1p/9/9/P1P1P1P1P/1C5C1/9/RHEAKAEHR";
        assert_eq!(Board::from_fen(fen).unwrap(), Board::opening());
    }

    #[test]
    fn index_agrees_with_grid() {
        let board = Board::opening();
        for side in Side::BOTH {
            for piece in Piece::all(side) {
                let location = board.location_of(piece).unwrap();
                assert_eq!(board[location], Some(piece));
            }
        }
        let occupied = Location::iter().filter(|&l| board[l].is_some()).count();
        assert_eq!(occupied, Piece::COUNT);
    }

    #[test]
    fn orthogonal_path_in_travel_order() {
        let board = Board::opening();
        let path = board.path_orthogonal(at("a1"), at("a5"));
        assert_eq!(locations(&path), ["a2", "a3", "a4", "a5"]);
        assert_eq!(path[2].occupant, board[at("a4")]);
        assert!(path[0].occupant.is_none());

        let back = board.path_orthogonal(at("i3"), at("f3"));
        assert_eq!(locations(&back), ["h3", "g3", "f3"]);

        assert!(board.path_orthogonal(at("a1"), at("b2")).is_empty());
        assert!(board.path_orthogonal(at("a1"), at("a1")).is_empty());
    }

    #[test]
    fn diagonal_path_requires_equal_offsets() {
        let board = Board::new();
        assert_eq!(locations(&board.path_diagonal(at("c1"), at("e3"))), ["d2", "e3"]);
        assert_eq!(locations(&board.path_diagonal(at("g10"), at("e8"))), ["f9", "e8"]);
        assert!(board.path_diagonal(at("c1"), at("e4")).is_empty());
        assert!(board.path_diagonal(at("c1"), at("c3")).is_empty());
    }

    #[test]
    fn l_shaped_path_goes_through_leg() {
        let board = Board::new();
        assert_eq!(locations(&board.path_l_shaped(at("b1"), at("c3"))), ["b2", "c3"]);
        assert_eq!(locations(&board.path_l_shaped(at("b1"), at("d2"))), ["c1", "d2"]);
        assert_eq!(locations(&board.path_l_shaped(at("h10"), at("g8"))), ["h9", "g8"]);
        assert!(board.path_l_shaped(at("b1"), at("b3")).is_empty());
        assert!(board.path_l_shaped(at("b1"), at("d3")).is_empty());
        assert!(board.path_l_shaped(at("e5"), at("g7")).is_empty());
    }

    #[test]
    fn palace_and_river() {
        let board = Board::new();
        assert_eq!(board.castle(Side::Red).count(), 9);
        assert!(board.is_in_castle(Side::Red, at("f3")));
        assert!(!board.is_in_castle(Side::Red, at("g3")));
        assert!(board.is_in_castle(Side::Black, at("d8")));
        assert!(!board.is_in_castle(Side::Black, at("e7")));

        assert!(board.is_within_river_limit(Side::Red, 5));
        assert!(!board.is_within_river_limit(Side::Red, 6));
        assert!(board.is_within_river_limit(Side::Black, 6));
        assert!(!board.is_within_river_limit(Side::Black, 5));
    }

    #[test]
    fn capture_bookkeeping_is_split() {
        let mut board = Board::opening();
        let chariot = board[at("a1")].unwrap();
        let soldier = board[at("a4")].unwrap();

        board.clear_position(at("a1"));
        board.place_piece(chariot, at("a4"));
        assert_eq!(board.location_of(soldier), Some(at("a4")));

        board.clear_piece_record(soldier);
        assert_eq!(board.location_of(soldier), None);
        assert_eq!(board[at("a4")], Some(chariot));
        assert_eq!(board[at("a1")], None);
    }

    #[test]
    fn destinations_exclude_friends() {
        let board = Board::opening();
        let red = board.available_destinations(Side::Red).count();
        assert_eq!(red, 90 - Piece::PER_SIDE);
        assert!(board.available_destinations(Side::Red).any(|l| l == at("e10")));
        assert!(!board.available_destinations(Side::Red).any(|l| l == at("e1")));
    }

    #[test]
    fn notation_errors() {
        assert_eq!(Board::from_fen("9/9"), Err(FenError::Height));
        assert_eq!(Board::from_fen("4k4/9/9/9/9/9/9/9/9/8"), Err(FenError::Width(1)));
        assert_eq!(Board::from_fen("4k4/9/9/9/9/9/9/9/9/4X4"), Err(FenError::Piece('X')));
        assert_eq!(
            Board::from_fen("4k4/9/9/9/9/9/9/9/9/3KK4"),
            Err(FenError::Count(PieceKind::General, Side::Red))
        );
        assert_eq!(Board::from_fen("9/9/9/9/9/9/9/9/9/4K4"), Err(FenError::General(Side::Black)));

        let long_row = "9".repeat(20);
        assert_eq!(
            Board::from_fen(&format!("4k4/9/9/9/9/9/9/9/9/{long_row}")),
            Err(FenError::Width(1))
        );
    }
}
