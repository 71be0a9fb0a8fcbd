use crate::board::Board;
use std::fmt::Formatter;
use std::str::FromStr;
use thiserror::Error;

/// A point on the board, `x` counting files from `a` and `y` counting ranks from `1`, both zero based.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Location {
    x: i8,
    y: i8,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Move {
    pub from: Location,
    pub to: Location,
}

#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ParseLocationError {
    #[error("empty location")]
    Empty,
    #[error("file '{0}' is not between 'a' and 'i'")]
    File(char),
    #[error("rank '{0}' is not between 1 and 10")]
    Rank(String),
    #[error("expected two locations in move '{0}'")]
    Move(String),
}

impl Location {
    pub fn new() -> Self {
        Self { x: 0, y: 0 }
    }

    pub fn from_xy(x: i8, y: i8) -> Option<Self> {
        Self::new().shift_xy(x, y)
    }

    pub fn from_index(index: usize) -> Option<Self> {
        if index >= (Board::WIDTH * Board::HEIGHT) as usize {
            return None;
        }
        let x = index as i8 % Board::WIDTH;
        let y = index as i8 / Board::WIDTH;
        Self::from_xy(x, y)
    }

    /// Builds a location from a file letter and a one based rank, the way positions are written.
    pub fn from_file_rank(file: char, rank: i8) -> Option<Self> {
        let file = file.to_ascii_lowercase();
        if !file.is_ascii_lowercase() {
            return None;
        }
        Self::from_xy((file as u8).wrapping_sub(b'a') as i8, rank - 1)
    }

    pub fn shift_x(&self, x: i8) -> Option<Self> {
        let new_x = self.x.checked_add(x)?;
        if 0 > new_x || new_x >= Board::WIDTH {
            return None;
        }
        Some(Self { x: new_x, y: self.y })
    }

    pub fn shift_y(&self, y: i8) -> Option<Self> {
        let new_y = self.y.checked_add(y)?;
        if 0 > new_y || new_y >= Board::HEIGHT {
            return None;
        }
        Some(Self { x: self.x, y: new_y })
    }

    pub fn shift_xy(&self, x: i8, y: i8) -> Option<Self> {
        self.shift_x(x)?.shift_y(y)
    }

    pub fn index(&self) -> usize {
        (self.x + self.y * Board::WIDTH) as usize
    }

    pub fn x(&self) -> i8 {
        self.x
    }

    pub fn y(&self) -> i8 {
        self.y
    }

    pub fn file(&self) -> char {
        (b'a' + self.x as u8) as char
    }

    /// One based rank, `1` on red's back row and `10` on black's.
    pub fn rank(&self) -> i8 {
        self.y + 1
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        (0..(Board::WIDTH * Board::HEIGHT) as usize).filter_map(Self::from_index)
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.file(), self.rank())
    }
}

impl FromStr for Location {
    type Err = ParseLocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let file = chars.next().ok_or(ParseLocationError::Empty)?;
        let rest = chars.as_str();

        let lower = file.to_ascii_lowercase();
        if !('a'..='i').contains(&lower) {
            return Err(ParseLocationError::File(file));
        }

        let digits = (1..=2).contains(&rest.len()) && rest.bytes().all(|b| b.is_ascii_digit());
        if !digits || rest.starts_with('0') {
            return Err(ParseLocationError::Rank(rest.to_string()));
        }

        let rank = rest
            .parse::<i8>()
            .ok()
            .filter(|rank| (1..=Board::HEIGHT).contains(rank))
            .ok_or_else(|| ParseLocationError::Rank(rest.to_string()))?;

        Self::from_file_rank(lower, rank).ok_or_else(|| ParseLocationError::Rank(rest.to_string()))
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}

impl FromStr for Move {
    type Err = ParseLocationError;

    /// Accepts `h3h7`, `h3 h7` and `h3-h7`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .char_indices()
            .skip(1)
            .find(|(_, c)| c.is_ascii_alphabetic())
            .map(|(i, _)| i)
            .ok_or_else(|| ParseLocationError::Move(s.to_string()))?;

        let (from, to) = s.split_at(split);
        let from = from.trim_end_matches(|c: char| c.is_whitespace() || c == '-');

        Ok(Self {
            from: from.parse()?,
            to: to.parse()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_rank_widths() {
        let e1: Location = "e1".parse().unwrap();
        assert_eq!((e1.x(), e1.y()), (4, 0));

        let h10: Location = "h10".parse().unwrap();
        assert_eq!((h10.x(), h10.y()), (7, 9));
        assert_eq!(h10.to_string(), "h10");
    }

    #[test]
    fn rejects_off_board_text() {
        assert_eq!("j1".parse::<Location>(), Err(ParseLocationError::File('j')));
        assert!(matches!("a0".parse::<Location>(), Err(ParseLocationError::Rank(_))));
        assert!(matches!("a11".parse::<Location>(), Err(ParseLocationError::Rank(_))));
        assert!(matches!("a".parse::<Location>(), Err(ParseLocationError::Rank(_))));
        assert_eq!("".parse::<Location>(), Err(ParseLocationError::Empty));

        for malformed in ["e+5", "e05", "e-1", "e5 ", "e５"] {
            assert!(matches!(malformed.parse::<Location>(), Err(ParseLocationError::Rank(_))), "{malformed}");
        }
        assert_eq!(" e5".parse::<Location>(), Err(ParseLocationError::File(' ')));
    }

    #[test]
    fn parses_moves_with_separators() {
        let expected = Move {
            from: "h3".parse().unwrap(),
            to: "h10".parse().unwrap(),
        };
        assert_eq!("h3h10".parse::<Move>(), Ok(expected));
        assert_eq!("h3 h10".parse::<Move>(), Ok(expected));
        assert_eq!("H3-H10".parse::<Move>(), Ok(expected));
        assert!("h3".parse::<Move>().is_err());
    }

    #[test]
    fn index_round_trips() {
        assert_eq!(Location::iter().count(), 90);
        for location in Location::iter() {
            assert_eq!(Location::from_index(location.index()), Some(location));
        }
        assert_eq!(Location::from_index(90), None);
    }
}
