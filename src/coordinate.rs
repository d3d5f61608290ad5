use std::fmt;

use crate::color::Color;

pub const BOARD_SIZE: u8 = 8;

const DESCRIPTIVE_FILES: [&str; 8] = ["QR", "QN", "QB", "Q", "K", "KB", "KN", "KR"];

/// A square on the 8x8 board. `rank` 0 is Black's back rank (algebraic rank 8) and
/// `file` 0 is the a-file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    pub file: u8,
    pub rank: u8,
}

impl Coordinate {
    pub fn new(file: u8, rank: u8) -> Self {
        Coordinate { file, rank }
    }

    /// Checked constructor for arithmetic results.
    pub fn try_new(file: i8, rank: i8) -> Option<Self> {
        if (0..BOARD_SIZE as i8).contains(&file) && (0..BOARD_SIZE as i8).contains(&rank) {
            Some(Coordinate::new(file as u8, rank as u8))
        } else {
            None
        }
    }

    pub fn is_valid(&self) -> bool {
        self.file < BOARD_SIZE && self.rank < BOARD_SIZE
    }

    pub fn offset(&self, file_delta: i8, rank_delta: i8) -> Option<Self> {
        Coordinate::try_new(self.file as i8 + file_delta, self.rank as i8 + rank_delta)
    }

    /// Every square, rank 0 first, files ascending within a rank.
    pub fn all() -> impl Iterator<Item = Coordinate> {
        (0..BOARD_SIZE).flat_map(|rank| (0..BOARD_SIZE).map(move |file| Coordinate::new(file, rank)))
    }

    pub fn file_char(&self) -> char {
        (b'a' + self.file) as char
    }

    pub fn rank_char(&self) -> char {
        (b'8' - self.rank) as char
    }

    pub fn file_from_char(c: char) -> Option<u8> {
        match c {
            'a'..='h' => Some(c as u8 - b'a'),
            _ => None,
        }
    }

    pub fn rank_from_char(c: char) -> Option<u8> {
        match c {
            '1'..='8' => Some(b'8' - c as u8),
            _ => None,
        }
    }

    pub fn to_algebraic(&self) -> String {
        format!("{}{}", self.file_char(), self.rank_char())
    }

    pub fn from_algebraic(s: &str) -> Result<Self, String> {
        let mut chars = s.chars();
        let (Some(f), Some(r), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(format!("Invalid square: {}", s));
        };

        let file = Coordinate::file_from_char(f).ok_or_else(|| format!("Invalid file: {}", f))?;
        let rank = Coordinate::rank_from_char(r).ok_or_else(|| format!("Invalid rank: {}", r))?;

        Ok(Coordinate { file, rank })
    }

    /// ICCF numeric square: file digit then rank digit, both 1-based from White's side.
    pub fn to_iccf(&self) -> String {
        format!("{}{}", self.file + 1, BOARD_SIZE - self.rank)
    }

    pub fn from_iccf(file_digit: u8, rank_digit: u8) -> Option<Self> {
        if (1..=BOARD_SIZE).contains(&file_digit) && (1..=BOARD_SIZE).contains(&rank_digit) {
            Some(Coordinate::new(file_digit - 1, BOARD_SIZE - rank_digit))
        } else {
            None
        }
    }

    /// Rank number counted from `color`'s own back rank, as descriptive notation does.
    pub fn descriptive_rank(&self, color: Color) -> u8 {
        match color {
            Color::White => BOARD_SIZE - self.rank,
            Color::Black => self.rank + 1,
        }
    }

    pub fn rank_from_descriptive(color: Color, number: u8) -> Option<u8> {
        if !(1..=BOARD_SIZE).contains(&number) {
            return None;
        }
        Some(match color {
            Color::White => BOARD_SIZE - number,
            Color::Black => number - 1,
        })
    }

    pub fn descriptive_file(&self) -> &'static str {
        DESCRIPTIVE_FILES[self.file as usize]
    }

    pub fn file_from_descriptive(name: &str) -> Option<u8> {
        let name = name.replace("Kt", "N");
        DESCRIPTIVE_FILES
            .iter()
            .position(|f| *f == name)
            .map(|i| i as u8)
    }

    pub fn to_descriptive(&self, color: Color) -> String {
        format!("{}{}", self.descriptive_file(), self.descriptive_rank(color))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_algebraic())
    }
}
