use std::fmt;

use crate::color::Color;
use crate::coordinate::{BOARD_SIZE, Coordinate};
use crate::errors::FenError;
use crate::pieces::{Piece, PieceType};

pub const STANDARD_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// Piece placement on the fixed 8x8 grid, indexed `[rank][file]`.
///
/// The king squares are cached per color. `set_piece` is the only mutator, so the cache
/// always agrees with a scan of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Layout {
    squares: [[Option<Piece>; BOARD_SIZE as usize]; BOARD_SIZE as usize],
    kings: [Option<Coordinate>; 2],
}

fn color_index(color: Color) -> usize {
    match color {
        Color::White => 0,
        Color::Black => 1,
    }
}

impl Layout {
    pub fn empty() -> Self {
        Layout {
            squares: [[None; BOARD_SIZE as usize]; BOARD_SIZE as usize],
            kings: [None; 2],
        }
    }

    pub fn standard() -> Self {
        let mut layout = Layout::empty();
        for (file, c) in "rnbqkbnr".chars().enumerate() {
            let file = file as u8;
            if let Some(piece) = Piece::from_char(c) {
                layout.set_piece(Coordinate::new(file, 0), Some(piece));
                layout.set_piece(
                    Coordinate::new(file, 7),
                    Some(Piece::new(piece.piece_type, Color::White)),
                );
            }
            layout.set_piece(
                Coordinate::new(file, 1),
                Some(Piece::new(PieceType::Pawn, Color::Black)),
            );
            layout.set_piece(
                Coordinate::new(file, 6),
                Some(Piece::new(PieceType::Pawn, Color::White)),
            );
        }
        layout
    }

    pub fn get_piece(&self, coord: Coordinate) -> Option<Piece> {
        if coord.is_valid() {
            self.squares[coord.rank as usize][coord.file as usize]
        } else {
            None
        }
    }

    pub fn is_empty(&self, coord: Coordinate) -> bool {
        self.get_piece(coord).is_none()
    }

    pub fn set_piece(&mut self, coord: Coordinate, piece: Option<Piece>) {
        if !coord.is_valid() {
            return;
        }

        if let Some(old) = self.squares[coord.rank as usize][coord.file as usize] {
            if old.piece_type == PieceType::King
                && self.kings[color_index(old.color)] == Some(coord)
            {
                self.kings[color_index(old.color)] = None;
            }
        }

        if let Some(new) = piece {
            if new.piece_type == PieceType::King {
                self.kings[color_index(new.color)] = Some(coord);
            }
        }

        self.squares[coord.rank as usize][coord.file as usize] = piece;
    }

    pub fn king(&self, color: Color) -> Option<Coordinate> {
        self.kings[color_index(color)]
    }

    pub fn find_kings(&self, color: Color) -> Vec<Coordinate> {
        self.pieces(color)
            .into_iter()
            .filter(|(_, piece)| piece.piece_type == PieceType::King)
            .map(|(coord, _)| coord)
            .collect()
    }

    /// Pieces of `color` in scan order (rank 0 first, files ascending).
    pub fn pieces(&self, color: Color) -> Vec<(Coordinate, Piece)> {
        Coordinate::all()
            .filter_map(|coord| {
                self.get_piece(coord)
                    .filter(|piece| piece.color == color)
                    .map(|piece| (coord, piece))
            })
            .collect()
    }

    pub fn count(&self, color: Color) -> usize {
        self.squares
            .iter()
            .flatten()
            .flatten()
            .filter(|piece| piece.color == color)
            .count()
    }

    /// The piece-placement field of a FEN record.
    pub fn to_placement(&self) -> String {
        let mut fen = String::new();

        for rank in 0..BOARD_SIZE {
            let mut empty_count = 0;

            for file in 0..BOARD_SIZE {
                if let Some(piece) = self.get_piece(Coordinate::new(file, rank)) {
                    if empty_count > 0 {
                        fen.push_str(&empty_count.to_string());
                        empty_count = 0;
                    }
                    fen.push(piece.to_char());
                } else {
                    empty_count += 1;
                }
            }

            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }

            if rank < BOARD_SIZE - 1 {
                fen.push('/');
            }
        }

        fen
    }

    pub fn from_placement(placement: &str) -> Result<Self, FenError> {
        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != BOARD_SIZE as usize {
            return Err(FenError::WrongRankCount(rows.len()));
        }

        let mut layout = Layout::empty();
        for (rank, row) in rows.iter().enumerate() {
            layout.fill_rank(rank as u8, row.chars(), Piece::from_char)?;
        }
        Ok(layout)
    }

    /// Fills one rank from a row of symbols. Digits skip that many squares; every other
    /// symbol must be recognised by `decode` (a `None` decode on a non-space is an error,
    /// a space is an empty square).
    pub(crate) fn fill_rank(
        &mut self,
        rank: u8,
        row: impl Iterator<Item = char>,
        decode: impl Fn(char) -> Option<Piece>,
    ) -> Result<(), FenError> {
        let mut file: u8 = 0;

        for c in row {
            if let Some(skip) = c.to_digit(10) {
                if skip == 0 {
                    return Err(FenError::InvalidPiece(c));
                }
                file = file.saturating_add(skip as u8);
            } else if c == ' ' {
                file = file.saturating_add(1);
            } else {
                let piece = decode(c).ok_or(FenError::InvalidPiece(c))?;
                if file >= BOARD_SIZE {
                    return Err(FenError::RankTooLong(rank));
                }
                self.set_piece(Coordinate::new(file, rank), Some(piece));
                file += 1;
            }

            if file > BOARD_SIZE {
                return Err(FenError::RankTooLong(rank));
            }
        }

        if file != BOARD_SIZE {
            return Err(FenError::RankTooShort(rank));
        }

        Ok(())
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for rank in 0..BOARD_SIZE {
            write!(f, "{} ", (b'8' - rank) as char)?;
            for file in 0..BOARD_SIZE {
                match self.get_piece(Coordinate::new(file, rank)) {
                    Some(piece) => write!(f, "{} ", piece.to_char())?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f)?;
        }

        write!(f, "  ")?;
        for file in 0..BOARD_SIZE {
            write!(f, "{} ", (b'a' + file) as char)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_layout() {
        let layout = Layout::standard();
        assert_eq!(layout.to_placement(), STANDARD_PLACEMENT);
        assert_eq!(layout.king(Color::White), Some(Coordinate::new(4, 7)));
        assert_eq!(layout.king(Color::Black), Some(Coordinate::new(4, 0)));
        assert_eq!(layout.count(Color::White), 16);
        assert_eq!(layout.count(Color::Black), 16);
    }

    #[test]
    fn test_placement_round_trip() {
        let layout = Layout::from_placement(STANDARD_PLACEMENT).expect("standard placement");
        assert_eq!(layout, Layout::standard());

        let custom = "r3k2r/8/8/3pP3/8/8/8/R3K2R";
        let layout = Layout::from_placement(custom).expect("custom placement");
        assert_eq!(layout.to_placement(), custom);
    }

    #[test]
    fn test_placement_errors() {
        assert_eq!(
            Layout::from_placement("8/8/8/8/8/8/8"),
            Err(FenError::WrongRankCount(7))
        );
        assert_eq!(
            Layout::from_placement("9/8/8/8/8/8/8/8"),
            Err(FenError::RankTooLong(0))
        );
        assert_eq!(
            Layout::from_placement("8/8/8/8/8/8/8/7"),
            Err(FenError::RankTooShort(7))
        );
        assert_eq!(
            Layout::from_placement("8/8/8/8/8/8/8/7x"),
            Err(FenError::InvalidPiece('x'))
        );
    }

    #[test]
    fn test_king_cache_follows_mutations() {
        let mut layout = Layout::empty();
        let king = Piece::new(PieceType::King, Color::White);
        let e1 = Coordinate::new(4, 7);
        let e2 = Coordinate::new(4, 6);

        layout.set_piece(e1, Some(king));
        assert_eq!(layout.king(Color::White), Some(e1));

        layout.set_piece(e1, None);
        layout.set_piece(e2, Some(king));
        assert_eq!(layout.king(Color::White), Some(e2));
        assert_eq!(layout.find_kings(Color::White), vec![e2]);

        layout.set_piece(e2, Some(Piece::new(PieceType::Queen, Color::Black)));
        assert_eq!(layout.king(Color::White), None);
    }
}
