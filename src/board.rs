use std::fmt;

use crate::action::CastleSide;
use crate::color::Color;
use crate::coordinate::{BOARD_SIZE, Coordinate};
use crate::errors::FenError;
use crate::fen::validate_and_build;
use crate::game::{CastlingRights, Game};
use crate::layout::Layout;
use crate::pieces::Piece;

/// A position drawn with figurine runes, one row per rank starting from Black's back
/// rank. A space is an empty square; on input a digit may also stand for that many
/// empty squares.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Board {
    pub rows: [String; 8],
    pub turn: Color,
    pub white_king_side: bool,
    pub white_queen_side: bool,
    pub black_king_side: bool,
    pub black_queen_side: bool,
    pub en_passant: Option<Coordinate>,
    pub half_move_clock: u32,
    pub full_move_number: u32,
}

impl Board {
    /// Builds a board from `/`-separated rows, with no castling rights, no en passant
    /// target and fresh counters.
    pub fn from_rows(rows: &str, turn: Color) -> Result<Self, FenError> {
        let split: Vec<&str> = rows.split('/').collect();
        let rows: [String; 8] = split
            .iter()
            .map(|row| row.to_string())
            .collect::<Vec<_>>()
            .try_into()
            .map_err(|_| FenError::WrongRankCount(split.len()))?;

        Ok(Board {
            rows,
            turn,
            white_king_side: false,
            white_queen_side: false,
            black_king_side: false,
            black_queen_side: false,
            en_passant: None,
            half_move_clock: 0,
            full_move_number: 1,
        })
    }

    fn castling_rights(&self) -> CastlingRights {
        let mut rights = CastlingRights::none();
        rights.set(Color::White, CastleSide::KingSide, self.white_king_side);
        rights.set(Color::White, CastleSide::QueenSide, self.white_queen_side);
        rights.set(Color::Black, CastleSide::KingSide, self.black_king_side);
        rights.set(Color::Black, CastleSide::QueenSide, self.black_queen_side);
        rights
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}

impl Game {
    pub fn from_board(board: &Board) -> Result<Self, FenError> {
        let mut layout = Layout::empty();
        for (rank, row) in board.rows.iter().enumerate() {
            layout.fill_rank(rank as u8, row.chars(), Piece::from_figurine)?;
        }

        if board.full_move_number == 0 {
            return Err(FenError::InvalidFullMoveNumber("0".to_string()));
        }

        validate_and_build(
            layout,
            board.turn,
            board.castling_rights(),
            board.en_passant,
            board.half_move_clock,
            board.full_move_number,
        )
    }

    pub fn to_board(&self) -> Board {
        let rows = std::array::from_fn(|rank| {
            (0..BOARD_SIZE)
                .map(|file| {
                    self.piece_at(Coordinate::new(file, rank as u8))
                        .map_or(' ', |piece| piece.figurine())
                })
                .collect()
        });

        let rights = self.castling_rights();
        Board {
            rows,
            turn: self.turn(),
            white_king_side: rights.has_king_side(Color::White),
            white_queen_side: rights.has_queen_side(Color::White),
            black_king_side: rights.has_king_side(Color::Black),
            black_queen_side: rights.has_queen_side(Color::Black),
            en_passant: self.en_passant_target(),
            half_move_clock: self.half_move_clock(),
            full_move_number: self.full_move_number(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_board() {
        let board = Game::default().to_board();
        assert_eq!(board.rows[0], "♜♞♝♛♚♝♞♜");
        assert_eq!(board.rows[1], "♟♟♟♟♟♟♟♟");
        assert_eq!(board.rows[4], "        ");
        assert_eq!(board.rows[7], "♖♘♗♕♔♗♘♖");
        assert!(board.white_king_side && board.black_queen_side);

        let game = Game::from_board(&board).expect("standard board");
        assert_eq!(game, Game::default());
    }

    #[test]
    fn test_digits_expand_to_empty_squares() {
        let board = Board::from_rows("4♚3/8/8/8/8/8/8/4♔3", Color::White).expect("8 rows");
        let game = Game::from_board(&board).expect("valid board");
        assert_eq!(game.to_fen(), "4k3/8/8/8/8/8/8/4K3 w - - 0 1");
        assert_eq!(game.to_board().rows[0], "    ♚   ");
    }

    #[test]
    fn test_board_errors() {
        assert_eq!(
            Board::from_rows("8/8/8", Color::White),
            Err(FenError::WrongRankCount(3))
        );

        let board = Board::from_rows("4♚3/8/8/8/8/8/8/4K3", Color::White).expect("8 rows");
        assert_eq!(Game::from_board(&board), Err(FenError::InvalidPiece('K')));

        let board = Board::from_rows("4♚3/8/8/8/8/8/8/4♔", Color::White).expect("8 rows");
        assert_eq!(Game::from_board(&board), Err(FenError::RankTooShort(7)));

        let mut board = Board::from_rows("4♚3/8/8/8/8/8/8/4♔3", Color::White).expect("8 rows");
        board.white_king_side = true;
        assert_eq!(
            Game::from_board(&board),
            Err(FenError::CastlingRightContradicted('K'))
        );
    }

    #[test]
    fn test_rook_corner_mate() {
        let board = Board::from_rows(
            "♜♞♝♛♚♝♞ /♟♟♟♟♟♟♟ /8/8/8/8/♙♙♙♙♙♙♙ /♖♘♗♕♔  ♜",
            Color::White,
        )
        .expect("8 rows");
        let game = Game::from_board(&board).expect("valid board");
        assert!(game.is_check());
        assert!(game.is_checkmate());
        assert!(game.is_game_over());
        assert_eq!(game.game_over_winner(), Some(Color::Black));
    }
}
