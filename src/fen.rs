use arrayvec::ArrayVec;

use crate::color::Color;
use crate::coordinate::Coordinate;
use crate::errors::FenError;
use crate::game::{CastlingRights, Game};
use crate::layout::Layout;
use crate::pieces::{Piece, PieceType};
use crate::threats::is_attacked;

pub const STANDARD_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

const MAX_PIECES_PER_COLOR: usize = 16;

impl Game {
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let mut parts: ArrayVec<&str, 6> = ArrayVec::new();
        for part in fen.split_whitespace() {
            parts
                .try_push(part)
                .map_err(|_| FenError::WrongFieldCount(fen.split_whitespace().count()))?;
        }

        if parts.len() != 6 {
            return Err(FenError::WrongFieldCount(parts.len()));
        }

        let layout = Layout::from_placement(parts[0])?;

        let mut turn_chars = parts[1].chars();
        let turn = match (turn_chars.next().and_then(Color::from_fen_char), turn_chars.next()) {
            (Some(color), None) => color,
            _ => return Err(FenError::InvalidTurn(parts[1].to_string())),
        };

        let castling_rights = parse_castling(parts[2])?;

        let en_passant = if parts[3] == "-" {
            None
        } else {
            Some(
                Coordinate::from_algebraic(parts[3])
                    .map_err(|_| FenError::InvalidEnPassant(parts[3].to_string()))?,
            )
        };

        let half_move_clock = parts[4]
            .parse()
            .map_err(|_| FenError::InvalidHalfMoveClock(parts[4].to_string()))?;

        let full_move_number = parts[5]
            .parse()
            .ok()
            .filter(|n: &u32| *n >= 1)
            .ok_or_else(|| FenError::InvalidFullMoveNumber(parts[5].to_string()))?;

        validate_and_build(
            layout,
            turn,
            castling_rights,
            en_passant,
            half_move_clock,
            full_move_number,
        )
    }

    pub fn to_fen(&self) -> String {
        let mut fen = self.layout().to_placement();

        fen.push(' ');
        fen.push(self.turn().fen_char());

        fen.push(' ');
        fen.push_str(&castling_field(self.castling_rights()));

        fen.push(' ');
        match self.en_passant_target() {
            Some(target) => fen.push_str(&target.to_algebraic()),
            None => fen.push('-'),
        }

        fen.push(' ');
        fen.push_str(&self.half_move_clock().to_string());

        fen.push(' ');
        fen.push_str(&self.full_move_number().to_string());

        fen
    }
}

pub(crate) fn parse_castling(field: &str) -> Result<CastlingRights, FenError> {
    let mut rights = CastlingRights::none();
    if field == "-" {
        return Ok(rights);
    }

    for c in field.chars() {
        let entry = rights
            .entries()
            .into_iter()
            .find(|(letter, ..)| *letter == c)
            .ok_or_else(|| FenError::InvalidCastling(field.to_string()))?;
        let (_, color, side, _) = entry;
        rights.set(color, side, true);
    }

    Ok(rights)
}

pub(crate) fn castling_field(rights: &CastlingRights) -> String {
    if !rights.any() {
        return "-".to_string();
    }
    rights
        .entries()
        .into_iter()
        .filter(|(.., held)| *held)
        .map(|(letter, ..)| letter)
        .collect()
}

/// Checks every construction invariant and builds the game. Shared by the FEN and
/// figurine board codecs.
pub(crate) fn validate_and_build(
    layout: Layout,
    turn: Color,
    castling_rights: CastlingRights,
    en_passant: Option<Coordinate>,
    half_move_clock: u32,
    full_move_number: u32,
) -> Result<Game, FenError> {
    // The ply counter must stay representable.
    if full_move_number
        .checked_sub(1)
        .and_then(|n| n.checked_mul(2))
        .and_then(|n| n.checked_add(1))
        .is_none()
    {
        return Err(FenError::InvalidFullMoveNumber(full_move_number.to_string()));
    }

    for color in [Color::White, Color::Black] {
        for (coord, piece) in layout.pieces(color) {
            if piece.piece_type == PieceType::Pawn
                && (coord.rank == Color::White.back_rank() || coord.rank == Color::Black.back_rank())
            {
                return Err(FenError::PawnOnBackRank(coord));
            }
        }

        let count = layout.count(color);
        if count > MAX_PIECES_PER_COLOR {
            return Err(FenError::TooManyPieces(color, count));
        }

        match layout.find_kings(color).len() {
            0 => return Err(FenError::MissingKing(color)),
            1 => {}
            _ => return Err(FenError::DuplicateKing(color)),
        }
    }

    for (letter, color, side, held) in castling_rights.entries() {
        if !held {
            continue;
        }
        let rank = color.back_rank();
        let king_home = layout.get_piece(Coordinate::new(4, rank));
        let rook_home = layout.get_piece(Coordinate::new(side.rook_start_file(), rank));
        if king_home != Some(Piece::new(PieceType::King, color))
            || rook_home != Some(Piece::new(PieceType::Rook, color))
        {
            return Err(FenError::CastlingRightContradicted(letter));
        }
    }

    if let Some(target) = en_passant {
        validate_en_passant(&layout, turn, target)?;
    }

    let waiting = turn.opposite();
    if let Some(king) = layout.king(waiting) {
        if is_attacked(&layout, king, waiting) {
            return Err(FenError::OpponentInCheck(waiting));
        }
    }

    Ok(Game::from_validated(
        layout,
        turn,
        castling_rights,
        en_passant,
        half_move_clock,
        full_move_number,
    ))
}

/// The target must be the square a pawn of the side that just moved skipped over: empty,
/// with that pawn directly in front of it and its home square vacated.
fn validate_en_passant(layout: &Layout, turn: Color, target: Coordinate) -> Result<(), FenError> {
    let mover = turn.opposite();
    let dir = mover.pawn_direction();
    let expected_rank = mover.pawn_home_rank() as i8 + dir;

    let pawn_square = target.offset(0, dir);
    let home_square = target.offset(0, -dir);

    let consistent = target.rank as i8 == expected_rank
        && layout.is_empty(target)
        && pawn_square.and_then(|sq| layout.get_piece(sq)) == Some(Piece::new(PieceType::Pawn, mover))
        && home_square.is_some_and(|sq| layout.is_empty(sq));

    if consistent {
        Ok(())
    } else {
        Err(FenError::UnsupportedEnPassant(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_standard_fen_round_trip() {
        let game = Game::from_fen(STANDARD_FEN).expect("standard FEN");
        assert_eq!(game, Game::default());
        assert_eq!(game.to_fen(), STANDARD_FEN);
    }

    #[rstest]
    #[case("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3")]
    #[case("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1")]
    #[case("r3k2r/8/8/8/8/8/8/R3K2R w Kq - 12 40")]
    #[case("4k3/8/8/8/8/8/8/4K3 b - - 99 60")]
    fn test_fen_round_trip(#[case] fen: &str) {
        let game = Game::from_fen(fen).expect("valid FEN");
        assert_eq!(game.to_fen(), fen);
        let again = Game::from_fen(&game.to_fen()).expect("round trip");
        assert_eq!(again, game);
    }

    #[rstest]
    #[case("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0", FenError::WrongFieldCount(5))]
    #[case("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP w KQkq - 0 1", FenError::WrongRankCount(7))]
    #[case("rnbqkbnrr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", FenError::RankTooLong(0))]
    #[case("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1", FenError::InvalidTurn("x".to_string()))]
    #[case("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkx - 0 1", FenError::InvalidCastling("KQkx".to_string()))]
    #[case("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - x 1", FenError::InvalidHalfMoveClock("x".to_string()))]
    #[case("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 0", FenError::InvalidFullMoveNumber("0".to_string()))]
    #[case("rnbqkbnP/pppppppp/8/8/8/8/PPPPPPP1/RNBQKBNR w KQkq - 0 1", FenError::PawnOnBackRank(Coordinate::new(7, 0)))]
    #[case("rnbqkbnr/pppppppp/8/8/8/PPPPPPPP/PPPPPPPP/RNBQKBNR w KQkq - 0 1", FenError::TooManyPieces(Color::White, 24))]
    #[case("rnbqqbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQ - 0 1", FenError::MissingKing(Color::Black))]
    #[case("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBKKBNR w kq - 0 1", FenError::DuplicateKing(Color::White))]
    #[case("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBN1 w KQkq - 0 1", FenError::CastlingRightContradicted('K'))]
    #[case("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq e9 0 1", FenError::InvalidEnPassant("e9".to_string()))]
    #[case("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq e3 0 1", FenError::UnsupportedEnPassant(Coordinate::new(4, 5)))]
    #[case("4k3/8/8/8/8/8/8/r3K3 b - - 0 1", FenError::OpponentInCheck(Color::White))]
    #[case("4k3/8/8/8/8/8/8/4K3 w - - 0 4294967295", FenError::InvalidFullMoveNumber("4294967295".to_string()))]
    #[case("4k3/8/8/8/8/8/8/4K3 w - - 0 2147483649", FenError::InvalidFullMoveNumber("2147483649".to_string()))]
    #[case("4k3/8/8/8/8/8/8/4K3 wb - - 0 1", FenError::InvalidTurn("wb".to_string()))]
    fn test_fen_errors(#[case] fen: &str, #[case] expected: FenError) {
        assert_eq!(Game::from_fen(fen), Err(expected));
    }
}
