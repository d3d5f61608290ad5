//! Smith notation: source and destination squares, then the captured piece in lower
//! case, then `c`/`C` for a king/queen side castle or `E` for en passant, then the
//! promotion piece in upper case.

use once_cell::sync::Lazy;
use regex::Captures;

use super::{
    ActionPattern, Characteristics, Dialect, Slot, TokenMatch, TokenPattern, group,
    separator_patterns,
};
use crate::action::CastleSide;
use crate::coordinate::Coordinate;
use crate::game::Game;
use crate::pieces::{Piece, PieceType};

pub struct Smith;

static MOVES: Lazy<Vec<TokenPattern>> = Lazy::new(|| {
    vec![TokenPattern::new(
        r"(?P<from>[a-h][1-8])(?P<to>[a-h][1-8])(?P<captured>[pnbrqk])?(?P<special>[cCE])?(?P<promo>[QRBN])?",
        smith_move,
    )]
});

impl Dialect for Smith {
    fn name(&self) -> &'static str {
        "smith"
    }

    fn token_patterns(&self, slot: Slot) -> &[TokenPattern] {
        if slot.is_move() {
            MOVES.as_slice()
        } else {
            separator_patterns(slot)
        }
    }
}

fn letter(captures: &Captures<'_>, name: &str) -> Option<PieceType> {
    group(captures, name)
        .and_then(|s| s.chars().next())
        .and_then(Piece::from_char)
        .map(|piece| piece.piece_type)
}

fn smith_move(captures: &Captures<'_>, _: &Game) -> Vec<TokenMatch> {
    let square = |name| group(captures, name).and_then(|s| Coordinate::from_algebraic(s).ok());
    let (Some(from), Some(to)) = (square("from"), square("to")) else {
        return Vec::new();
    };

    let mut pattern = ActionPattern::any().with_from(from).with_to(to);

    // The captured piece is always written, so its absence means a quiet move.
    match letter(captures, "captured") {
        Some(captured) => {
            pattern.capture = Some(true);
            pattern.captured = Some(captured);
        }
        None => pattern.capture = Some(false),
    }

    match group(captures, "special") {
        Some("c") => pattern.castle = Some(CastleSide::KingSide),
        Some("C") => pattern.castle = Some(CastleSide::QueenSide),
        Some("E") => pattern.en_passant = Some(true),
        _ => {}
    }

    pattern.promotion = letter(captures, "promo");

    vec![TokenMatch::new(pattern, Characteristics::new())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smith_transcript() {
        let steps = Smith
            .parse(&Game::default(), "1. e2e4 d7d5 2. e4d5p d8d5p 3. b1c3 d5a5")
            .expect("parses");
        assert_eq!(steps.len(), 6);
        assert_eq!(steps[2].action.as_move().and_then(|mv| mv.captured), Some(PieceType::Pawn));
    }

    #[test]
    fn test_capture_letter_is_checked() {
        let game = Game::from_fen("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 2")
            .expect("valid FEN");
        assert!(Smith.parse(&game, "e4d5n").is_err());
        assert!(Smith.parse(&game, "e4d5").is_err());
        assert!(Smith.parse(&game, "e4d5p").is_ok());
    }

    #[test]
    fn test_castle_and_en_passant_suffixes() {
        let game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("valid FEN");
        let steps = Smith.parse(&game, "e1g1c e8c8C").expect("parses");
        assert_eq!(steps[0].action.to_smith(), "e1g1c");
        assert_eq!(steps[1].action.to_smith(), "e8c8C");

        let game = Game::from_fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3")
            .expect("valid FEN");
        let steps = Smith.parse(&game, "e5d6pE").expect("parses");
        assert!(steps[0].action.as_move().is_some_and(|mv| mv.is_en_passant_capture()));
    }

    #[test]
    fn test_promotion_suffix() {
        let game = Game::from_fen("1r2k3/P7/8/8/8/8/8/4K3 w - - 0 1").expect("valid FEN");
        let steps = Smith.parse(&game, "a7b8rN").expect("parses");
        let mv = steps[0].action.as_move().copied().expect("a move");
        assert_eq!(mv.captured, Some(PieceType::Rook));
        assert_eq!(mv.promotion, Some(PieceType::Knight));
        assert_eq!(mv.to_smith(), "a7b8rN");
    }
}
