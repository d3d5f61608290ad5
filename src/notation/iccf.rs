//! ICCF numeric notation: `5254` is e2-e4, a fifth digit 1-4 picks the promotion
//! piece. Castling is written as the king's two-square move.

use once_cell::sync::Lazy;
use regex::Captures;

use super::{
    ActionPattern, Characteristics, Dialect, Marker, Slot, TokenMatch, TokenPattern, group,
    separator_patterns,
};
use crate::coordinate::Coordinate;
use crate::game::Game;
use crate::pieces::PieceType;

pub struct Iccf;

static MOVES: Lazy<Vec<TokenPattern>> = Lazy::new(|| {
    vec![TokenPattern::new(
        r"(?P<from>[1-8][1-8])(?P<to>[1-8][1-8])(?P<promo>[1-4])?",
        numeric_move,
    )]
});

// Moves are all digits, so an undotted move number is only told apart by its length.
static FULL_MOVE_START: Lazy<Vec<TokenPattern>> = Lazy::new(|| {
    vec![
        TokenPattern::new(r"\d{1,3}\.\s*", |_, _| {
            vec![TokenMatch::marker(
                Characteristics::new().with(Marker::FullMoveDot, "."),
            )]
        }),
        TokenPattern::new(r"\d{1,3}\s+", |_, _| {
            vec![TokenMatch::marker(
                Characteristics::new().with(Marker::FullMoveDot, "none"),
            )]
        }),
        TokenPattern::new(r"", |_, _| vec![TokenMatch::marker(Characteristics::new())]),
    ]
});

impl Dialect for Iccf {
    fn name(&self) -> &'static str {
        "iccf"
    }

    fn token_patterns(&self, slot: Slot) -> &[TokenPattern] {
        match slot {
            Slot::WhiteMove | Slot::BlackMove => MOVES.as_slice(),
            Slot::FullMoveStart => FULL_MOVE_START.as_slice(),
            other => separator_patterns(other),
        }
    }
}

fn iccf_square(digits: &str) -> Option<Coordinate> {
    let mut bytes = digits.bytes().map(|b| b.wrapping_sub(b'0'));
    let file = bytes.next()?;
    let rank = bytes.next()?;
    Coordinate::from_iccf(file, rank)
}

fn numeric_move(captures: &Captures<'_>, _: &Game) -> Vec<TokenMatch> {
    let (Some(from), Some(to)) = (
        group(captures, "from").and_then(iccf_square),
        group(captures, "to").and_then(iccf_square),
    ) else {
        return Vec::new();
    };

    let mut pattern = ActionPattern::any().with_from(from).with_to(to);
    let mut characteristics = Characteristics::new();

    if let Some(digit) = group(captures, "promo").and_then(|d| d.parse().ok()) {
        pattern.promotion = PieceType::from_iccf_digit(digit);
        characteristics = characteristics.with(Marker::Promotion, "digit");
    }

    vec![TokenMatch::new(pattern, characteristics)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::pieces::Piece;
    use rstest::rstest;

    fn lan(game: &Game, transcript: &str) -> Vec<String> {
        Iccf.parse(game, transcript)
            .expect("transcript parses")
            .iter()
            .map(|s| s.action.to_string())
            .collect()
    }

    #[rstest]
    #[case("1. 5254 5755 2. 7163 2836")]
    #[case("1 5254 5755 2 7163 2836")]
    #[case("5254 5755 7163 2836")]
    fn test_move_number_styles(#[case] transcript: &str) {
        assert_eq!(
            lan(&Game::default(), transcript),
            vec!["e2e4", "e7e5", "g1f3", "b8c6"]
        );
    }

    #[test]
    fn test_castling_as_king_move() {
        let game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").expect("valid FEN");
        let steps = Iccf.parse(&game, "1. 5171 5838").expect("parses");
        assert!(steps[0].action.as_move().is_some_and(|mv| mv.castle_side().is_some()));
        assert_eq!(steps[1].action.to_string(), "e8c8");
    }

    #[test]
    fn test_promotion_digit() {
        let game = Game::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").expect("valid FEN");
        for (digit, piece) in [
            ('1', PieceType::Queen),
            ('2', PieceType::Rook),
            ('3', PieceType::Bishop),
            ('4', PieceType::Knight),
        ] {
            let steps = Iccf.parse(&game, &format!("1718{digit}")).expect("parses");
            assert_eq!(
                steps[0].game.piece_at(Coordinate::new(0, 0)),
                Some(Piece::new(piece, Color::White))
            );
        }
    }

    #[test]
    fn test_round_trip_with_move_formatter() {
        let steps = Iccf
            .parse(&Game::default(), "1. 5254 4745 2. 5445 4845")
            .expect("parses");
        let printed: Vec<String> = steps
            .iter()
            .filter_map(|s| s.action.as_move().map(|mv| mv.to_iccf()))
            .collect();
        assert_eq!(printed, vec!["5254", "4745", "5445", "4845"]);
    }
}
