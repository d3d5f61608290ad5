//! Standard algebraic notation, including figurine and older typographic variants.

use once_cell::sync::Lazy;
use regex::Captures;

use super::{
    ActionPattern, Characteristics, Dialect, Marker, Slot, TokenMatch, TokenPattern, check_suffix,
    group, separator_patterns,
};
use crate::action::CastleSide;
use crate::coordinate::Coordinate;
use crate::game::Game;
use crate::pieces::PieceType;

pub struct Algebraic;

const CHECK: &str = r"(?P<check>\+\+|\+|†|#|‡)?";
const PROMOTION: &str = r"(?:(?P<promo_sep>[=/(])?(?P<promo>[QRBN♕♖♗♘♛♜♝♞])\)?)?";

static MOVES: Lazy<Vec<TokenPattern>> = Lazy::new(|| {
    vec![
        TokenPattern::new(&format!(r"(?P<castle>O-O-O|0-0-0|O-O|0-0){CHECK}"), castle),
        TokenPattern::new(
            &format!(
                r"(?P<piece>[KQRBN♔♕♖♗♘♚♛♜♝♞])(?P<from_file>[a-h])?(?P<from_rank>[1-8])?(?P<capture>[x:])?(?P<to>[a-h][1-8]){CHECK}"
            ),
            piece_move,
        ),
        TokenPattern::new(
            &format!(
                r"(?P<from_file>[a-h])(?P<capture>[x:])(?P<to>[a-h][1-8])(?P<ep>\s?e\.p\.)?{PROMOTION}{CHECK}"
            ),
            pawn_move,
        ),
        TokenPattern::new(&format!(r"(?P<to>[a-h][1-8]){PROMOTION}{CHECK}"), pawn_move),
    ]
});

impl Dialect for Algebraic {
    fn name(&self) -> &'static str {
        "algebraic"
    }

    fn token_patterns(&self, slot: Slot) -> &[TokenPattern] {
        if slot.is_move() {
            MOVES.as_slice()
        } else {
            separator_patterns(slot)
        }
    }
}

fn piece_type(symbol: &str) -> Option<PieceType> {
    let c = symbol.chars().next()?;
    PieceType::from_algebraic_letter(c).or_else(|| PieceType::from_figurine(c))
}

fn square(captures: &Captures<'_>, name: &str) -> Option<Coordinate> {
    group(captures, name).and_then(|s| Coordinate::from_algebraic(s).ok())
}

fn castle(captures: &Captures<'_>, _: &Game) -> Vec<TokenMatch> {
    let Some(text) = group(captures, "castle") else {
        return Vec::new();
    };

    let side = if text.len() == 5 {
        CastleSide::QueenSide
    } else {
        CastleSide::KingSide
    };
    let symbol = if text.starts_with('0') { "0" } else { "O" };

    let mut pattern = ActionPattern::castle(side);
    let characteristics = Characteristics::new().with(Marker::Castle, symbol);
    let characteristics = check_suffix(captures, &mut pattern, characteristics);
    vec![TokenMatch::new(pattern, characteristics)]
}

fn piece_move(captures: &Captures<'_>, _: &Game) -> Vec<TokenMatch> {
    let (Some(piece), Some(to)) = (
        group(captures, "piece").and_then(piece_type),
        square(captures, "to"),
    ) else {
        return Vec::new();
    };

    let mut pattern = ActionPattern::piece(piece).with_to(to);
    pattern.from_file = group(captures, "from_file")
        .and_then(|s| s.chars().next())
        .and_then(Coordinate::file_from_char);
    pattern.from_rank = group(captures, "from_rank")
        .and_then(|s| s.chars().next())
        .and_then(Coordinate::rank_from_char);

    let mut characteristics = Characteristics::new();
    if let Some(symbol) = group(captures, "capture") {
        pattern.capture = Some(true);
        characteristics = characteristics.with(Marker::Capture, symbol);
    }

    let characteristics = check_suffix(captures, &mut pattern, characteristics);
    vec![TokenMatch::new(pattern, characteristics)]
}

/// Pushes and pawn captures. A pawn token without a capture symbol never captures.
fn pawn_move(captures: &Captures<'_>, _: &Game) -> Vec<TokenMatch> {
    let Some(to) = square(captures, "to") else {
        return Vec::new();
    };

    let mut pattern = ActionPattern::piece(PieceType::Pawn).with_to(to);
    let mut characteristics = Characteristics::new();

    pattern.from_file = group(captures, "from_file")
        .and_then(|s| s.chars().next())
        .and_then(Coordinate::file_from_char);

    match group(captures, "capture") {
        Some(symbol) => {
            pattern.capture = Some(true);
            characteristics = characteristics.with(Marker::Capture, symbol);
        }
        None => pattern.capture = Some(false),
    }

    if group(captures, "ep").is_some() {
        pattern.en_passant = Some(true);
        characteristics = characteristics.with(Marker::EnPassant, "e.p.");
    }

    if let Some(promo) = group(captures, "promo").and_then(piece_type) {
        pattern.promotion = Some(promo);
        let symbol = match group(captures, "promo_sep") {
            Some("(") => "()",
            Some(sep) => sep,
            None => "none",
        };
        characteristics = characteristics.with(Marker::Promotion, symbol);
    }

    let characteristics = check_suffix(captures, &mut pattern, characteristics);
    vec![TokenMatch::new(pattern, characteristics)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::color::Color;
    use crate::notation::ParseError;
    use rstest::rstest;

    fn sq(s: &str) -> Coordinate {
        Coordinate::from_algebraic(s).expect("valid square")
    }

    fn last(game: &Game, transcript: &str) -> Action {
        let steps = Algebraic.parse(game, transcript).expect("transcript parses");
        steps.last().map(|s| s.action).expect("at least one step")
    }

    #[test]
    fn test_opening_moves() {
        let steps = Algebraic
            .parse(&Game::default(), "1. e4 e5 2. Nf3 Nc6 3. Bb5 a6")
            .expect("parses");
        let lan: Vec<String> = steps.iter().map(|s| s.action.to_string()).collect();
        assert_eq!(lan, vec!["e2e4", "e7e5", "g1f3", "b8c6", "f1b5", "a7a6"]);
        assert_eq!(steps[1].token, "e5");
    }

    #[test]
    fn test_figurines_and_colon_captures() {
        let steps = Algebraic
            .parse(&Game::default(), "1. e4 d5 2. e:d5 ♛:d5 3. ♘c3")
            .expect("parses");
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[3].action.to_string(), "d8d5");
        assert_eq!(steps[4].action.to_string(), "b1c3");
    }

    #[test]
    fn test_disambiguation() {
        let game = Game::from_fen("4k3/8/8/8/8/8/4K3/R6R w - - 0 1").expect("valid FEN");
        assert_eq!(last(&game, "Rad1").to_string(), "a1d1");
        assert_eq!(last(&game, "Rhd1").to_string(), "h1d1");

        // Without the file both rooks qualify; the first in action order wins
        assert_eq!(last(&game, "Rd1").to_string(), "a1d1");

        let game = Game::from_fen("4k3/8/8/8/8/R7/4K3/R7 w - - 0 1").expect("valid FEN");
        assert_eq!(last(&game, "R1a2").to_string(), "a1a2");
        assert_eq!(last(&game, "R3a2").to_string(), "a3a2");
        assert_eq!(last(&game, "Ra1a2").to_string(), "a1a2");
    }

    #[rstest]
    #[case("a8=Q+", PieceType::Queen)]
    #[case("a8Q+", PieceType::Queen)]
    #[case("a8(Q)+", PieceType::Queen)]
    #[case("a8/Q+", PieceType::Queen)]
    #[case("a8=R+", PieceType::Rook)]
    #[case("a8=N", PieceType::Knight)]
    #[case("a8♕+", PieceType::Queen)]
    fn test_promotion_forms(#[case] token: &str, #[case] expected: PieceType) {
        let game = Game::from_fen("4k3/P7/8/8/8/8/8/4K3 w - - 0 1").expect("valid FEN");
        let action = last(&game, token);
        assert_eq!(action.as_move().and_then(|mv| mv.promotion), Some(expected));
    }

    #[test]
    fn test_castling_forms() {
        let fen = "r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1";
        let game = Game::from_fen(fen).expect("valid FEN");
        assert_eq!(last(&game, "O-O").to_string(), "e1g1");
        assert_eq!(last(&game, "0-0-0").to_string(), "e1c1");
        assert_eq!(last(&game, "1. O-O O-O-O").to_string(), "e8c8");
    }

    #[test]
    fn test_en_passant_suffix() {
        let game = Game::from_fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3")
            .expect("valid FEN");
        let action = last(&game, "3. exd6 e.p.");
        let mv = action.as_move().expect("a move");
        assert!(mv.is_en_passant_capture());
        assert_eq!(mv.to, sq("d6"));

        let action = last(&game, "3. exd6");
        assert!(action.as_move().is_some_and(|mv| mv.is_en_passant_capture()));
    }

    #[rstest]
    #[case("1. f3 e5 2. g4 Qh4#")]
    #[case("1. f3 e5 2. g4 Qh4‡")]
    #[case("1. f3 e5 2. g4 Qh4++")]
    fn test_mate_symbols(#[case] transcript: &str) {
        let steps = Algebraic.parse(&Game::default(), transcript).expect("parses");
        let end = &steps[3].game;
        assert!(end.is_checkmate());
        assert_eq!(end.game_over_winner(), Some(Color::Black));
    }

    #[test]
    fn test_false_check_claim_is_rejected() {
        let failure = Algebraic
            .parse(&Game::default(), "1. e4+")
            .expect_err("e4 gives no check");
        assert!(matches!(failure.error, ParseError::NoLegalAction { .. }));
    }

    #[test]
    fn test_mate_on_the_hundredth_half_move() {
        let game = Game::from_fen("7k/6pp/8/8/8/8/8/R5K1 w - - 99 80").expect("valid FEN");
        let steps = Algebraic.parse(&game, "Ra8#").expect("mate is recognised");
        assert_eq!(steps.len(), 1);
        assert!(steps[0].game.is_checkmate());
        assert!(!steps[0].game.is_draw());
    }

    #[test]
    fn test_check_symbol_conflict() {
        let transcript = "1. e4 e5 2. Bc4 Nc6 3. Bxf7+ Kxf7 4. Qh5† g6";
        let failure = Algebraic
            .parse(&Game::default(), transcript)
            .expect_err("two check symbols");
        assert_eq!(failure.steps.len(), 6);
        assert_eq!(
            failure.error,
            ParseError::CharacteristicConflict {
                marker: Marker::Check,
                established: "+".to_string(),
                found: "†".to_string(),
                offset: transcript.find("Qh5").expect("token present"),
            }
        );
    }

    #[test]
    fn test_newline_separated_moves() {
        let steps = Algebraic
            .parse(&Game::default(), "1. e4 e5\n2. Nf3 Nc6\n3. Bc4")
            .expect("parses");
        assert_eq!(steps.len(), 5);

        let failure = Algebraic
            .parse(&Game::default(), "1. e4 e5\n2. Nf3 Nc6 3. Bc4")
            .expect_err("mixed separators");
        assert!(matches!(
            failure.error,
            ParseError::CharacteristicConflict {
                marker: Marker::MoveSeparator,
                ..
            }
        ));
    }
}
