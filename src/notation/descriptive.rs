//! English descriptive notation (`P-K4`, `N-KB3`, `QxQP`).
//!
//! Files are named after the pieces that start on them and ranks count from the
//! mover's own side. A bare `R`, `N`/`Kt` or `B` file names both of that piece's files,
//! so such tokens yield one candidate per file.

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

pub struct Descriptive;

const FILE: &str = "KKt|QKt|KR|KN|KB|QR|QN|QB|Kt|K|Q|R|N|B";
const PIECE: &str = "Kt|[KQRBNP]";
const PROMOTION: &str = r"(?:(?P<promo_sep>[=/(])?(?P<promo>Kt|[QRBN])\)?)?";
const CHECK: &str = r"(?:\s?(?P<check>ch|mate|\+|#))?";

static MOVES: Lazy<Vec<TokenPattern>> = Lazy::new(|| {
    let mover = format!(r"(?P<mover_file>{FILE})?(?P<piece>{PIECE})(?:\((?P<origin_file>{FILE})?(?P<origin_rank>[1-8])\))?");
    vec![
        TokenPattern::new(
            &format!(r"(?P<castle>O-O-O|0-0-0|O-O|0-0|Castles(?:\s?(?P<castle_side>KR|QR|K|Q))?){CHECK}"),
            castle,
        ),
        TokenPattern::new(
            &format!(r"{mover}-(?P<to_file>{FILE})(?P<to_rank>[1-8]){PROMOTION}{CHECK}"),
            piece_move,
        ),
        TokenPattern::new(
            &format!(r"{mover}(?P<capture>[x:])(?P<target_file>{FILE})?(?P<target>{PIECE})(?P<ep>\s?e\.p\.)?{PROMOTION}{CHECK}"),
            capture,
        ),
    ]
});

impl Dialect for Descriptive {
    fn name(&self) -> &'static str {
        "descriptive"
    }

    fn token_patterns(&self, slot: Slot) -> &[TokenPattern] {
        if slot.is_move() {
            MOVES.as_slice()
        } else {
            separator_patterns(slot)
        }
    }
}

/// Every file a descriptive file name can stand for, queen's side first.
fn files(name: &str) -> Vec<u8> {
    match name {
        "R" => vec![0, 7],
        "N" | "Kt" => vec![1, 6],
        "B" => vec![2, 5],
        other => Coordinate::file_from_descriptive(other).into_iter().collect(),
    }
}

/// File options for an optional group: `[None]` when the group is absent.
fn file_options(captures: &Captures<'_>, name: &str) -> Vec<Option<u8>> {
    match group(captures, name) {
        Some(file) => files(file).into_iter().map(Some).collect(),
        None => vec![None],
    }
}

fn piece_type(captures: &Captures<'_>, name: &str) -> Option<PieceType> {
    group(captures, name).and_then(PieceType::from_descriptive_letter)
}

/// Common mover part: piece, plus the optional origin qualifiers. A file prefix on the
/// mover only locates pawns (`QP` is the pawn on the queen's file); for pieces it names
/// the starting side, which says nothing about where the piece stands now.
fn mover_patterns(captures: &Captures<'_>, game: &Game) -> Vec<ActionPattern> {
    let Some(piece) = piece_type(captures, "piece") else {
        return Vec::new();
    };

    let mover_files = if piece == PieceType::Pawn {
        file_options(captures, "mover_file")
    } else {
        vec![None]
    };
    let origin_files = file_options(captures, "origin_file");
    let origin_rank = group(captures, "origin_rank")
        .and_then(|r| r.parse().ok())
        .and_then(|n| Coordinate::rank_from_descriptive(game.turn(), n));

    let mut patterns = Vec::new();
    for mover_file in &mover_files {
        for origin_file in &origin_files {
            let from_file = match (mover_file, origin_file) {
                (Some(a), Some(b)) if a != b => continue,
                (Some(a), _) => Some(*a),
                (None, b) => *b,
            };
            patterns.push(ActionPattern {
                from_file,
                from_rank: origin_rank,
                ..ActionPattern::piece(piece)
            });
        }
    }
    patterns
}

fn promotion(
    captures: &Captures<'_>,
    pattern: &mut ActionPattern,
    characteristics: Characteristics,
) -> Characteristics {
    let Some(promo) = piece_type(captures, "promo") else {
        return characteristics;
    };
    pattern.promotion = Some(promo);
    let symbol = match group(captures, "promo_sep") {
        Some("(") => "()",
        Some(sep) => sep,
        None => "none",
    };
    characteristics.with(Marker::Promotion, symbol)
}

fn castle(captures: &Captures<'_>, _: &Game) -> Vec<TokenMatch> {
    let Some(text) = group(captures, "castle") else {
        return Vec::new();
    };

    let (sides, symbol) = if text.starts_with("Castles") {
        let sides = match group(captures, "castle_side") {
            Some("K" | "KR") => vec![CastleSide::KingSide],
            Some(_) => vec![CastleSide::QueenSide],
            None => vec![CastleSide::KingSide, CastleSide::QueenSide],
        };
        (sides, "Castles")
    } else if text.len() == 5 {
        (vec![CastleSide::QueenSide], &text[..1])
    } else {
        (vec![CastleSide::KingSide], &text[..1])
    };

    sides
        .into_iter()
        .map(|side| {
            let mut pattern = ActionPattern::castle(side);
            let characteristics = Characteristics::new().with(Marker::Castle, symbol);
            let characteristics = check_suffix(captures, &mut pattern, characteristics);
            TokenMatch::new(pattern, characteristics)
        })
        .collect()
}

fn piece_move(captures: &Captures<'_>, game: &Game) -> Vec<TokenMatch> {
    let Some(to_rank) = group(captures, "to_rank")
        .and_then(|r| r.parse().ok())
        .and_then(|n| Coordinate::rank_from_descriptive(game.turn(), n))
    else {
        return Vec::new();
    };
    let to_files = group(captures, "to_file").map(files).unwrap_or_default();

    let mut matches = Vec::new();
    for mover in mover_patterns(captures, game) {
        for &to_file in &to_files {
            let mut pattern = ActionPattern {
                to_file: Some(to_file),
                to_rank: Some(to_rank),
                capture: Some(false),
                ..mover
            };
            let characteristics = promotion(captures, &mut pattern, Characteristics::new());
            let characteristics = check_suffix(captures, &mut pattern, characteristics);
            matches.push(TokenMatch::new(pattern, characteristics));
        }
    }
    matches
}

/// `PxP`, `BxN`, `QxQP`. A file qualifier on the target locates pawns only.
fn capture(captures: &Captures<'_>, game: &Game) -> Vec<TokenMatch> {
    let (Some(target), Some(symbol)) = (piece_type(captures, "target"), group(captures, "capture"))
    else {
        return Vec::new();
    };

    let target_files = if target == PieceType::Pawn {
        file_options(captures, "target_file")
    } else {
        vec![None]
    };
    let en_passant = group(captures, "ep").is_some();

    let mut matches = Vec::new();
    for mover in mover_patterns(captures, game) {
        for &to_file in &target_files {
            let mut pattern = ActionPattern {
                to_file,
                capture: Some(true),
                captured: Some(target),
                ..mover
            };
            let mut characteristics = Characteristics::new().with(Marker::Capture, symbol);
            if en_passant {
                pattern.en_passant = Some(true);
                characteristics = characteristics.with(Marker::EnPassant, "e.p.");
            }
            let characteristics = promotion(captures, &mut pattern, characteristics);
            let characteristics = check_suffix(captures, &mut pattern, characteristics);
            matches.push(TokenMatch::new(pattern, characteristics));
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::pieces::Piece;

    fn sq(s: &str) -> Coordinate {
        Coordinate::from_algebraic(s).expect("valid square")
    }

    fn lan(game: &Game, transcript: &str) -> Vec<String> {
        Descriptive
            .parse(game, transcript)
            .expect("transcript parses")
            .iter()
            .map(|s| s.action.to_string())
            .collect()
    }

    #[test]
    fn test_ruy_lopez_exchange() {
        let moves = lan(
            &Game::default(),
            "1. P-K4 P-K4 2. N-KB3 N-QB3 3. B-N5 P-QR3 4. BxN QPxB 5. O-O P-B3",
        );
        assert_eq!(
            moves,
            vec![
                "e2e4", "e7e5", "g1f3", "b8c6", "f1b5", "a7a6", "b5c6", "d7c6", "e1g1", "f7f6"
            ]
        );
    }

    #[test]
    fn test_kt_spelling() {
        assert_eq!(lan(&Game::default(), "1. Kt-KB3 Kt-QB3"), vec!["g1f3", "b8c6"]);
        assert_eq!(lan(&Game::default(), "1. N-KB3 N-KB3"), vec!["g1f3", "g8f6"]);
    }

    #[test]
    fn test_ranks_count_from_the_mover() {
        let steps = Descriptive
            .parse(&Game::default(), "1. P-Q4 P-Q4")
            .expect("parses");
        assert_eq!(steps[0].game.piece_at(sq("d4")).map(|p| p.color), Some(Color::White));
        assert_eq!(steps[1].game.piece_at(sq("d5")).map(|p| p.color), Some(Color::Black));
    }

    #[test]
    fn test_pawn_file_qualifier() {
        let game = Game::from_fen("4k3/8/8/2p1p3/3P4/8/8/4K3 w - - 0 1").expect("valid FEN");
        assert_eq!(lan(&game, "PxKP"), vec!["d4e5"]);
        assert_eq!(lan(&game, "PxQBP"), vec!["d4c5"]);
        // Unqualified, the queen's side capture comes first
        assert_eq!(lan(&game, "PxP"), vec!["d4c5"]);
    }

    #[test]
    fn test_promotion_and_mate() {
        let game = Game::from_fen("7k/P7/6K1/8/8/8/8/8 w - - 0 1").expect("valid FEN");
        let steps = Descriptive.parse(&game, "P-R8=Q mate").expect("parses");
        let end = &steps[0].game;
        assert_eq!(end.piece_at(sq("a8")), Some(Piece::new(PieceType::Queen, Color::White)));
        assert!(end.is_checkmate());

        let steps = Descriptive.parse(&game, "P-R8(Kt)").expect("parses");
        assert_eq!(
            steps[0].action.as_move().and_then(|mv| mv.promotion),
            Some(PieceType::Knight)
        );
    }

    #[test]
    fn test_check_suffix() {
        let game = Game::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").expect("valid FEN");
        let steps = Descriptive.parse(&game, "R-R8 ch").expect("parses");
        assert!(steps[0].game.is_check());
        assert!(Descriptive.parse(&game, "R-R7 ch").is_err());
    }

    #[test]
    fn test_castles_word() {
        let game = Game::from_fen("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1").expect("valid FEN");
        assert_eq!(lan(&game, "Castles QR"), vec!["e1c1"]);
        assert_eq!(lan(&game, "Castles K"), vec!["e1g1"]);
        // Both sides are legal; the king's side reading is tried first
        assert_eq!(lan(&game, "Castles"), vec!["e1g1"]);
    }

    #[test]
    fn test_en_passant() {
        let game = Game::from_fen("rnbqkbnr/ppp1pppp/8/3pP3/8/8/PPPP1PPP/RNBQKBNR w KQkq d6 0 3")
            .expect("valid FEN");
        let steps = Descriptive.parse(&game, "3. PxP e.p.").expect("parses");
        assert!(
            steps[0]
                .action
                .as_move()
                .is_some_and(|mv| mv.is_en_passant_capture())
        );
    }
}
