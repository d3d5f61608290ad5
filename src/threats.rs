use arrayvec::ArrayVec;

use crate::color::Color;
use crate::coordinate::Coordinate;
use crate::layout::Layout;
use crate::pieces::{Piece, PieceType};

pub const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

pub const ROOK_DELTAS: [(i8, i8); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

pub const BISHOP_DELTAS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

pub const KING_DELTAS: [(i8, i8); 8] = [
    (0, 1),
    (0, -1),
    (1, 0),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, 1),
    (-1, -1),
];

/// Whether a threat scan may stop at the first attacker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThreatScan {
    FirstHit,
    Exhaustive,
}

/// Pieces attacking `square`. At most 16 pieces can attack one square.
pub type Threats = ArrayVec<(Coordinate, Piece), 16>;

/// Collects opposing pieces that attack `square` on behalf of `defender`.
///
/// The square itself may be empty (castle transit) or hold the defender's king.
pub fn threats_to(layout: &Layout, square: Coordinate, defender: Color, scan: ThreatScan) -> Threats {
    let attacker = defender.opposite();
    let mut found = Threats::new();

    let hit = |coord: Coordinate, piece: Piece, found: &mut Threats| -> bool {
        found.push((coord, piece));
        scan == ThreatScan::FirstHit
    };

    for (df, dr) in KNIGHT_DELTAS {
        if let Some(coord) = square.offset(df, dr) {
            if let Some(piece) = layout.get_piece(coord) {
                if piece.color == attacker
                    && piece.piece_type == PieceType::Knight
                    && hit(coord, piece, &mut found)
                {
                    return found;
                }
            }
        }
    }

    let rays = [
        (&ROOK_DELTAS, PieceType::Rook),
        (&BISHOP_DELTAS, PieceType::Bishop),
    ];
    for (deltas, slider) in rays {
        for &(df, dr) in deltas.iter() {
            let mut cursor = square;
            while let Some(coord) = cursor.offset(df, dr) {
                cursor = coord;
                let Some(piece) = layout.get_piece(coord) else {
                    continue;
                };
                if piece.color == attacker
                    && (piece.piece_type == slider || piece.piece_type == PieceType::Queen)
                    && hit(coord, piece, &mut found)
                {
                    return found;
                }
                break;
            }
        }
    }

    for (df, dr) in KING_DELTAS {
        if let Some(coord) = square.offset(df, dr) {
            if let Some(piece) = layout.get_piece(coord) {
                if piece.color == attacker
                    && piece.piece_type == PieceType::King
                    && hit(coord, piece, &mut found)
                {
                    return found;
                }
            }
        }
    }

    // An attacking pawn sits one step "ahead" of the defended square from the
    // defender's point of view.
    for df in [-1, 1] {
        if let Some(coord) = square.offset(df, defender.pawn_direction()) {
            if let Some(piece) = layout.get_piece(coord) {
                if piece.color == attacker
                    && piece.piece_type == PieceType::Pawn
                    && hit(coord, piece, &mut found)
                {
                    return found;
                }
            }
        }
    }

    found
}

pub fn is_attacked(layout: &Layout, square: Coordinate, defender: Color) -> bool {
    !threats_to(layout, square, defender, ThreatScan::FirstHit).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(s: &str) -> Coordinate {
        Coordinate::from_algebraic(s).expect("valid square")
    }

    fn layout(placement: &str) -> Layout {
        Layout::from_placement(placement).expect("valid placement")
    }

    #[test]
    fn test_rook_attack_and_block() {
        // White rook e5, black king e8, black pawn e7 blocking
        let l = layout("4k3/4p3/8/4R3/8/8/8/4K3");
        assert!(!is_attacked(&l, sq("e8"), Color::Black));
        assert!(is_attacked(&l, sq("e7"), Color::Black));
        assert!(is_attacked(&l, sq("a5"), Color::Black));
        assert!(!is_attacked(&l, sq("f6"), Color::Black));
    }

    #[test]
    fn test_friendly_piece_blocks_ray() {
        let l = layout("4k3/8/8/8/4N3/8/8/4R1K1");
        // White knight on e4 shields the e-file for the white rook
        assert!(!is_attacked(&l, sq("e8"), Color::Black));
    }

    #[test]
    fn test_bishop_and_queen_diagonals() {
        let l = layout("4k3/8/8/8/8/8/1Q6/4K3");
        assert!(is_attacked(&l, sq("h8"), Color::Black));
        assert!(is_attacked(&l, sq("a1"), Color::Black));
        assert!(is_attacked(&l, sq("b8"), Color::Black));
    }

    #[test]
    fn test_pawn_attacks_are_directional() {
        let l = layout("4k3/8/8/8/3p4/8/8/4K3");
        // Black pawn on d4 attacks c3 and e3, not c5/e5
        assert!(is_attacked(&l, sq("c3"), Color::White));
        assert!(is_attacked(&l, sq("e3"), Color::White));
        assert!(!is_attacked(&l, sq("c5"), Color::White));
        assert!(!is_attacked(&l, sq("d3"), Color::White));
    }

    #[test]
    fn test_knight_and_king_attacks() {
        let l = layout("8/8/8/3k4/8/4N3/8/4K3");
        assert!(is_attacked(&l, sq("d5"), Color::Black));
        assert!(is_attacked(&l, sq("d2"), Color::Black));
        assert!(is_attacked(&l, sq("c6"), Color::White));
    }

    #[test]
    fn test_exhaustive_collects_all_attackers() {
        // Black king e8 attacked by rook e1 and knight d6
        let l = layout("4k3/8/3N4/8/8/8/8/K3R3");
        let first = threats_to(&l, sq("e8"), Color::Black, ThreatScan::FirstHit);
        assert_eq!(first.len(), 1);
        let all = threats_to(&l, sq("e8"), Color::Black, ThreatScan::Exhaustive);
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|(c, p)| *c == sq("e1") && p.piece_type == PieceType::Rook));
        assert!(all.iter().any(|(c, p)| *c == sq("d6") && p.piece_type == PieceType::Knight));
    }
}
