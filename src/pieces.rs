use crate::color::Color;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// Promotion candidates in the order the engine generates them.
pub const PROMOTION_TYPES: [PieceType; 4] = [
    PieceType::Queen,
    PieceType::Rook,
    PieceType::Bishop,
    PieceType::Knight,
];

impl PieceType {
    pub fn is_valid_promotion(&self) -> bool {
        !matches!(self, PieceType::Pawn | PieceType::King)
    }

    /// Letter used by algebraic and Smith notation. Pawns have none.
    pub fn algebraic_letter(&self) -> Option<char> {
        match self {
            PieceType::Pawn => None,
            PieceType::Knight => Some('N'),
            PieceType::Bishop => Some('B'),
            PieceType::Rook => Some('R'),
            PieceType::Queen => Some('Q'),
            PieceType::King => Some('K'),
        }
    }

    pub fn from_algebraic_letter(c: char) -> Option<PieceType> {
        match c {
            'P' => Some(PieceType::Pawn),
            'N' => Some(PieceType::Knight),
            'B' => Some(PieceType::Bishop),
            'R' => Some(PieceType::Rook),
            'Q' => Some(PieceType::Queen),
            'K' => Some(PieceType::King),
            _ => None,
        }
    }

    pub fn descriptive_letter(&self) -> &'static str {
        match self {
            PieceType::Pawn => "P",
            PieceType::Knight => "N",
            PieceType::Bishop => "B",
            PieceType::Rook => "R",
            PieceType::Queen => "Q",
            PieceType::King => "K",
        }
    }

    pub fn from_descriptive_letter(s: &str) -> Option<PieceType> {
        match s {
            "P" => Some(PieceType::Pawn),
            "N" | "Kt" => Some(PieceType::Knight),
            "B" => Some(PieceType::Bishop),
            "R" => Some(PieceType::Rook),
            "Q" => Some(PieceType::Queen),
            "K" => Some(PieceType::King),
            _ => None,
        }
    }

    /// ICCF promotion digit: 1 queen, 2 rook, 3 bishop, 4 knight.
    pub fn iccf_digit(&self) -> Option<u8> {
        match self {
            PieceType::Queen => Some(1),
            PieceType::Rook => Some(2),
            PieceType::Bishop => Some(3),
            PieceType::Knight => Some(4),
            _ => None,
        }
    }

    pub fn from_iccf_digit(d: u8) -> Option<PieceType> {
        match d {
            1 => Some(PieceType::Queen),
            2 => Some(PieceType::Rook),
            3 => Some(PieceType::Bishop),
            4 => Some(PieceType::Knight),
            _ => None,
        }
    }

    /// Figurine of either color, as accepted in figurine algebraic notation.
    pub fn from_figurine(c: char) -> Option<PieceType> {
        Piece::from_figurine(c).map(|p| p.piece_type)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Piece {
    pub piece_type: PieceType,
    pub color: Color,
}

impl Piece {
    pub fn new(piece_type: PieceType, color: Color) -> Self {
        Piece { piece_type, color }
    }

    pub fn to_char(&self) -> char {
        let c = match self.piece_type {
            PieceType::Pawn => 'p',
            PieceType::Knight => 'n',
            PieceType::Bishop => 'b',
            PieceType::Rook => 'r',
            PieceType::Queen => 'q',
            PieceType::King => 'k',
        };

        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };

        let piece_type = match c.to_ascii_lowercase() {
            'p' => PieceType::Pawn,
            'n' => PieceType::Knight,
            'b' => PieceType::Bishop,
            'r' => PieceType::Rook,
            'q' => PieceType::Queen,
            'k' => PieceType::King,
            _ => return None,
        };

        Some(Piece::new(piece_type, color))
    }

    pub fn figurine(&self) -> char {
        match (self.color, self.piece_type) {
            (Color::White, PieceType::King) => '♔',
            (Color::White, PieceType::Queen) => '♕',
            (Color::White, PieceType::Rook) => '♖',
            (Color::White, PieceType::Bishop) => '♗',
            (Color::White, PieceType::Knight) => '♘',
            (Color::White, PieceType::Pawn) => '♙',
            (Color::Black, PieceType::King) => '♚',
            (Color::Black, PieceType::Queen) => '♛',
            (Color::Black, PieceType::Rook) => '♜',
            (Color::Black, PieceType::Bishop) => '♝',
            (Color::Black, PieceType::Knight) => '♞',
            (Color::Black, PieceType::Pawn) => '♟',
        }
    }

    pub fn from_figurine(c: char) -> Option<Self> {
        let (piece_type, color) = match c {
            '♔' => (PieceType::King, Color::White),
            '♕' => (PieceType::Queen, Color::White),
            '♖' => (PieceType::Rook, Color::White),
            '♗' => (PieceType::Bishop, Color::White),
            '♘' => (PieceType::Knight, Color::White),
            '♙' => (PieceType::Pawn, Color::White),
            '♚' => (PieceType::King, Color::Black),
            '♛' => (PieceType::Queen, Color::Black),
            '♜' => (PieceType::Rook, Color::Black),
            '♝' => (PieceType::Bishop, Color::Black),
            '♞' => (PieceType::Knight, Color::Black),
            '♟' => (PieceType::Pawn, Color::Black),
            _ => return None,
        };
        Some(Piece::new(piece_type, color))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_piece_creation() {
        let piece = Piece::new(PieceType::King, Color::White);
        assert_eq!(piece.piece_type, PieceType::King);
        assert_eq!(piece.color, Color::White);
    }

    #[rstest]
    #[case('K', PieceType::King, Color::White)]
    #[case('k', PieceType::King, Color::Black)]
    #[case('Q', PieceType::Queen, Color::White)]
    #[case('r', PieceType::Rook, Color::Black)]
    #[case('B', PieceType::Bishop, Color::White)]
    #[case('n', PieceType::Knight, Color::Black)]
    #[case('P', PieceType::Pawn, Color::White)]
    fn test_piece_char_round_trip(
        #[case] c: char,
        #[case] piece_type: PieceType,
        #[case] color: Color,
    ) {
        let piece = Piece::new(piece_type, color);
        assert_eq!(piece.to_char(), c);
        assert_eq!(Piece::from_char(c), Some(piece));
        assert_eq!(Piece::from_figurine(piece.figurine()), Some(piece));
    }

    #[test]
    fn test_piece_from_char_invalid() {
        assert_eq!(Piece::from_char('x'), None);
        assert_eq!(Piece::from_figurine('x'), None);
    }

    #[test]
    fn test_promotion_validity() {
        assert!(PieceType::Queen.is_valid_promotion());
        assert!(PieceType::Knight.is_valid_promotion());
        assert!(!PieceType::Pawn.is_valid_promotion());
        assert!(!PieceType::King.is_valid_promotion());
    }

    #[test]
    fn test_notation_letters() {
        assert_eq!(PieceType::Pawn.algebraic_letter(), None);
        assert_eq!(PieceType::Knight.algebraic_letter(), Some('N'));
        assert_eq!(PieceType::from_descriptive_letter("Kt"), Some(PieceType::Knight));
        assert_eq!(PieceType::from_iccf_digit(3), Some(PieceType::Bishop));
        assert_eq!(PieceType::Rook.iccf_digit(), Some(2));
        assert_eq!(PieceType::King.iccf_digit(), None);
    }
}
