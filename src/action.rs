use std::fmt;

use bitflags::bitflags;

use crate::color::Color;
use crate::coordinate::Coordinate;
use crate::pieces::{Piece, PieceType};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct MoveFlags: u8 {
        const CAPTURE = 0b00000001;
        /// Double pawn step; opens an en passant window for the opponent.
        const DOUBLE_STEP = 0b00000010;
        const EN_PASSANT_CAPTURE = 0b00000100;
        const CASTLE_KING_SIDE = 0b00001000;
        const CASTLE_QUEEN_SIDE = 0b00010000;
        const PROMOTION = 0b00100000;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CastleSide {
    KingSide,
    QueenSide,
}

impl CastleSide {
    /// File the king lands on.
    pub fn king_destination_file(&self) -> u8 {
        match self {
            CastleSide::KingSide => 6,
            CastleSide::QueenSide => 2,
        }
    }

    pub fn rook_start_file(&self) -> u8 {
        match self {
            CastleSide::KingSide => 7,
            CastleSide::QueenSide => 0,
        }
    }

    pub fn rook_destination_file(&self) -> u8 {
        match self {
            CastleSide::KingSide => 5,
            CastleSide::QueenSide => 3,
        }
    }
}

/// One fully described piece move, as produced by the rules engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Move {
    pub piece: Piece,
    pub from: Coordinate,
    pub to: Coordinate,
    pub flags: MoveFlags,
    pub promotion: Option<PieceType>,
    pub captured: Option<PieceType>,
}

impl Move {
    pub fn new(piece: Piece, from: Coordinate, to: Coordinate) -> Self {
        Move {
            piece,
            from,
            to,
            flags: MoveFlags::empty(),
            promotion: None,
            captured: None,
        }
    }

    pub fn is_capture(&self) -> bool {
        self.flags.contains(MoveFlags::CAPTURE)
    }

    pub fn is_en_passant_capture(&self) -> bool {
        self.flags.contains(MoveFlags::EN_PASSANT_CAPTURE)
    }

    pub fn is_double_step(&self) -> bool {
        self.flags.contains(MoveFlags::DOUBLE_STEP)
    }

    pub fn castle_side(&self) -> Option<CastleSide> {
        if self.flags.contains(MoveFlags::CASTLE_KING_SIDE) {
            Some(CastleSide::KingSide)
        } else if self.flags.contains(MoveFlags::CASTLE_QUEEN_SIDE) {
            Some(CastleSide::QueenSide)
        } else {
            None
        }
    }

    /// Square of the piece removed by this move, if any. Differs from `to` only for
    /// en passant, where the victim sits one rank behind the destination.
    pub fn captured_square(&self) -> Option<Coordinate> {
        if self.is_en_passant_capture() {
            self.to.offset(0, -self.piece.color.pawn_direction())
        } else if self.is_capture() {
            Some(self.to)
        } else {
            None
        }
    }

    /// Long algebraic form, e.g. `e2e4` or `e7e8q`.
    pub fn to_lan(&self) -> String {
        let mut lan = format!("{}{}", self.from.to_algebraic(), self.to.to_algebraic());

        if let Some(promo) = self.promotion {
            lan.push(Piece::new(promo, Color::Black).to_char());
        }

        lan
    }

    /// ICCF numeric form, e.g. `5254`, with a trailing promotion digit.
    pub fn to_iccf(&self) -> String {
        let mut iccf = format!("{}{}", self.from.to_iccf(), self.to.to_iccf());

        if let Some(digit) = self.promotion.and_then(|promo| promo.iccf_digit()) {
            iccf.push_str(&digit.to_string());
        }

        iccf
    }

    /// Smith notation: squares, then the captured piece letter, then a castle, en passant
    /// or promotion suffix.
    pub fn to_smith(&self) -> String {
        let mut smith = format!("{}{}", self.from.to_algebraic(), self.to.to_algebraic());

        if let Some(captured) = self.captured {
            smith.push(Piece::new(captured, Color::Black).to_char());
        }

        match self.castle_side() {
            Some(CastleSide::KingSide) => smith.push('c'),
            Some(CastleSide::QueenSide) => smith.push('C'),
            None => {}
        }

        if self.is_en_passant_capture() {
            smith.push('E');
        }

        if let Some(promo) = self.promotion {
            smith.push(Piece::new(promo, Color::White).to_char());
        }

        smith
    }
}

/// A single ply: either a piece move or a resignation by the side to move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    Move(Move),
    Resign(Color),
}

impl Action {
    pub fn color(&self) -> Color {
        match self {
            Action::Move(mv) => mv.piece.color,
            Action::Resign(color) => *color,
        }
    }

    pub fn is_resign(&self) -> bool {
        matches!(self, Action::Resign(_))
    }

    pub fn as_move(&self) -> Option<&Move> {
        match self {
            Action::Move(mv) => Some(mv),
            Action::Resign(_) => None,
        }
    }

    pub fn to_smith(&self) -> String {
        match self {
            Action::Move(mv) => mv.to_smith(),
            Action::Resign(_) => "resign".to_string(),
        }
    }
}

impl From<Move> for Action {
    fn from(mv: Move) -> Self {
        Action::Move(mv)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_lan())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Move(mv) => write!(f, "{}", mv),
            Action::Resign(color) => write!(f, "{} resigns", color),
        }
    }
}
