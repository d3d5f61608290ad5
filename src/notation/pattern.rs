use crate::action::{Action, CastleSide};
use crate::coordinate::Coordinate;
use crate::game::Game;
use crate::pieces::PieceType;

/// A partial description of a move as read from a token. Every `None` field is a
/// wildcard; every set field must equal the corresponding part of the move.
///
/// `check` and `checkmate` are assertions about the position after the move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ActionPattern {
    pub piece: Option<PieceType>,
    pub from_file: Option<u8>,
    pub from_rank: Option<u8>,
    pub to_file: Option<u8>,
    pub to_rank: Option<u8>,
    pub capture: Option<bool>,
    pub captured: Option<PieceType>,
    pub en_passant: Option<bool>,
    pub castle: Option<CastleSide>,
    pub promotion: Option<PieceType>,
    pub check: Option<bool>,
    pub checkmate: Option<bool>,
}

impl ActionPattern {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn piece(piece: PieceType) -> Self {
        ActionPattern {
            piece: Some(piece),
            ..Self::default()
        }
    }

    pub fn castle(side: CastleSide) -> Self {
        ActionPattern {
            piece: Some(PieceType::King),
            castle: Some(side),
            ..Self::default()
        }
    }

    pub fn with_from(mut self, from: Coordinate) -> Self {
        self.from_file = Some(from.file);
        self.from_rank = Some(from.rank);
        self
    }

    pub fn with_to(mut self, to: Coordinate) -> Self {
        self.to_file = Some(to.file);
        self.to_rank = Some(to.rank);
        self
    }

    /// Static part of the match: everything except the check assertions. Resignations
    /// never match a move pattern.
    pub fn matches_action(&self, action: &Action) -> bool {
        let Action::Move(mv) = action else {
            return false;
        };

        fn agrees<T: PartialEq>(wanted: Option<T>, actual: T) -> bool {
            wanted.is_none_or(|w| w == actual)
        }

        agrees(self.piece, mv.piece.piece_type)
            && agrees(self.from_file, mv.from.file)
            && agrees(self.from_rank, mv.from.rank)
            && agrees(self.to_file, mv.to.file)
            && agrees(self.to_rank, mv.to.rank)
            && agrees(self.capture, mv.is_capture())
            && agrees(self.en_passant, mv.is_en_passant_capture())
            && self.captured.is_none_or(|c| mv.captured == Some(c))
            && self.castle.is_none_or(|side| mv.castle_side() == Some(side))
            && self.promotion.is_none_or(|p| mv.promotion == Some(p))
    }

    /// Check assertions against the position the move produced.
    pub fn matches_result(&self, result: &Game) -> bool {
        self.check.is_none_or(|c| c == result.is_check())
            && self.checkmate.is_none_or(|m| m == result.is_checkmate())
    }

    pub fn matches(&self, action: &Action, result: &Game) -> bool {
        self.matches_action(action) && self.matches_result(result)
    }
}
