//! Error types for position construction and action application.
//!
//! Notation parsing has its own error type in [`crate::notation::ParseError`].

use thiserror::Error;

use crate::color::Color;
use crate::coordinate::Coordinate;

/// Reasons a FEN record or figurine board cannot become a [`Game`](crate::game::Game).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FenError {
    #[error("Invalid FEN: expected 6 space-separated fields, got {0}")]
    WrongFieldCount(usize),
    #[error("Invalid board: expected 8 ranks, got {0}")]
    WrongRankCount(usize),
    #[error("Invalid board: rank index {0} has more than 8 squares")]
    RankTooLong(u8),
    #[error("Invalid board: rank index {0} has fewer than 8 squares")]
    RankTooShort(u8),
    #[error("Invalid piece symbol: '{0}'")]
    InvalidPiece(char),
    #[error("Pawn on the first or last rank at {0}")]
    PawnOnBackRank(Coordinate),
    #[error("{0} has {1} pieces, at most 16 allowed")]
    TooManyPieces(Color, usize),
    #[error("{0} has no king")]
    MissingKing(Color),
    #[error("{0} has more than one king")]
    DuplicateKing(Color),
    #[error("Invalid turn field: '{0}'")]
    InvalidTurn(String),
    #[error("Invalid castling field: '{0}'")]
    InvalidCastling(String),
    #[error("{0} castling right declared but king or rook is not on its original square")]
    CastlingRightContradicted(char),
    #[error("Invalid en passant field: '{0}'")]
    InvalidEnPassant(String),
    #[error("En passant target {0} is not consistent with a double pawn step")]
    UnsupportedEnPassant(Coordinate),
    #[error("Invalid half-move clock: '{0}'")]
    InvalidHalfMoveClock(String),
    #[error("Invalid full-move number: '{0}'")]
    InvalidFullMoveNumber(String),
    #[error("{0} is in check but it is not their turn")]
    OpponentInCheck(Color),
}

/// Errors from [`Game::do_action`](crate::game::Game::do_action).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Action {0} is not legal in this position")]
    IllegalAction(String),
    #[error("The game is already over")]
    GameOver,
}

/// Why the engine refused to build a candidate move. Only ever logged; an illegal
/// candidate simply never becomes part of the legal action set.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalMove {
    #[error("destination off the board")]
    OutOfBounds,
    #[error("destination holds a friendly piece")]
    FriendlyOccupied,
    #[error("path is blocked")]
    Blocked,
    #[error("piece cannot move that way")]
    InvalidGeometry,
    #[error("pawn cannot capture an empty square")]
    NothingToCapture,
    #[error("castling is not allowed")]
    CastlingNotAllowed,
    #[error("castling through an attacked square")]
    CastlingThroughCheck,
    #[error("promotion piece missing or invalid")]
    InvalidPromotion,
    #[error("move leaves the king in check")]
    SelfCheck,
}
