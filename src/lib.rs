//! Chess rules engine with a multi-dialect move-notation parser.
//!
//! [`Game`] values are built from FEN, a figurine [`Board`] or [`Game::default`], and
//! only ever advance through [`Game::do_action`]. The [`notation`] module reads free
//! text transcripts in algebraic, descriptive, ICCF or Smith notation into a sequence
//! of [`notation::GameStep`]s.

pub mod action;
pub mod board;
pub mod color;
pub mod coordinate;
pub mod errors;
pub mod fen;
pub mod game;
pub mod layout;
pub mod notation;
pub mod outcome;
pub mod pieces;
pub mod threats;

#[cfg(feature = "serde")]
pub mod serde_support;

pub use action::{Action, CastleSide, Move, MoveFlags};
pub use board::Board;
pub use color::Color;
pub use coordinate::Coordinate;
pub use errors::{FenError, GameError, IllegalMove};
pub use game::{CastlingRights, Game};
pub use layout::Layout;
pub use notation::{Dialect, ParseError, ParseFailure, ParserConfig};
pub use outcome::GameOutcome;
pub use pieces::{Piece, PieceType};
