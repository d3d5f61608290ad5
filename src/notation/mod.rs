//! Move-notation parsing.
//!
//! A transcript is read as a repeating cycle of [`Slot`]s. Each [`Dialect`] supplies an
//! ordered table of regex [`TokenPattern`]s per slot; move tokens become
//! [`ActionPattern`]s that are matched against the legal actions of every live
//! interpretation of the game so far. See [`parser`] for the search itself.

pub mod algebraic;
pub mod characteristics;
pub mod descriptive;
pub mod error;
pub mod iccf;
pub mod parser;
pub mod pattern;
pub mod smith;

use std::fmt;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::action::Action;
use crate::color::Color;
use crate::game::Game;

pub use algebraic::Algebraic;
pub use characteristics::{Characteristics, Conflict, Marker};
pub use descriptive::Descriptive;
pub use error::{ParseError, ParseFailure};
pub use iccf::Iccf;
pub use parser::{ParserConfig, parse, parse_with_config};
pub use pattern::ActionPattern;
pub use smith::Smith;

/// Position in the five-slot cycle a transcript is read in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    FullMoveStart,
    WhiteMove,
    HalfMoveSeparator,
    BlackMove,
    FullMoveSeparator,
}

impl Slot {
    /// Slot a transcript starts in. With Black to move the white half is skipped.
    pub fn initial(turn: Color) -> Slot {
        match turn {
            Color::White => Slot::FullMoveStart,
            Color::Black => Slot::HalfMoveSeparator,
        }
    }

    pub fn next(self) -> Slot {
        match self {
            Slot::FullMoveStart => Slot::WhiteMove,
            Slot::WhiteMove => Slot::HalfMoveSeparator,
            Slot::HalfMoveSeparator => Slot::BlackMove,
            Slot::BlackMove => Slot::FullMoveSeparator,
            Slot::FullMoveSeparator => Slot::FullMoveStart,
        }
    }

    pub fn is_move(self) -> bool {
        matches!(self, Slot::WhiteMove | Slot::BlackMove)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Slot::FullMoveStart => "move number",
            Slot::WhiteMove => "white move",
            Slot::HalfMoveSeparator => "half-move separator",
            Slot::BlackMove => "black move",
            Slot::FullMoveSeparator => "full-move separator",
        };
        write!(f, "{}", s)
    }
}

/// One interpretation of a token: what the move looks like, and which conventions the
/// token commits the transcript to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TokenMatch {
    pub pattern: ActionPattern,
    pub characteristics: Characteristics,
}

impl TokenMatch {
    pub fn new(pattern: ActionPattern, characteristics: Characteristics) -> Self {
        TokenMatch {
            pattern,
            characteristics,
        }
    }

    /// A separator match, which only carries characteristics.
    pub fn marker(characteristics: Characteristics) -> Self {
        TokenMatch {
            pattern: ActionPattern::any(),
            characteristics,
        }
    }
}

/// Turns the capture groups of a token into candidate interpretations. The game is the
/// position the token is read in; descriptive ranks depend on whose move it is.
pub type Extractor = fn(&Captures<'_>, &Game) -> Vec<TokenMatch>;

pub struct TokenPattern {
    regex: Regex,
    extract: Extractor,
}

impl TokenPattern {
    /// Compiles `pattern` anchored at the start of the remaining input.
    ///
    /// Patterns are literals in the dialect tables, so a compile failure is a
    /// programming error.
    pub fn new(pattern: &str, extract: Extractor) -> Self {
        let regex = Regex::new(&format!(r"\A(?:{pattern})"))
            .unwrap_or_else(|e| panic!("invalid token pattern {pattern:?}: {e}"));
        TokenPattern { regex, extract }
    }

    pub fn captures<'t>(&self, text: &'t str) -> Option<Captures<'t>> {
        self.regex.captures(text)
    }

    pub fn extract(&self, captures: &Captures<'_>, game: &Game) -> Vec<TokenMatch> {
        (self.extract)(captures, game)
    }
}

impl fmt::Debug for TokenPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TokenPattern").field(&self.regex.as_str()).finish()
    }
}

/// A resolved ply: the text it was read from, the action, and the position after it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameStep {
    pub token: String,
    pub action: Action,
    pub game: Game,
}

pub trait Dialect {
    fn name(&self) -> &'static str;

    /// Patterns for `slot`, in priority order.
    fn token_patterns(&self, slot: Slot) -> &[TokenPattern];

    fn evolve(
        &self,
        current: &Characteristics,
        new: &Characteristics,
    ) -> Result<Characteristics, Conflict> {
        current.evolve(new)
    }

    fn parse(&self, game: &Game, transcript: &str) -> Result<Vec<GameStep>, ParseFailure>
    where
        Self: Sized,
    {
        parse(self, game, transcript)
    }
}

pub fn dialects() -> [&'static dyn Dialect; 4] {
    [&Algebraic, &Descriptive, &Iccf, &Smith]
}

/// Tries every dialect in turn and returns the name of the first that reads the whole
/// transcript. On failure the error from the dialect that got furthest is returned.
pub fn parse_any(
    game: &Game,
    transcript: &str,
) -> Result<(&'static str, Vec<GameStep>), ParseFailure> {
    let mut best: Option<ParseFailure> = None;

    for dialect in dialects() {
        match parse(dialect, game, transcript) {
            Ok(steps) => return Ok((dialect.name(), steps)),
            Err(failure) => {
                if best
                    .as_ref()
                    .is_none_or(|b| failure.steps.len() > b.steps.len())
                {
                    best = Some(failure);
                }
            }
        }
    }

    Err(best.unwrap_or(ParseFailure {
        steps: Vec::new(),
        error: ParseError::EmptyTranscript,
    }))
}

pub(crate) fn group<'t>(captures: &Captures<'t>, name: &str) -> Option<&'t str> {
    captures.name(name).map(|m| m.as_str())
}

/// Reads the `check` group shared by the dialects that annotate checks and mates.
pub(crate) fn check_suffix(
    captures: &Captures<'_>,
    pattern: &mut ActionPattern,
    characteristics: Characteristics,
) -> Characteristics {
    match group(captures, "check") {
        Some(symbol @ ("+" | "†" | "ch")) => {
            pattern.check = Some(true);
            characteristics.with(Marker::Check, symbol)
        }
        Some(symbol @ ("#" | "‡" | "++" | "mate")) => {
            pattern.checkmate = Some(true);
            characteristics.with(Marker::Checkmate, symbol)
        }
        _ => characteristics,
    }
}

fn dot(_: &Captures<'_>, _: &Game) -> Vec<TokenMatch> {
    vec![TokenMatch::marker(
        Characteristics::new().with(Marker::FullMoveDot, "."),
    )]
}

fn no_dot(_: &Captures<'_>, _: &Game) -> Vec<TokenMatch> {
    vec![TokenMatch::marker(
        Characteristics::new().with(Marker::FullMoveDot, "none"),
    )]
}

fn newline(_: &Captures<'_>, _: &Game) -> Vec<TokenMatch> {
    vec![TokenMatch::marker(
        Characteristics::new().with(Marker::MoveSeparator, "newline"),
    )]
}

fn space(_: &Captures<'_>, _: &Game) -> Vec<TokenMatch> {
    vec![TokenMatch::marker(
        Characteristics::new().with(Marker::MoveSeparator, "space"),
    )]
}

fn nothing(_: &Captures<'_>, _: &Game) -> Vec<TokenMatch> {
    vec![TokenMatch::marker(Characteristics::new())]
}

// A bare move number needs trailing whitespace so it never eats the start of a
// castling token like `0-0`.
static FULL_MOVE_START: Lazy<Vec<TokenPattern>> = Lazy::new(|| {
    vec![
        TokenPattern::new(r"\d+\.\s*", dot),
        TokenPattern::new(r"\d+\s+", no_dot),
        TokenPattern::new(r"", nothing),
    ]
});

static HALF_MOVE_SEPARATOR: Lazy<Vec<TokenPattern>> = Lazy::new(|| {
    vec![
        TokenPattern::new(r"\s*\d+\s*(?:\.\.\.|…)\s*", nothing),
        TokenPattern::new(r"\s*", nothing),
    ]
});

static FULL_MOVE_SEPARATOR: Lazy<Vec<TokenPattern>> = Lazy::new(|| {
    vec![
        TokenPattern::new(r"[ \t]*\r?\n\s*", newline),
        TokenPattern::new(r"[ \t]+", space),
        TokenPattern::new(r"", nothing),
    ]
});

/// Separator patterns shared by the dialects. Move slots have none.
pub(crate) fn separator_patterns(slot: Slot) -> &'static [TokenPattern] {
    match slot {
        Slot::FullMoveStart => FULL_MOVE_START.as_slice(),
        Slot::HalfMoveSeparator => HALF_MOVE_SEPARATOR.as_slice(),
        Slot::FullMoveSeparator => FULL_MOVE_SEPARATOR.as_slice(),
        Slot::WhiteMove | Slot::BlackMove => &[],
    }
}
