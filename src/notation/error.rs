use thiserror::Error;

use super::characteristics::Marker;
use super::{GameStep, Slot};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("No {slot} token at offset {offset}: '{remainder}'")]
    NoGrammarMatch {
        slot: Slot,
        offset: usize,
        remainder: String,
    },
    #[error("'{token}' at offset {offset} matches no legal action (legal: {})", .legal.join(", "))]
    NoLegalAction {
        token: String,
        offset: usize,
        legal: Vec<String>,
    },
    #[error("{marker} changes from '{established}' to '{found}' at offset {offset}")]
    CharacteristicConflict {
        marker: Marker,
        established: String,
        found: String,
        offset: usize,
    },
    #[error("Transcript contains no moves")]
    EmptyTranscript,
}

impl ParseError {
    pub fn offset(&self) -> Option<usize> {
        match self {
            ParseError::NoGrammarMatch { offset, .. }
            | ParseError::NoLegalAction { offset, .. }
            | ParseError::CharacteristicConflict { offset, .. } => Some(*offset),
            ParseError::EmptyTranscript => None,
        }
    }
}

/// A failed parse, with every step resolved before the failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{error} (after {} resolved steps)", .steps.len())]
pub struct ParseFailure {
    pub steps: Vec<GameStep>,
    #[source]
    pub error: ParseError,
}
