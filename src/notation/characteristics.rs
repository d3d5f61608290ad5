//! The stylistic fingerprint a transcript builds up as it is read.
//!
//! Every marker starts unset. The first token that uses a marker fixes its symbol; any
//! later token spelling the same marker differently is a conflict.

use std::fmt;

/// A notational convention a transcript can commit to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Marker {
    Check,
    Checkmate,
    Capture,
    Castle,
    Promotion,
    EnPassant,
    EndOfGame,
    FullMoveDot,
    MoveSeparator,
}

impl Marker {
    pub const ALL: [Marker; 9] = [
        Marker::Check,
        Marker::Checkmate,
        Marker::Capture,
        Marker::Castle,
        Marker::Promotion,
        Marker::EnPassant,
        Marker::EndOfGame,
        Marker::FullMoveDot,
        Marker::MoveSeparator,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Marker::Check => "check symbol",
            Marker::Checkmate => "checkmate symbol",
            Marker::Capture => "capture symbol",
            Marker::Castle => "castling symbol",
            Marker::Promotion => "promotion symbol",
            Marker::EnPassant => "en passant symbol",
            Marker::EndOfGame => "end of game symbol",
            Marker::FullMoveDot => "move number punctuation",
            Marker::MoveSeparator => "move separator",
        };
        write!(f, "{}", s)
    }
}

/// Two spellings of the same marker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conflict {
    pub marker: Marker,
    pub established: String,
    pub found: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Characteristics {
    markers: [Option<String>; 9],
}

impl Characteristics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, marker: Marker, symbol: impl Into<String>) -> Self {
        self.markers[marker.index()] = Some(symbol.into());
        self
    }

    pub fn get(&self, marker: Marker) -> Option<&str> {
        self.markers[marker.index()].as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.iter().all(Option::is_none)
    }

    /// Markers that are set, in [`Marker::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Marker, &str)> {
        Marker::ALL
            .into_iter()
            .filter_map(|marker| self.get(marker).map(|symbol| (marker, symbol)))
    }

    /// Folds `new` into `self`. Unset markers are recorded; a marker already set to a
    /// different symbol is a conflict.
    pub fn evolve(&self, new: &Characteristics) -> Result<Characteristics, Conflict> {
        let mut evolved = self.clone();

        for (marker, symbol) in new.iter() {
            match self.get(marker) {
                Some(established) if established != symbol => {
                    return Err(Conflict {
                        marker,
                        established: established.to_string(),
                        found: symbol.to_string(),
                    });
                }
                Some(_) => {}
                None => evolved.markers[marker.index()] = Some(symbol.to_string()),
            }
        }

        Ok(evolved)
    }
}
