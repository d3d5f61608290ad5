//! Backtracking transcript reader.
//!
//! Several interpretations ("alternatives") of a transcript can be alive at once, e.g.
//! when a descriptive `N-B3` could mean either bishop file. Each alternative owns its
//! game, its characteristics and a persistent linked history of resolved steps, so
//! forking an alternative never copies its history. Alternatives die when a later
//! token has no legal reading for them; the first survivor is the result.
//!
//! Alternatives stay in a stable order: parent order, then pattern table order, then
//! extractor order, then the order of [`Game::actions`].

use std::num::NonZeroUsize;
use std::rc::Rc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace, warn};

use super::characteristics::{Characteristics, Conflict, Marker};
use super::error::{ParseError, ParseFailure};
use super::{Dialect, GameStep, Slot};
use crate::action::Action;
use crate::color::Color;
use crate::game::Game;

pub const DEFAULT_MAX_ALTERNATIVES: usize = 64;

const REMAINDER_PREVIEW: usize = 24;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParserConfig {
    /// Upper bound on live alternatives. Extra alternatives are dropped from the end
    /// of the stable order.
    pub max_alternatives: NonZeroUsize,
}

impl ParserConfig {
    pub fn with_max_alternatives(max_alternatives: NonZeroUsize) -> Self {
        ParserConfig { max_alternatives }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            max_alternatives: NonZeroUsize::new(DEFAULT_MAX_ALTERNATIVES)
                .unwrap_or(NonZeroUsize::MIN),
        }
    }
}

struct StepNode {
    step: GameStep,
    parent: Option<Rc<StepNode>>,
}

#[derive(Clone)]
struct Alternative {
    game: Game,
    history: Option<Rc<StepNode>>,
    characteristics: Characteristics,
}

impl Alternative {
    fn root(game: Game) -> Self {
        Alternative {
            game,
            history: None,
            characteristics: Characteristics::new(),
        }
    }

    fn extend(
        &self,
        token: &str,
        action: Action,
        game: Game,
        characteristics: Characteristics,
    ) -> Self {
        let node = StepNode {
            step: GameStep {
                token: token.to_string(),
                action,
                game: game.clone(),
            },
            parent: self.history.clone(),
        };
        Alternative {
            game,
            history: Some(Rc::new(node)),
            characteristics,
        }
    }

    fn steps(&self) -> Vec<GameStep> {
        let mut steps = Vec::new();
        let mut cursor = self.history.as_deref();
        while let Some(node) = cursor {
            steps.push(node.step.clone());
            cursor = node.parent.as_deref();
        }
        steps.reverse();
        steps
    }
}

pub fn parse(
    dialect: &dyn Dialect,
    game: &Game,
    transcript: &str,
) -> Result<Vec<GameStep>, ParseFailure> {
    parse_with_config(dialect, game, transcript, &ParserConfig::default())
}

pub fn parse_with_config(
    dialect: &dyn Dialect,
    game: &Game,
    transcript: &str,
    config: &ParserConfig,
) -> Result<Vec<GameStep>, ParseFailure> {
    let mut alternatives = vec![Alternative::root(game.clone())];
    let mut slot = Slot::initial(game.turn());
    let mut offset = 0;

    debug!(dialect = dialect.name(), %slot, "parsing transcript");

    loop {
        let rest = &transcript[offset..];
        if rest.trim().is_empty() {
            break;
        }

        if let Some(conclusion) = Conclusion::read(rest) {
            let leading = rest.len() - rest.trim_start().len();
            alternatives = conclude(dialect, &alternatives, &conclusion, offset + leading)
                .map_err(|error| failure(&alternatives, error))?;
            break;
        }

        let (next, advance) = if slot.is_move() {
            read_move(dialect, &alternatives, slot, rest, offset, config)
        } else {
            read_separator(dialect, &alternatives, slot, rest, offset)
        }
        .map_err(|error| failure(&alternatives, error))?;

        alternatives = next;
        offset += advance;
        slot = slot.next();
    }

    let steps = alternatives.first().map(Alternative::steps).unwrap_or_default();
    if steps.is_empty() {
        return Err(ParseFailure {
            steps,
            error: ParseError::EmptyTranscript,
        });
    }

    debug!(
        dialect = dialect.name(),
        steps = steps.len(),
        alternatives = alternatives.len(),
        "transcript parsed"
    );
    Ok(steps)
}

fn failure(alternatives: &[Alternative], error: ParseError) -> ParseFailure {
    ParseFailure {
        steps: alternatives.first().map(Alternative::steps).unwrap_or_default(),
        error,
    }
}

fn conflict_error(conflict: Conflict, offset: usize) -> ParseError {
    ParseError::CharacteristicConflict {
        marker: conflict.marker,
        established: conflict.established,
        found: conflict.found,
        offset,
    }
}

fn preview(rest: &str) -> String {
    rest.chars().take(REMAINDER_PREVIEW).collect()
}

fn legal_actions(alternatives: &[Alternative]) -> Vec<String> {
    alternatives
        .first()
        .map(|alt| alt.game.actions().iter().map(Action::to_string).collect())
        .unwrap_or_default()
}

/// Reads one move token for every alternative. Returns the surviving alternatives and
/// the token length.
fn read_move(
    dialect: &dyn Dialect,
    alternatives: &[Alternative],
    slot: Slot,
    rest: &str,
    offset: usize,
    config: &ParserConfig,
) -> Result<(Vec<Alternative>, usize), ParseError> {
    let mut candidates: Vec<(usize, usize, Alternative)> = Vec::new();
    let mut longest_token: Option<&str> = None;
    let mut conflict: Option<Conflict> = None;

    for (parent, alternative) in alternatives.iter().enumerate() {
        for pattern in dialect.token_patterns(slot) {
            let Some(captures) = pattern.captures(rest) else {
                continue;
            };
            let len = captures.get(0).map_or(0, |m| m.end());
            if len == 0 {
                continue;
            }
            if longest_token.is_none_or(|t| len > t.len()) {
                longest_token = Some(&rest[..len]);
            }
            let token = rest[..len].trim();

            for token_match in pattern.extract(&captures, &alternative.game) {
                for action in alternative.game.actions() {
                    if !token_match.pattern.matches_action(action) {
                        continue;
                    }
                    let duplicate = candidates.iter().any(|(p, l, alt)| {
                        *p == parent
                            && *l == len
                            && alt.history.as_ref().is_some_and(|h| h.step.action == *action)
                    });
                    if duplicate {
                        continue;
                    }
                    let Ok(result) = alternative.game.do_action(action) else {
                        continue;
                    };
                    if !token_match.pattern.matches_result(&result) {
                        continue;
                    }
                    let evolved = dialect
                        .evolve(&alternative.characteristics, &token_match.characteristics);
                    match evolved {
                        Ok(characteristics) => candidates.push((
                            parent,
                            len,
                            alternative.extend(token, *action, result, characteristics),
                        )),
                        Err(found) => {
                            conflict.get_or_insert(found);
                        }
                    }
                }
            }
        }
    }

    let Some(longest) = candidates.iter().map(|(_, len, _)| *len).max() else {
        return Err(match (conflict, longest_token) {
            (Some(conflict), _) => conflict_error(conflict, offset),
            (None, Some(token)) => ParseError::NoLegalAction {
                token: token.trim().to_string(),
                offset,
                legal: legal_actions(alternatives),
            },
            (None, None) => ParseError::NoGrammarMatch {
                slot,
                offset,
                remainder: preview(rest),
            },
        });
    };

    let mut survivors: Vec<Alternative> = candidates
        .into_iter()
        .filter(|(_, len, _)| *len == longest)
        .map(|(_, _, alt)| alt)
        .collect();

    let max = config.max_alternatives.get();
    if survivors.len() > max {
        warn!(
            offset,
            alternatives = survivors.len(),
            max,
            "too many alternatives, dropping the excess"
        );
        survivors.truncate(max);
    }

    debug!(
        %slot,
        offset,
        token = rest[..longest].trim(),
        alternatives = survivors.len(),
        "move token resolved"
    );
    Ok((survivors, longest))
}

/// Reads a non-move slot. The first matching pattern wins.
fn read_separator(
    dialect: &dyn Dialect,
    alternatives: &[Alternative],
    slot: Slot,
    rest: &str,
    offset: usize,
) -> Result<(Vec<Alternative>, usize), ParseError> {
    let Some((pattern, captures)) = dialect
        .token_patterns(slot)
        .iter()
        .find_map(|p| p.captures(rest).map(|c| (p, c)))
    else {
        return Err(ParseError::NoGrammarMatch {
            slot,
            offset,
            remainder: preview(rest),
        });
    };
    let len = captures.get(0).map_or(0, |m| m.end());

    let mut survivors = Vec::with_capacity(alternatives.len());
    let mut conflict = None;
    for alternative in alternatives {
        let characteristics = pattern
            .extract(&captures, &alternative.game)
            .into_iter()
            .next()
            .map(|m| m.characteristics)
            .unwrap_or_default();
        match dialect.evolve(&alternative.characteristics, &characteristics) {
            Ok(characteristics) => survivors.push(Alternative {
                characteristics,
                ..alternative.clone()
            }),
            Err(found) => {
                conflict.get_or_insert(found);
            }
        }
    }

    if survivors.is_empty() {
        return Err(match conflict {
            Some(conflict) => conflict_error(conflict, offset),
            None => ParseError::NoGrammarMatch {
                slot,
                offset,
                remainder: preview(rest),
            },
        });
    }

    trace!(%slot, offset, len, "separator");
    Ok((survivors, len))
}

/// A trailing result or resignation token.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Conclusion {
    Win { winner: Color, token: String },
    Draw { token: String },
    Resignation { token: String },
}

static CONCLUSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\A\s*(?:(?P<white>1-0)|(?P<black>0-1)|(?P<draw>1/2-1/2|½-½)",
        r"|(?P<resign>[Rr]esigns|[Rr]esigned)\.?)\s*\z",
    ))
        .unwrap_or_else(|e| panic!("invalid conclusion pattern: {e}"))
});

impl Conclusion {
    fn read(rest: &str) -> Option<Conclusion> {
        let captures = CONCLUSION.captures(rest)?;
        let token = rest.trim().to_string();

        if captures.name("white").is_some() {
            Some(Conclusion::Win {
                winner: Color::White,
                token,
            })
        } else if captures.name("black").is_some() {
            Some(Conclusion::Win {
                winner: Color::Black,
                token,
            })
        } else if captures.name("draw").is_some() {
            Some(Conclusion::Draw { token })
        } else {
            Some(Conclusion::Resignation { token })
        }
    }

    fn token(&self) -> &str {
        match self {
            Conclusion::Win { token, .. }
            | Conclusion::Draw { token }
            | Conclusion::Resignation { token } => token,
        }
    }
}

/// Applies a trailing result to every alternative. A result that the game has already
/// reached adds no step; a win or resignation in a live game is the side to move
/// resigning. Alternatives whose position contradicts the result are dropped.
fn conclude(
    dialect: &dyn Dialect,
    alternatives: &[Alternative],
    conclusion: &Conclusion,
    offset: usize,
) -> Result<Vec<Alternative>, ParseError> {
    let marker = Characteristics::new().with(Marker::EndOfGame, conclusion.token());
    let mut survivors = Vec::new();
    let mut conflict = None;

    for alternative in alternatives {
        let game = &alternative.game;
        let resigns = match conclusion {
            Conclusion::Win { winner, .. } if game.is_game_over() => {
                if game.game_over_winner() != Some(*winner) {
                    continue;
                }
                false
            }
            Conclusion::Win { winner, .. } => {
                if game.turn() == *winner {
                    continue;
                }
                true
            }
            Conclusion::Draw { .. } => {
                if game.is_game_over() && game.game_over_winner().is_some() {
                    continue;
                }
                false
            }
            Conclusion::Resignation { .. } => {
                if game.is_game_over() {
                    continue;
                }
                true
            }
        };

        let characteristics = match dialect.evolve(&alternative.characteristics, &marker) {
            Ok(characteristics) => characteristics,
            Err(found) => {
                conflict.get_or_insert(found);
                continue;
            }
        };

        if resigns {
            let action = Action::Resign(game.turn());
            let Ok(result) = game.do_action(&action) else {
                continue;
            };
            survivors.push(alternative.extend(
                conclusion.token(),
                action,
                result,
                characteristics,
            ));
        } else {
            survivors.push(Alternative {
                characteristics,
                ..alternative.clone()
            });
        }
    }

    if survivors.is_empty() {
        return Err(match conflict {
            Some(conflict) => conflict_error(conflict, offset),
            None => ParseError::NoLegalAction {
                token: conclusion.token().to_string(),
                offset,
                legal: legal_actions(alternatives),
            },
        });
    }

    debug!(token = conclusion.token(), offset, "transcript concluded");
    Ok(survivors)
}
