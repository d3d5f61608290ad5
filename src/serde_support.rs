use crate::action::MoveFlags;
use crate::game::Game;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Serialize Game as FEN string
impl Serialize for Game {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_fen())
    }
}

/// Deserialize Game from FEN string
impl<'de> Deserialize<'de> for Game {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fen = String::deserialize(deserializer)?;
        Game::from_fen(&fen).map_err(serde::de::Error::custom)
    }
}

/// Move flags travel as their raw bits. Deserialized actions are still only applied
/// through [`Game::do_action`], which rejects anything not in [`Game::actions`].
impl Serialize for MoveFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.bits())
    }
}

impl<'de> Deserialize<'de> for MoveFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        MoveFlags::from_bits(bits)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown move flags {bits:#b}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::board::Board;
    use crate::coordinate::Coordinate;

    fn sq(s: &str) -> Coordinate {
        Coordinate::from_algebraic(s).expect("valid square")
    }

    #[test]
    fn test_game_serde() {
        let game = Game::default();
        let json = serde_json::to_string(&game).expect("serializes");
        assert_eq!(
            json,
            "\"rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1\""
        );

        let game2: Game = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(game, game2);
    }

    #[test]
    fn test_invalid_fen_rejected() {
        let result: Result<Game, _> = serde_json::from_str("\"8/8/8/8/8/8/8/8 w - - 0 1\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_action_serde() {
        let game = Game::default();
        let action = game.find_action(sq("e2"), sq("e4"), None).expect("legal");

        let json = serde_json::to_string(&action).expect("serializes");
        assert!(json.contains("\"Move\""));

        let back: Action = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, action);
        assert!(game.do_action(&back).is_ok());

        let resign = game.actions().last().copied().expect("resignation");
        let json = serde_json::to_string(&resign).expect("serializes");
        let back: Action = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, resign);
    }

    #[test]
    fn test_game_roundtrip_after_moves() {
        let mut game = Game::default();
        for (from, to) in [("e2", "e4"), ("e7", "e5"), ("g1", "f3"), ("b8", "c6")] {
            let action = game.find_action(sq(from), sq(to), None).expect("legal");
            game = game.do_action(&action).expect("applies");
        }

        let json = serde_json::to_string(&game).expect("serializes");
        let game2: Game = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(game.to_fen(), game2.to_fen());
    }

    #[test]
    fn test_board_serde() {
        let board = Game::default().to_board();
        let json = serde_json::to_string(&board).expect("serializes");
        let back: Board = serde_json::from_str(&json).expect("deserializes");
        assert_eq!(back, board);
        assert_eq!(Game::from_board(&back), Ok(Game::default()));
    }
}
