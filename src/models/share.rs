use serde::{Deserialize, Serialize};

/// Game outcome carried inside a share link.
///
/// Built at the end of a game, serialized into a token, and rebuilt when the
/// link is opened. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_pfp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent_pfp: Option<String>,
    pub player_symbol: PlayerSymbol,
    pub result: GameResult,
    pub room_code: String,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moves: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_elapsed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerSymbol {
    X,
    O,
}

impl PlayerSymbol {
    pub fn opponent(self) -> Self {
        match self {
            PlayerSymbol::X => PlayerSymbol::O,
            PlayerSymbol::O => PlayerSymbol::X,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlayerSymbol::X => "X",
            PlayerSymbol::O => "O",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameResult {
    Won,
    Lost,
    Draw,
}

impl GameResult {
    /// Headline shown on the card and in the share text.
    pub fn headline(self) -> &'static str {
        match self {
            GameResult::Won => "🏆 Victory!",
            GameResult::Lost => "😔 Good Game!",
            GameResult::Draw => "🤝 Draw!",
        }
    }

    /// Headline without the leading emoji, for surfaces that can't draw it.
    pub fn label(self) -> &'static str {
        match self {
            GameResult::Won => "Victory!",
            GameResult::Lost => "Good Game!",
            GameResult::Draw => "Draw!",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ShareQueryParams {
    pub data: Option<String>,
}

/// Response for `POST /api/share/link`
#[derive(Debug, Serialize)]
pub struct ShareLinkResponse {
    pub url: String,
    pub token: String,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_camel_case_and_omits_absent_fields() {
        let record = ShareRecord {
            player_name: Some("alice".to_string()),
            player_pfp: None,
            opponent_name: None,
            opponent_pfp: None,
            player_symbol: PlayerSymbol::X,
            result: GameResult::Won,
            room_code: "AB12".to_string(),
            timestamp: 1_700_000_000,
            moves: None,
            time_elapsed: Some(42),
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "playerName": "alice",
                "playerSymbol": "X",
                "result": "won",
                "roomCode": "AB12",
                "timestamp": 1_700_000_000,
                "timeElapsed": 42
            })
        );
    }

    #[test]
    fn symbol_and_result_are_closed_sets() {
        assert!(serde_json::from_value::<PlayerSymbol>(json!("Z")).is_err());
        assert!(serde_json::from_value::<PlayerSymbol>(json!("x")).is_err());
        assert!(serde_json::from_value::<GameResult>(json!("tie")).is_err());
        assert_eq!(
            serde_json::from_value::<GameResult>(json!("draw")).unwrap(),
            GameResult::Draw
        );
    }

    #[test]
    fn opponent_symbol_flips() {
        assert_eq!(PlayerSymbol::X.opponent(), PlayerSymbol::O);
        assert_eq!(PlayerSymbol::O.opponent(), PlayerSymbol::X);
    }
}
