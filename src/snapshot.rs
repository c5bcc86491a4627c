use crate::error::Result;
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Session state as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Menu,
    Playing,
    Paused,
    GameOver,
    /// Any token this layer has no special handling for.
    Other(String),
}

impl SessionState {
    pub fn parse(token: &str) -> Self {
        match token {
            "menu" => SessionState::Menu,
            "playing" => SessionState::Playing,
            "paused" => SessionState::Paused,
            "game_over" => SessionState::GameOver,
            other => SessionState::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SessionState::Menu => "menu",
            SessionState::Playing => "playing",
            SessionState::Paused => "paused",
            SessionState::GameOver => "game_over",
            SessionState::Other(token) => token,
        }
    }

    /// States in which a confirm press starts a new run.
    pub fn accepts_start(&self) -> bool {
        matches!(self, SessionState::Menu | SessionState::GameOver)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SessionState {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let token = String::deserialize(deserializer)?;
        Ok(SessionState::parse(&token))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlayerView {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    /// Animation token such as "running" or "jumping"; passed through as a class.
    #[serde(default)]
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ObstacleView {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CoinView {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub spin: f64,
    #[serde(default)]
    pub collected: bool,
}

/// One frame of game state handed over by the engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameSnapshot {
    pub player: PlayerView,
    #[serde(default)]
    pub obstacles: Vec<ObstacleView>,
    #[serde(default)]
    pub coins: Vec<CoinView>,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub distance: f64,
    #[serde(default, alias = "coins_collected")]
    pub coins_count: f64,
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub high_score: f64,
    #[serde(default)]
    pub state: Option<SessionState>,
}

impl GameSnapshot {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn final_stats(&self) -> FinalStats {
        FinalStats {
            score: self.score,
            distance: self.distance,
            coins: self.coins_count,
        }
    }

    pub fn visible_coins(&self) -> impl Iterator<Item = &CoinView> {
        self.coins.iter().filter(|coin| !coin.collected)
    }
}

/// Figures written into the game-over overlay.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct FinalStats {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub distance: f64,
    #[serde(default, alias = "coins_count", alias = "coins_collected")]
    pub coins: f64,
}

impl FinalStats {
    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "state": "playing",
        "player": {"x": 100, "y": 0, "action": "running"},
        "obstacles": [{"x": 800, "y": 320, "width": 40, "height": 60, "type": "high"}],
        "coins": [
            {"x": 500, "y": 250, "spin": 90.0, "collected": true},
            {"x": 600, "y": 280, "spin": 45.5, "collected": false}
        ],
        "score": 50,
        "distance": 120,
        "coins_count": 3,
        "speed": 1.5,
        "high_score": 200
    }"#;

    #[test]
    fn test_decode_full_snapshot() {
        let snapshot = GameSnapshot::from_json(SAMPLE).unwrap();

        assert_eq!(snapshot.player.action, "running");
        assert_eq!(snapshot.obstacles[0].kind, "high");
        assert_eq!(snapshot.coins.len(), 2);
        assert_eq!(snapshot.visible_coins().count(), 1);
        assert_eq!(snapshot.coins_count, 3.0);
        assert_eq!(snapshot.state, Some(SessionState::Playing));
    }

    #[test]
    fn test_missing_counters_default_to_zero() {
        let snapshot = GameSnapshot::from_json(r#"{"player": {"x": 1, "y": 2}}"#).unwrap();

        assert!(snapshot.obstacles.is_empty());
        assert!(snapshot.coins.is_empty());
        assert_eq!(snapshot.score, 0.0);
        assert_eq!(snapshot.state, None);
        assert_eq!(snapshot.player.action, "");
    }

    #[test]
    fn test_coins_collected_alias() {
        let raw = r#"{"player": {"x": 0, "y": 0}, "coins_collected": 7}"#;
        let snapshot = GameSnapshot::from_json(raw).unwrap();
        assert_eq!(snapshot.coins_count, 7.0);
        assert_eq!(snapshot.final_stats().coins, 7.0);
    }

    #[test]
    fn test_fractional_counters_decode() {
        let raw = r#"{
            "player": {"x": 100, "y": 0, "action": "running"},
            "score": 50.0, "distance": 120.5, "coins_count": 3, "speed": 1.5, "high_score": 200.25
        }"#;
        let snapshot = GameSnapshot::from_json(raw).unwrap();

        assert_eq!(snapshot.score, 50.0);
        assert_eq!(snapshot.distance, 120.5);
        assert_eq!(snapshot.high_score, 200.25);

        let raw = r#"{"score": 1.5, "distance": 2, "coins": 0.5}"#;
        let stats = FinalStats::from_json(raw).unwrap();
        assert_eq!(stats.coins, 0.5);
    }

    #[test]
    fn test_malformed_snapshot_is_an_error() {
        assert!(GameSnapshot::from_json(r#"{"obstacles": []}"#).is_err());
        assert!(GameSnapshot::from_json("not json").is_err());
    }

    #[test]
    fn test_session_state_tokens() {
        for token in ["menu", "playing", "paused", "game_over", "running"] {
            assert_eq!(SessionState::parse(token).as_str(), token);
        }
        assert_eq!(SessionState::parse("running"), SessionState::Other("running".into()));
        assert!(SessionState::Menu.accepts_start());
        assert!(SessionState::GameOver.accepts_start());
        assert!(!SessionState::Paused.accepts_start());
        assert!(!SessionState::parse("running").accepts_start());
    }

    #[test]
    fn test_final_stats_from_game_over_payload() {
        let stats = FinalStats::from_json(r#"{"score": 9, "distance": 4, "coins": 2}"#).unwrap();
        assert_eq!(
            stats,
            FinalStats {
                score: 9.0,
                distance: 4.0,
                coins: 2.0
            }
        );
    }
}
