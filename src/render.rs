use crate::document::Document;
use crate::error::Result;
use crate::snapshot::{CoinView, FinalStats, GameSnapshot, ObstacleView, PlayerView, SessionState};

// Play-field geometry. The engine's y axis points down from the top of a
// 400px field; CSS `bottom` is measured up from the ground.
pub const GROUND_LEVEL: f64 = 400.0;
pub const PLAYER_HEIGHT: f64 = 60.0;
pub const COIN_HEIGHT: f64 = 20.0;

pub mod selectors {
    pub const PLAYER: &str = ".player";
    pub const GAME_AREA: &str = ".game-area";
    pub const OBSTACLE: &str = ".obstacle";
    pub const COIN: &str = ".coin";
    pub const SCORE: &str = ".score-value";
    pub const DISTANCE: &str = ".distance-value";
    pub const COINS: &str = ".coins-value";
    pub const SPEED: &str = ".speed-value";
    pub const HIGH_SCORE: &str = ".high-score-value";
    pub const GAME_OVER_SCREEN: &str = ".game-over-screen";
    pub const FINAL_SCORE: &str = ".final-score-value";
    pub const FINAL_DISTANCE: &str = ".final-distance-value";
    pub const FINAL_COINS: &str = ".final-coins-value";
    pub const MENU: &str = ".game-menu";
}

/// Format a number the way JavaScript template strings do
/// (`120`, `1.5`, `1e+21`, `1e-7`, never `120.0` or `-0`).
pub fn js_number(value: f64) -> String {
    if value == 0.0 {
        "0".to_string()
    } else if value.is_infinite() {
        let sign = if value > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if value.abs() >= 1e21 || value.abs() < 1e-6 {
        // JS switches to exponent form outside [1e-6, 1e21) and always signs the exponent
        let formatted = format!("{:e}", value);
        match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{mantissa}e+{exponent}")
            }
            _ => formatted,
        }
    } else {
        value.to_string()
    }
}

fn px(value: f64) -> String {
    format!("{}px", js_number(value))
}

/// CSS `bottom` offset for an entity whose top edge sits at `y`.
pub fn bottom_offset(y: f64, height: f64) -> f64 {
    GROUND_LEVEL - y - height
}

/// Writes snapshots into a document. Holds no game state between calls.
pub struct Renderer<D> {
    document: D,
}

impl<D: Document> Renderer<D> {
    pub fn new(document: D) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn render(&self, snapshot: &GameSnapshot) -> Result<()> {
        self.update_player(&snapshot.player)?;
        self.update_obstacles(&snapshot.obstacles)?;
        self.update_coins(&snapshot.coins)?;
        self.update_ui(snapshot);
        Ok(())
    }

    pub fn update_player(&self, player: &PlayerView) -> Result<()> {
        let Some(node) = self.document.query(selectors::PLAYER) else {
            return Ok(());
        };

        self.document.set_style(&node, "left", &px(player.x))?;
        self.document
            .set_style(&node, "bottom", &px(bottom_offset(player.y, PLAYER_HEIGHT)))?;
        self.document
            .set_class_name(&node, &format!("player {}", player.action));
        Ok(())
    }

    pub fn update_obstacles(&self, obstacles: &[ObstacleView]) -> Result<()> {
        let Some(area) = self.clear_generated(selectors::OBSTACLE) else {
            return Ok(());
        };

        for obstacle in obstacles {
            let node = self.document.create_element("div")?;
            self.document
                .set_class_name(&node, &format!("obstacle {}", obstacle.kind));
            self.document.set_style(&node, "left", &px(obstacle.x))?;
            self.document
                .set_style(&node, "bottom", &px(bottom_offset(obstacle.y, obstacle.height)))?;
            self.document.set_style(&node, "width", &px(obstacle.width))?;
            self.document.set_style(&node, "height", &px(obstacle.height))?;
            self.document.append_child(&area, &node)?;
        }
        Ok(())
    }

    pub fn update_coins(&self, coins: &[CoinView]) -> Result<()> {
        let Some(area) = self.clear_generated(selectors::COIN) else {
            return Ok(());
        };

        for coin in coins.iter().filter(|coin| !coin.collected) {
            let node = self.document.create_element("div")?;
            self.document.set_class_name(&node, "coin");
            self.document.set_style(&node, "left", &px(coin.x))?;
            self.document
                .set_style(&node, "bottom", &px(bottom_offset(coin.y, COIN_HEIGHT)))?;
            self.document
                .set_style(&node, "transform", &format!("rotateY({}deg)", js_number(coin.spin)))?;
            self.document.append_child(&area, &node)?;
        }
        Ok(())
    }

    /// Score panel text. Each label is optional.
    pub fn update_ui(&self, snapshot: &GameSnapshot) {
        self.write_text(selectors::SCORE, &js_number(snapshot.score));
        self.write_text(selectors::DISTANCE, &format!("{}m", js_number(snapshot.distance)));
        self.write_text(selectors::COINS, &js_number(snapshot.coins_count));
        self.write_text(selectors::SPEED, &format!("{}x", js_number(snapshot.speed)));
        self.write_text(selectors::HIGH_SCORE, &js_number(snapshot.high_score));
    }

    pub fn show_game_over(&self, stats: &FinalStats) -> Result<()> {
        let Some(screen) = self.document.query(selectors::GAME_OVER_SCREEN) else {
            return Ok(());
        };
        self.document.set_style(&screen, "display", "flex")?;

        let fields = [
            (selectors::FINAL_SCORE, js_number(stats.score)),
            (selectors::FINAL_DISTANCE, format!("{}m", js_number(stats.distance))),
            (selectors::FINAL_COINS, js_number(stats.coins)),
        ];
        for (selector, text) in fields {
            if let Some(node) = self.document.query_in(&screen, selector) {
                self.document.set_text(&node, &text);
            }
        }
        Ok(())
    }

    pub fn hide_game_over(&self) -> Result<()> {
        self.set_display(selectors::GAME_OVER_SCREEN, "none")
    }

    pub fn show_menu(&self) -> Result<()> {
        self.set_display(selectors::MENU, "block")
    }

    pub fn hide_menu(&self) -> Result<()> {
        self.set_display(selectors::MENU, "none")
    }

    /// Show the overlay that belongs to `state` and hide the other one.
    pub fn sync_overlays(&self, state: &SessionState, stats: &FinalStats) -> Result<()> {
        match state {
            SessionState::Menu => {
                self.hide_game_over()?;
                self.show_menu()
            }
            SessionState::GameOver => {
                self.hide_menu()?;
                self.show_game_over(stats)
            }
            _ => {
                self.hide_menu()?;
                self.hide_game_over()
            }
        }
    }

    /// Remove every generated node matching `selector` from the play area.
    /// Returns the play area, or `None` when the page has none.
    fn clear_generated(&self, selector: &str) -> Option<D::Node> {
        let area = self.document.query(selectors::GAME_AREA)?;
        for node in self.document.query_all_in(&area, selector) {
            self.document.remove(&node);
        }
        Some(area)
    }

    fn write_text(&self, selector: &str, text: &str) {
        if let Some(node) = self.document.query(selector) {
            self.document.set_text(&node, text);
        }
    }

    fn set_display(&self, selector: &str, display: &str) -> Result<()> {
        match self.document.query(selector) {
            Some(node) => self.document.set_style(&node, "display", display),
            None => Ok(()),
        }
    }
}
