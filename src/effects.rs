use crate::document::Document;
use crate::error::{BridgeError, Result};
use crate::render::{js_number, selectors};

pub const EFFECT_DURATION_MS: u32 = 500;

const COIN_COLLECT_STYLE: [(&str, &str); 7] = [
    ("position", "absolute"),
    ("width", "20px"),
    ("height", "20px"),
    ("background", "radial-gradient(circle, #fbbf24, #f59e0b)"),
    ("border-radius", "50%"),
    ("animation", "coinCollect 0.5s ease-out forwards"),
    ("z-index", "100"),
];

/// Spawn the coin-collect burst at `(x, y)` inside the play area.
/// The node removes itself after [`EFFECT_DURATION_MS`].
///
/// Unlike the renderer this requires `.game-area` to exist.
pub fn spawn_coin_collect_effect<D: Document>(document: &D, x: f64, y: f64) -> Result<D::Node> {
    let area = document
        .query(selectors::GAME_AREA)
        .ok_or(BridgeError::MissingElement(selectors::GAME_AREA))?;

    let effect = document.create_element("div")?;
    document.set_class_name(&effect, "coin-collect-effect");
    for (property, value) in COIN_COLLECT_STYLE {
        document.set_style(&effect, property, value)?;
    }
    document.set_style(&effect, "left", &format!("{}px", js_number(x)))?;
    document.set_style(&effect, "bottom", &format!("{}px", js_number(y)))?;

    document.append_child(&area, &effect)?;
    document.remove_after(effect.clone(), EFFECT_DURATION_MS);
    Ok(effect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory_document::MemoryDocument;

    #[test]
    fn test_effect_lives_for_half_a_second() {
        let doc = MemoryDocument::game_page();
        let effect = spawn_coin_collect_effect(&doc, 120.0, 85.5).unwrap();

        assert_eq!(doc.count(".coin-collect-effect"), 1);
        assert_eq!(doc.parent(effect), doc.query(".game-area"));
        assert_eq!(doc.style(effect, "left").as_deref(), Some("120px"));
        assert_eq!(doc.style(effect, "bottom").as_deref(), Some("85.5px"));
        assert_eq!(doc.style(effect, "z-index").as_deref(), Some("100"));

        doc.advance(250);
        assert_eq!(doc.count(".coin-collect-effect"), 1);

        doc.advance(250);
        assert_eq!(doc.count(".coin-collect-effect"), 0);
    }

    #[test]
    fn test_overlapping_effects_expire_independently() {
        let doc = MemoryDocument::game_page();
        spawn_coin_collect_effect(&doc, 10.0, 10.0).unwrap();
        doc.advance(300);
        spawn_coin_collect_effect(&doc, 20.0, 10.0).unwrap();
        assert_eq!(doc.count(".coin-collect-effect"), 2);

        doc.advance(200);
        assert_eq!(doc.count(".coin-collect-effect"), 1);

        doc.advance(300);
        assert_eq!(doc.count(".coin-collect-effect"), 0);
    }

    #[test]
    fn test_effect_survives_entity_refresh() {
        use crate::render::Renderer;

        let renderer = Renderer::new(MemoryDocument::game_page());
        spawn_coin_collect_effect(renderer.document(), 10.0, 10.0).unwrap();
        renderer.update_coins(&[]).unwrap();
        renderer.update_obstacles(&[]).unwrap();

        assert_eq!(renderer.document().count(".coin-collect-effect"), 1);
    }

    #[test]
    fn test_missing_play_area_fails() {
        let doc = MemoryDocument::new();
        let err = spawn_coin_collect_effect(&doc, 0.0, 0.0).unwrap_err();

        assert!(matches!(err, BridgeError::MissingElement(".game-area")));
        assert_eq!(doc.pending_removals(), 0);
    }
}
