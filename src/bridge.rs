use crate::dispatch::{Dispatched, Dispatcher};
use crate::document::Document;
use crate::effects;
use crate::engine::Engine;
use crate::error::Result;
use crate::input::{classify_key, Command, TouchSession};
use crate::render::Renderer;
use crate::snapshot::{FinalStats, GameSnapshot};
use std::cell::RefCell;

/// Input and render paths for one page.
///
/// Every method takes `&self` so a single `Rc<Bridge>` can be shared by all
/// event listeners. Rendering never touches the input state, so an engine may
/// render synchronously from inside a command. A command issued from inside
/// another command comes back as `Dispatched::Busy`.
pub struct Bridge<E, D> {
    touch: RefCell<TouchSession>,
    dispatcher: RefCell<Dispatcher<E>>,
    renderer: Renderer<D>,
}

impl<E: Engine, D: Document> Bridge<E, D> {
    pub fn new(engine: Option<E>, document: D) -> Self {
        Self {
            touch: RefCell::new(TouchSession::new()),
            dispatcher: RefCell::new(Dispatcher::new(engine)),
            renderer: Renderer::new(document),
        }
    }

    pub fn renderer(&self) -> &Renderer<D> {
        &self.renderer
    }

    pub fn document(&self) -> &D {
        self.renderer.document()
    }

    /// Run `f` against the attached engine, if any.
    /// Returns `None` when called from inside an engine call.
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut E) -> R) -> Option<R> {
        self.dispatcher.try_borrow_mut().ok()?.engine_mut().map(f)
    }

    /// Handle a key press by `KeyboardEvent.code`.
    /// `Some` means the key was recognised and its default action should be suppressed.
    pub fn on_key(&self, code: &str) -> Option<Dispatched> {
        classify_key(code).map(|command| self.command(command))
    }

    pub fn on_touch_start(&self, x: f64, y: f64) {
        self.touch.borrow_mut().begin(x, y);
    }

    pub fn on_touch_end(&self, x: f64, y: f64) -> Option<Dispatched> {
        let command = self.touch.borrow_mut().end(x, y)?;
        Some(self.command(command))
    }

    pub fn on_touch_cancel(&self) {
        self.touch.borrow_mut().cancel();
    }

    /// Commands issued by the engine while it is handling another one are dropped.
    pub fn command(&self, command: Command) -> Dispatched {
        match self.dispatcher.try_borrow_mut() {
            Ok(mut dispatcher) => dispatcher.dispatch(command),
            Err(_) => Dispatched::Busy,
        }
    }

    pub fn jump(&self) -> Dispatched {
        self.command(Command::Jump)
    }

    pub fn slide(&self) -> Dispatched {
        self.command(Command::Slide)
    }

    /// Confirm: starts a run from the menu or game-over screen.
    pub fn handle_action(&self) -> Dispatched {
        self.command(Command::Confirm)
    }

    pub fn update_game_display(&self, snapshot: &GameSnapshot) -> Result<()> {
        self.renderer.render(snapshot)
    }

    /// Render a frame and, if it carries a session state, show the matching overlay.
    pub fn present(&self, snapshot: &GameSnapshot) -> Result<()> {
        self.renderer.render(snapshot)?;
        if let Some(state) = &snapshot.state {
            self.renderer.sync_overlays(state, &snapshot.final_stats())?;
        }
        Ok(())
    }

    pub fn show_game_over(&self, stats: &FinalStats) -> Result<()> {
        self.renderer.show_game_over(stats)
    }

    pub fn hide_game_over(&self) -> Result<()> {
        self.renderer.hide_game_over()
    }

    pub fn show_menu(&self) -> Result<()> {
        self.renderer.show_menu()
    }

    pub fn hide_menu(&self) -> Result<()> {
        self.renderer.hide_menu()
    }

    pub fn coin_collect_effect(&self, x: f64, y: f64) -> Result<D::Node> {
        effects::spawn_coin_collect_effect(self.renderer.document(), x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::test_engine::RecordingEngine;
    use crate::memory_document::MemoryDocument;
    use crate::snapshot::SessionState;
    use std::rc::{Rc, Weak};

    fn bridge(state: SessionState) -> Bridge<RecordingEngine, MemoryDocument> {
        Bridge::new(Some(RecordingEngine::in_state(state)), MemoryDocument::game_page())
    }

    fn counts(b: &Bridge<RecordingEngine, MemoryDocument>) -> (usize, usize, usize) {
        b.with_engine(|e| (e.jumps, e.slides, e.starts)).unwrap()
    }

    #[test]
    fn test_keys_reach_engine() {
        let b = bridge(SessionState::Playing);

        assert_eq!(b.on_key("Space"), Some(Dispatched::Forwarded));
        assert_eq!(b.on_key("ArrowDown"), Some(Dispatched::Forwarded));
        assert_eq!(b.on_key("Enter"), Some(Dispatched::Ignored));
        assert_eq!(b.on_key("KeyA"), None);

        assert_eq!(counts(&b), (1, 1, 0));
    }

    #[test]
    fn test_enter_from_menu_starts_game() {
        let b = bridge(SessionState::Menu);
        assert_eq!(b.on_key("Enter"), Some(Dispatched::Started));
        assert_eq!(counts(&b), (0, 0, 1));
    }

    #[test]
    fn test_swipes_reach_engine() {
        let b = bridge(SessionState::Playing);

        b.on_touch_start(100.0, 400.0);
        assert_eq!(b.on_touch_end(105.0, 369.0), Some(Dispatched::Forwarded));

        b.on_touch_start(100.0, 400.0);
        assert_eq!(b.on_touch_end(100.0, 431.0), Some(Dispatched::Forwarded));

        b.on_touch_start(100.0, 400.0);
        assert_eq!(b.on_touch_end(100.0, 380.0), None);

        b.on_touch_start(100.0, 400.0);
        assert_eq!(b.on_touch_end(150.0, 390.0), None);

        assert_eq!(counts(&b), (1, 1, 0));
    }

    #[test]
    fn test_touch_end_without_start_is_ignored() {
        let b = bridge(SessionState::Playing);
        assert_eq!(b.on_touch_end(0.0, 0.0), None);

        b.on_touch_start(0.0, 300.0);
        b.on_touch_cancel();
        assert_eq!(b.on_touch_end(0.0, 0.0), None);
        assert_eq!(counts(&b), (0, 0, 0));
    }

    #[test]
    fn test_no_engine_is_silent() {
        let b: Bridge<RecordingEngine, MemoryDocument> =
            Bridge::new(None, MemoryDocument::game_page());

        assert_eq!(b.on_key("Space"), Some(Dispatched::NoEngine));
        b.on_touch_start(0.0, 300.0);
        assert_eq!(b.on_touch_end(0.0, 0.0), Some(Dispatched::NoEngine));
        assert_eq!(b.handle_action(), Dispatched::NoEngine);
        assert!(b.with_engine(|_| ()).is_none());
    }

    #[test]
    fn test_present_follows_snapshot_state() {
        let b = bridge(SessionState::Menu);
        let raw = r#"{
            "state": "game_over",
            "player": {"x": 100, "y": 300, "action": "running"},
            "obstacles": [{"x": 120, "y": 320, "width": 40, "height": 60, "type": "high"}],
            "coins": [],
            "score": 420, "distance": 37, "coins_count": 5, "speed": 3.1, "high_score": 420
        }"#;
        b.present(&GameSnapshot::from_json(raw).unwrap()).unwrap();

        let doc = b.document();
        let menu = doc.query(".game-menu").unwrap();
        let screen = doc.query(".game-over-screen").unwrap();
        assert_eq!(doc.style(menu, "display").as_deref(), Some("none"));
        assert_eq!(doc.style(screen, "display").as_deref(), Some("flex"));
        assert_eq!(doc.text_of(".final-distance-value").as_deref(), Some("37m"));
        assert_eq!(doc.text_of(".speed-value").as_deref(), Some("3.1x"));
        assert_eq!(doc.count(".obstacle"), 1);
    }

    #[test]
    fn test_update_game_display_leaves_overlays_alone() {
        let b = bridge(SessionState::Menu);
        let raw = r#"{"state": "playing", "player": {"x": 0, "y": 0, "action": "sliding"}}"#;
        b.update_game_display(&GameSnapshot::from_json(raw).unwrap()).unwrap();

        let doc = b.document();
        let menu = doc.query(".game-menu").unwrap();
        assert_eq!(doc.style(menu, "display").as_deref(), Some("block"));
        assert_eq!(doc.class_name(doc.query(".player").unwrap()), "player sliding");
    }

    #[test]
    fn test_full_run_cycle() {
        let b = bridge(SessionState::Menu);

        assert_eq!(b.handle_action(), Dispatched::Started);
        b.hide_menu().unwrap();
        b.jump();
        b.slide();

        b.with_engine(|e| e.state = SessionState::GameOver);
        let stats = FinalStats {
            score: 12.0,
            distance: 3.0,
            coins: 0.0,
        };
        b.show_game_over(&stats).unwrap();
        assert_eq!(b.document().text_of(".final-score-value").as_deref(), Some("12"));

        assert_eq!(b.handle_action(), Dispatched::Started);
        b.hide_game_over().unwrap();
        assert_eq!(counts(&b), (1, 1, 2));

        let doc = b.document();
        let screen = doc.query(".game-over-screen").unwrap();
        assert_eq!(doc.style(screen, "display").as_deref(), Some("none"));
    }

    /// Engine that calls back into its own bridge while handling a jump.
    struct ReentrantEngine {
        bridge: Weak<Bridge<ReentrantEngine, MemoryDocument>>,
        nested: Rc<RefCell<Vec<Dispatched>>>,
        rendered: Rc<RefCell<bool>>,
    }

    impl Engine for ReentrantEngine {
        fn jump(&mut self) {
            let Some(bridge) = self.bridge.upgrade() else {
                return;
            };
            self.nested.borrow_mut().push(bridge.jump());
            self.nested.borrow_mut().push(bridge.handle_action());
            assert!(bridge.with_engine(|_| ()).is_none());

            let raw = r#"{"player": {"x": 0, "y": 0, "action": "jumping"}, "score": 7}"#;
            let snapshot = GameSnapshot::from_json(raw).unwrap();
            *self.rendered.borrow_mut() = bridge.update_game_display(&snapshot).is_ok();
        }

        fn slide(&mut self) {}

        fn request_start(&mut self) {}

        fn current_state(&self) -> SessionState {
            SessionState::Menu
        }
    }

    #[test]
    fn test_reentrant_command_is_dropped_not_panicking() {
        let nested = Rc::new(RefCell::new(Vec::new()));
        let rendered = Rc::new(RefCell::new(false));
        let b = Rc::new_cyclic(|weak| {
            let engine = ReentrantEngine {
                bridge: weak.clone(),
                nested: nested.clone(),
                rendered: rendered.clone(),
            };
            Bridge::new(Some(engine), MemoryDocument::game_page())
        });

        assert_eq!(b.jump(), Dispatched::Forwarded);
        assert_eq!(*nested.borrow(), vec![Dispatched::Busy, Dispatched::Busy]);
        assert!(*rendered.borrow());

        let doc = b.document();
        assert_eq!(doc.text_of(".score-value").as_deref(), Some("7"));
        assert_eq!(doc.class_name(doc.query(".player").unwrap()), "player jumping");

        // The outer borrow is released afterwards
        assert!(b.with_engine(|_| ()).is_some());
        assert_eq!(b.handle_action(), Dispatched::Started);
    }

    #[test]
    fn test_coin_effect_through_bridge() {
        let b = bridge(SessionState::Playing);
        b.coin_collect_effect(40.0, 60.0).unwrap();
        assert_eq!(b.document().count(".coin-collect-effect"), 1);

        b.document().advance(500);
        assert_eq!(b.document().count(".coin-collect-effect"), 0);
    }
}
