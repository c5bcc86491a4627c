use crate::engine::Engine;
use crate::snapshot::SessionState;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Engine backed by a JS object exposing `player_jump()`, `player_slide()`,
/// `start_game()` and `session.state`.
pub struct JsEngine {
    target: JsValue,
}

impl JsEngine {
    /// `None` for `null`/`undefined`, so a page without an engine still gets a client.
    pub fn from_value(target: JsValue) -> Option<Self> {
        if target.is_null() || target.is_undefined() {
            None
        } else {
            Some(Self { target })
        }
    }

    fn call(&self, method: &str) {
        let Ok(function) = js_sys::Reflect::get(&self.target, &JsValue::from_str(method)) else {
            return;
        };
        // Missing methods are tolerated like a missing engine
        if let Some(function) = function.dyn_ref::<js_sys::Function>() {
            if let Err(e) = function.call0(&self.target) {
                web_sys::console::error_2(&format!("[WASM] engine.{} threw:", method).into(), &e);
            }
        }
    }
}

impl Engine for JsEngine {
    fn jump(&mut self) {
        self.call("player_jump");
    }

    fn slide(&mut self) {
        self.call("player_slide");
    }

    fn request_start(&mut self) {
        self.call("start_game");
    }

    fn current_state(&self) -> SessionState {
        let token = js_sys::Reflect::get(&self.target, &JsValue::from_str("session"))
            .ok()
            .filter(|session| session.is_object())
            .and_then(|session| js_sys::Reflect::get(&session, &JsValue::from_str("state")).ok())
            .and_then(|state| state.as_string())
            .unwrap_or_default();
        SessionState::parse(&token)
    }
}
