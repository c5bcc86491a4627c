use crate::bridge::Bridge;
use crate::document::Document;
use crate::effects;
use crate::error::BridgeError;
use crate::snapshot::{FinalStats, GameSnapshot};
use crate::web_document::WebDocument;
use crate::web_engine::JsEngine;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{AddEventListenerOptions, KeyboardEvent, TouchEvent};

type WebBridge = Bridge<JsEngine, WebDocument>;

fn clog(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

fn to_js(err: BridgeError) -> JsValue {
    js_sys::Error::new(&err.to_string()).into()
}

fn stringify(data: &JsValue) -> Result<String, JsValue> {
    if data.is_null() || data.is_undefined() {
        return Err(to_js(BridgeError::Dom("no game data supplied".into())));
    }
    Ok(js_sys::JSON::stringify(data)?.into())
}

fn decode_snapshot(data: &JsValue) -> Result<GameSnapshot, JsValue> {
    let raw = stringify(data)?;
    GameSnapshot::from_json(&raw).map_err(to_js)
}

/// Game-over payloads come either as a full snapshot or as bare
/// `{score, distance, coins}` figures.
fn decode_final_stats(data: &JsValue) -> Result<FinalStats, JsValue> {
    let raw = stringify(data)?;
    match GameSnapshot::from_json(&raw) {
        Ok(snapshot) => Ok(snapshot.final_stats()),
        Err(_) => FinalStats::from_json(&raw).map_err(to_js),
    }
}

fn touch_point(event: &TouchEvent, changed: bool) -> Option<(f64, f64)> {
    let list = if changed {
        event.changed_touches()
    } else {
        event.touches()
    };
    let touch = list.item(0)?;
    Some((touch.client_x() as f64, touch.client_y() as f64))
}

fn setup_keyboard_listener(
    document: &web_sys::Document,
    bridge: Rc<WebBridge>,
) -> Result<(), JsValue> {
    let closure = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        if bridge.on_key(&event.code()).is_some() {
            event.prevent_default();
        }
    }) as Box<dyn FnMut(KeyboardEvent)>);

    document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
    closure.forget(); // Keep listener alive
    Ok(())
}

fn setup_touch_listeners(
    document: &web_sys::Document,
    bridge: Rc<WebBridge>,
) -> Result<(), JsValue> {
    // TouchStart: Record initial position
    let start_bridge = bridge.clone();
    let touchstart_closure = Closure::wrap(Box::new(move |event: TouchEvent| {
        if let Some((x, y)) = touch_point(&event, false) {
            start_bridge.on_touch_start(x, y);
        }
    }) as Box<dyn FnMut(TouchEvent)>);
    document.add_event_listener_with_callback(
        "touchstart",
        touchstart_closure.as_ref().unchecked_ref(),
    )?;
    touchstart_closure.forget();

    // TouchEnd: Classify swipe
    let end_bridge = bridge.clone();
    let touchend_closure = Closure::wrap(Box::new(move |event: TouchEvent| {
        match touch_point(&event, true) {
            Some((x, y)) => {
                end_bridge.on_touch_end(x, y);
            }
            None => end_bridge.on_touch_cancel(),
        }
    }) as Box<dyn FnMut(TouchEvent)>);
    document.add_event_listener_with_callback(
        "touchend",
        touchend_closure.as_ref().unchecked_ref(),
    )?;
    touchend_closure.forget();

    let touchcancel_closure = Closure::wrap(Box::new(move |_event: TouchEvent| {
        bridge.on_touch_cancel();
    }) as Box<dyn FnMut(TouchEvent)>);
    document.add_event_listener_with_callback(
        "touchcancel",
        touchcancel_closure.as_ref().unchecked_ref(),
    )?;
    touchcancel_closure.forget();

    // TouchMove: Block page scroll and zoom while the game is attached.
    // Must be non-passive or preventDefault is ignored.
    let touchmove_closure = Closure::wrap(Box::new(move |event: TouchEvent| {
        event.prevent_default();
    }) as Box<dyn FnMut(TouchEvent)>);
    let options = AddEventListenerOptions::new();
    options.set_passive(false);
    document.add_event_listener_with_callback_and_add_event_listener_options(
        "touchmove",
        touchmove_closure.as_ref().unchecked_ref(),
        &options,
    )?;
    touchmove_closure.forget();

    Ok(())
}

/// Browser-facing client: input listeners plus render entry points.
#[wasm_bindgen]
pub struct GameClient {
    bridge: Rc<WebBridge>,
}

#[wasm_bindgen]
impl GameClient {
    /// Attach to the current page. `engine` may be `null`, in which case
    /// input is still captured but commands are dropped.
    #[wasm_bindgen(constructor)]
    pub fn new(engine: JsValue) -> Result<GameClient, JsValue> {
        let document = WebDocument::new()?;
        let engine = JsEngine::from_value(engine);
        if engine.is_none() {
            clog("[WASM] No game engine supplied; input will be ignored");
        }

        let bridge = Rc::new(Bridge::new(engine, document.clone()));
        setup_keyboard_listener(document.raw(), bridge.clone())?;
        setup_touch_listeners(document.raw(), bridge.clone())?;
        clog("[WASM] Input listeners installed");

        Ok(GameClient { bridge })
    }

    #[wasm_bindgen(js_name = updateGameDisplay)]
    pub fn update_game_display(&self, data: JsValue) -> Result<(), JsValue> {
        let snapshot = decode_snapshot(&data)?;
        self.bridge.update_game_display(&snapshot).map_err(to_js)
    }

    /// Like `updateGameDisplay`, and also toggles overlays from the snapshot's `state`.
    pub fn present(&self, data: JsValue) -> Result<(), JsValue> {
        let snapshot = decode_snapshot(&data)?;
        self.bridge.present(&snapshot).map_err(to_js)
    }

    #[wasm_bindgen(js_name = showGameOver)]
    pub fn show_game_over(&self, data: JsValue) -> Result<(), JsValue> {
        let stats = decode_final_stats(&data)?;
        self.bridge.show_game_over(&stats).map_err(to_js)
    }

    #[wasm_bindgen(js_name = hideGameOver)]
    pub fn hide_game_over(&self) -> Result<(), JsValue> {
        self.bridge.hide_game_over().map_err(to_js)
    }

    #[wasm_bindgen(js_name = showMenu)]
    pub fn show_menu(&self) -> Result<(), JsValue> {
        self.bridge.show_menu().map_err(to_js)
    }

    #[wasm_bindgen(js_name = hideMenu)]
    pub fn hide_menu(&self) -> Result<(), JsValue> {
        self.bridge.hide_menu().map_err(to_js)
    }

    pub fn jump(&self) {
        self.bridge.jump();
    }

    pub fn slide(&self) {
        self.bridge.slide();
    }

    #[wasm_bindgen(js_name = handleAction)]
    pub fn handle_action(&self) {
        self.bridge.handle_action();
    }
}

/// Coin pickup burst. Throws if the page has no `.game-area`.
#[wasm_bindgen(js_name = createCoinCollectEffect)]
pub fn create_coin_collect_effect(x: f64, y: f64) -> Result<(), JsValue> {
    let document = WebDocument::new()?;
    effects::spawn_coin_collect_effect(&document, x, y)
        .map(|_| ())
        .map_err(to_js)
}

#[wasm_bindgen]
pub fn attach_client(engine: JsValue) -> Result<GameClient, JsValue> {
    // Set panic hook for better error messages
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    clog("[WASM] Attaching game client...");
    let client = match GameClient::new(engine) {
        Ok(client) => client,
        Err(e) => {
            web_sys::console::error_1(
                &format!("[WASM] Failed to attach game client: {:?}", e).into(),
            );
            return Err(e);
        }
    };

    if client.bridge.document().query(crate::render::selectors::GAME_AREA).is_none() {
        clog("[WASM] No .game-area on page yet; entities will not be drawn until it exists");
    }

    clog("[WASM] Game client attached");
    Ok(client)
}
