pub mod bridge;
pub mod dispatch;
pub mod document;
pub mod effects;
pub mod engine;
pub mod error;
pub mod input;
pub mod memory_document;
pub mod render;
pub mod snapshot;

#[cfg(target_arch = "wasm32")]
pub mod web_document;
#[cfg(target_arch = "wasm32")]
pub mod web_engine;
#[cfg(target_arch = "wasm32")]
pub mod web_main;

pub use bridge::Bridge;
pub use dispatch::{Dispatched, Dispatcher};
pub use document::Document;
pub use engine::Engine;
pub use error::BridgeError;
pub use input::{Command, Gesture, GestureSource, SwipeDirection, TouchSession};
pub use memory_document::{MemoryDocument, NodeId};
pub use render::Renderer;
pub use snapshot::{CoinView, FinalStats, GameSnapshot, ObstacleView, PlayerView, SessionState};
