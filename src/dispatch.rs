use crate::engine::Engine;
use crate::input::Command;

/// What happened to a dispatched command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    /// Jump or slide was passed to the engine.
    Forwarded,
    /// Confirm triggered a new run.
    Started,
    /// Confirm arrived while a run was active.
    Ignored,
    /// No engine attached; the command was dropped.
    NoEngine,
    /// Issued from inside another engine call; the command was dropped.
    Busy,
}

pub struct Dispatcher<E> {
    engine: Option<E>,
}

impl<E: Engine> Dispatcher<E> {
    pub fn new(engine: Option<E>) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> Option<&E> {
        self.engine.as_ref()
    }

    pub fn engine_mut(&mut self) -> Option<&mut E> {
        self.engine.as_mut()
    }

    pub fn dispatch(&mut self, command: Command) -> Dispatched {
        let Some(engine) = self.engine.as_mut() else {
            return Dispatched::NoEngine;
        };

        match command {
            Command::Jump => {
                engine.jump();
                Dispatched::Forwarded
            }
            Command::Slide => {
                engine.slide();
                Dispatched::Forwarded
            }
            Command::Confirm => {
                if engine.current_state().accepts_start() {
                    engine.request_start();
                    Dispatched::Started
                } else {
                    Dispatched::Ignored
                }
            }
        }
    }
}
