use crate::snapshot::SessionState;

/// Capability handed to the bridge by whoever owns the simulation.
/// The bridge never advances the game itself; it only issues these calls.
pub trait Engine {
    fn jump(&mut self);

    fn slide(&mut self);

    /// Ask the engine to begin a new run.
    fn request_start(&mut self);

    fn current_state(&self) -> SessionState;
}
