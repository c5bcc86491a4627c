/// Minimum vertical travel in pixels for a swipe to count.
pub const SWIPE_THRESHOLD: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Jump,
    Slide,
    Confirm, // Start game - handled contextually based on engine state
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureSource {
    Key,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gesture {
    pub direction: SwipeDirection,
    pub source: GestureSource,
}

impl Gesture {
    pub fn command(&self) -> Command {
        match self.direction {
            SwipeDirection::Up => Command::Jump,
            SwipeDirection::Down => Command::Slide,
        }
    }
}

/// Map a `KeyboardEvent.code` to a command.
/// A `Some` result also means the browser default should be suppressed.
pub fn classify_key(code: &str) -> Option<Command> {
    match code {
        "Space" => Some(Command::Jump),
        "ArrowDown" => Some(Command::Slide),
        "Enter" => Some(Command::Confirm),
        _ => None,
    }
}

/// Classify a finished touch. Screen coordinates grow downward, so an upward
/// swipe has a positive `start_y - end_y`.
pub fn classify_swipe(start: (f64, f64), end: (f64, f64)) -> Option<Gesture> {
    let delta_y = start.1 - end.1;
    let delta_x = (start.0 - end.0).abs();

    // Horizontal-dominant swipes never produce a command
    if delta_y.abs() <= delta_x {
        return None;
    }

    let direction = if delta_y > SWIPE_THRESHOLD {
        SwipeDirection::Up
    } else if delta_y < -SWIPE_THRESHOLD {
        SwipeDirection::Down
    } else {
        return None;
    };

    Some(Gesture {
        direction,
        source: GestureSource::Touch,
    })
}

/// Start point of the single touch being tracked.
#[derive(Debug, Default, Clone)]
pub struct TouchSession {
    start: Option<(f64, f64)>,
}

impl TouchSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, x: f64, y: f64) {
        self.start = Some((x, y));
    }

    /// Consume the session. Returns nothing if no touch was started.
    pub fn end(&mut self, x: f64, y: f64) -> Option<Command> {
        let start = self.start.take()?;
        classify_swipe(start, (x, y)).map(|gesture| gesture.command())
    }

    pub fn cancel(&mut self) {
        self.start = None;
    }

    pub fn is_active(&self) -> bool {
        self.start.is_some()
    }
}
