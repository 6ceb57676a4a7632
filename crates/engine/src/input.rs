//! Phase-A input mapping and debouncing.
//!
//! Keys and gestures become intents through per-orientation tables; the
//! gate drops repeats of the same input inside the cooldown window.

use l2w_core::{Direction, Horizontal, Orientation, Vertical};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Space,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gesture {
    Tap,
    Swipe(Direction),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Intent {
    Move(Horizontal),
    MoveVertical(Vertical),
    Rotate,
    Drop,
    DropIn(Direction),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Input {
    Key(Key),
    Gesture(Gesture),
}

impl From<Key> for Input {
    fn from(key: Key) -> Self {
        Input::Key(key)
    }
}

impl From<Gesture> for Input {
    fn from(gesture: Gesture) -> Self {
        Input::Gesture(gesture)
    }
}

/// Every key is bound in every orientation.
pub fn key_intent(orientation: Orientation, key: Key) -> Intent {
    match (orientation, key) {
        (_, Key::Space) => Intent::Rotate,

        (Orientation::Down, Key::Left) => Intent::Move(Horizontal::Left),
        (Orientation::Down, Key::Right) => Intent::Move(Horizontal::Right),
        (Orientation::Down, Key::Up) => Intent::Rotate,
        (Orientation::Down, Key::Down) => Intent::DropIn(Direction::Down),

        (Orientation::Left, Key::Left) => Intent::DropIn(Direction::Left),
        (Orientation::Left, Key::Right) => Intent::Rotate,
        (Orientation::Left, Key::Up) => Intent::MoveVertical(Vertical::Up),
        (Orientation::Left, Key::Down) => Intent::MoveVertical(Vertical::Down),

        (Orientation::Right, Key::Left) => Intent::Rotate,
        (Orientation::Right, Key::Right) => Intent::DropIn(Direction::Right),
        (Orientation::Right, Key::Up) => Intent::MoveVertical(Vertical::Up),
        (Orientation::Right, Key::Down) => Intent::MoveVertical(Vertical::Down),

        (Orientation::Up, Key::Left) => Intent::Move(Horizontal::Left),
        (Orientation::Up, Key::Right) => Intent::Move(Horizontal::Right),
        (Orientation::Up, Key::Up) => Intent::DropIn(Direction::Up),
        (Orientation::Up, Key::Down) => Intent::Rotate,
    }
}

/// Tap rotates, a swipe with the fall drops, a lateral swipe moves.
pub fn gesture_intent(orientation: Orientation, gesture: Gesture) -> Option<Intent> {
    let dir = match gesture {
        Gesture::Tap => return Some(Intent::Rotate),
        Gesture::Swipe(dir) => dir,
    };
    let fall = orientation.fall_direction();
    if dir == fall {
        return Some(Intent::Drop);
    }
    if dir == fall.opposite() {
        return None;
    }
    Some(match dir {
        Direction::Left => Intent::Move(Horizontal::Left),
        Direction::Right => Intent::Move(Horizontal::Right),
        Direction::Up => Intent::MoveVertical(Vertical::Up),
        Direction::Down => Intent::MoveVertical(Vertical::Down),
    })
}

/// Drops an input equal to the last accepted one while inside the cooldown.
#[derive(Clone, Debug, Default)]
pub struct InputGate {
    cooldown_ms: u64,
    last: Option<(Input, u64)>,
}

impl InputGate {
    pub fn new(cooldown_ms: u64) -> Self {
        Self {
            cooldown_ms,
            last: None,
        }
    }

    pub fn accept(&mut self, input: impl Into<Input>, now_ms: u64) -> bool {
        let input = input.into();
        if let Some((last, at)) = self.last {
            if last == input && now_ms.saturating_sub(at) < self.cooldown_ms {
                return false;
            }
        }
        self.last = Some((input, now_ms));
        true
    }

    /// Pointer or key released; the next input always passes.
    pub fn release(&mut self) {
        self.last = None;
    }
}
