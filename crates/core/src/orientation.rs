//! level-dependent orientation profile: fall direction, movement axes, spawn edge

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Unit step as (dx, dy); y grows toward the bottom row.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Horizontal {
    Left,
    Right,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
pub enum Vertical {
    Up,
    Down,
}

/// One of the four level rotations. Named by where pieces fall.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, Serialize, Deserialize)]
pub enum Orientation {
    /// 0°, levels 1-2
    #[default]
    Down,
    /// 90°, levels 3-4
    Left,
    /// 270°, levels 5-6
    Right,
    /// 180°, levels 7-8
    Up,
}

impl Orientation {
    pub const ALL: [Orientation; 4] = [
        Orientation::Down,
        Orientation::Left,
        Orientation::Right,
        Orientation::Up,
    ];

    pub fn for_level(level: u32) -> Self {
        match level.max(1) {
            1..=2 => Orientation::Down,
            3..=4 => Orientation::Left,
            5..=6 => Orientation::Right,
            7..=8 => Orientation::Up,
            n => Self::for_level(reduce_level(n)),
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Orientation::Down => 0,
            Orientation::Left => 90,
            Orientation::Up => 180,
            Orientation::Right => 270,
        }
    }

    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(Orientation::Down),
            90 => Some(Orientation::Left),
            180 => Some(Orientation::Up),
            270 => Some(Orientation::Right),
            _ => None,
        }
    }

    /// Clockwise turns applied to spawned masks.
    pub fn quarter_turns(self) -> u8 {
        (self.degrees() / 90) as u8
    }

    pub fn fall_direction(self) -> Direction {
        match self {
            Orientation::Down => Direction::Down,
            Orientation::Left => Direction::Left,
            Orientation::Right => Direction::Right,
            Orientation::Up => Direction::Up,
        }
    }

    /// Edge pieces spawn against, i.e. the one they fall away from.
    pub fn spawn_edge(self) -> Edge {
        match self {
            Orientation::Down => Edge::Top,
            Orientation::Left => Edge::Right,
            Orientation::Right => Edge::Left,
            Orientation::Up => Edge::Bottom,
        }
    }

    /// Horizontal intents are always literal screen left/right.
    pub fn horizontal_movement(self, dir: Horizontal) -> (i32, i32) {
        match dir {
            Horizontal::Left => (-1, 0),
            Horizontal::Right => (1, 0),
        }
    }

    /// Vertical intents; "down" points toward row 0 when the board is upside down.
    pub fn vertical_movement(self, dir: Vertical) -> (i32, i32) {
        let dy = match dir {
            Vertical::Up => -1,
            Vertical::Down => 1,
        };
        if self == Orientation::Up {
            (0, -dy)
        } else {
            (0, dy)
        }
    }

    /// Manual vertical moves only exist for the sideways-falling levels (3-6).
    pub fn allows_vertical_moves(self) -> bool {
        matches!(self, Orientation::Left | Orientation::Right)
    }
}

/// Rotation in degrees for a level.
pub fn rotation_for_level(level: u32) -> u16 {
    Orientation::for_level(level).degrees()
}

/// Maps level >= 9 onto 1..=8. Fixed-seed xorshift so a level always
/// lands on the same profile.
fn reduce_level(level: u32) -> u32 {
    let mut state = (level as u64) ^ 0x9e37_79b9_7f4a_7c15;
    for _ in 0..3 {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
    }
    (state % 8) as u32 + 1
}
