//! Phase-B countdown, one tick per second.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    Running(u32),
    Expired,
    /// Paused or already expired; nothing changed.
    Idle,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    limit_secs: u32,
    remaining_secs: u32,
    paused: bool,
}

impl Countdown {
    pub fn new(limit_secs: u32) -> Self {
        Self {
            limit_secs,
            remaining_secs: limit_secs,
            paused: false,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_secs == 0
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn add_bonus(&mut self, secs: u32) {
        self.remaining_secs = self.remaining_secs.saturating_add(secs);
    }

    /// Full time again, running.
    pub fn reset(&mut self) {
        self.remaining_secs = self.limit_secs;
        self.paused = false;
    }

    pub fn tick(&mut self) -> Tick {
        if self.paused || self.is_expired() {
            return Tick::Idle;
        }
        self.remaining_secs -= 1;
        if self.remaining_secs == 0 {
            Tick::Expired
        } else {
            Tick::Running(self.remaining_secs)
        }
    }

    /// "m:ss"
    pub fn formatted(&self) -> String {
        format!("{}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_down_to_expiry() {
        let mut c = Countdown::new(3);
        assert_eq!(c.tick(), Tick::Running(2));
        assert_eq!(c.tick(), Tick::Running(1));
        assert_eq!(c.tick(), Tick::Expired);
        assert_eq!(c.tick(), Tick::Idle);
        assert!(c.is_expired());
    }

    #[test]
    fn test_pause_and_bonus() {
        let mut c = Countdown::new(10);
        c.pause();
        assert_eq!(c.tick(), Tick::Idle);
        c.resume();
        c.add_bonus(5);
        assert_eq!(c.tick(), Tick::Running(14));
        c.reset();
        assert_eq!(c.remaining(), 10);
    }

    #[test]
    fn test_formatted() {
        assert_eq!(Countdown::new(120).formatted(), "2:00");
        assert_eq!(Countdown::new(65).formatted(), "1:05");
        assert_eq!(Countdown::new(9).formatted(), "0:09");
    }
}
