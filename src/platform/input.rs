//! Raw device events to simulation input
//!
//! Throttle, brake and steering are level-triggered: active while the key is
//! held. Everything else is edge-triggered: queued once per press and handed
//! to the next tick.

use std::collections::HashSet;

use crate::sim::{Command, RacePhase, TickInput};

/// Abstract key identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Escape,
}

impl Key {
    fn normalized(self) -> Self {
        match self {
            Key::Char(c) => Key::Char(c.to_ascii_lowercase()),
            other => other,
        }
    }
}

/// Edge-triggered command for a key press in the given phase
pub fn command_for_key(key: Key, phase: RacePhase) -> Option<Command> {
    let command = match key.normalized() {
        Key::Escape => Command::MenuCancel,
        Key::Char(' ') => Command::MenuConfirm,
        Key::Char('b') => Command::OpenSetup,
        Key::Char('p') => Command::TogglePause,
        Key::Char('v') => Command::ToggleCamera,
        Key::Char('m') => Command::ToggleTheme,
        Key::Char('r') => Command::Retry,
        Key::Char('1') => Command::SelectLaps(1),
        Key::Char('2') => Command::SelectLaps(3),
        Key::Char('3') => Command::SelectLaps(5),
        // Difficulty keys double as flight keys outside setup
        Key::Char('q') if phase == RacePhase::CustomRaceSetup => Command::SelectDifficulty(1),
        Key::Char('w') if phase == RacePhase::CustomRaceSetup => Command::SelectDifficulty(2),
        Key::Char('e') if phase == RacePhase::CustomRaceSetup => Command::SelectDifficulty(3),
        _ => return None,
    };
    Some(command)
}

/// Collects device events between ticks
#[derive(Debug, Default)]
pub struct InputAdapter {
    held: HashSet<Key>,
    pending: Vec<Command>,
}

impl InputAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key pressed. Auto-repeat of a held key queues nothing.
    pub fn key_down(&mut self, key: Key, phase: RacePhase) {
        let key = key.normalized();
        if !self.held.insert(key) {
            return;
        }
        if let Some(command) = command_for_key(key, phase) {
            self.pending.push(command);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        self.held.remove(&key.normalized());
    }

    /// Primary mouse button
    pub fn mouse_click(&mut self) {
        self.pending.push(Command::Fire);
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key.normalized())
    }

    /// Input for the next tick; pending commands are consumed
    pub fn take_input(&mut self) -> TickInput {
        TickInput {
            accelerate: self.is_held(Key::Char('w')),
            brake: self.is_held(Key::Char('s')),
            steer_left: self.is_held(Key::Char('a')),
            steer_right: self.is_held(Key::Char('d')),
            commands: std::mem::take(&mut self.pending),
        }
    }
}
