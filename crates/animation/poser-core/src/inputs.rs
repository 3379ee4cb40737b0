//! Input contracts for the core engine.
//!
//! Hosts collect commands between frames and pass them into
//! `Engine::update()`, which applies them in order before stepping.

use serde::{Deserialize, Serialize};

use crate::ids::AnimId;

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Inputs {
    /// Commands applied before stepping.
    #[serde(default)]
    pub commands: Vec<Command>,
}

impl Inputs {
    pub fn with(mut self, command: Command) -> Self {
        self.commands.push(command);
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum Command {
    /// Freeze layers that are not mid-transition.
    Pause,
    Play,
    SetSpeed { animation: AnimId, speed: f32 },
    SendMessage { message: String },
    /// Switch to the named animation.
    SetAnimation { animation: String },
}
