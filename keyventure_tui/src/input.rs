use keyventure_core::Direction;

/// Shown for any key that is not a command.
pub const INVALID: &str = "That's invalid.";

pub const HELP_TEXT: &str = "\
W/A/S/D  move up/left/down/right (1 move, even into a wall)
I + dir  investigate the neighbouring cell (1 move)
N        hint: next step towards the key, then the door
P        toggle autoplay
H        toggle this help
Q / Esc  quit";

/// Commands understood by the front-end.
///
/// Only [`Command::Move`] and [`Command::Investigate`] reach the game engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    /// Wait for a direction, then investigate it.
    Investigate,
    Hint,
    ToggleAutoplay,
    Help,
    Quit,
}

impl Command {
    /// Maps a typed character to a command, ignoring case.
    pub fn from_char(c: char) -> Option<Command> {
        if let Some(direction) = Direction::from_token(c) {
            return Some(Command::Move(direction));
        }
        match c.to_ascii_uppercase() {
            'I' => Some(Command::Investigate),
            'N' => Some(Command::Hint),
            'P' => Some(Command::ToggleAutoplay),
            'H' => Some(Command::Help),
            'Q' => Some(Command::Quit),
            _ => None,
        }
    }
}
