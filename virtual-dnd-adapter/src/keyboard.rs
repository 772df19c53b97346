/// Keyboard input understood by [`crate::DndController::handle_key`] during a keyboard drag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum KeyboardCommand {
    Up,
    Down,
    /// Hand the drag to the previous registered list.
    Left,
    /// Hand the drag to the next registered list.
    Right,
    Confirm,
    Cancel,
}

impl KeyboardCommand {
    /// Maps a DOM-style `KeyboardEvent.key` value.
    pub fn from_key(key: &str) -> Option<Self> {
        Some(match key {
            "ArrowUp" => Self::Up,
            "ArrowDown" => Self::Down,
            "ArrowLeft" => Self::Left,
            "ArrowRight" => Self::Right,
            "Enter" | " " => Self::Confirm,
            // Tab moves focus off the drag handle.
            "Escape" | "Tab" => Self::Cancel,
            _ => return None,
        })
    }
}
