//! Pointer cursor shapes.
//!
//! Nodes carry an optional cursor. While the mouse hovers, the stage reports
//! the cursor of the nearest node under the pointer that sets one; the host
//! application applies it to its window.

use std::fmt;
use std::str::FromStr;

/// Standard cursor icons that can be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CursorIcon {
    /// The default arrow cursor.
    #[default]
    Default,
    /// Hide the cursor entirely.
    None,
    /// Text selection cursor (I-beam).
    Text,
    /// Pointer/hand cursor for clickable elements.
    Pointer,
    Crosshair,
    Move,
    NotAllowed,
    /// Grab cursor (open hand).
    Grab,
    /// Grabbing cursor (closed hand).
    Grabbing,
    ResizeNorth,
    ResizeSouth,
    ResizeEast,
    ResizeWest,
    ResizeNorthEast,
    ResizeNorthWest,
    ResizeSouthEast,
    ResizeSouthWest,
    ColResize,
    RowResize,
    Wait,
    /// Arrow with spinner.
    Progress,
    Help,
}

impl CursorIcon {
    const ALL: [CursorIcon; 22] = [
        CursorIcon::Default,
        CursorIcon::None,
        CursorIcon::Text,
        CursorIcon::Pointer,
        CursorIcon::Crosshair,
        CursorIcon::Move,
        CursorIcon::NotAllowed,
        CursorIcon::Grab,
        CursorIcon::Grabbing,
        CursorIcon::ResizeNorth,
        CursorIcon::ResizeSouth,
        CursorIcon::ResizeEast,
        CursorIcon::ResizeWest,
        CursorIcon::ResizeNorthEast,
        CursorIcon::ResizeNorthWest,
        CursorIcon::ResizeSouthEast,
        CursorIcon::ResizeSouthWest,
        CursorIcon::ColResize,
        CursorIcon::RowResize,
        CursorIcon::Wait,
        CursorIcon::Progress,
        CursorIcon::Help,
    ];

    /// The CSS cursor keyword.
    pub fn name(&self) -> &'static str {
        match self {
            CursorIcon::Default => "default",
            CursorIcon::None => "none",
            CursorIcon::Text => "text",
            CursorIcon::Pointer => "pointer",
            CursorIcon::Crosshair => "crosshair",
            CursorIcon::Move => "move",
            CursorIcon::NotAllowed => "not-allowed",
            CursorIcon::Grab => "grab",
            CursorIcon::Grabbing => "grabbing",
            CursorIcon::ResizeNorth => "n-resize",
            CursorIcon::ResizeSouth => "s-resize",
            CursorIcon::ResizeEast => "e-resize",
            CursorIcon::ResizeWest => "w-resize",
            CursorIcon::ResizeNorthEast => "ne-resize",
            CursorIcon::ResizeNorthWest => "nw-resize",
            CursorIcon::ResizeSouthEast => "se-resize",
            CursorIcon::ResizeSouthWest => "sw-resize",
            CursorIcon::ColResize => "col-resize",
            CursorIcon::RowResize => "row-resize",
            CursorIcon::Wait => "wait",
            CursorIcon::Progress => "progress",
            CursorIcon::Help => "help",
        }
    }
}

impl fmt::Display for CursorIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CursorIcon {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .iter()
            .find(|icon| icon.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| format!("unknown cursor: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for icon in CursorIcon::ALL {
            assert_eq!(icon.name().parse::<CursorIcon>(), Ok(icon));
        }
    }

    #[test]
    fn test_unknown_name() {
        assert!("zoom-in-please".parse::<CursorIcon>().is_err());
        assert_eq!("POINTER".parse::<CursorIcon>(), Ok(CursorIcon::Pointer));
    }
}
