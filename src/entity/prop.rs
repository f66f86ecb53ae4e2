//! Static gameplay data for stealth-room props

use serde::{Deserialize, Serialize};

use crate::renderer::{Rgba, colors};

/// Puzzle block/box color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PuzzleColor {
    Red,
    Blue,
    Green,
}

impl PuzzleColor {
    pub const ALL: [PuzzleColor; 3] = [PuzzleColor::Red, PuzzleColor::Blue, PuzzleColor::Green];

    pub fn rgba(&self) -> Rgba {
        match self {
            PuzzleColor::Red => colors::PUZZLE_RED,
            PuzzleColor::Blue => colors::PUZZLE_BLUE,
            PuzzleColor::Green => colors::PUZZLE_GREEN,
        }
    }

    /// Dimmed variant used to draw the target boxes
    pub fn box_rgba(&self) -> Rgba {
        self.rgba().scaled(0.45)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Prop {
    Key { collected: bool },
    Door { opened: bool, final_door: bool },
    ColorBlock { color: PuzzleColor, placed: bool },
    ColorBox { target: PuzzleColor },
    Wall,
}

impl Prop {
    pub fn key() -> Self {
        Prop::Key { collected: false }
    }

    pub fn door(final_door: bool) -> Self {
        Prop::Door {
            opened: false,
            final_door,
        }
    }

    pub fn block(color: PuzzleColor) -> Self {
        Prop::ColorBlock {
            color,
            placed: false,
        }
    }

    pub fn color_box(target: PuzzleColor) -> Self {
        Prop::ColorBox { target }
    }

    pub fn is_key(&self) -> bool {
        matches!(self, Prop::Key { .. })
    }

    /// Color of a block or box
    pub fn color(&self) -> Option<PuzzleColor> {
        match self {
            Prop::ColorBlock { color, .. } => Some(*color),
            Prop::ColorBox { target } => Some(*target),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_only_for_puzzle_props() {
        assert_eq!(Prop::block(PuzzleColor::Red).color(), Some(PuzzleColor::Red));
        assert_eq!(Prop::color_box(PuzzleColor::Green).color(), Some(PuzzleColor::Green));
        assert_eq!(Prop::key().color(), None);
        assert_eq!(Prop::Wall.color(), None);
    }

    #[test]
    fn test_box_is_dimmer_than_block() {
        for color in PuzzleColor::ALL {
            let block = color.rgba();
            let target = color.box_rgba();
            assert!(target.r <= block.r && target.g <= block.g && target.b <= block.b);
            assert_eq!(target.a, block.a);
        }
    }
}
