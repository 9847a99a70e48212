use crate::color::Rgb;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStyle {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

/// Visual attributes the style rules look at. `None` means the piece has no such component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PieceStyle {
    #[serde(default)]
    pub color: Option<Rgb>,
    #[serde(default)]
    pub text: Option<TextStyle>,
}

impl PieceStyle {
    pub fn colored(color: Rgb) -> Self {
        Self {
            color: Some(color),
            text: None,
        }
    }

    pub fn text(color: Rgb, bold: bool, italic: bool) -> Self {
        Self {
            color: Some(color),
            text: Some(TextStyle { bold, italic }),
        }
    }
}
