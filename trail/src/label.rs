//! The four activity classes a cell of an integral/zero-correlation trail may take, and the
//! presentation style each of them is drawn with.

use std::convert::TryFrom;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a single state cell, as assigned by the solver.
///
/// The solver encodes the labels as the integers `0..=3`, see the `TryFrom<u8>` impl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityLabel {
    /// The cell is provably inactive.
    Zero,
    /// Active, with a fixed/known difference class.
    NonzeroFixed,
    /// Active, arbitrary value.
    NonzeroAny,
    /// Not determined by the solver.
    Unknown,
}

/// Visual style tag a renderer fills a cell with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    White,
    NonzeroFixed,
    NonzeroAny,
    Unknown,
}

impl ActivityLabel {
    pub const ALL: [ActivityLabel; 4] = [
        ActivityLabel::Zero,
        ActivityLabel::NonzeroFixed,
        ActivityLabel::NonzeroAny,
        ActivityLabel::Unknown,
    ];

    #[inline]
    pub fn style(self) -> Style {
        style(self)
    }

    /// The integer the solver uses for this label.
    #[inline]
    pub fn raw(self) -> u8 {
        match self {
            ActivityLabel::Zero => 0,
            ActivityLabel::NonzeroFixed => 1,
            ActivityLabel::NonzeroAny => 2,
            ActivityLabel::Unknown => 3,
        }
    }

    #[inline]
    pub fn is_active(self) -> bool {
        self != ActivityLabel::Zero
    }
}

impl TryFrom<u8> for ActivityLabel {
    /// The rejected raw value.
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(ActivityLabel::Zero),
            1 => Ok(ActivityLabel::NonzeroFixed),
            2 => Ok(ActivityLabel::NonzeroAny),
            3 => Ok(ActivityLabel::Unknown),
            other => Err(other),
        }
    }
}

/// Maps a label onto its presentation style. Total, never fails.
pub fn style(label: ActivityLabel) -> Style {
    match label {
        ActivityLabel::Zero => Style::White,
        ActivityLabel::NonzeroFixed => Style::NonzeroFixed,
        ActivityLabel::NonzeroAny => Style::NonzeroAny,
        ActivityLabel::Unknown => Style::Unknown,
    }
}

impl Style {
    /// Name of the style as the renderer's style package knows it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Style::White => "white",
            Style::NonzeroFixed => "nonzerofixed",
            Style::NonzeroAny => "nonzeroany",
            Style::Unknown => "unknown",
        }
    }

    /// One character shorthand, used when a state is logged as a grid.
    pub fn glyph(&self) -> char {
        match self {
            Style::White => '.',
            Style::NonzeroFixed => 'F',
            Style::NonzeroAny => 'A',
            Style::Unknown => '?',
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for ActivityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw())
    }
}
