use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MetagameError;

/// One of the five colors of magic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
}

impl Color {
    pub const ALL: [Color; 5] = [Color::White, Color::Blue, Color::Black, Color::Red, Color::Green];

    fn bit(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Blue => 1 << 1,
            Color::Black => 1 << 2,
            Color::Red => 1 << 3,
            Color::Green => 1 << 4,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Color::White => 'W',
            Color::Blue => 'U',
            Color::Black => 'B',
            Color::Red => 'R',
            Color::Green => 'G',
        }
    }
}

/// A set of colors, e.g. a card's color identity or a whole deck's.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Colors(u8);

impl Colors {
    pub const COLORLESS: Colors = Colors(0);

    pub fn with(self, color: Color) -> Self {
        Colors(self.0 | color.bit())
    }

    pub fn union(self, other: Colors) -> Self {
        Colors(self.0 | other.0)
    }

    pub fn contains(self, color: Color) -> bool {
        self.0 & color.bit() != 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The conventional community name for this color combination.
    pub fn name(self) -> &'static str {
        use Color::*;
        let has = |c: Color| self.contains(c);
        match self.len() {
            0 => "Colorless",
            1 => match Color::ALL.iter().copied().find(|c| has(*c)) {
                Some(White) => "Mono White",
                Some(Blue) => "Mono Blue",
                Some(Black) => "Mono Black",
                Some(Red) => "Mono Red",
                _ => "Mono Green",
            },
            2 => match (has(White), has(Blue), has(Black), has(Red), has(Green)) {
                (true, true, _, _, _) => "Azorius",
                (true, _, true, _, _) => "Orzhov",
                (true, _, _, true, _) => "Boros",
                (true, _, _, _, true) => "Selesnya",
                (_, true, true, _, _) => "Dimir",
                (_, true, _, true, _) => "Izzet",
                (_, true, _, _, true) => "Simic",
                (_, _, true, true, _) => "Rakdos",
                (_, _, true, _, true) => "Golgari",
                _ => "Gruul",
            },
            3 => match (has(White), has(Blue), has(Black), has(Red), has(Green)) {
                (true, true, false, false, true) => "Bant",
                (true, true, true, false, false) => "Esper",
                (false, true, true, true, false) => "Grixis",
                (false, false, true, true, true) => "Jund",
                (true, false, false, true, true) => "Naya",
                (true, false, true, false, true) => "Abzan",
                (true, true, false, true, false) => "Jeskai",
                (false, true, true, false, true) => "Sultai",
                (true, false, true, true, false) => "Mardu",
                _ => "Temur",
            },
            4 => "4 Color",
            _ => "5 Color",
        }
    }
}

impl FromIterator<Color> for Colors {
    fn from_iter<I: IntoIterator<Item = Color>>(iter: I) -> Self {
        iter.into_iter().fold(Colors::COLORLESS, Colors::with)
    }
}

impl fmt::Display for Colors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for color in Color::ALL {
            if self.contains(color) {
                write!(f, "{}", color.symbol())?;
            }
        }
        Ok(())
    }
}

/// Parses a WUBRG symbol string such as `"UR"`. `"C"` and `""` are colorless.
impl FromStr for Colors {
    type Err = MetagameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .try_fold(Colors::COLORLESS, |acc, ch| match ch.to_ascii_uppercase() {
                'W' => Ok(acc.with(Color::White)),
                'U' => Ok(acc.with(Color::Blue)),
                'B' => Ok(acc.with(Color::Black)),
                'R' => Ok(acc.with(Color::Red)),
                'G' => Ok(acc.with(Color::Green)),
                'C' => Ok(acc),
                other => Err(MetagameError::InvalidColor(other)),
            })
    }
}
