//! Page identifiers.
//!
//! A scanned page is addressed by volume, folio and side, rendered as
//! `<volume>-<folio><side>` (for example `1-1b`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when a string does not describe a page.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid page identifier '{0}': expected <volume>-<folio><side>, e.g. 1-1b")]
    Shape(String),

    #[error("invalid page identifier '{0}': volume and folio must be positive")]
    NotPositive(String),
}

/// Side of a folio. `A` sorts before `B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    A,
    B,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::A, Side::B];

    pub fn as_char(self) -> char {
        match self {
            Side::A => 'a',
            Side::B => 'b',
        }
    }

    fn from_char(c: char) -> Option<Self> {
        match c {
            'a' => Some(Side::A),
            'b' => Some(Side::B),
            _ => None,
        }
    }
}

/// Canonical `(volume, folio, side)` key of one page.
///
/// Field order matters: the derived ordering compares volume, then folio,
/// then side.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PageId {
    volume: u32,
    folio: u32,
    side: Side,
}

impl PageId {
    /// Builds an identifier, rejecting zero volume or folio numbers.
    pub fn new(volume: u32, folio: u32, side: Side) -> Option<Self> {
        if volume == 0 || folio == 0 {
            return None;
        }
        Some(Self {
            volume,
            folio,
            side,
        })
    }

    pub fn volume(&self) -> u32 {
        self.volume
    }

    pub fn folio(&self) -> u32 {
        self.folio
    }

    pub fn side(&self) -> Side {
        self.side
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}{}", self.volume, self.folio, self.side.as_char())
    }
}

fn parse_number(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

impl FromStr for PageId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let shape = || ParseError::Shape(s.to_string());

        let (volume, rest) = s.split_once('-').ok_or_else(shape)?;
        let side_char = rest.chars().last().ok_or_else(shape)?;
        let side = Side::from_char(side_char).ok_or_else(shape)?;
        let folio = &rest[..rest.len() - side_char.len_utf8()];

        let volume = parse_number(volume).ok_or_else(shape)?;
        let folio = parse_number(folio).ok_or_else(shape)?;

        PageId::new(volume, folio, side).ok_or_else(|| ParseError::NotPositive(s.to_string()))
    }
}

impl TryFrom<String> for PageId {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PageId> for String {
    fn from(id: PageId) -> Self {
        id.to_string()
    }
}
