//! Moves and their PTN notation
//!
//! Placement: `[F|S|C]?<square>`, e.g. `a1`, `Sc3`, `Ce5`.
//! Spread: `[count]?<square><direction>[drops]*[*]?`, e.g. `a1>`, `3c3+12`,
//! `2b2<11*`. Directions are `+` (up), `-` (down), `<` (left), `>` (right).

use crate::board::{Direction, Square};
use crate::error::ParseError;
use crate::pieces::{PieceKind, MAX_SIZE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pieces dropped on each square a spread passes over, in travel order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Drops {
    counts: [u8; MAX_SIZE],
    len: u8,
}

impl Drops {
    /// Build from per-square counts. Every count must be non-zero and at most
    /// `MAX_SIZE` squares can be covered.
    pub fn new(counts: &[u8]) -> Option<Self> {
        if counts.is_empty() || counts.len() > MAX_SIZE || counts.contains(&0) {
            return None;
        }
        let mut drops = Self {
            counts: [0; MAX_SIZE],
            len: counts.len() as u8,
        };
        drops.counts[..counts.len()].copy_from_slice(counts);
        if drops.total() > MAX_SIZE {
            return None;
        }
        Some(drops)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.counts[..self.len as usize]
    }

    /// Number of squares the spread travels
    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of pieces picked up
    pub fn total(&self) -> usize {
        self.as_slice().iter().map(|&count| count as usize).sum()
    }

    pub fn last(&self) -> u8 {
        self.as_slice().last().copied().unwrap_or(0)
    }
}

/// A single ply
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Place {
        square: Square,
        kind: PieceKind,
    },
    Spread {
        square: Square,
        direction: Direction,
        drops: Drops,
    },
}

impl Move {
    pub fn place(square: Square, kind: PieceKind) -> Self {
        Move::Place { square, kind }
    }

    pub fn spread(square: Square, direction: Direction, drops: Drops) -> Self {
        Move::Spread {
            square,
            direction,
            drops,
        }
    }

    /// Square placed on, or the origin of a spread
    pub fn square(&self) -> Square {
        match *self {
            Move::Place { square, .. } | Move::Spread { square, .. } => square,
        }
    }

    pub fn is_placement(&self) -> bool {
        matches!(self, Move::Place { .. })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Move::Place { square, kind } => {
                if let Some(letter) = kind.letter() {
                    write!(f, "{letter}")?;
                }
                write!(f, "{square}")
            }
            Move::Spread {
                square,
                direction,
                drops,
            } => {
                let pickup = drops.total();
                if pickup > 1 {
                    write!(f, "{pickup}")?;
                }
                write!(f, "{square}{}", direction.symbol())?;
                if drops.len() > 1 {
                    for count in drops.as_slice() {
                        write!(f, "{count}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl FromStr for Move {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Err(ParseError::Empty);
        }
        if !text.is_ascii() {
            return Err(ParseError::Move(s.to_string()));
        }
        let bad = || ParseError::Move(s.to_string());

        // Placement with an explicit kind
        let kind = match text.as_bytes()[0] {
            b'F' => Some(PieceKind::Flat),
            b'S' => Some(PieceKind::Wall),
            b'C' => Some(PieceKind::Cap),
            _ => None,
        };
        if let Some(kind) = kind {
            let square = text[1..].parse::<Square>().map_err(|_| bad())?;
            return Ok(Move::place(square, kind));
        }

        let (body, smash) = match text.strip_suffix('*') {
            Some(body) => (body, true),
            None => (text, false),
        };
        if body.is_empty() {
            return Err(bad());
        }

        let (pickup, rest) = match body.as_bytes()[0] {
            digit @ b'1'..=b'8' => (Some((digit - b'0') as usize), &body[1..]),
            b'0' | b'9' => return Err(ParseError::Drops(s.to_string())),
            _ => (None, body),
        };
        if rest.len() < 2 {
            return Err(bad());
        }
        let square = rest[..2].parse::<Square>().map_err(|_| bad())?;
        let rest = &rest[2..];

        let mut chars = rest.chars();
        let direction = match chars.next() {
            None if pickup.is_none() && !smash => {
                return Ok(Move::place(square, PieceKind::Flat));
            }
            None => return Err(bad()),
            Some(symbol) => Direction::from_symbol(symbol).ok_or_else(bad)?,
        };

        let pickup = pickup.unwrap_or(1);
        let counts = chars
            .map(|ch| match ch.to_digit(10) {
                Some(digit) => Ok(digit as u8),
                None => Err(bad()),
            })
            .collect::<Result<Vec<u8>, _>>()?;
        let drops = if counts.is_empty() {
            Drops::new(&[pickup as u8])
        } else {
            Drops::new(&counts)
        }
        .filter(|drops| drops.total() == pickup)
        .ok_or_else(|| ParseError::Drops(s.to_string()))?;

        Ok(Move::spread(square, direction, drops))
    }
}
