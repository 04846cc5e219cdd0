use crate::{Result, constants::ALERT_KEY_CHAR, error::Error};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single decimal digit (0-9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Digit(u8);

impl Digit {
    /// Create a new digit with validation.
    ///
    /// # Errors
    /// Returns `Error::InvalidDigit` if the value is greater than 9.
    pub fn new(value: u8) -> Result<Self> {
        if value > 9 {
            return Err(Error::InvalidDigit(value));
        }
        Ok(Digit(value))
    }

    /// Parse a digit from its ASCII character.
    ///
    /// # Errors
    /// Returns `Error::InvalidKey` if the character is not `'0'..='9'`.
    pub fn from_char(c: char) -> Result<Self> {
        c.to_digit(10)
            .map(|d| Digit(d as u8))
            .ok_or(Error::InvalidKey(c))
    }

    /// Get the raw digit value.
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self.0
    }

    /// Get the ASCII character for this digit.
    #[must_use]
    pub fn as_char(self) -> char {
        char::from(b'0' + self.0)
    }
}

impl TryFrom<u8> for Digit {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Digit::new(value)
    }
}

impl From<Digit> for u8 {
    fn from(digit: Digit) -> Self {
        digit.0
    }
}

impl fmt::Display for Digit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A raw key as reported by the keypad scanner.
///
/// Covers the 4×4 matrix keypad (see [`crate::constants::KEYPAD_MATRIX`]) and
/// the separate alert button, which is wired to its own input and never
/// conflated with lock sensor edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RawKey {
    /// Numeric key `0`-`9`.
    Digit(Digit),
    /// Letter key `A` (menu).
    A,
    /// Letter key `B` (reopen).
    B,
    /// Letter key `C` (unassigned).
    C,
    /// Letter key `D` (delete).
    D,
    /// Star key `*` (back).
    Star,
    /// Hash key `#` (confirm).
    Hash,
    /// Dedicated alert button.
    Alert,
}

impl RawKey {
    /// Parse a key from the character printed on it.
    ///
    /// Letters are case-insensitive. The alert button is represented by `'!'`.
    ///
    /// # Errors
    /// Returns `Error::InvalidKey` for characters not present on the keypad.
    ///
    /// # Examples
    ///
    /// ```
    /// use lockbox_core::{Digit, RawKey};
    ///
    /// assert_eq!(RawKey::from_char('7').unwrap(), RawKey::Digit(Digit::new(7).unwrap()));
    /// assert_eq!(RawKey::from_char('#').unwrap(), RawKey::Hash);
    /// assert!(RawKey::from_char('x').is_err());
    /// ```
    pub fn from_char(c: char) -> Result<Self> {
        match c.to_ascii_uppercase() {
            '0'..='9' => Digit::from_char(c).map(RawKey::Digit),
            'A' => Ok(RawKey::A),
            'B' => Ok(RawKey::B),
            'C' => Ok(RawKey::C),
            'D' => Ok(RawKey::D),
            '*' => Ok(RawKey::Star),
            '#' => Ok(RawKey::Hash),
            ALERT_KEY_CHAR => Ok(RawKey::Alert),
            _ => Err(Error::InvalidKey(c)),
        }
    }

    /// Get the character printed on this key.
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            RawKey::Digit(d) => d.as_char(),
            RawKey::A => 'A',
            RawKey::B => 'B',
            RawKey::C => 'C',
            RawKey::D => 'D',
            RawKey::Star => '*',
            RawKey::Hash => '#',
            RawKey::Alert => ALERT_KEY_CHAR,
        }
    }
}

impl fmt::Display for RawKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl std::str::FromStr for RawKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => RawKey::from_char(c),
            (Some(c), Some(_)) => Err(Error::InvalidKey(c)),
            (None, _) => Err(Error::InvalidKey(' ')),
        }
    }
}

/// Identifier of a digital I/O line on the controller board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(u8);

impl LineId {
    /// Create a line identifier.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        LineId(id)
    }

    /// Get the raw line number.
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

/// Logic level of a digital line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Low,
    High,
}

impl Level {
    #[inline]
    #[must_use]
    pub fn from_bool(high: bool) -> Self {
        if high { Level::High } else { Level::Low }
    }

    #[inline]
    #[must_use]
    pub fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Level::Low => write!(f, "low"),
            Level::High => write!(f, "high"),
        }
    }
}

/// Mechanical position of the lock, as reported by its position sensor.
///
/// The sensor line reads high while the lock is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockPosition {
    Open,
    #[default]
    Closed,
}

impl LockPosition {
    /// Map a sensor line level to a lock position.
    #[inline]
    #[must_use]
    pub fn from_level(level: Level) -> Self {
        match level {
            Level::High => LockPosition::Open,
            Level::Low => LockPosition::Closed,
        }
    }

    /// The sensor line level corresponding to this position.
    #[inline]
    #[must_use]
    pub fn to_level(self) -> Level {
        match self {
            LockPosition::Open => Level::High,
            LockPosition::Closed => Level::Low,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_open(self) -> bool {
        matches!(self, LockPosition::Open)
    }
}

impl fmt::Display for LockPosition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LockPosition::Open => write!(f, "Open"),
            LockPosition::Closed => write!(f, "Closed"),
        }
    }
}
