//! Strand orientation
//!
//! Features are oriented relative to the genomic reference: forward,
//! reverse, or unstranded when orientation is unknown or meaningless.

use crate::core::error::ParseError;

/// Strand orientation of a feature
///
/// Ordering follows the conventional sort key used for segments:
/// forward before reverse before unstranded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub enum Strand {
    /// 5' to 3' along the reference ("+")
    Forward,
    /// 5' to 3' along the reverse complement ("-")
    Reverse,
    /// No orientation (".")
    #[default]
    Unstranded,
}

impl Strand {
    /// Get the complement strand
    ///
    /// # Examples
    /// ```
    /// use segchain::core::Strand;
    /// assert_eq!(Strand::Forward.complement(), Strand::Reverse);
    /// assert_eq!(Strand::Reverse.complement(), Strand::Forward);
    /// assert_eq!(Strand::Unstranded.complement(), Strand::Unstranded);
    /// ```
    pub fn complement(&self) -> Self {
        match self {
            Strand::Forward => Strand::Reverse,
            Strand::Reverse => Strand::Forward,
            Strand::Unstranded => Strand::Unstranded,
        }
    }

    /// Parse strand from char
    ///
    /// # Examples
    /// ```
    /// use segchain::core::Strand;
    /// assert_eq!(Strand::from_char('+'), Some(Strand::Forward));
    /// assert_eq!(Strand::from_char('-'), Some(Strand::Reverse));
    /// assert_eq!(Strand::from_char('.'), Some(Strand::Unstranded));
    /// assert_eq!(Strand::from_char('x'), None);
    /// ```
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Strand::Forward),
            '-' => Some(Strand::Reverse),
            '.' => Some(Strand::Unstranded),
            _ => None,
        }
    }

    /// Parse strand from byte
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'+' => Some(Strand::Forward),
            b'-' => Some(Strand::Reverse),
            b'.' => Some(Strand::Unstranded),
            _ => None,
        }
    }

    /// Convert to char
    pub fn to_char(&self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
            Strand::Unstranded => '.',
        }
    }

    /// Convert to byte
    pub fn to_byte(&self) -> u8 {
        match self {
            Strand::Forward => b'+',
            Strand::Reverse => b'-',
            Strand::Unstranded => b'.',
        }
    }

    /// True for forward or reverse, false for unstranded
    pub fn is_stranded(&self) -> bool {
        !matches!(self, Strand::Unstranded)
    }

    /// Whether two strands can belong to the same sense
    ///
    /// Unstranded acts as a wildcard: it is compatible with everything.
    pub fn compatible_with(&self, other: Strand) -> bool {
        *self == other || !self.is_stranded() || !other.is_stranded()
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

impl std::str::FromStr for Strand {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                Strand::from_char(c).ok_or_else(|| ParseError::InvalidStrand(s.to_string()))
            }
            _ => Err(ParseError::InvalidStrand(s.to_string())),
        }
    }
}
