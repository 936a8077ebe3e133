use std::fmt;

/// # Opcodes
///
/// Chip-8 opcodes are 16 bits each. Their behavior is cased on some combination of:
/// - `(n, _, _, _)` broad categorization; applies to all opcodes
/// - `(_, _, _, n)` specific behavior within a category
/// - `(_, _, n, n)` more specific behavior within a category
/// - `(_, n, n, n)` some fixed function that doesn't require variables (e.g. CLS; clear screen)
///
/// Nibbles not used to determine the operation often (but not always) carry important data.
/// - `(_, n, n, n)` represent a 12-bit address
/// - `(_, _, n, n)` encodes some data that is assigned to and/or compared with Vx
/// - `(_, n, _, _)` refers either to the register Vx or a range of registers V0..Vx
/// - `(_, _, n, _)` refers to the the register Vy
///
/// An `Opcode` decoded from memory has all four nibbles. The instruction table also uses
/// `Opcode`s as patterns, where a `None` nibble is a wildcard that matches anything.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Opcode {
    nibbles: [Option<u8>; 4],
}

impl Opcode {
    /// Builds a pattern; `None` nibbles match any value.
    pub const fn pattern(
        first: Option<u8>,
        second: Option<u8>,
        third: Option<u8>,
        fourth: Option<u8>,
    ) -> Self {
        Opcode {
            nibbles: [first, second, third, fourth],
        }
    }

    /// Returns the Opcode's component nibbles.
    pub fn nibbles(&self) -> [Option<u8>; 4] {
        self.nibbles
    }

    /// The Opcode's second nibble as a register index.
    /// `[_x__]`
    pub fn x(&self) -> Option<usize> {
        self.nibbles[1].map(usize::from)
    }

    /// The Opcode's third nibble as a register index.
    /// `[__y_]`
    pub fn y(&self) -> Option<usize> {
        self.nibbles[2].map(usize::from)
    }

    /// The Opcode's fourth nibble.
    /// `[___n]`
    pub fn n(&self) -> Option<u8> {
        self.nibbles[3]
    }

    /// The Opcode's least significant byte.
    /// `[__kk]`
    pub fn kk(&self) -> Option<u8> {
        Some(self.nibbles[2]? << 4 | self.nibbles[3]?)
    }

    /// The Opcode without its most significant nibble.
    /// `[_adr]`
    pub fn addr(&self) -> Option<u16> {
        let [_, a, b, c] = self.nibbles;
        Some(u16::from(a?) << 8 | u16::from(b?) << 4 | u16::from(c?))
    }

    /// The 16-bit instruction this Opcode was decoded from, if it has no wildcards.
    pub fn raw(&self) -> Option<u16> {
        self.nibbles
            .iter()
            .try_fold(0u16, |acc, nibble| Some(acc << 4 | u16::from((*nibble)?)))
    }

    /// Whether `literal` fits this pattern.
    /// A nibble matches if either side leaves it out or both sides agree on it.
    pub fn matches(&self, literal: &Opcode) -> bool {
        self.nibbles
            .iter()
            .zip(literal.nibbles.iter())
            .all(|pair| match pair {
                (Some(want), Some(got)) => want == got,
                _ => true,
            })
    }

    /// How many nibbles this pattern pins down; more specific patterns win dispatch.
    pub fn specificity(&self) -> usize {
        self.nibbles.iter().filter(|nibble| nibble.is_some()).count()
    }
}

impl From<u16> for Opcode {
    fn from(raw: u16) -> Self {
        Opcode {
            nibbles: [
                Some(((raw & 0xF000) >> 12) as u8),
                Some(((raw & 0x0F00) >> 8) as u8),
                Some(((raw & 0x00F0) >> 4) as u8),
                Some((raw & 0x000F) as u8),
            ],
        }
    }
}

/// Hex nibbles with `_` for wildcards, e.g. `D123` or `8__4`
impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for nibble in self.nibbles.iter() {
            match nibble {
                Some(value) => write!(f, "{:X}", value)?,
                None => write!(f, "_")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test_opcode {
    use super::*;

    #[test]
    fn test_nibbles() {
        let op = Opcode::from(0xABCD);
        assert_eq!(op.nibbles(), [Some(0xA), Some(0xB), Some(0xC), Some(0xD)]);
    }

    #[test]
    fn test_x() {
        assert_eq!(Opcode::from(0xABCD).x(), Some(0xB));
    }

    #[test]
    fn test_y() {
        assert_eq!(Opcode::from(0xABCD).y(), Some(0xC));
    }

    #[test]
    fn test_n() {
        assert_eq!(Opcode::from(0xABCD).n(), Some(0xD));
    }

    #[test]
    fn test_kk() {
        assert_eq!(Opcode::from(0xABCD).kk(), Some(0xCD));
    }

    #[test]
    fn test_addr() {
        assert_eq!(Opcode::from(0xABCD).addr(), Some(0x0BCD));
    }

    #[test]
    fn test_raw() {
        assert_eq!(Opcode::from(0x00EE).raw(), Some(0x00EE));
        assert_eq!(Opcode::pattern(Some(0x1), None, None, None).raw(), None);
    }

    #[test]
    fn test_wildcards_have_no_operands() {
        let pattern = Opcode::pattern(Some(0x8), None, None, Some(0x4));
        assert_eq!(pattern.x(), None);
        assert_eq!(pattern.y(), None);
        assert_eq!(pattern.kk(), None);
        assert_eq!(pattern.addr(), None);
        assert_eq!(pattern.n(), Some(0x4));
    }

    #[test]
    fn test_pattern_matches_literal() {
        let pattern = Opcode::pattern(Some(0x8), None, None, Some(0x4));
        assert!(pattern.matches(&Opcode::from(0x8124)));
        assert!(pattern.matches(&Opcode::from(0x8FF4)));
        assert!(!pattern.matches(&Opcode::from(0x8125)));
        assert!(!pattern.matches(&Opcode::from(0x9124)));
    }

    #[test]
    fn test_specificity() {
        assert_eq!(Opcode::pattern(Some(0x0), None, None, None).specificity(), 1);
        assert_eq!(Opcode::pattern(Some(0xF), None, Some(0x6), Some(0x5)).specificity(), 3);
        assert_eq!(Opcode::from(0x00E0).specificity(), 4);
    }

    #[test]
    fn test_display() {
        assert_eq!(Opcode::from(0xD12F).to_string(), "D12F");
        assert_eq!(Opcode::pattern(Some(0x8), None, None, Some(0xE)).to_string(), "8__E");
    }
}
