//! Software access types and bit ranges.

use std::fmt;

/// Software access type of a register field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwAccess {
    Ro,
    Rc,
    Rw,
    R0w1c,
    Rw1s,
    Rw1c,
    Rw0c,
    Wo,
}

impl SwAccess {
    /// Parse an access type as written in descriptors.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ro" => Some(Self::Ro),
            "rc" => Some(Self::Rc),
            "rw" => Some(Self::Rw),
            "r0w1c" => Some(Self::R0w1c),
            "rw1s" => Some(Self::Rw1s),
            "rw1c" => Some(Self::Rw1c),
            "rw0c" => Some(Self::Rw0c),
            "wo" => Some(Self::Wo),
            _ => None,
        }
    }

    /// Descriptor spelling of the access type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ro => "ro",
            Self::Rc => "rc",
            Self::Rw => "rw",
            Self::R0w1c => "r0w1c",
            Self::Rw1s => "rw1s",
            Self::Rw1c => "rw1c",
            Self::Rw0c => "rw0c",
            Self::Wo => "wo",
        }
    }

    /// Whether software can read the value back.
    #[must_use]
    pub fn is_readable(self) -> bool {
        !matches!(self, Self::Wo)
    }
}

impl fmt::Display for SwAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive bit range `msb:lsb` within a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitRange {
    pub msb: u32,
    pub lsb: u32,
}

impl BitRange {
    /// Parse `"n"` or `"msb:lsb"`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let (msb, lsb) = match s.split_once(':') {
            Some((msb, lsb)) => (msb.trim().parse().ok()?, lsb.trim().parse().ok()?),
            None => {
                let bit = s.trim().parse().ok()?;
                (bit, bit)
            }
        };
        (msb >= lsb).then_some(Self { msb, lsb })
    }

    /// Number of bits covered.
    #[must_use]
    pub fn width(self) -> u32 {
        self.msb - self.lsb + 1
    }

    /// Mask of the covered bits within a 64-bit word.
    #[must_use]
    pub fn mask(self) -> u64 {
        let ones = if self.width() >= 64 {
            u64::MAX
        } else {
            (1u64 << self.width()) - 1
        };
        ones << self.lsb
    }
}

impl fmt::Display for BitRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.msb == self.lsb {
            write!(f, "{}", self.lsb)
        } else {
            write!(f, "{}:{}", self.msb, self.lsb)
        }
    }
}

/// Parse a descriptor integer: decimal, `0x` hex, `0b` binary or `0o` octal,
/// with optional `_` separators.
#[must_use]
pub fn parse_int(s: &str) -> Option<u64> {
    let cleaned = s.trim().replace('_', "");
    let lower = cleaned.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        u64::from_str_radix(bin, 2).ok()
    } else if let Some(oct) = lower.strip_prefix("0o") {
        u64::from_str_radix(oct, 8).ok()
    } else {
        lower.parse().ok()
    }
}
