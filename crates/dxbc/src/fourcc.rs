use core::fmt;

/// A four-character code identifying a `DXBC` container or chunk.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// Container magic.
    pub const DXBC: FourCC = FourCC(*b"DXBC");
    /// SM4 token stream.
    pub const SHDR: FourCC = FourCC(*b"SHDR");
    /// SM5 token stream.
    pub const SHEX: FourCC = FourCC(*b"SHEX");
    /// Resource definitions.
    pub const RDEF: FourCC = FourCC(*b"RDEF");
    /// Input signature, 24-byte records.
    pub const ISGN: FourCC = FourCC(*b"ISGN");
    /// Input signature, 32-byte records with minimum precision.
    pub const ISG1: FourCC = FourCC(*b"ISG1");
    /// Output signature, 24-byte records.
    pub const OSGN: FourCC = FourCC(*b"OSGN");
    /// Output signature, 28-byte records with a stream index.
    pub const OSG5: FourCC = FourCC(*b"OSG5");
    /// Output signature, 32-byte records with minimum precision.
    pub const OSG1: FourCC = FourCC(*b"OSG1");
    /// Patch-constant signature, 24-byte records.
    pub const PCSG: FourCC = FourCC(*b"PCSG");
    /// Patch-constant signature, 32-byte records with minimum precision.
    pub const PSG1: FourCC = FourCC(*b"PSG1");

    /// Returns the raw tag bytes.
    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl From<&[u8; 4]> for FourCC {
    fn from(value: &[u8; 4]) -> Self {
        FourCC(*value)
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCC(\"{self}\")")
    }
}
