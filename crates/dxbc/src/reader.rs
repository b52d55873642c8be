use crate::DxbcError;

/// A little-endian cursor over a byte slice.
///
/// Every read is bounds-checked and reports [`DxbcError::BufferOverrun`] with the
/// offending offset relative to the start of the underlying slice. Chunk parsers
/// use [`ByteReader::fork`] to jump to the chunk-relative offsets stored in their
/// headers.
#[derive(Debug, Clone, Copy)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a reader positioned at the start of `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Returns a new reader over the same slice, positioned at `offset`.
    pub fn fork(&self, offset: usize) -> Result<Self, DxbcError> {
        if offset > self.bytes.len() {
            return Err(self.overrun(offset, 0));
        }
        Ok(Self {
            bytes: self.bytes,
            pos: offset,
        })
    }

    /// Current position, relative to the start of the slice.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Number of bytes left after the current position.
    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    /// Length of the underlying slice.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the underlying slice is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consumes `len` bytes and returns them.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DxbcError> {
        let end = self
            .pos
            .checked_add(len)
            .ok_or_else(|| self.overrun(self.pos, len))?;
        let slice = self
            .bytes
            .get(self.pos..end)
            .ok_or_else(|| self.overrun(self.pos, len))?;
        self.pos = end;
        Ok(slice)
    }

    /// Skips `len` bytes without decoding them.
    pub fn skip(&mut self, len: usize) -> Result<(), DxbcError> {
        self.read_bytes(len).map(|_| ())
    }

    /// Reads a single byte.
    pub fn read_u8(&mut self) -> Result<u8, DxbcError> {
        Ok(self.read_bytes(1)?[0])
    }

    /// Reads a little-endian `u16`.
    pub fn read_u16_le(&mut self) -> Result<u16, DxbcError> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    /// Reads a little-endian `u32`.
    pub fn read_u32_le(&mut self) -> Result<u32, DxbcError> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Reads a NUL-terminated string starting at absolute `offset`, without moving
    /// the cursor.
    ///
    /// Invalid UTF-8 is replaced rather than rejected; compilers only ever emit
    /// ASCII identifiers here.
    pub fn read_cstring_at(&self, offset: usize) -> Result<String, DxbcError> {
        let tail = self
            .bytes
            .get(offset..)
            .ok_or_else(|| self.overrun(offset, 1))?;
        let nul = tail
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| self.overrun(offset, tail.len() + 1))?;
        Ok(String::from_utf8_lossy(&tail[..nul]).into_owned())
    }

    fn overrun(&self, offset: usize, wanted: usize) -> DxbcError {
        DxbcError::BufferOverrun {
            offset,
            wanted,
            len: self.bytes.len(),
        }
    }
}
