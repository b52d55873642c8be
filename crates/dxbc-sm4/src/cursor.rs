use crate::error::{DecodeError, DecodeErrorKind};

/// Sequential, bounds-checked reader over little-endian SM4/SM5 tokens.
///
/// Positions are token indices into the whole chunk, including for cursors
/// produced by [`TokenCursor::take`], so errors always point at the absolute
/// token that failed.
#[derive(Debug, Clone)]
pub struct TokenCursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> TokenCursor<'a> {
    /// Wraps a token chunk payload. The length must be a whole number of tokens.
    pub fn new(bytes: &'a [u8]) -> Result<Self, DecodeError> {
        if bytes.len() % 4 != 0 {
            return Err(DecodeError::new(
                0,
                DecodeErrorKind::MisalignedChunk { len: bytes.len() },
            ));
        }
        Ok(Self {
            bytes,
            pos: 0,
            end: bytes.len() / 4,
        })
    }

    /// Index of the next token to be read.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Tokens left before the cursor boundary.
    pub fn remaining(&self) -> usize {
        self.end - self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.end
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        self.ensure(1)?;
        let at = self.pos * 4;
        let b = &self.bytes[at..at + 4];
        self.pos += 1;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Reads two tokens as a 64-bit value, low word first.
    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        self.ensure(2)?;
        let lo = self.read_u32()?;
        let hi = self.read_u32()?;
        Ok(u64::from(lo) | (u64::from(hi) << 32))
    }

    /// Returns the next token without consuming it.
    pub fn peek_u32(&self) -> Result<u32, DecodeError> {
        self.clone().read_u32()
    }

    /// Advances past `n` tokens without decoding them.
    pub fn skip(&mut self, n: usize) -> Result<(), DecodeError> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    /// Reads `n` tokens into an owned vector.
    pub fn read_vec(&mut self, n: usize) -> Result<Vec<u32>, DecodeError> {
        self.ensure(n)?;
        (0..n).map(|_| self.read_u32()).collect()
    }

    /// Splits off the next `n` tokens as their own cursor and advances past them.
    pub fn take(&mut self, n: usize) -> Result<TokenCursor<'a>, DecodeError> {
        self.ensure(n)?;
        let sub = TokenCursor {
            bytes: self.bytes,
            pos: self.pos,
            end: self.pos + n,
        };
        self.pos += n;
        Ok(sub)
    }

    /// Moves the boundary in to `len` tokens from the chunk start, if it is not
    /// already closer.
    pub fn truncate(&mut self, len: usize) {
        self.end = self.end.min(len.max(self.pos));
    }

    pub(crate) fn error(&self, kind: DecodeErrorKind) -> DecodeError {
        DecodeError::new(self.pos, kind)
    }

    fn ensure(&self, wanted: usize) -> Result<(), DecodeError> {
        if wanted > self.remaining() {
            return Err(self.error(DecodeErrorKind::BufferOverrun {
                wanted,
                remaining: self.remaining(),
            }));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes(tokens: &[u32]) -> Vec<u8> {
        tokens.iter().flat_map(|t| t.to_le_bytes()).collect()
    }

    #[test]
    fn reads_tokens_and_pairs() {
        let data = bytes(&[7, 0x8888_0001, 0x0000_0002]);
        let mut c = TokenCursor::new(&data).unwrap();
        assert_eq!(c.read_u32().unwrap(), 7);
        assert_eq!(c.read_u64().unwrap(), 0x0000_0002_8888_0001);
        assert!(c.is_at_end());
    }

    #[test]
    fn rejects_partial_tokens() {
        let err = TokenCursor::new(&[0u8; 6]).unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::MisalignedChunk { len: 6 });
    }

    #[test]
    fn overrun_is_reported_without_advancing() {
        let data = bytes(&[1, 2, 3]);
        let mut c = TokenCursor::new(&data).unwrap();
        c.skip(2).unwrap();
        let err = c.read_u64().unwrap_err();
        assert_eq!(err.at_token, 2);
        assert_eq!(
            err.kind,
            DecodeErrorKind::BufferOverrun {
                wanted: 2,
                remaining: 1
            }
        );
        assert_eq!(c.read_u32().unwrap(), 3);
    }

    #[test]
    fn take_bounds_the_sub_cursor() {
        let data = bytes(&[10, 11, 12, 13]);
        let mut c = TokenCursor::new(&data).unwrap();
        c.skip(1).unwrap();
        let mut sub = c.take(2).unwrap();
        assert_eq!(c.position(), 3);
        assert_eq!(sub.position(), 1);
        assert_eq!(sub.read_u32().unwrap(), 11);
        assert_eq!(sub.read_u32().unwrap(), 12);
        let err = sub.read_u32().unwrap_err();
        assert_eq!(err.at_token, 3);
    }

    #[test]
    fn truncate_never_moves_past_the_original_end() {
        let data = bytes(&[1, 2, 3, 4]);
        let mut c = TokenCursor::new(&data).unwrap();
        c.truncate(100);
        assert_eq!(c.remaining(), 4);
        c.truncate(2);
        assert_eq!(c.remaining(), 2);
    }
}
