use core::fmt;

use tracing::debug;

use crate::reader::ByteReader;
use crate::{DxbcError, FourCC};

// magic + checksum + reserved + total_size + chunk_count
const DXBC_HEADER_LEN: usize = 4 + 16 + 4 + 4 + 4;
const CHUNK_HEADER_LEN: usize = 8;

/// Upper bound on the number of chunks accepted in one container.
///
/// Compilers emit a handful of chunks; the cap keeps hostile offset tables from
/// driving large validation loops.
pub const MAX_DXBC_CHUNK_COUNT: u32 = 4096;

/// The fixed header of a `DXBC` container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DxbcHeader {
    /// The checksum stored in the header. It is not verified.
    pub checksum: [u8; 16],
    /// Declared total size of the container, in bytes.
    pub total_size: u32,
    /// Number of entries in the chunk offset table.
    pub chunk_count: u32,
}

/// A single chunk within a `DXBC` container.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct DxbcChunk<'a> {
    /// The chunk tag (e.g. `SHEX`, `RDEF`).
    pub fourcc: FourCC,
    /// Chunk payload, excluding the tag and size fields.
    pub data: &'a [u8],
}

impl fmt::Debug for DxbcChunk<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DxbcChunk")
            .field("fourcc", &self.fourcc)
            .field("data_len", &self.data.len())
            .finish()
    }
}

/// A validated view over a `DXBC` container.
///
/// [`DxbcFile::parse`] checks every chunk offset and size up front, so the lookup
/// methods never fail afterwards.
#[derive(Debug, Clone)]
pub struct DxbcFile<'a> {
    header: DxbcHeader,
    chunks: Vec<DxbcChunk<'a>>,
}

impl<'a> DxbcFile<'a> {
    /// Parses and validates a `DXBC` container.
    pub fn parse(bytes: &'a [u8]) -> Result<DxbcFile<'a>, DxbcError> {
        if bytes.len() < DXBC_HEADER_LEN {
            return Err(DxbcError::malformed_header(format!(
                "need at least {DXBC_HEADER_LEN} bytes, got {}",
                bytes.len()
            )));
        }

        let mut r = ByteReader::new(bytes);
        let tag = header_field(r.read_bytes(4))?;
        let magic = FourCC([tag[0], tag[1], tag[2], tag[3]]);
        if magic != FourCC::DXBC {
            return Err(DxbcError::malformed_header(format!(
                "bad magic {magic:?}, expected {:?}",
                FourCC::DXBC
            )));
        }

        let mut checksum = [0u8; 16];
        checksum.copy_from_slice(header_field(r.read_bytes(16))?);
        // Reserved word; always 1 in compiler output but not enforced.
        header_field(r.skip(4))?;
        let total_size = header_field(r.read_u32_le())?;
        let chunk_count = header_field(r.read_u32_le())?;

        if chunk_count > MAX_DXBC_CHUNK_COUNT {
            return Err(DxbcError::malformed_offsets(format!(
                "chunk_count {chunk_count} exceeds maximum {MAX_DXBC_CHUNK_COUNT}"
            )));
        }
        let total_len = total_size as usize;
        if total_len < DXBC_HEADER_LEN {
            return Err(DxbcError::malformed_header(format!(
                "total_size {total_size} is smaller than header size {DXBC_HEADER_LEN}"
            )));
        }
        if total_len > bytes.len() {
            return Err(DxbcError::malformed_header(format!(
                "total_size {total_size} exceeds buffer length {}",
                bytes.len()
            )));
        }

        // Everything past the declared size is ignored.
        let bytes = &bytes[..total_len];
        let table_end = DXBC_HEADER_LEN + chunk_count as usize * 4;
        if table_end > bytes.len() {
            return Err(DxbcError::malformed_offsets(format!(
                "chunk offset table ends at {table_end}, but total_size is {total_size}"
            )));
        }

        let mut table = ByteReader::new(bytes).fork(DXBC_HEADER_LEN)?;
        let mut chunks = Vec::with_capacity(chunk_count as usize);
        for i in 0..chunk_count {
            let chunk_offset = table.read_u32_le()? as usize;
            chunks.push(read_chunk(bytes, i, chunk_offset, table_end)?);
        }

        debug!(total_size, chunk_count, "parsed DXBC container");

        Ok(DxbcFile {
            header: DxbcHeader {
                checksum,
                total_size,
                chunk_count,
            },
            chunks,
        })
    }

    /// Returns the container header.
    pub fn header(&self) -> &DxbcHeader {
        &self.header
    }

    /// Iterates over all chunks in file order.
    pub fn chunks(&self) -> impl Iterator<Item = DxbcChunk<'a>> + '_ {
        self.chunks.iter().copied()
    }

    /// Returns the first chunk tagged `fourcc`, if any.
    pub fn get_chunk(&self, fourcc: FourCC) -> Option<DxbcChunk<'a>> {
        self.chunks().find(|chunk| chunk.fourcc == fourcc)
    }

    /// Returns the first chunk tagged `fourcc`, or [`DxbcError::MissingChunk`].
    pub fn require_chunk(&self, fourcc: FourCC) -> Result<DxbcChunk<'a>, DxbcError> {
        self.get_chunk(fourcc).ok_or(DxbcError::MissingChunk(fourcc))
    }

    /// Returns the first chunk (in file order) whose tag is any of `fourccs`.
    pub fn find_first_of(&self, fourccs: &[FourCC]) -> Option<DxbcChunk<'a>> {
        self.chunks().find(|chunk| fourccs.contains(&chunk.fourcc))
    }

    /// Returns a human-readable listing of the container and its chunks.
    pub fn debug_summary(&self) -> String {
        use core::fmt::Write as _;

        let mut out = String::new();
        let _ = write!(
            &mut out,
            "DXBC total_size={} chunk_count={}",
            self.header.total_size, self.header.chunk_count
        );
        for (idx, chunk) in self.chunks().enumerate() {
            let _ = write!(
                &mut out,
                "\n  [{idx:02}] {} {} bytes",
                chunk.fourcc,
                chunk.data.len()
            );
        }
        out
    }
}

fn header_field<T>(res: Result<T, DxbcError>) -> Result<T, DxbcError> {
    res.map_err(|e| DxbcError::malformed_header(e.to_string()))
}

fn read_chunk(
    bytes: &[u8],
    index: u32,
    offset: usize,
    table_end: usize,
) -> Result<DxbcChunk<'_>, DxbcError> {
    if offset < table_end {
        return Err(DxbcError::malformed_offsets(format!(
            "chunk {index} offset {offset} points into the container header (need >= {table_end})"
        )));
    }

    let mut r = ByteReader::new(bytes).fork(offset).map_err(|_| {
        DxbcError::malformed_offsets(format!(
            "chunk {index} offset {offset} is outside total_size {}",
            bytes.len()
        ))
    })?;
    if r.remaining() < CHUNK_HEADER_LEN {
        return Err(DxbcError::malformed_offsets(format!(
            "chunk {index} header at {offset} is truncated by total_size {}",
            bytes.len()
        )));
    }
    let tag = r.read_bytes(4)?;
    let fourcc = FourCC([tag[0], tag[1], tag[2], tag[3]]);
    let size = r.read_u32_le()? as usize;
    let data = r.read_bytes(size).map_err(|_| {
        DxbcError::malformed_offsets(format!(
            "chunk {index} ({fourcc}) declares {size} bytes at {}, past total_size {}",
            offset + CHUNK_HEADER_LEN,
            bytes.len()
        ))
    })?;

    Ok(DxbcChunk { fourcc, data })
}
