//! Minimal RIFF/WAVE walker that pulls the description out of a `bext` chunk.
//!
//! Broadcast-wave files keep their free-text description in a fixed 256-byte
//! field at the start of the `bext` chunk, which generic tag readers skip.

use std::io::{self, Cursor, ErrorKind, Read, Seek, SeekFrom};

use thiserror::Error;

const RIFF_TAG: &[u8; 4] = b"RIFF";
const WAVE_TAG: &[u8; 4] = b"WAVE";
const BEXT_ID: &[u8; 4] = b"bext";

/// Size of the description field at the start of a `bext` chunk.
pub const DESCRIPTION_LEN: usize = 256;

/// Ways a container can fail to yield a description.
#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("stream does not start with a RIFF tag")]
    BadContainerTag,
    #[error("RIFF container is not WAVE")]
    BadFormatTag,
    #[error("stream ends inside the {0}")]
    Truncated(&'static str),
    #[error("chunk identifier shorter than 4 bytes")]
    ShortChunkId,
    #[error("no bext chunk present")]
    NotFound,
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Walk the chunks of `reader` and return the `bext` description with its
/// trailing NUL padding removed.
pub fn parse_description<R: Read + Seek>(reader: &mut R) -> Result<String, ChunkError> {
    let len = reader.seek(SeekFrom::End(0))?;
    reader.seek(SeekFrom::Start(0))?;

    if &read_tag(reader, "container tag")? != RIFF_TAG {
        return Err(ChunkError::BadContainerTag);
    }
    read_u32_le(reader, "container size")?;
    if &read_tag(reader, "format tag")? != WAVE_TAG {
        return Err(ChunkError::BadFormatTag);
    }

    loop {
        let mut id = [0u8; 4];
        match read_up_to(reader, &mut id)? {
            0 => return Err(ChunkError::NotFound),
            n if n < id.len() => return Err(ChunkError::ShortChunkId),
            _ => {}
        }
        let size = u64::from(read_u32_le(reader, "chunk size")?);

        if &id == BEXT_ID {
            let mut field = [0u8; DESCRIPTION_LEN];
            read_exact(reader, &mut field, "bext description")?;
            return Ok(decode_field(&field));
        }

        let pos = reader.stream_position()?;
        if pos + size > len {
            return Err(ChunkError::Truncated("chunk payload"));
        }
        // Chunks are word aligned; a missing final pad byte is tolerated.
        let next = (pos + size + (size & 1)).min(len);
        reader.seek(SeekFrom::Start(next))?;
    }
}

/// Never-fail variant over an in-memory buffer: any malformed input yields "".
pub fn extract_description(bytes: &[u8]) -> String {
    parse_description(&mut Cursor::new(bytes)).unwrap_or_default()
}

fn decode_field(field: &[u8]) -> String {
    String::from_utf8_lossy(field)
        .trim_end_matches('\0')
        .to_string()
}

fn read_tag<R: Read>(reader: &mut R, what: &'static str) -> Result<[u8; 4], ChunkError> {
    let mut tag = [0u8; 4];
    read_exact(reader, &mut tag, what)?;
    Ok(tag)
}

fn read_u32_le<R: Read>(reader: &mut R, what: &'static str) -> Result<u32, ChunkError> {
    let mut buf = [0u8; 4];
    read_exact(reader, &mut buf, what)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_exact<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    what: &'static str,
) -> Result<(), ChunkError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => ChunkError::Truncated(what),
        _ => ChunkError::Io(e),
    })
}

/// Fill as much of `buf` as the stream allows, returning the byte count.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
