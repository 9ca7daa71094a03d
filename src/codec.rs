//! Payload decompression capability
//!
//! Payloads whose length differs from the canonical uncompressed size are
//! handed to a [`PayloadCodec`]. The reader owns the output buffer; a codec
//! only has to fill it.

use thiserror::Error;

/// Errors a codec can report while decoding a payload.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CodecError {
    #[error("Compressed payload is corrupt: {0}")]
    Corrupt(String),

    #[error("Decoded payload is {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Codec I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Decompresses one frame payload into a canonically sized buffer.
///
/// `output.len()` is the expected decompressed size. Implementations return
/// the number of bytes written; the reader rejects anything other than
/// `output.len()`.
pub trait PayloadCodec: Send + Sync + std::fmt::Debug {
    fn decode(&self, compressed: &[u8], output: &mut [u8]) -> Result<usize, CodecError>;
}

/// zlib (RFC 1950) payloads, as written by the capture tool for depth data.
#[cfg(feature = "zlib")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ZlibCodec;

#[cfg(feature = "zlib")]
impl PayloadCodec for ZlibCodec {
    fn decode(&self, compressed: &[u8], output: &mut [u8]) -> Result<usize, CodecError> {
        use flate2::read::ZlibDecoder;
        use std::io::{ErrorKind, Read};

        let mut decoder = ZlibDecoder::new(compressed);
        let mut written = 0;
        while written < output.len() {
            match decoder.read(&mut output[written..]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == ErrorKind::InvalidInput || e.kind() == ErrorKind::InvalidData => {
                    return Err(CodecError::Corrupt(e.to_string()));
                }
                Err(e) => return Err(CodecError::Io(e)),
            }
        }

        if written < output.len() {
            return Err(CodecError::SizeMismatch { expected: output.len(), actual: written });
        }

        // Any data left in the stream means the payload was larger than the frame
        let mut probe = [0u8; 1];
        match decoder.read(&mut probe) {
            Ok(0) => Ok(written),
            Ok(_) => Err(CodecError::SizeMismatch { expected: output.len(), actual: written + 1 }),
            Err(e) => Err(CodecError::Corrupt(e.to_string())),
        }
    }
}

#[cfg(all(test, feature = "zlib"))]
mod tests {
    use super::*;
    use anyhow::Result;
    use flate2::{Compression, write::ZlibEncoder};
    use std::io::Write;

    fn compress(data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data)?;
        Ok(encoder.finish()?)
    }

    #[test]
    fn zlib_fills_exact_output() -> Result<()> {
        let raw: Vec<u8> = (0..200u32).map(|i| (i % 7) as u8).collect();
        let compressed = compress(&raw)?;

        let mut out = vec![0u8; raw.len()];
        let written = ZlibCodec.decode(&compressed, &mut out)?;

        assert_eq!(written, raw.len());
        assert_eq!(out, raw);
        Ok(())
    }

    #[test]
    fn zlib_rejects_short_stream() -> Result<()> {
        let compressed = compress(&[1u8; 10])?;
        let mut out = vec![0u8; 20];
        let err = ZlibCodec.decode(&compressed, &mut out).unwrap_err();
        assert!(matches!(err, CodecError::SizeMismatch { expected: 20, actual: 10 }));
        Ok(())
    }

    #[test]
    fn zlib_rejects_oversized_stream() -> Result<()> {
        let compressed = compress(&[1u8; 30])?;
        let mut out = vec![0u8; 20];
        let err = ZlibCodec.decode(&compressed, &mut out).unwrap_err();
        assert!(matches!(err, CodecError::SizeMismatch { expected: 20, .. }));
        Ok(())
    }

    #[test]
    fn zlib_rejects_garbage() {
        let mut out = vec![0u8; 16];
        let result = ZlibCodec.decode(&[0xde, 0xad, 0xbe, 0xef, 0x00, 0x11], &mut out);
        assert!(result.is_err());
    }
}
