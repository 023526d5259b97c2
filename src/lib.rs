//! # deflate-rs
//!
//! A from-scratch DEFLATE-family compressor and decompressor: hash-chain
//! LZ77 matching, length-limited canonical Huffman coding via
//! package-merge, and RFC 1951-style block framing.
//!
//! No container format (gzip/zlib headers, checksums) is produced; callers
//! that need one should wrap this crate's output themselves.
//!
//! ## Buffer example
//!
//! ```rs
//! use deflate_rs::{compress, decompress, STD_OPTIONS};
//! let data = b"the quick brown fox jumps over the lazy dog";
//! let packed = compress(data, &STD_OPTIONS).expect("compression failed");
//! let unpacked = decompress(&packed).expect("decompression failed");
//! assert_eq!(unpacked, data);
//! ```

pub mod bitstream;
pub mod block;
pub mod canonical;
pub mod error;
pub mod freq;
pub mod lz;
pub mod matchfinder;
pub mod options;
pub mod package_merge;
pub mod tables;

pub use error::{Error, Result};
pub use lz::{LzEncoder, Token};
pub use options::{Options, STD_OPTIONS};

/// Compress `data` into a single self-contained DEFLATE-style block
/// stream. Always succeeds given enough memory: compression has no failure
/// mode that this crate's error type represents.
///
/// Empty input is encoded as a fixed-Huffman block carrying only the
/// end-of-block symbol; all other input uses a single dynamic-Huffman
/// block whose litlen/distance codes are built by package-merge.
pub fn compress(data: &[u8], options: &Options) -> Result<Vec<u8>> {
    let mut writer = bitstream::BitWriter::new();

    if data.is_empty() {
        block::emit_fixed(&mut writer, &[], true);
    } else {
        let encoder = LzEncoder::new(options.clone());
        let (tokens, freqs) = encoder.tokenize(data);
        block::emit_dynamic(&mut writer, &tokens, &freqs, options, true)?;
    }

    Ok(writer.into_bytes())
}

/// Decompress a stream produced by [`compress`] (or any conforming
/// stored/fixed/dynamic block sequence). Returns an error rather than
/// panicking on truncated or malformed input.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    block::decode(data)
}
