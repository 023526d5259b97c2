//! Options controlling compression.
//!
//! A plain data struct with a documented standard instance, not a builder.

/// Options controlling the LZ77 + Huffman pipeline.
#[derive(Clone, Debug)]
pub struct Options {
    /// size of the sliding dictionary window. Must be a power of two no
    /// greater than 32768: match distances are carried in a `u16` end to
    /// end, and `MatchFinder::new` asserts this bound rather than letting a
    /// larger window silently truncate distances downstream.
    pub window_size: usize,
    /// shortest match the encoder is willing to emit
    pub min_match: usize,
    /// longest match the encoder will ever emit
    pub max_match: usize,
    /// how many hash-chain entries to walk before giving up on a better match
    pub search_depth: usize,
    /// maximum code length the package-merge stage may produce for litlen/
    /// dist tables. Must be no greater than 15: the block format's code-length
    /// RLE scheme only has literal symbols for lengths 0..=15 (16/17/18 are
    /// repeat codes), so `emit_dynamic` rejects anything above that with
    /// `Error::CodeLengthLimitTooLarge` rather than corrupting the wire
    /// format.
    pub max_code_length: u8,
}

/// Default options: 32 KiB window, DEFLATE-standard match length bounds.
pub const STD_OPTIONS: Options = Options {
    window_size: 32768,
    min_match: 3,
    max_match: 258,
    search_depth: 64,
    max_code_length: 15,
};
