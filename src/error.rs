//! Crate-wide error type.
//!
//! Groups into the same four conceptual failure kinds as the rest of this
//! codec's error handling (bad input, resource exhaustion, corrupted data,
//! limit violations), with the bad-input case split into specific variants
//! the way a `thiserror` enum earns its keep: each failure mode gets its own
//! message instead of a single generic one.

/// All fallible paths in this crate return this error type.
#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone)]
pub enum Error {
    #[error("truncated compressed stream")]
    Truncated,
    #[error("code length table has an oversubscribed Kraft sum")]
    OversubscribedCode,
    #[error("symbol with a zero-length code appeared in the stream")]
    UnusedSymbol,
    #[error("match distance refers before the start of the output")]
    DistanceUnderflow,
    #[error("reserved block type (BTYPE = 11)")]
    CorruptedCode,
    #[error("code length limit {limit} is too small for {n} symbols")]
    LimitExceeded { n: usize, limit: u8 },
    #[error("configured max code length {0} exceeds the code-length alphabet's 15-bit literal capacity")]
    CodeLengthLimitTooLarge(u8),
    /// Reserved for allocation failure. Safe Rust surfaces OOM as an abort
    /// rather than a catchable error, so nothing in this crate currently
    /// constructs this variant; it exists for interface completeness.
    #[error("allocation failure")]
    ResourceExhausted,
}

pub type Result<T> = std::result::Result<T, Error>;
