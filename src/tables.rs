//! Fixed alphabet tables: litlen length-symbol bases/extra-bits, distance
//! symbol bases/extra-bits, and the RFC 1951 predefined (fixed) code
//! lengths used by `BTYPE = 01` blocks.
//!
//! Values match RFC 1951's length/distance extra-bits tables.

/// First litlen symbol used for match lengths (257..=285).
pub const LENGTH_SYMBOL_BASE: u16 = 257;
/// litlen symbol for end-of-block.
pub const END_OF_BLOCK: u16 = 256;
/// Number of symbols in the litlen alphabet (0..=285).
pub const LITLEN_ALPHABET_SIZE: usize = 286;
/// Number of symbols in the distance alphabet.
pub const DIST_ALPHABET_SIZE: usize = 30;

/// Base length for each length symbol, indexed by `symbol - 257`.
pub const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];

/// Extra bits for each length symbol, indexed by `symbol - 257`.
pub const LENGTH_EXTRA_BITS: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/// Base distance for each distance symbol.
pub const DIST_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

/// Extra bits for each distance symbol.
pub const DIST_EXTRA_BITS: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/// Map a match length (3..=258) to its litlen length symbol.
pub fn length_symbol(length: u16) -> u16 {
    debug_assert!((3..=258).contains(&length));
    // Length 258 has two representations in the RFC (symbol 285, 0 extra
    // bits); we always prefer the canonical base-258 entry (symbol 285)
    // since it never needs extra bits.
    if length == 258 {
        return 285;
    }
    match LENGTH_BASE.iter().rposition(|&base| base <= length) {
        Some(i) => LENGTH_SYMBOL_BASE + i as u16,
        None => unreachable!("length {length} below MIN_MATCH"),
    }
}

/// Extra bits to emit after a length symbol, and their value.
pub fn length_extra(length: u16) -> (u8, u16) {
    let symbol = length_symbol(length);
    let i = (symbol - LENGTH_SYMBOL_BASE) as usize;
    let nbits = LENGTH_EXTRA_BITS[i];
    let extra = length - LENGTH_BASE[i];
    (nbits, extra)
}

/// Map a match distance (1..=32768) to its distance symbol.
pub fn distance_symbol(distance: u16) -> u16 {
    debug_assert!((1..=32768).contains(&distance));
    match DIST_BASE.iter().rposition(|&base| base <= distance) {
        Some(i) => i as u16,
        None => unreachable!("distance {distance} below 1"),
    }
}

/// Extra bits to emit after a distance symbol, and their value.
pub fn distance_extra(distance: u16) -> (u8, u16) {
    let symbol = distance_symbol(distance);
    let i = symbol as usize;
    let nbits = DIST_EXTRA_BITS[i];
    let extra = distance - DIST_BASE[i];
    (nbits, extra)
}

/// Reconstruct a match length from a length symbol and its extra bits.
pub fn length_from_symbol(symbol: u16, extra: u16) -> u16 {
    let i = (symbol - LENGTH_SYMBOL_BASE) as usize;
    LENGTH_BASE[i] + extra
}

/// Reconstruct a distance from a distance symbol and its extra bits.
pub fn distance_from_symbol(symbol: u16, extra: u16) -> u16 {
    DIST_BASE[symbol as usize] + extra
}

/// Number of symbols in the fixed-Huffman litlen table. RFC 1951 §3.2.6
/// defines codes for symbols 0..287 even though 286 and 287 are never
/// actually emitted; padding the table out to 288 entries (rather than
/// stopping at our 286-symbol dynamic alphabet) is what makes the fixed
/// code's Kraft sum come out to exactly 1 (a complete code), matching the
/// invariant every other emitted code table satisfies.
pub const FIXED_LITLEN_TABLE_SIZE: usize = 288;

/// RFC 1951 §3.2.6 predefined litlen code lengths, used for `BTYPE = 01`
/// (fixed Huffman) blocks. Symbols 286 and 287 are present only to complete
/// the code; the block format never encodes or accepts them.
pub fn fixed_litlen_lengths() -> Vec<u8> {
    let mut lens = vec![0u8; FIXED_LITLEN_TABLE_SIZE];
    for (sym, len) in lens.iter_mut().enumerate() {
        *len = match sym {
            0..=143 => 8,
            144..=255 => 9,
            256..=279 => 7,
            280..=287 => 8,
            _ => unreachable!(),
        };
    }
    lens
}

/// Number of symbols in the fixed-Huffman distance table. The real
/// distance alphabet only has 30 meaningful symbols; padding to 32 (all at
/// length 5) is, again, what makes the fixed distance code complete
/// (32 * 2^-5 == 1) instead of leaving 1/16 of the codespace unassigned.
/// Symbols 30 and 31 are never emitted or accepted.
pub const FIXED_DIST_TABLE_SIZE: usize = 32;

/// RFC 1951 §3.2.6 predefined distance code lengths (all 5 bits).
pub fn fixed_dist_lengths() -> Vec<u8> {
    vec![5u8; FIXED_DIST_TABLE_SIZE]
}
