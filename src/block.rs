//! Block framing: header, code-length table transmission, and the
//! literal/match token stream.
//!
//! Wire format for the block header and code-length table is this crate's
//! own (not a byte-for-byte copy of RFC 1951's HLIT/HDIST/HCLEN framing):
//! the litlen and distance tables are always transmitted at their full
//! alphabet size (286 and 32 entries respectively) rather than trimmed to
//! the highest used symbol, which removes the need for HLIT/HDIST length
//! fields entirely. The code-length run-length scheme itself (alphabet of
//! 19 symbols, repeat codes 16/17/18) follows RFC 1951 §3.2.7 directly,
//! since that part of the format has no reason to diverge from a
//! well-tested design.

use crate::canonical::CanonicalCode;
use crate::bitstream::{BitReader, BitWriter};
use crate::error::{Error, Result};
use crate::freq::FrequencyCounter;
use crate::lz::Token;
use crate::options::Options;
use crate::package_merge::package_merge_any;
use crate::tables::{self, DIST_ALPHABET_SIZE, END_OF_BLOCK, LITLEN_ALPHABET_SIZE};

const BTYPE_STORED: u8 = 0b00;
const BTYPE_FIXED: u8 = 0b01;
const BTYPE_DYNAMIC: u8 = 0b10;
const BTYPE_RESERVED: u8 = 0b11;

/// Number of symbols in the code-length alphabet used to transmit litlen/
/// dist code lengths (RFC 1951 §3.2.7): 0..15 are literal lengths, 16/17/18
/// are repeat codes.
const CL_ALPHABET_SIZE: usize = 19;
const CL_MAX_LENGTH: u8 = 7;
const CL_FIELD_BITS: u32 = 3;

const REP_PREV: u8 = 16;
const REP_ZERO_SHORT: u8 = 17;
const REP_ZERO_LONG: u8 = 18;

fn write_header(out: &mut BitWriter, btype: u8, is_final: bool) {
    let v = ((is_final as u32) << 2) | btype as u32;
    out.append_bits_msb(v as u64, 3);
}

fn read_header(r: &BitReader, pos: &mut usize) -> Result<(bool, u8)> {
    let v = r.read_bits_msb(*pos, 3)? as u8;
    *pos += 3;
    Ok((v & 0b100 != 0, v & 0b011))
}

/// Emit a stored (uncompressed) block: byte-aligned `u16` length followed
/// by the literal bytes. Not chosen automatically by [`crate::compress`];
/// reachable directly for callers (or tests) that want an incompressible
/// fallback.
pub fn emit_stored(out: &mut BitWriter, data: &[u8], is_final: bool) {
    assert!(data.len() <= u16::MAX as usize, "stored block payload must fit in a u16 length");
    write_header(out, BTYPE_STORED, is_final);
    out.pad_to_byte();
    out.append_bits_lsb(data.len() as u64, 16);
    for &b in data {
        out.append_bits_lsb(b as u64, 8);
    }
}

fn decode_stored(r: &BitReader, pos: &mut usize) -> Result<Vec<u8>> {
    *pos = (*pos + 7) / 8 * 8;
    let len = r.read_bits_lsb(*pos, 16)? as usize;
    *pos += 16;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        out.push(r.read_bits_lsb(*pos, 8)? as u8);
        *pos += 8;
    }
    Ok(out)
}

fn emit_token_stream(out: &mut BitWriter, tokens: &[Token], litlen: &CanonicalCode, dist: &CanonicalCode) {
    for t in tokens {
        match *t {
            Token::Literal(b) => litlen.encode(b as usize, out),
            Token::Match { length, distance } => {
                let lsym = tables::length_symbol(length);
                litlen.encode(lsym as usize, out);
                let (lbits, lextra) = tables::length_extra(length);
                if lbits > 0 {
                    out.append_bits_lsb(lextra as u64, lbits as u32);
                }

                let dsym = tables::distance_symbol(distance);
                dist.encode(dsym as usize, out);
                let (dbits, dextra) = tables::distance_extra(distance);
                if dbits > 0 {
                    out.append_bits_lsb(dextra as u64, dbits as u32);
                }
            }
        }
    }
    litlen.encode(END_OF_BLOCK as usize, out);
}

fn decode_token_stream(r: &BitReader, pos: &mut usize, litlen: &CanonicalCode, dist: &CanonicalCode, output: &mut Vec<u8>) -> Result<()> {
    loop {
        let sym = litlen.decode(r, pos)?;
        if sym == END_OF_BLOCK {
            return Ok(());
        }
        if sym < END_OF_BLOCK {
            output.push(sym as u8);
            continue;
        }

        let i = (sym - tables::LENGTH_SYMBOL_BASE) as usize;
        if i >= tables::LENGTH_EXTRA_BITS.len() {
            return Err(Error::CorruptedCode);
        }
        let lbits = tables::LENGTH_EXTRA_BITS[i];
        let lextra = if lbits > 0 { r.read_bits_lsb(*pos, lbits as u32)? as u16 } else { 0 };
        *pos += lbits as usize;
        let length = tables::length_from_symbol(sym, lextra);

        let dsym = dist.decode(r, pos)?;
        if dsym as usize >= tables::DIST_EXTRA_BITS.len() {
            return Err(Error::CorruptedCode);
        }
        let dbits = tables::DIST_EXTRA_BITS[dsym as usize];
        let dextra = if dbits > 0 { r.read_bits_lsb(*pos, dbits as u32)? as u16 } else { 0 };
        *pos += dbits as usize;
        let distance = tables::distance_from_symbol(dsym, dextra);

        if distance as usize > output.len() {
            return Err(Error::DistanceUnderflow);
        }
        let start = output.len() - distance as usize;
        for k in 0..length as usize {
            let b = output[start + k];
            output.push(b);
        }
    }
}

/// Emit a fixed-Huffman block (`BTYPE = 01`) using the RFC 1951 §3.2.6
/// predefined code length tables.
pub fn emit_fixed(out: &mut BitWriter, tokens: &[Token], is_final: bool) {
    write_header(out, BTYPE_FIXED, is_final);
    let litlen = CanonicalCode::from_lengths(&tables::fixed_litlen_lengths())
        .expect("the fixed litlen table is always a valid complete code");
    let dist = CanonicalCode::from_lengths(&tables::fixed_dist_lengths())
        .expect("the fixed distance table is always a valid complete code");
    emit_token_stream(out, tokens, &litlen, &dist);
}

fn decode_fixed(r: &BitReader, pos: &mut usize) -> Result<Vec<u8>> {
    let litlen = CanonicalCode::from_lengths(&tables::fixed_litlen_lengths())?;
    let dist = CanonicalCode::from_lengths(&tables::fixed_dist_lengths())?;
    let mut out = Vec::new();
    decode_token_stream(r, pos, &litlen, &dist, &mut out)?;
    Ok(out)
}

/// Run-length entry in the code-length alphabet: the CL symbol to emit,
/// plus how many extra bits (and their value) follow it.
struct ClEntry {
    symbol: u8,
    extra_bits: u8,
    extra_value: u16,
}

fn rle_encode_lengths(lengths: &[u8]) -> Vec<ClEntry> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < lengths.len() {
        let value = lengths[i];
        let mut run = 1usize;
        while i + run < lengths.len() && lengths[i + run] == value {
            run += 1;
        }

        if value == 0 {
            let mut remaining = run;
            while remaining > 0 {
                if remaining >= 11 {
                    let take = remaining.min(138);
                    out.push(ClEntry { symbol: REP_ZERO_LONG, extra_bits: 7, extra_value: (take - 11) as u16 });
                    remaining -= take;
                } else if remaining >= 3 {
                    let take = remaining.min(10);
                    out.push(ClEntry { symbol: REP_ZERO_SHORT, extra_bits: 3, extra_value: (take - 3) as u16 });
                    remaining -= take;
                } else {
                    for _ in 0..remaining {
                        out.push(ClEntry { symbol: 0, extra_bits: 0, extra_value: 0 });
                    }
                    remaining = 0;
                }
            }
        } else {
            out.push(ClEntry { symbol: value, extra_bits: 0, extra_value: 0 });
            let mut remaining = run - 1;
            while remaining > 0 {
                if remaining >= 3 {
                    let take = remaining.min(6);
                    out.push(ClEntry { symbol: REP_PREV, extra_bits: 2, extra_value: (take - 3) as u16 });
                    remaining -= take;
                } else {
                    for _ in 0..remaining {
                        out.push(ClEntry { symbol: value, extra_bits: 0, extra_value: 0 });
                    }
                    remaining = 0;
                }
            }
        }
        i += run;
    }
    out
}

fn decode_rle_lengths(r: &BitReader, pos: &mut usize, cl_code: &CanonicalCode, total: usize) -> Result<Vec<u8>> {
    let mut lengths = Vec::with_capacity(total);
    let mut previous = 0u8;
    while lengths.len() < total {
        let sym = cl_code.decode(r, pos)?;
        match sym {
            0..=15 => {
                previous = sym as u8;
                lengths.push(previous);
            }
            16 => {
                let extra = r.read_bits_lsb(*pos, 2)? as usize;
                *pos += 2;
                let count = extra + 3;
                if lengths.is_empty() || lengths.len() + count > total {
                    return Err(Error::CorruptedCode);
                }
                for _ in 0..count {
                    lengths.push(previous);
                }
            }
            17 => {
                let extra = r.read_bits_lsb(*pos, 3)? as usize;
                *pos += 3;
                let count = extra + 3;
                if lengths.len() + count > total {
                    return Err(Error::CorruptedCode);
                }
                for _ in 0..count {
                    lengths.push(0);
                }
                previous = 0;
            }
            18 => {
                let extra = r.read_bits_lsb(*pos, 7)? as usize;
                *pos += 7;
                let count = extra + 11;
                if lengths.len() + count > total {
                    return Err(Error::CorruptedCode);
                }
                for _ in 0..count {
                    lengths.push(0);
                }
                previous = 0;
            }
            _ => return Err(Error::CorruptedCode),
        }
    }
    Ok(lengths)
}

/// Emit a dynamic-Huffman block (`BTYPE = 10`): package-merge-optimal
/// litlen/distance codes, self-described via the RLE code-length scheme.
pub fn emit_dynamic(out: &mut BitWriter, tokens: &[Token], freqs: &FrequencyCounter, options: &Options, is_final: bool) -> Result<()> {
    // The RLE code-length scheme's literal symbols only cover lengths 0..=15
    // (§3.2.7's repeat codes start at 16), so a litlen/dist length can never
    // be transmitted above 15 regardless of what package_merge itself allows.
    if options.max_code_length > 15 {
        return Err(Error::CodeLengthLimitTooLarge(options.max_code_length));
    }

    log::debug!("building dynamic block for {} tokens", tokens.len());

    let litlen_lengths = package_merge_any(freqs.litlen_freqs(), options.max_code_length)?;
    let dist_lengths = package_merge_any(freqs.dist_freqs(), options.max_code_length)?;
    debug_assert_eq!(litlen_lengths.len(), LITLEN_ALPHABET_SIZE);
    debug_assert_eq!(dist_lengths.len(), DIST_ALPHABET_SIZE);

    let litlen_lengths: Vec<u8> = litlen_lengths.iter().map(|&l| l as u8).collect();
    let dist_lengths: Vec<u8> = dist_lengths.iter().map(|&l| l as u8).collect();

    let mut combined = litlen_lengths.clone();
    combined.extend_from_slice(&dist_lengths);

    let cl_entries = rle_encode_lengths(&combined);
    let mut cl_freqs = vec![0u32; CL_ALPHABET_SIZE];
    for e in &cl_entries {
        cl_freqs[e.symbol as usize] += 1;
    }
    let cl_lengths = package_merge_any(&cl_freqs, CL_MAX_LENGTH)?;
    let cl_lengths: Vec<u8> = cl_lengths.iter().map(|&l| l as u8).collect();
    let cl_code = CanonicalCode::from_lengths(&cl_lengths)?;

    let litlen_code = CanonicalCode::from_lengths(&litlen_lengths)?;
    let dist_code = CanonicalCode::from_lengths(&dist_lengths)?;
    log::trace!("code tables built, {} RLE entries for code lengths", cl_entries.len());

    write_header(out, BTYPE_DYNAMIC, is_final);

    for &len in &cl_lengths {
        out.append_bits_lsb(len as u64, CL_FIELD_BITS);
    }

    for e in &cl_entries {
        cl_code.encode(e.symbol as usize, out);
        if e.extra_bits > 0 {
            out.append_bits_lsb(e.extra_value as u64, e.extra_bits as u32);
        }
    }

    emit_token_stream(out, tokens, &litlen_code, &dist_code);
    Ok(())
}

fn decode_dynamic(r: &BitReader, pos: &mut usize) -> Result<Vec<u8>> {
    let mut cl_lengths = vec![0u8; CL_ALPHABET_SIZE];
    for len in cl_lengths.iter_mut() {
        *len = r.read_bits_lsb(*pos, CL_FIELD_BITS)? as u8;
        *pos += CL_FIELD_BITS as usize;
    }
    let cl_code = CanonicalCode::from_lengths(&cl_lengths)?;

    let total = LITLEN_ALPHABET_SIZE + DIST_ALPHABET_SIZE;
    let combined = decode_rle_lengths(r, pos, &cl_code, total)?;
    let litlen_lengths = &combined[..LITLEN_ALPHABET_SIZE];
    let dist_lengths = &combined[LITLEN_ALPHABET_SIZE..];

    let litlen_code = CanonicalCode::from_lengths(litlen_lengths)?;
    let dist_code = CanonicalCode::from_lengths(dist_lengths)?;

    let mut out = Vec::new();
    decode_token_stream(r, pos, &litlen_code, &dist_code, &mut out)?;
    Ok(out)
}

/// Decode a full compressed stream: one or more blocks until `BFINAL = 1`.
/// This crate's own encoder only ever emits a single block, but the
/// decoder accepts any conforming multi-block stream.
pub fn decode(data: &[u8]) -> Result<Vec<u8>> {
    let r = BitReader::new(data);
    let mut pos = 0usize;
    let mut out = Vec::new();

    loop {
        let (is_final, btype) = read_header(&r, &mut pos)?;
        log::debug!("block header: btype={btype} final={is_final}");
        let mut block_out = match btype {
            BTYPE_STORED => decode_stored(&r, &mut pos)?,
            BTYPE_FIXED => decode_fixed(&r, &mut pos)?,
            BTYPE_DYNAMIC => decode_dynamic(&r, &mut pos)?,
            BTYPE_RESERVED => return Err(Error::CorruptedCode),
            _ => unreachable!(),
        };
        out.append(&mut block_out);
        if is_final {
            return Ok(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lz::LzEncoder;
    use crate::options::STD_OPTIONS;

    fn dynamic_round_trip(data: &[u8]) -> Vec<u8> {
        let encoder = LzEncoder::new(STD_OPTIONS.clone());
        let (tokens, freqs) = encoder.tokenize(data);
        let mut w = BitWriter::new();
        emit_dynamic(&mut w, &tokens, &freqs, &STD_OPTIONS, true).unwrap();
        let bytes = w.into_bytes();
        decode(&bytes).unwrap()
    }

    #[test]
    fn dynamic_block_round_trips_plain_text() {
        let data = b"the quick brown fox jumps over the lazy dog. the quick brown fox.";
        assert_eq!(dynamic_round_trip(data), data);
    }

    #[test]
    fn dynamic_block_round_trips_highly_repetitive_data() {
        let data = vec![b'x'; 2000];
        assert_eq!(dynamic_round_trip(&data), data);
    }

    #[test]
    fn dynamic_block_round_trips_single_byte() {
        let data = b"a";
        assert_eq!(dynamic_round_trip(data), data);
    }

    #[test]
    fn stored_block_round_trips() {
        let data = b"incompressible-looking data 12345";
        let mut w = BitWriter::new();
        emit_stored(&mut w, data, true);
        let bytes = w.into_bytes();
        assert_eq!(decode(&bytes).unwrap(), data);
    }

    #[test]
    fn fixed_block_round_trips() {
        let encoder = LzEncoder::new(STD_OPTIONS.clone());
        let data = b"abababababab";
        let (tokens, _) = encoder.tokenize(data);
        let mut w = BitWriter::new();
        emit_fixed(&mut w, &tokens, true);
        let bytes = w.into_bytes();
        assert_eq!(decode(&bytes).unwrap(), data);
    }

    #[test]
    fn empty_fixed_block_round_trips() {
        let mut w = BitWriter::new();
        emit_fixed(&mut w, &[], true);
        let bytes = w.into_bytes();
        assert_eq!(decode(&bytes).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn reserved_btype_is_corrupted_code() {
        let mut w = BitWriter::new();
        write_header(&mut w, BTYPE_RESERVED, true);
        let bytes = w.into_bytes();
        assert_eq!(decode(&bytes), Err(Error::CorruptedCode));
    }

    #[test]
    fn truncated_stream_is_an_error() {
        assert_eq!(decode(&[]), Err(Error::Truncated));
    }

    #[test]
    fn max_code_length_above_fifteen_is_rejected_instead_of_corrupting_the_wire_format() {
        // 19 is a value package_merge itself would happily accept (it allows
        // up to 32), but the RLE code-length scheme only has literal symbols
        // for 0..=15, so emit_dynamic must reject it up front.
        let mut options = STD_OPTIONS;
        options.max_code_length = 19;
        let encoder = LzEncoder::new(options.clone());
        let (tokens, freqs) = encoder.tokenize(b"abcabcabc");
        let mut w = BitWriter::new();
        let err = emit_dynamic(&mut w, &tokens, &freqs, &options, true).unwrap_err();
        assert_eq!(err, Error::CodeLengthLimitTooLarge(19));
    }

    #[test]
    fn max_code_length_of_exactly_fifteen_is_accepted() {
        let options = STD_OPTIONS;
        assert_eq!(options.max_code_length, 15);
        assert_eq!(dynamic_round_trip(b"abcabcabc"), b"abcabcabc");
    }

    #[test]
    fn rle_encodes_long_zero_run_with_repeat_18() {
        let lengths = [0u8; 50];
        let entries = rle_encode_lengths(&lengths);
        assert!(entries.iter().any(|e| e.symbol == REP_ZERO_LONG));
        let total: usize = entries
            .iter()
            .map(|e| match e.symbol {
                REP_ZERO_LONG => e.extra_value as usize + 11,
                REP_ZERO_SHORT => e.extra_value as usize + 3,
                _ => 1,
            })
            .sum();
        assert_eq!(total, 50);
    }

    #[test]
    fn rle_round_trips_mixed_lengths() {
        let mut lengths = vec![0u8; 20];
        lengths.extend(vec![5u8; 8]);
        lengths.extend(vec![0u8; 4]);
        lengths.push(3);
        lengths.extend(vec![7u8; 7]);

        let mut cl_freqs = vec![0u32; CL_ALPHABET_SIZE];
        let entries = rle_encode_lengths(&lengths);
        for e in &entries {
            cl_freqs[e.symbol as usize] += 1;
        }
        let cl_lengths_raw = package_merge_any(&cl_freqs, CL_MAX_LENGTH).unwrap();
        let cl_lengths: Vec<u8> = cl_lengths_raw.iter().map(|&l| l as u8).collect();
        let cl_code = CanonicalCode::from_lengths(&cl_lengths).unwrap();

        let mut w = BitWriter::new();
        for &len in &cl_lengths {
            w.append_bits_lsb(len as u64, CL_FIELD_BITS);
        }
        for e in &entries {
            cl_code.encode(e.symbol as usize, &mut w);
            if e.extra_bits > 0 {
                w.append_bits_lsb(e.extra_value as u64, e.extra_bits as u32);
            }
        }
        let bytes = w.into_bytes();
        let r = BitReader::new(&bytes);
        let mut pos = 0usize;
        let mut read_cl_lengths = vec![0u8; CL_ALPHABET_SIZE];
        for len in read_cl_lengths.iter_mut() {
            *len = r.read_bits_lsb(pos, CL_FIELD_BITS).unwrap() as u8;
            pos += CL_FIELD_BITS as usize;
        }
        assert_eq!(read_cl_lengths, cl_lengths);
        let read_cl_code = CanonicalCode::from_lengths(&read_cl_lengths).unwrap();
        let decoded = decode_rle_lengths(&r, &mut pos, &read_cl_code, lengths.len()).unwrap();
        assert_eq!(decoded, lengths);
    }

    #[test]
    fn match_with_distance_past_output_start_is_distance_underflow() {
        // Fixed block whose first token is a match: impossible on a real
        // encoder, constructed here to exercise the decoder's guard.
        let litlen = CanonicalCode::from_lengths(&tables::fixed_litlen_lengths()).unwrap();
        let dist = CanonicalCode::from_lengths(&tables::fixed_dist_lengths()).unwrap();
        let mut w = BitWriter::new();
        write_header(&mut w, BTYPE_FIXED, true);
        litlen.encode(tables::LENGTH_SYMBOL_BASE as usize, &mut w); // symbol 257: length 3, 0 extra bits
        dist.encode(0, &mut w); // symbol 0: distance 1, 0 extra bits
        litlen.encode(END_OF_BLOCK as usize, &mut w);
        let bytes = w.into_bytes();
        assert_eq!(decode(&bytes), Err(Error::DistanceUnderflow));
    }
}
