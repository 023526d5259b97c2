//! Greedy LZ77 tokenization.
//!
//! Drives a [`MatchFinder`] over the input, one position at a time, and
//! turns it into a stream of literal/match tokens plus the symbol
//! frequencies the dynamic Huffman stage needs.

use crate::freq::FrequencyCounter;
use crate::matchfinder::MatchFinder;
use crate::options::Options;

/// One LZ77 token: either a raw byte, or a back-reference to earlier
/// output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Literal(u8),
    Match { length: u16, distance: u16 },
}

/// Turns input bytes into an LZ77 token stream.
///
/// Policy: **greedy**, not lazy. At every position the encoder takes the
/// longest match the match finder reports and moves past it; it never
/// looks one position ahead to see if delaying the match would let a
/// longer one start there. This is a deliberate, documented choice (lazy
/// matching is a known compression-ratio improvement but is not
/// implemented) so test vectors stay reproducible against one fixed policy
/// rather than drifting with a heuristic.
pub struct LzEncoder {
    options: Options,
}

impl LzEncoder {
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    pub fn tokenize(&self, data: &[u8]) -> (Vec<Token>, FrequencyCounter) {
        log::debug!("tokenizing {} bytes", data.len());
        let mut finder = MatchFinder::new(&self.options);
        let mut freqs = FrequencyCounter::new();
        let mut tokens = Vec::new();

        let mut pos = 0usize;
        while pos < data.len() {
            let found = finder.find_longest_match(data, pos);
            match found {
                Some(m) if m.length >= self.options.min_match => {
                    let length = m.length as u16;
                    let distance = m.distance as u16;
                    log::trace!("match at {pos}: length={length} distance={distance}");
                    tokens.push(Token::Match { length, distance });
                    freqs.record_match(length, distance);
                    finder.insert_range(data, pos, m.length);
                    pos += m.length;
                }
                _ => {
                    tokens.push(Token::Literal(data[pos]));
                    freqs.record_literal(data[pos]);
                    finder.insert(data, pos);
                    pos += 1;
                }
            }
        }

        freqs.finish();
        log::debug!("tokenized into {} tokens", tokens.len());
        (tokens, freqs)
    }
}
