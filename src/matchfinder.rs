//! Hash-chain match finder over a sliding window.
//!
//! A 3-byte rolling hash (`3483*b0 + 23081*b1 + 6954*b2`) buckets positions
//! into `head`, a same-bucket singly-linked list threads through `prev`, and
//! both tables hold positions *relative to a moving base* rather than
//! absolute indices, rebased by one window's worth every time the base
//! advances a full window.
//!
//! Chain traversal recovers each entry's physical storage slot as
//! `(base + relpos) mod window_size` before indexing `prev` again, since the
//! physical slot is fixed at insertion time while the stored relative value
//! drifts as the base moves forward. The search never walks further back
//! than one window.

use crate::options::Options;

/// Sentinel meaning "no entry". Far enough below any value a rebase will
/// ever produce that the `> limit` search guard always rejects it.
const EMPTY: i64 = i64::MIN / 2;

/// A candidate match: `distance` bytes back, `length` bytes long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub length: usize,
    pub distance: usize,
}

pub struct MatchFinder {
    window_size: usize,
    mask: usize,
    search_depth: usize,
    min_match: usize,
    max_match: usize,
    /// hashtable buckets, holding a position relative to `base`
    head: Vec<i64>,
    /// same-bucket chain, holding a position relative to `base`
    prev: Vec<i64>,
    /// absolute input position that relative position 0 refers to
    base: u64,
}

impl MatchFinder {
    pub fn new(options: &Options) -> Self {
        let window_size = options.window_size;
        assert!(window_size.is_power_of_two(), "window_size must be a power of two");
        assert!(
            window_size <= 32768,
            "window_size must not exceed the spec-mandated 32 KiB maximum (match distances are carried in a u16)"
        );
        Self {
            window_size,
            mask: window_size - 1,
            search_depth: options.search_depth,
            min_match: options.min_match,
            max_match: options.max_match,
            head: vec![EMPTY; window_size],
            prev: vec![EMPTY; window_size],
            base: 0,
        }
    }

    fn hash3(data: &[u8], pos: usize) -> usize {
        let b0 = data[pos] as u32;
        let b1 = *data.get(pos + 1).unwrap_or(&0) as u32;
        let b2 = *data.get(pos + 2).unwrap_or(&0) as u32;
        (3483u32.wrapping_mul(b0).wrapping_add(23081u32.wrapping_mul(b1)).wrapping_add(6954u32.wrapping_mul(b2))) as usize
    }

    /// Recover the physical slot an entry was stored at from its current
    /// (possibly rebased-negative) relative position.
    fn physical_slot(&self, relpos: i64) -> usize {
        let abs = self.base as i64 + relpos;
        abs.rem_euclid(self.window_size as i64) as usize
    }

    /// Search the hash chain for the longest match at `data[pos..]`.
    /// Returns `None` if nothing at least `min_match` bytes long was found.
    pub fn find_longest_match(&self, data: &[u8], pos: usize) -> Option<Match> {
        if pos + self.min_match > data.len() {
            return None;
        }
        let max_len = self.max_match.min(data.len() - pos);
        let relpos = pos as i64 - self.base as i64;
        debug_assert!(relpos >= 0 && (relpos as usize) < self.window_size);
        let limit = relpos - self.window_size as i64;

        let slot = Self::hash3(data, pos) & self.mask;

        let mut best_len = 0usize;
        let mut best_dist = 0usize;
        let mut match_relpos = self.head[slot];
        let mut depth = self.search_depth;

        while match_relpos > limit && depth > 0 {
            depth -= 1;
            let match_pos = (self.base as i64 + match_relpos) as usize;

            let mut len = 0usize;
            while len < max_len && data[match_pos + len] == data[pos + len] {
                len += 1;
            }

            if len > best_len {
                best_len = len;
                best_dist = (relpos - match_relpos) as usize;
                if len >= max_len {
                    break;
                }
            }

            match_relpos = self.prev[self.physical_slot(match_relpos)];
        }

        if best_len >= self.min_match {
            Some(Match { length: best_len, distance: best_dist })
        } else {
            None
        }
    }

    /// Record the byte at `pos` in the hash chain.
    pub fn insert(&mut self, data: &[u8], pos: usize) {
        if pos >= data.len() {
            return;
        }
        let relpos = pos as i64 - self.base as i64;
        debug_assert!(relpos >= 0 && (relpos as usize) < self.window_size);

        let slot = Self::hash3(data, pos) & self.mask;
        let phys = relpos as usize;
        self.prev[phys] = self.head[slot];
        self.head[slot] = relpos;

        if phys + 1 == self.window_size {
            self.rebase();
        }
    }

    /// Record every position in `data[pos..pos + count]`, in order. Used
    /// after emitting a match so the skipped-over bytes are still
    /// discoverable by later searches.
    pub fn insert_range(&mut self, data: &[u8], pos: usize, count: usize) {
        for i in 0..count {
            self.insert(data, pos + i);
        }
    }

    fn rebase(&mut self) {
        log::trace!("rebasing match finder at base {}", self.base);
        let shift = self.window_size as i64;
        for v in self.head.iter_mut().chain(self.prev.iter_mut()) {
            if *v <= shift {
                *v -= shift;
            }
        }
        self.base += self.window_size as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::STD_OPTIONS;

    #[test]
    fn finds_nothing_in_fresh_window() {
        let mf = MatchFinder::new(&STD_OPTIONS);
        let data = b"abc";
        assert_eq!(mf.find_longest_match(data, 0), None);
    }

    #[test]
    fn finds_repeated_pattern() {
        let mut mf = MatchFinder::new(&STD_OPTIONS);
        let data = b"abcabcabc";
        for i in 0..3 {
            mf.insert(data, i);
        }
        let m = mf.find_longest_match(data, 3).unwrap();
        assert_eq!(m.distance, 3);
        assert!(m.length >= 3);
    }

    #[test]
    fn prefers_longer_match_over_nearer_shorter_one() {
        let mut mf = MatchFinder::new(&STD_OPTIONS);
        let data = b"xyzabcdezzzabcde";
        for i in 0..11 {
            mf.insert(data, i);
        }
        // "abcde" at position 3 is a 5-byte match; "zzz" right before
        // position 11 only offers a much shorter match.
        let m = mf.find_longest_match(data, 11).unwrap();
        assert_eq!(m.length, 5);
        assert_eq!(m.distance, 8);
    }

    #[test]
    fn respects_max_match_length() {
        let mut options = STD_OPTIONS;
        options.max_match = 6;
        let mut mf = MatchFinder::new(&options);
        let data = vec![b'a'; 50];
        for i in 0..20 {
            mf.insert(&data, i);
        }
        let m = mf.find_longest_match(&data, 20).unwrap();
        assert_eq!(m.length, 6);
    }

    #[test]
    fn survives_multiple_window_rebases() {
        // A tiny window forces frequent rebasing; matches must remain
        // correct (and distances must never exceed the window) across
        // several full wraps.
        let mut options = STD_OPTIONS;
        options.window_size = 16;
        options.search_depth = 16;
        let mut mf = MatchFinder::new(&options);

        let mut data = Vec::new();
        for i in 0..300u32 {
            data.push((i % 251) as u8);
        }
        // Plant a recognizable repeat a handful of window-lengths in.
        for &b in b"needle" {
            data.push(b);
        }
        let insert_up_to = data.len() - 6;
        for i in 0..insert_up_to {
            mf.insert(&data, i);
        }
        for &b in b"needle" {
            data.push(b);
        }

        let search_pos = data.len() - 6;
        if let Some(m) = mf.find_longest_match(&data, search_pos) {
            assert!(m.distance <= options.window_size);
            assert!(m.distance > 0);
        }
    }

    #[test]
    fn insert_range_records_every_position() {
        let mut mf = MatchFinder::new(&STD_OPTIONS);
        let data = b"aaaaaaaa";
        mf.insert_range(data, 0, 5);
        let m = mf.find_longest_match(data, 5).unwrap();
        assert!(m.distance >= 1 && m.distance <= 5);
    }

    #[test]
    #[should_panic(expected = "32 KiB")]
    fn window_larger_than_32_kib_is_rejected() {
        // A window this size is still a valid power of two, so only the
        // explicit bound (not is_power_of_two) can catch it. Left
        // unchecked, distances up to it would silently truncate when cast
        // to the u16 a Token::Match carries.
        let mut options = STD_OPTIONS;
        options.window_size = 1 << 20;
        MatchFinder::new(&options);
    }
}
