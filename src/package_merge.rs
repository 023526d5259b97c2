//! Length-limited prefix-code construction via the lazy/boundary
//! package-merge algorithm (Moffat et al., "A Fast and Space-Economical
//! Algorithm for Length-Limited Coding"): per-list `w`/`c`/`j` running totals
//! and a bitmask matrix recording which list produced each package, with a
//! `u64::MAX` sentinel standing in for an out-of-range frequency.

use crate::error::{Error, Result};

const MAX_DEPTH: u8 = 32;

/// Core lazy package-merge over `n > 2` non-zero frequencies, sorted
/// ascending, with `2^limit > n`. Returns one code length per input
/// frequency, in the same order.
fn package_merge_core(freqs: &[u32], limit: u8) -> Vec<u32> {
    let n = freqs.len();
    debug_assert!(n > 2);
    let limit = limit as usize;

    // Per-list scalars: w = sum of the two rightmost look-ahead chains,
    // c = count of non-package chains so far, j = total chains so far.
    let mut w = vec![0u64; limit];
    let mut c = vec![0usize; limit];
    let mut j = vec![0usize; limit];

    // One bit per list records whether chain `k` in that list is a package.
    let mut masks = vec![0u32; 2 * n - 2];
    let mut stack: Vec<usize> = Vec::with_capacity(limit);

    for l in 0..limit {
        w[l] = freqs[0] as u64 + freqs[1] as u64;
        c[l] = 2;
        j[l] = 2;
    }

    let mut l = limit - 1;
    let mut i = 2;
    while i < 2 * n - 2 {
        let freq: u64 = if c[l] < n { freqs[c[l]] as u64 } else { u64::MAX };
        let s: u64 = if l != 0 { w[l - 1] } else { 0 };

        if l == 0 || s > freq {
            // Take the next symbol.
            c[l] += 1;
            w[l] += freq;
        } else {
            // Form a package from the two rightmost chains one list down.
            w[l - 1] = 0;
            w[l] += s;
            masks[j[l]] |= 1 << l;
            stack.push(l - 1);
            stack.push(l - 1);
        }

        j[l] += 1;

        if l == limit - 1 {
            i += 1;
        }

        l = stack.pop().unwrap_or(limit - 1);
    }

    // Count active (non-package) leaves per list, from the deepest list up.
    let mut active_leaves = vec![0u32; limit];
    let mut num_to_use = 2 * n - 2;
    for lvl in (0..limit).rev() {
        let mut num_packages = 0usize;
        for k in 2..num_to_use {
            num_packages += ((masks[k] >> lvl) & 1) as usize;
        }
        active_leaves[lvl] = (num_to_use - num_packages) as u32;
        num_to_use = 2 * num_packages;
    }

    // Peel off symbols in ascending depth: deepest (longest) codes first,
    // lowest-frequency symbols first.
    let mut lengths = vec![0u32; n];
    let mut sym = 0usize;
    for lvl in 0..limit {
        let count = if lvl == 0 { active_leaves[0] } else { active_leaves[lvl] - active_leaves[lvl - 1] };
        for _ in 0..count {
            lengths[sym] = (limit - lvl) as u32;
            sym += 1;
        }
    }
    lengths
}

/// Package-merge over `n >= 1` non-zero frequencies sorted ascending.
/// Handles the `n = 1` and `n = 2` edge cases directly.
pub fn package_merge(freqs: &[u32], limit: u8) -> Result<Vec<u32>> {
    let n = freqs.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    if limit > MAX_DEPTH || (1u64 << limit) <= n as u64 {
        return Err(Error::LimitExceeded { n, limit });
    }
    debug_assert!(freqs.iter().all(|&f| f > 0), "package_merge requires non-zero frequencies");
    debug_assert!(freqs.windows(2).all(|w| w[0] <= w[1]), "package_merge requires ascending frequencies");

    if n == 1 {
        return Ok(vec![1]);
    }
    if n == 2 {
        return Ok(vec![1, 1]);
    }
    Ok(package_merge_core(freqs, limit))
}

/// Package-merge over an arbitrary (unsorted, possibly-zero) frequency
/// vector. Zero-frequency symbols get `length = 0`; everything else is
/// sorted, fed to [`package_merge`], and scattered back into the original
/// index order.
pub fn package_merge_any(freqs: &[u32], limit: u8) -> Result<Vec<u32>> {
    let n = freqs.len();
    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&a, &b| freqs[a].cmp(&freqs[b]).then(a.cmp(&b)));

    let zero_count = indices.iter().take_while(|&&i| freqs[i] == 0).count();
    let mut lengths = vec![0u32; n];
    if zero_count == n {
        return Ok(lengths);
    }

    let nonzero_indices = &indices[zero_count..];
    let sorted_freqs: Vec<u32> = nonzero_indices.iter().map(|&i| freqs[i]).collect();
    let sorted_lengths = package_merge(&sorted_freqs, limit)?;

    for (k, &idx) in nonzero_indices.iter().enumerate() {
        lengths[idx] = sorted_lengths[k];
    }
    Ok(lengths)
}
