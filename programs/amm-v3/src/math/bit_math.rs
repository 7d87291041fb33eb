//! Bit Math
//!
//! Bit scans over u64 bitmap words and word slices.

/// Check if a bit is set
#[inline]
pub fn is_bit_set(word: u64, bit: u32) -> bool {
    (word >> bit) & 1 == 1
}

/// Toggle a bit in a word slice addressed by a flat bit index
#[inline]
pub fn toggle_bit(words: &mut [u64], bit: usize) {
    words[bit / 64] ^= 1u64 << (bit % 64);
}

/// Check a bit in a word slice addressed by a flat bit index
#[inline]
pub fn is_bit_set_in(words: &[u64], bit: usize) -> bool {
    is_bit_set(words[bit / 64], (bit % 64) as u32)
}

/// Lowest set bit of `word` at position >= `from`, if any
#[inline]
pub fn next_set_bit(word: u64, from: u32) -> Option<u32> {
    if from >= 64 {
        return None;
    }
    let masked = word & (u64::MAX << from);
    if masked == 0 {
        None
    } else {
        Some(masked.trailing_zeros())
    }
}

/// Highest set bit of `word` at position <= `from`, if any
#[inline]
pub fn prev_set_bit(word: u64, from: u32) -> Option<u32> {
    let masked = word & (u64::MAX >> (63 - from.min(63)));
    if masked == 0 {
        None
    } else {
        Some(63 - masked.leading_zeros())
    }
}

/// Scan words upward from flat bit `start` (inclusive).
///
/// `word_at` yields `None` for words the caller cannot see; the scan stops there.
pub fn scan_up<F>(word_at: F, start: usize, total_bits: usize) -> Option<usize>
where
    F: Fn(usize) -> Option<u64>,
{
    let mut bit = start;
    while bit < total_bits {
        let index = bit / 64;
        let word = word_at(index)?;
        if let Some(found) = next_set_bit(word, (bit % 64) as u32) {
            return Some(index * 64 + found as usize);
        }
        bit = (index + 1) * 64;
    }
    None
}

/// Scan words downward from flat bit `start` (inclusive).
pub fn scan_down<F>(word_at: F, start: usize) -> Option<usize>
where
    F: Fn(usize) -> Option<u64>,
{
    let mut bit = start;
    loop {
        let index = bit / 64;
        let word = word_at(index)?;
        if let Some(found) = prev_set_bit(word, (bit % 64) as u32) {
            return Some(index * 64 + found as usize);
        }
        if index == 0 {
            return None;
        }
        bit = index * 64 - 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_and_prev_in_word() {
        let word = 0b1001_0000u64;
        assert_eq!(next_set_bit(word, 0), Some(4));
        assert_eq!(next_set_bit(word, 5), Some(7));
        assert_eq!(next_set_bit(word, 8), None);
        assert_eq!(next_set_bit(word, 64), None);

        assert_eq!(prev_set_bit(word, 63), Some(7));
        assert_eq!(prev_set_bit(word, 6), Some(4));
        assert_eq!(prev_set_bit(word, 3), None);
        assert_eq!(prev_set_bit(1u64 << 63, 63), Some(63));
    }

    #[test]
    fn test_toggle_and_check() {
        let mut words = [0u64; 4];
        toggle_bit(&mut words, 130);
        assert!(is_bit_set_in(&words, 130));
        assert_eq!(words[2], 1 << 2);
        toggle_bit(&mut words, 130);
        assert!(!is_bit_set_in(&words, 130));
    }

    #[test]
    fn test_scan_across_words() {
        let mut words = [0u64; 4];
        toggle_bit(&mut words, 3);
        toggle_bit(&mut words, 200);
        let view = |i: usize| words.get(i).copied();

        assert_eq!(scan_up(view, 0, 256), Some(3));
        assert_eq!(scan_up(view, 4, 256), Some(200));
        assert_eq!(scan_up(view, 201, 256), None);
        assert_eq!(scan_down(view, 255), Some(200));
        assert_eq!(scan_down(view, 199), Some(3));
        assert_eq!(scan_down(view, 2), None);
    }

    #[test]
    fn test_scan_stops_at_hidden_words() {
        let mut words = [0u64; 4];
        toggle_bit(&mut words, 250);
        let view = |i: usize| if i < 2 { Some(words[i]) } else { None };
        assert_eq!(scan_up(view, 0, 256), None);
    }
}
