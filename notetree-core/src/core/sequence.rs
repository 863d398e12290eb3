//! Ordering-key allocation for sibling notes.
//!
//! Each note carries an integer sequence key relative to its parent; display
//! order is ascending key order. Keys are deliberately sparse (gap 10 000) so
//! that a note can be inserted between two siblings without renumbering the
//! rest — the midpoint of the two neighboring keys becomes the new key.
//!
//! Repeated insertion between the same two neighbors eventually closes the
//! gap; when the midpoint lands on a neighbor the allocator reports
//! [`NotetreeError::AllocationExhausted`] and the caller re-sequences the
//! sibling list with [`spread_keys`] before retrying. A duplicate key is
//! never produced silently.

use crate::{NotetreeError, Result};

/// Key assigned to the first note under a parent.
pub const SEQUENCE_BASE: i64 = 10_000;

/// Spacing reserved between adjacent keys on append, prepend, and re-sequence.
pub const SEQUENCE_GAP: i64 = 10_000;

/// Computes the ordering key for inserting at `index` among `keys`, the
/// current sibling keys sorted ascending.
///
/// # Errors
///
/// Returns [`NotetreeError::AllocationExhausted`] when inserting between two
/// keys whose midpoint collides with either neighbor.
pub fn allocate_sequence(keys: &[i64], index: usize) -> Result<i64> {
    if keys.is_empty() {
        return Ok(SEQUENCE_BASE);
    }
    if index == 0 {
        return Ok(keys[0] - SEQUENCE_GAP);
    }
    if index >= keys.len() {
        return Ok(keys[keys.len() - 1] + SEQUENCE_GAP);
    }
    let left = keys[index - 1];
    let right = keys[index];
    let mid = (left + right).div_euclid(2);
    if mid == left || mid == right {
        return Err(NotetreeError::AllocationExhausted);
    }
    Ok(mid)
}

/// Fresh evenly spaced keys for a sibling list of `len` notes, used when the
/// midpoint space between two keys is exhausted.
pub fn spread_keys(len: usize) -> Vec<i64> {
    (0..len as i64)
        .map(|i| SEQUENCE_BASE + i * SEQUENCE_GAP)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_key_is_base() {
        assert_eq!(allocate_sequence(&[], 0).unwrap(), 10_000);
        assert_eq!(allocate_sequence(&[], 5).unwrap(), 10_000);
    }

    #[test]
    fn test_front_insert_subtracts_gap() {
        assert_eq!(allocate_sequence(&[10_000, 20_000], 0).unwrap(), 0);
        assert_eq!(allocate_sequence(&[0, 20_000], 0).unwrap(), -10_000);
    }

    #[test]
    fn test_end_insert_adds_gap() {
        assert_eq!(allocate_sequence(&[10_000, 20_000], 2).unwrap(), 30_000);
        assert_eq!(allocate_sequence(&[10_000], 7).unwrap(), 20_000);
    }

    #[test]
    fn test_middle_insert_takes_floor_midpoint() {
        assert_eq!(allocate_sequence(&[10_000, 20_000], 1).unwrap(), 15_000);
        assert_eq!(allocate_sequence(&[10_000, 10_003], 1).unwrap(), 10_001);
    }

    #[test]
    fn test_adjacent_keys_exhaust() {
        // floor((10000 + 10001) / 2) == 10000 — collides with the left key.
        let err = allocate_sequence(&[10_000, 10_001], 1).unwrap_err();
        assert!(matches!(err, NotetreeError::AllocationExhausted));

        let err = allocate_sequence(&[10_001, 10_002], 1).unwrap_err();
        assert!(matches!(err, NotetreeError::AllocationExhausted));

        // A gap of two still leaves exactly one free midpoint.
        assert_eq!(allocate_sequence(&[10_000, 10_002], 1).unwrap(), 10_001);
    }

    #[test]
    fn test_repeated_midpoint_insertion_eventually_exhausts() {
        // Keep inserting between two fixed neighbors; every allocated key must
        // be strictly between them and distinct until exhaustion is signalled.
        let mut left = 10_000i64;
        let right = 20_000i64;
        let mut allocated = std::collections::HashSet::new();
        loop {
            match allocate_sequence(&[left, right], 1) {
                Ok(key) => {
                    assert!(key > left && key < right);
                    assert!(allocated.insert(key), "allocator produced duplicate key {key}");
                    left = key;
                }
                Err(NotetreeError::AllocationExhausted) => break,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert!(!allocated.is_empty());
    }

    #[test]
    fn test_spread_keys_even_spacing() {
        assert_eq!(spread_keys(3), vec![10_000, 20_000, 30_000]);
        assert!(spread_keys(0).is_empty());
    }
}
