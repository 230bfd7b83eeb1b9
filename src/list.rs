//! Selection arithmetic shared by the panel services.

/// Move `current` by `delta` and clamp into `[0, len - 1]`.
///
/// Navigation is never circular: stepping past either end stays on the
/// end.  `len` must be non-zero.
pub fn step_clamped(current: usize, delta: isize, len: usize) -> usize {
    debug_assert!(len > 0);
    let last = len.saturating_sub(1) as isize;
    (current as isize + delta).clamp(0, last) as usize
}

/// Clamp an optional selection into a list of `len` items.
///
/// An empty list has no selection; a missing or out-of-range selection
/// falls back to the first item.
pub fn clamp_selection(selected: Option<usize>, len: usize) -> Option<usize> {
    match selected {
        _ if len == 0 => None,
        Some(i) if i < len => Some(i),
        _ => Some(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_stays_in_bounds() {
        assert_eq!(step_clamped(0, -1, 5), 0);
        assert_eq!(step_clamped(4, 1, 5), 4);
        assert_eq!(step_clamped(2, 1, 5), 3);
        assert_eq!(step_clamped(2, -10, 5), 0);
        assert_eq!(step_clamped(0, 10, 1), 0);
    }

    #[test]
    fn clamp_selection_cases() {
        assert_eq!(clamp_selection(Some(3), 0), None);
        assert_eq!(clamp_selection(None, 0), None);
        assert_eq!(clamp_selection(None, 2), Some(0));
        assert_eq!(clamp_selection(Some(5), 2), Some(0));
        assert_eq!(clamp_selection(Some(1), 2), Some(1));
    }
}
