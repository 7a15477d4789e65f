//! Conversion between cell arrays and packed integer states.
//!
//! States are packed MSB-first: cell 0 is the most significant bit, so the
//! cells `[1, 0, 0]` pack to `4` and read left to right like the binary
//! literal `0b100`. The convention only affects how states print; cycle
//! lengths are independent of it.

use crate::error::CaError;

/// Smallest supported automaton width.
pub const MIN_WIDTH: usize = 1;

/// Largest width that fits a packed `u32` state.
pub const MAX_WIDTH: usize = 31;

/// Largest width for operations that visit every one of the 2^n states.
pub const MAX_EXHAUSTIVE_WIDTH: usize = 20;

/// Checks `width` against `MIN_WIDTH..=max`.
pub(crate) fn check_width(width: usize, max: usize) -> Result<(), CaError> {
    if (MIN_WIDTH..=max).contains(&width) {
        Ok(())
    } else {
        Err(CaError::InvalidLength {
            len: width,
            min: MIN_WIDTH,
            max,
        })
    }
}

/// Returns 2^width, the size of the state space.
///
/// Fails for widths outside `MIN_WIDTH..=MAX_EXHAUSTIVE_WIDTH`.
pub fn state_count(width: usize) -> Result<usize, CaError> {
    check_width(width, MAX_EXHAUSTIVE_WIDTH)?;
    Ok(1usize << width)
}

/// Packs a cell array into an integer, cell 0 first (most significant).
pub fn pack(cells: &[bool]) -> Result<u32, CaError> {
    check_width(cells.len(), MAX_WIDTH)?;
    Ok(cells
        .iter()
        .fold(0u32, |acc, &cell| (acc << 1) | cell as u32))
}

/// Unpacks `state` into `width` cells. Exact inverse of [`pack`].
pub fn unpack(state: u32, width: usize) -> Result<Vec<bool>, CaError> {
    check_width(width, MAX_WIDTH)?;
    if state >> width != 0 {
        return Err(CaError::StateOutOfRange { state, width });
    }
    Ok((0..width)
        .map(|i| (state >> (width - 1 - i)) & 1 == 1)
        .collect())
}

/// Reads cell `index` of a packed state of the given width.
#[inline]
pub(crate) fn cell(state: u32, width: usize, index: usize) -> u32 {
    (state >> (width - 1 - index)) & 1
}

/// Renders a packed state as a string of `0`/`1`, cell 0 first.
pub fn format_state(state: u32, width: usize) -> String {
    (0..width)
        .map(|i| if cell(state, width, i) == 1 { '1' } else { '0' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_is_msb_first() {
        assert_eq!(pack(&[true, false, false]).unwrap(), 4);
        assert_eq!(pack(&[false, false, true]).unwrap(), 1);
        assert_eq!(pack(&[true, true, true, true]).unwrap(), 15);
    }

    #[test]
    fn test_unpack_inverts_pack() {
        let cells = vec![true, false, true, true, false];
        let packed = pack(&cells).unwrap();
        assert_eq!(packed, 0b10110);
        assert_eq!(unpack(packed, 5).unwrap(), cells);
    }

    #[test]
    fn test_roundtrip_all_small_widths() {
        for width in 1..=10 {
            for state in 0..(1u32 << width) {
                let cells = unpack(state, width).unwrap();
                assert_eq!(cells.len(), width);
                assert_eq!(pack(&cells).unwrap(), state);
            }
        }
    }

    #[test]
    fn test_empty_cells_rejected() {
        assert!(matches!(
            pack(&[]),
            Err(CaError::InvalidLength { len: 0, .. })
        ));
        assert!(unpack(0, 0).is_err());
    }

    #[test]
    fn test_width_cap() {
        assert!(pack(&[false; 32]).is_err());
        assert!(pack(&[true; 31]).is_ok());
        assert!(unpack(0, 32).is_err());
    }

    #[test]
    fn test_state_out_of_range() {
        assert!(matches!(
            unpack(8, 3),
            Err(CaError::StateOutOfRange { state: 8, width: 3 })
        ));
    }

    #[test]
    fn test_state_count() {
        assert_eq!(state_count(1).unwrap(), 2);
        assert_eq!(state_count(10).unwrap(), 1024);
        assert!(state_count(0).is_err());
        assert!(state_count(MAX_EXHAUSTIVE_WIDTH + 1).is_err());
    }

    #[test]
    fn test_format_state() {
        assert_eq!(format_state(0b1011, 4), "1011");
        assert_eq!(format_state(1, 3), "001");
    }
}
