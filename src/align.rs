/// Alignment quantum of every header footprint, in bytes.
pub const ALIGNMENT: usize = 16;

/// Rounds `value` up to the next multiple of `quantum`, which must be a power
/// of two.
///
/// # Examples
///
/// ```rust
/// use brkalloc::{ALIGNMENT, align_to};
///
/// assert_eq!(align_to!(13, ALIGNMENT), 16);
/// assert_eq!(align_to!(32, ALIGNMENT), 32);
/// assert_eq!(align_to!(33, 8), 40);
/// ```
#[macro_export]
macro_rules! align_to {
  ($value:expr, $quantum:expr) => {
    ($value + $quantum - 1) & !($quantum - 1)
  };
}

#[cfg(test)]
mod tests {
  use super::ALIGNMENT;

  #[test]
  fn test_align_to_rounds_up_to_quantum() {
    let cases: [(usize, usize); 7] = [(0, 0), (1, 16), (15, 16), (16, 16), (17, 32), (100, 112), (4095, 4096)];

    for (value, expected) in cases {
      assert_eq!(align_to!(value, ALIGNMENT), expected, "align_to!({value}, 16)");
    }
  }

  #[test]
  fn test_align_to_other_quanta() {
    assert_eq!(align_to!(1usize, 1), 1);
    assert_eq!(align_to!(33usize, 8), 40);
    assert_eq!(align_to!(129usize, 128), 256);
    assert_eq!(align_to!(4096usize, 4096), 4096);
  }
}
