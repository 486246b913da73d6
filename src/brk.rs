use std::ptr::NonNull;

use libc::{c_void, intptr_t, sbrk};

/// A monotonic break pointer the allocator carves blocks from.
///
/// `adjust(0)` is a pure query, a positive delta extends the region and a
/// negative delta hands memory back. On success the break *before* the
/// adjustment is returned, on failure `None` and the break is untouched.
///
/// # Safety
///
/// Implementors must guarantee that after a successful `adjust(n)` with
/// `n > 0` the `n` bytes starting at the returned address are valid for
/// reads and writes until they are handed back with a negative delta, and
/// that nothing else moves the break while the allocator owns it.
pub unsafe trait ProgramBreak {
  fn adjust(
    &mut self,
    delta: isize,
  ) -> Option<NonNull<u8>>;
}

/// The process break, driven through `sbrk(2)`.
///
/// There is exactly one process break, so only one allocator should own an
/// [`Sbrk`]. Two allocators adjusting it under separate locks would race on
/// the "is this block at the end of the heap" check.
#[derive(Debug, Default, Clone, Copy)]
pub struct Sbrk;

unsafe impl ProgramBreak for Sbrk {
  fn adjust(
    &mut self,
    delta: isize,
  ) -> Option<NonNull<u8>> {
    let previous = unsafe { sbrk(delta as intptr_t) };

    // sbrk signals failure with (void *) -1.
    if previous == usize::MAX as *mut c_void {
      return None;
    }

    NonNull::new(previous.cast())
  }
}

/// A break simulated over a fixed region of memory owned by the caller.
///
/// ```text
///   base                    base + brk                base + capacity
///   ├───────── carved ─────────┼────────── spare ──────────┤
/// ```
///
/// Growing past `capacity` or shrinking below `base` fails exactly like
/// `sbrk` would. Useful wherever the real process break is off limits: tests,
/// benches, or a static arena.
#[derive(Debug)]
pub struct RegionBreak {
  base: NonNull<u8>,
  capacity: usize,
  brk: usize,
}

unsafe impl Send for RegionBreak {}

impl RegionBreak {
  /// # Safety
  ///
  /// `base` must point to `capacity` bytes valid for reads and writes that
  /// nobody else touches for as long as this value (and the allocator owning
  /// it) is alive. Align `base` to [`crate::ALIGNMENT`] to get aligned
  /// payloads.
  pub const unsafe fn new(
    base: NonNull<u8>,
    capacity: usize,
  ) -> Self {
    Self {
      base,
      capacity,
      brk: 0,
    }
  }

  pub fn base(&self) -> NonNull<u8> {
    self.base
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }
}

unsafe impl ProgramBreak for RegionBreak {
  fn adjust(
    &mut self,
    delta: isize,
  ) -> Option<NonNull<u8>> {
    let brk = self.brk.checked_add_signed(delta)?;

    if brk > self.capacity {
      return None;
    }

    let previous = unsafe { self.base.add(self.brk) };
    self.brk = brk;

    Some(previous)
  }
}
