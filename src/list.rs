use std::ptr::NonNull;

use crate::{Pointer, block::Header};

/// Headers in the order their memory was carved from the break.
///
/// ```text
///   head                                              tail
///    │                                                 │
///    ▼                                                 ▼
///   ┌────────┬──────┐   ┌────────┬──────┐   ┌────────┬──────┐
///   │ Header │ data │──▶│ Header │ data │──▶│ Header │ data │──▶ None
///   └────────┴──────┘   └────────┴──────┘   └────────┴──────┘
///   low address                                     program break
/// ```
///
/// Blocks are only appended at the tail and only removed from the tail, so
/// list order is always ascending address order. The deallocation path relies
/// on that to decide whether a block sits at the end of the heap.
pub(crate) struct BlockList {
  head: Pointer<Header>,
  tail: Pointer<Header>,
}

// Headers are only reachable through the allocator's lock.
unsafe impl Send for BlockList {}

impl BlockList {
  pub const fn new() -> Self {
    Self {
      head: None,
      tail: None,
    }
  }

  pub fn tail(&self) -> Pointer<Header> {
    self.tail
  }

  /// First-fit: the first free block whose size is at least `size`. The
  /// block is not split, a larger block is handed out whole.
  ///
  /// # Safety
  ///
  /// Every header in the list must still be valid.
  pub unsafe fn find_reusable(
    &self,
    size: usize,
  ) -> Pointer<Header> {
    unsafe { self.find_reusable_aligned(size, 1) }
  }

  /// Same as [`BlockList::find_reusable`], skipping blocks whose payload is
  /// not a multiple of `align`.
  ///
  /// # Safety
  ///
  /// Every header in the list must still be valid.
  pub unsafe fn find_reusable_aligned(
    &self,
    size: usize,
    align: usize,
  ) -> Pointer<Header> {
    let mut blocks = unsafe { self.iter() };

    blocks
      .find(|&(at, header)| {
        let payload = unsafe { Header::payload_of(at) };
        header.is_free && header.size >= size && payload.as_ptr() as usize % align == 0
      })
      .map(|(at, _)| at)
  }

  /// Links `block` after the current tail.
  ///
  /// # Safety
  ///
  /// `block` must hold a freshly stored header with `next == None` and sit at
  /// a higher address than every block already in the list.
  pub unsafe fn append(
    &mut self,
    block: NonNull<Header>,
  ) {
    match self.tail {
      None => self.head = Some(block),
      Some(tail) => unsafe { Header::set_next(tail, Some(block)) },
    }

    self.tail = Some(block);
  }

  /// Unlinks the tail block. The caller hands its memory back.
  ///
  /// # Safety
  ///
  /// Every header in the list must still be valid.
  pub unsafe fn pop_tail(&mut self) {
    let Some(tail) = self.tail else {
      return;
    };

    if self.head == self.tail {
      self.head = None;
      self.tail = None;
      return;
    }

    let mut current = self.head;

    while let Some(block) = current {
      let next = unsafe { Header::load(block) }.next;

      if next == Some(tail) {
        unsafe { Header::set_next(block, None) };
        self.tail = Some(block);
        return;
      }

      current = next;
    }
  }

  /// Walks the list from head to tail yielding each header address with a
  /// copy of its contents.
  ///
  /// # Safety
  ///
  /// Every header in the list must stay valid while the iterator is used.
  pub unsafe fn iter(&self) -> Blocks {
    Blocks { current: self.head }
  }
}

pub(crate) struct Blocks {
  current: Pointer<Header>,
}

impl Iterator for Blocks {
  type Item = (NonNull<Header>, Header);

  fn next(&mut self) -> Option<Self::Item> {
    let at = self.current?;
    let header = unsafe { Header::load(at) };
    self.current = header.next;

    Some((at, header))
  }
}
