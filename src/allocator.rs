use std::{
  alloc::{GlobalAlloc, Layout},
  fmt,
  ptr::{self, NonNull},
  sync::Mutex,
};

use crate::{
  Pointer, align_to,
  align::ALIGNMENT,
  block::{FOOTPRINT, Header},
  brk::ProgramBreak,
  list::BlockList,
};

/// Diagnostics on stderr when the `trace` feature is enabled. Formatting
/// integers and pointers through `eprintln!` does not allocate.
macro_rules! trace {
  ($($arg:tt)*) => {
    #[cfg(feature = "trace")]
    eprintln!("[BrkAllocator] {}", format_args!($($arg)*));
  };
}

/// Everything the lock protects: the block list and the break it was carved
/// from.
struct Heap<B> {
  blocks: BlockList,
  brk: B,
}

/// First-fit allocator over a single break.
///
/// Every allocation either reuses the first free block that is large enough
/// or grows the break by a header plus the requested size. Deallocating the
/// block that ends at the break hands it back to the break, any other block
/// is only marked free and stays in the list for reuse. There is no
/// splitting and no coalescing.
///
/// One [`Mutex`] guards the list, every header in it and the break, so the
/// allocator can be shared between threads and installed as the
/// `#[global_allocator]`:
///
/// ```rust,ignore
/// use brkalloc::{BrkAllocator, Sbrk};
///
/// #[global_allocator]
/// static ALLOCATOR: BrkAllocator<Sbrk> = BrkAllocator::new(Sbrk);
/// ```
pub struct BrkAllocator<B> {
  heap: Mutex<Heap<B>>,
}

impl<B: ProgramBreak> BrkAllocator<B> {
  pub const fn new(brk: B) -> Self {
    Self {
      heap: Mutex::new(Heap {
        blocks: BlockList::new(),
        brk,
      }),
    }
  }

  /// Returns the address of `size` writable bytes, or null when `size` is
  /// zero or the break cannot grow.
  pub fn allocate(
    &self,
    size: usize,
  ) -> *mut u8 {
    self.allocate_aligned(size, 1)
  }

  /// [`BrkAllocator::allocate`] with a payload that is a multiple of `align`,
  /// a power of two.
  fn allocate_aligned(
    &self,
    size: usize,
    align: usize,
  ) -> *mut u8 {
    if size == 0 {
      return ptr::null_mut();
    }

    let Ok(mut heap) = self.heap.lock() else {
      return ptr::null_mut();
    };

    match unsafe { heap.allocate(size, align) } {
      Some(payload) => payload.as_ptr(),
      None => ptr::null_mut(),
    }
  }

  /// Releases the block behind `address`. Null is ignored.
  ///
  /// # Safety
  ///
  /// `address` must have been returned by [`BrkAllocator::allocate`] on this
  /// same allocator and not deallocated since. Anything else is undefined
  /// behaviour: the header in front of it is trusted blindly.
  pub unsafe fn deallocate(
    &self,
    address: *mut u8,
  ) {
    let Some(payload) = NonNull::new(address) else {
      return;
    };

    if let Ok(mut heap) = self.heap.lock() {
      unsafe { heap.deallocate(payload) }
    }
  }

  /// Current position of the break.
  pub fn current_break(&self) -> Option<NonNull<u8>> {
    let mut heap = self.heap.lock().ok()?;
    heap.brk.adjust(0)
  }

  /// Snapshot of every block the allocator is tracking.
  pub fn stats(&self) -> HeapStats {
    let mut stats = HeapStats::default();

    let Ok(heap) = self.heap.lock() else {
      return stats;
    };

    for (_, header) in unsafe { heap.blocks.iter() } {
      stats.blocks += 1;

      if header.is_free {
        stats.free_blocks += 1;
        stats.free_bytes += header.size;
      } else {
        stats.used_bytes += header.size;
      }
    }

    stats
  }
}

impl<B: ProgramBreak> Heap<B> {
  /// Reuses or carves a block of `size` bytes whose payload is a multiple of
  /// `align`. With `align == 1` the break grows by exactly one header plus
  /// `size`.
  ///
  /// Otherwise, when the payload at the current break would be misaligned, a
  /// free filler block is carved first so that the next payload lands on the
  /// boundary:
  ///
  /// ```text
  ///   break before                                 aligned
  ///   ▼                                            ▼
  ///   ┌────────┬──────────────────┬──────────────┬──────────────┐
  ///   │ Header │  filler (free)   │    Header    │   payload    │
  ///   └────────┴──────────────────┴──────────────┴──────────────┘
  ///   ◀────────────── pad ───────▶
  /// ```
  ///
  /// # Safety
  ///
  /// Must be called with the lock held, which `&mut self` guarantees.
  /// `align` must be a power of two.
  unsafe fn allocate(
    &mut self,
    size: usize,
    align: usize,
  ) -> Pointer<u8> {
    if let Some(block) = unsafe { self.blocks.find_reusable_aligned(size, align) } {
      unsafe { Header::set_free(block, false) };
      trace!("reuse size={} block={:?}", size, block);

      return Some(unsafe { Header::payload_of(block) });
    }

    let pad = if align > 1 { self.padding_for(align)? } else { 0 };

    // A total that wraps or does not fit a signed delta can never be served.
    let total = pad.checked_add(FOOTPRINT)?.checked_add(size)?;
    let delta = isize::try_from(total).ok()?;

    let Some(address) = self.brk.adjust(delta) else {
      trace!("out of memory size={}", size);
      return None;
    };

    if pad > 0 {
      let filler = address.cast::<Header>();

      unsafe {
        Header::store(filler, Header::new(pad - FOOTPRINT));
        Header::set_free(filler, true);
        self.blocks.append(filler);
      }

      trace!("filler block={:?} total={}", filler, pad);
    }

    let block = unsafe { address.add(pad) }.cast::<Header>();

    unsafe {
      Header::store(block, Header::new(size));
      self.blocks.append(block);
    }

    trace!("grow size={} block={:?} total={}", size, block, total);

    Some(unsafe { Header::payload_of(block) })
  }

  /// Bytes to carve before the next header so that its payload is a multiple
  /// of `align`. Either zero or large enough to hold a filler header.
  fn padding_for(
    &mut self,
    align: usize,
  ) -> Option<usize> {
    let payload = self.brk.adjust(0)?.as_ptr() as usize + FOOTPRINT;
    let mut pad = payload.next_multiple_of(align) - payload;

    while pad != 0 && pad < FOOTPRINT {
      pad += align;
    }

    Some(pad)
  }

  /// # Safety
  ///
  /// `payload` must be a live allocation of this heap.
  unsafe fn deallocate(
    &mut self,
    payload: NonNull<u8>,
  ) {
    let block = unsafe { Header::from_payload(payload) };
    let end = unsafe { Header::end_of(block) };

    let at_break = self.brk.adjust(0).is_some_and(|brk| brk.as_ptr() as usize == end);
    let total = end - block.as_ptr() as usize;

    // A break that refuses to shrink keeps the block listed for reuse.
    if !at_break || self.brk.adjust(-(total as isize)).is_none() {
      unsafe { Header::set_free(block, true) };
      trace!("mark free block={:?} at_break={}", block, at_break);
      return;
    }

    debug_assert_eq!(self.blocks.tail(), Some(block));

    unsafe { self.blocks.pop_tail() };

    trace!("release block={:?} total={}", block, total);
  }
}

unsafe impl<B: ProgramBreak> GlobalAlloc for BrkAllocator<B> {
  unsafe fn alloc(
    &self,
    layout: Layout,
  ) -> *mut u8 {
    // Rounding every request to the quantum keeps each header, and so each
    // payload, aligned as long as the break started out aligned. Layout sizes
    // never exceed isize::MAX, so the rounding cannot wrap.
    let size = align_to!(layout.size(), ALIGNMENT);

    // Cache padded std types ask for more than the quantum.
    if layout.align() > ALIGNMENT {
      return self.allocate_aligned(size, layout.align());
    }

    let address = self.allocate(size);

    if address as usize % layout.align() != 0 {
      unsafe { self.deallocate(address) };
      return ptr::null_mut();
    }

    address
  }

  unsafe fn dealloc(
    &self,
    address: *mut u8,
    _layout: Layout,
  ) {
    unsafe { self.deallocate(address) }
  }
}

/// Counters reported by [`BrkAllocator::stats`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct HeapStats {
  /// Blocks in the list, live or free.
  pub blocks: usize,
  pub free_blocks: usize,
  /// Payload bytes of live blocks.
  pub used_bytes: usize,
  /// Payload bytes of free blocks waiting for reuse.
  pub free_bytes: usize,
}

impl fmt::Display for HeapStats {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    write!(
      f,
      "{} blocks ({} free), {} bytes used, {} bytes free",
      self.blocks, self.free_blocks, self.used_bytes, self.free_bytes
    )
  }
}
