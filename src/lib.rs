//! # brkalloc - A First-Fit Allocator over the Program Break
//!
//! This crate provides a small, thread-safe **first-fit allocator** that carves
//! memory from a single break pointer, the process break via `sbrk(2)` by
//! default.
//!
//! ## Overview
//!
//! Every block is a header followed by its payload, and every header is linked
//! into one list in the order the blocks were carved:
//!
//! ```text
//!   Heap after allocate(10), allocate(20), allocate(8):
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                         HEAP MEMORY                                  │
//!   │                                                                      │
//!   │   ┌────┬────┬────┬────────┬────┬─────┬───────────────────────────┐   │
//!   │   │ H  │ 10 │ H  │   20   │ H  │  8  │        (not mapped)       │   │
//!   │   └────┴────┴────┴────────┴────┴─────┴───────────────────────────┘   │
//!   │   ▲                                  ▲                               │
//!   │   │                                  │                               │
//!   │  head ──next──▶ ... ──next──▶ tail  Program                          │
//!   │                                     Break                            │
//!   │                                                                      │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **Allocation** scans the list for the first free block whose size is at
//!   least the request. If there is none, the break grows by one header plus
//!   the requested size and the new block is appended at the tail.
//! - **Deallocation** checks whether the block ends exactly at the break. If
//!   so, it is unlinked and the break shrinks. Otherwise the block is only
//!   marked free and stays in the list until a request fits into it.
//!
//! Freeing in LIFO order gives every byte back. Freeing out of order leaves
//! holes that are reused whole: blocks are never split and never merged.
//!
//! ## Crate Structure
//!
//! ```text
//!   brkalloc
//!   ├── align      - align_to! macro and the 16 byte ALIGNMENT quantum
//!   ├── block      - Header metadata structure (internal)
//!   ├── brk        - ProgramBreak trait, Sbrk and RegionBreak
//!   ├── list       - Block list and first-fit search (internal)
//!   └── allocator  - BrkAllocator and HeapStats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use brkalloc::{BrkAllocator, Sbrk};
//!
//! fn main() {
//!     let allocator = BrkAllocator::new(Sbrk);
//!
//!     let ptr = allocator.allocate(64);
//!     assert!(!ptr.is_null());
//!
//!     unsafe {
//!         ptr.write_bytes(0xAB, 64);
//!         allocator.deallocate(ptr);
//!     }
//! }
//! ```
//!
//! Or for the whole program:
//!
//! ```rust,ignore
//! use brkalloc::{BrkAllocator, Sbrk};
//!
//! #[global_allocator]
//! static ALLOCATOR: BrkAllocator<Sbrk> = BrkAllocator::new(Sbrk);
//! ```
//!
//! ## Header Layout
//!
//! ```text
//!   ┌───────────────────────┬────────────────────────────────┐
//!   │    Block Header       │         User Data              │
//!   │  ┌─────────────────┐  │                                │
//!   │  │ size: N         │  │  ┌──────────────────────────┐  │
//!   │  │ is_free: false  │  │  │                          │  │
//!   │  │ next: null/ptr  │  │  │     N bytes usable       │  │
//!   │  └─────────────────┘  │  │                          │  │
//!   │  32 bytes (64 bit)    │  └──────────────────────────┘  │
//!   └───────────────────────┴────────────────────────────────┘
//!                           ▲
//!                           └── Pointer returned to user
//! ```
//!
//! The header is padded to a multiple of 16 bytes, so the first payload is
//! 16-aligned whenever the break starts out aligned. Raw [`BrkAllocator::allocate`]
//! does not round sizes, so later payloads follow the requested sizes
//! byte for byte. The [`GlobalAlloc`](std::alloc::GlobalAlloc) implementation
//! rounds every request to 16 bytes to keep all payloads aligned.
//!
//! ## Features
//!
//! - `trace`: print every grow, reuse, release and mark-free to stderr.
//!
//! ## Limitations
//!
//! - **One lock**: every call serializes on a single mutex.
//! - **No coalescing or splitting**: free blocks keep their original size.
//! - **Tail-only release**: only the block at the break goes back to the OS.
//! - **Unix-only** for [`Sbrk`]. [`RegionBreak`] works on any memory region.
//!
//! ## Safety
//!
//! Deallocating a pointer this allocator did not hand out, or deallocating
//! twice, is undefined behaviour and is not detected.

use std::ptr::NonNull;

pub mod align;
mod allocator;
mod block;
mod brk;
mod list;

/// Nullable non-null pointer, the allocator's internal failure channel.
pub(crate) type Pointer<T> = Option<NonNull<T>>;

pub use align::ALIGNMENT;
pub use allocator::{BrkAllocator, HeapStats};
pub use brk::{ProgramBreak, RegionBreak, Sbrk};
