use std::{mem, ptr::NonNull};

use crate::{Pointer, align::ALIGNMENT};

/// Metadata written in front of every payload carved from the break.
///
/// ```text
///   ┌───────────────────────┬──────────────────────────┐
///   │        Header         │         Payload          │
///   │  size | is_free | next│      `size` bytes        │
///   └───────────────────────┴──────────────────────────┘
///   ▲                       ▲
///   header address          header address + FOOTPRINT
/// ```
///
/// `align(16)` widens the footprint to a multiple of [`ALIGNMENT`]. Headers
/// are packed back to back with unrounded payload sizes, so a header may live
/// at an address that is not 16-aligned; every access goes through the
/// unaligned helpers below and never through a reference.
#[repr(C, align(16))]
#[derive(Clone, Copy)]
pub(crate) struct Header {
  pub size: usize,
  pub is_free: bool,
  pub next: Pointer<Header>,
}

/// Bytes occupied by a [`Header`], padding included.
pub(crate) const FOOTPRINT: usize = mem::size_of::<Header>();

const _: () = assert!(FOOTPRINT % ALIGNMENT == 0);

impl Header {
  pub fn new(size: usize) -> Self {
    Self {
      size,
      is_free: false,
      next: None,
    }
  }

  /// Writes `header` at `at`.
  ///
  /// # Safety
  ///
  /// `at` must point to [`FOOTPRINT`] writable bytes owned by the allocator.
  #[inline]
  pub unsafe fn store(
    at: NonNull<Header>,
    header: Header,
  ) {
    unsafe { at.as_ptr().write_unaligned(header) }
  }

  /// Reads the header at `at`.
  ///
  /// # Safety
  ///
  /// `at` must point to a header previously written with [`Header::store`].
  #[inline]
  pub unsafe fn load(at: NonNull<Header>) -> Header {
    unsafe { at.as_ptr().read_unaligned() }
  }

  /// # Safety
  ///
  /// Same as [`Header::load`].
  #[inline]
  pub unsafe fn set_free(
    at: NonNull<Header>,
    is_free: bool,
  ) {
    unsafe { (&raw mut (*at.as_ptr()).is_free).write_unaligned(is_free) }
  }

  /// # Safety
  ///
  /// Same as [`Header::load`].
  #[inline]
  pub unsafe fn set_next(
    at: NonNull<Header>,
    next: Pointer<Header>,
  ) {
    unsafe { (&raw mut (*at.as_ptr()).next).write_unaligned(next) }
  }

  /// Address of the first payload byte after the header at `at`.
  ///
  /// # Safety
  ///
  /// `at` must be the start of a block carved by the allocator, so that the
  /// offset stays inside the same break region.
  #[inline]
  pub unsafe fn payload_of(at: NonNull<Header>) -> NonNull<u8> {
    unsafe { at.cast::<u8>().add(FOOTPRINT) }
  }

  /// Inverse of [`Header::payload_of`].
  ///
  /// # Safety
  ///
  /// `payload` must have been returned by the allocator's allocation path.
  /// Any other address yields a pointer to garbage, which is undefined
  /// behaviour once read.
  #[inline]
  pub unsafe fn from_payload(payload: NonNull<u8>) -> NonNull<Header> {
    unsafe { payload.sub(FOOTPRINT).cast() }
  }

  /// One past the last payload byte of the header at `at`.
  ///
  /// # Safety
  ///
  /// Same as [`Header::load`].
  #[inline]
  pub unsafe fn end_of(at: NonNull<Header>) -> usize {
    let header = unsafe { Header::load(at) };
    at.as_ptr() as usize + FOOTPRINT + header.size
  }
}
