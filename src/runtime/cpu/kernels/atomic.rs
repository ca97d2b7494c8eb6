//! Host floating-point atomic adds
//!
//! `f32` and `f64` use compare-and-swap on their bit patterns. `f16` has no
//! 2-byte atomic, so it is updated through the aligned 4-byte word holding
//! it: the half is extracted with [`byte_perm`], summed in `f32`, packed back,
//! and the word is swapped in, retrying until no other writer intervened.

use half::f16;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Select four bytes out of the eight bytes of `x` (bytes 0-3) and `y`
/// (bytes 4-7)
///
/// Byte `n` of the result is the input byte numbered by the low three bits
/// of nibble `n` of `selector`. Bytes are numbered little-endian, matching
/// the device intrinsic of the same name.
///
/// # Example
///
/// ```
/// use subtensor::runtime::cpu::byte_perm;
/// assert_eq!(byte_perm(0x4433_2211, 0, 0x4432), 0x0000_4433);
/// assert_eq!(byte_perm(0x4433_2211, 0xBBAA, 0x5410), 0xBBAA_2211);
/// ```
#[inline]
pub fn byte_perm(x: u32, y: u32, selector: u32) -> u32 {
    let bytes = ((y as u64) << 32) | x as u64;
    (0..4).fold(0u32, |acc, n| {
        let sel = (selector >> (4 * n)) & 0x7;
        let byte = ((bytes >> (8 * sel)) & 0xff) as u32;
        acc | (byte << (8 * n))
    })
}

/// Atomically add `val` to the half stored in one half of `word`
///
/// `high_half` selects the upper 16 bits of the word's value. Returns the
/// previous value of the half. The other half is rewritten with whatever
/// value it held, so concurrent updates to it are never lost either.
pub fn atomic_add_f16(word: &AtomicU32, high_half: bool, val: f16) -> f16 {
    let (extract, insert) = if high_half {
        (0x4432, 0x5410)
    } else {
        (0x4410, 0x3254)
    };

    let mut old = word.load(Ordering::Relaxed);
    loop {
        let current = f16::from_bits(byte_perm(old, 0, extract) as u16);
        let sum = f16::from_f32(current.to_f32() + val.to_f32()).to_bits() as u32;
        let new = byte_perm(old, sum, insert);
        match word.compare_exchange_weak(old, new, Ordering::AcqRel, Ordering::Relaxed) {
            Ok(_) => return current,
            Err(actual) => old = actual,
        }
    }
}

/// Atomically add `val` to the `f32` whose bits live in `cell`
pub fn atomic_add_f32(cell: &AtomicU32, val: f32) -> f32 {
    let mut old = cell.load(Ordering::Relaxed);
    loop {
        let current = f32::from_bits(old);
        let new = (current + val).to_bits();
        match cell.compare_exchange_weak(old, new, Ordering::AcqRel, Ordering::Relaxed) {
            Ok(_) => return current,
            Err(actual) => old = actual,
        }
    }
}

/// Atomically add `val` to the `f64` whose bits live in `cell`
pub fn atomic_add_f64(cell: &AtomicU64, val: f64) -> f64 {
    let mut old = cell.load(Ordering::Relaxed);
    loop {
        let current = f64::from_bits(old);
        let new = (current + val).to_bits();
        match cell.compare_exchange_weak(old, new, Ordering::AcqRel, Ordering::Relaxed) {
            Ok(_) => return current,
            Err(actual) => old = actual,
        }
    }
}

/// Element types with a host atomic add
pub trait AtomicAddElement: crate::dtype::Element {
    /// Atomically add `val` to `*ptr`
    ///
    /// # Safety
    /// `ptr` must be valid and aligned for `Self`, and every concurrent
    /// access to it must go through this function. For 2-byte types the
    /// containing aligned 4-byte word must be valid as well.
    unsafe fn atomic_add(ptr: *mut Self, val: Self);
}

impl AtomicAddElement for f32 {
    #[inline]
    unsafe fn atomic_add(ptr: *mut Self, val: Self) {
        atomic_add_f32(unsafe { AtomicU32::from_ptr(ptr.cast()) }, val);
    }
}

impl AtomicAddElement for f64 {
    #[inline]
    unsafe fn atomic_add(ptr: *mut Self, val: Self) {
        atomic_add_f64(unsafe { AtomicU64::from_ptr(ptr.cast()) }, val);
    }
}

impl AtomicAddElement for f16 {
    #[inline]
    unsafe fn atomic_add(ptr: *mut Self, val: Self) {
        let addr = ptr as usize;
        let base = (addr & !3) as *mut u32;
        // The half at the higher address is the high half of the word's
        // value on little-endian hosts and the low half on big-endian ones
        let high_half = (addr & 2 != 0) != cfg!(target_endian = "big");
        atomic_add_f16(unsafe { AtomicU32::from_ptr(base) }, high_half, val);
    }
}
