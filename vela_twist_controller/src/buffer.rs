//! Single-slot latest-value command buffer.
//!
//! Hands the most recent command from the non-real-time arrival context to
//! the periodic update context. Seqlock versioning: the version counter is
//! odd while a write is in progress and even when the cell is stable; the
//! reader validates version-before == version-after over a byte copy and
//! retries a bounded number of times. Neither side blocks the other.
//!
//! Multiple writes between two reads collapse to the latest value; there is
//! no queue and no history.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{fence, AtomicBool, AtomicU64, Ordering};

/// Bounded reader retries under version conflict.
const MAX_READ_RETRIES: usize = 10;

/// Latest-value handoff cell between one writer and one reader context.
///
/// `write` is expected to be called from a single arrival context per buffer
/// (one subscription → one buffer); a second writer serializes on the version
/// counter instead of racing, so a misbehaving transport degrades to brief
/// spinning rather than a torn cell.
pub struct CommandBuffer<T: Copy> {
    /// Seqlock version: even = stable, odd = write in progress.
    version: AtomicU64,
    /// Whether the cell holds a value (cleared on lifecycle transitions).
    filled: AtomicBool,
    cell: UnsafeCell<MaybeUninit<T>>,
}

// SAFETY: all access to `cell` is mediated by the seqlock protocol below;
// readers discard any snapshot taken while the version moved.
unsafe impl<T: Copy + Send> Send for CommandBuffer<T> {}
unsafe impl<T: Copy + Send> Sync for CommandBuffer<T> {}

impl<T: Copy> CommandBuffer<T> {
    /// Create an empty buffer.
    pub const fn new() -> Self {
        Self {
            version: AtomicU64::new(0),
            filled: AtomicBool::new(false),
            cell: UnsafeCell::new(MaybeUninit::uninit()),
        }
    }

    /// Replace the current latest value.
    ///
    /// Never fails and never blocks the reader.
    pub fn write(&self, value: T) {
        let begin = self.begin_write();

        // SAFETY: the odd version claimed in begin_write() excludes other
        // writers; readers validate the version around their copy.
        unsafe {
            (*self.cell.get()).write(value);
        }
        self.filled.store(true, Ordering::Release);

        self.end_write(begin);
    }

    /// Reset the buffer to empty.
    ///
    /// Used on lifecycle transitions so a command received while inactive is
    /// not replayed after (re)activation.
    pub fn clear(&self) {
        let begin = self.begin_write();
        self.filled.store(false, Ordering::Release);
        self.end_write(begin);
    }

    /// Snapshot the latest value without consuming it.
    ///
    /// Returns `None` if no value was ever written, the buffer was cleared,
    /// or a consistent snapshot could not be taken within the retry bound
    /// (treated as "no data", the safe direction for a command relay).
    pub fn read(&self) -> Option<T> {
        for _ in 0..MAX_READ_RETRIES {
            let before = self.version.load(Ordering::Acquire);

            // Skip if a write is in progress (odd version).
            if before & 1 == 1 {
                core::hint::spin_loop();
                continue;
            }

            fence(Ordering::Acquire);

            let filled = self.filled.load(Ordering::Acquire);
            let mut snapshot = MaybeUninit::<T>::uninit();
            // Copy out the raw cell bytes; validity is decided by the version
            // check below, exactly as with a shared-memory segment read.
            unsafe {
                std::ptr::copy_nonoverlapping(
                    self.cell.get() as *const u8,
                    snapshot.as_mut_ptr() as *mut u8,
                    core::mem::size_of::<T>(),
                );
            }

            fence(Ordering::Acquire);

            let after = self.version.load(Ordering::Acquire);
            if before == after {
                if !filled {
                    return None;
                }
                // SAFETY: version unchanged across the copy, and `filled` was
                // observed inside the same stable window, so the bytes are a
                // completed write of T.
                return Some(unsafe { snapshot.assume_init() });
            }

            core::hint::spin_loop();
        }

        // Persistent version conflict; report no data rather than stall.
        None
    }

    /// Whether the buffer currently holds no value.
    pub fn is_empty(&self) -> bool {
        !self.filled.load(Ordering::Acquire)
    }

    /// Claim the write lock by moving the version to odd.
    fn begin_write(&self) -> u64 {
        loop {
            let v = self.version.load(Ordering::Acquire);
            if v & 1 == 0
                && self
                    .version
                    .compare_exchange_weak(v, v + 1, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
            {
                fence(Ordering::Release);
                return v;
            }
            core::hint::spin_loop();
        }
    }

    /// Publish the write by moving the version to the next even value.
    fn end_write(&self, begin: u64) {
        fence(Ordering::Release);
        self.version.store(begin + 2, Ordering::Release);
    }
}

impl<T: Copy> Default for CommandBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────
