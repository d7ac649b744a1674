//! Fixed-slot overwrite ring shared by byte and typed topics
//!
//! Cursors are absolute publish counts: the write cursor equals the latest
//! committed epoch and the read cursor counts entries consumed or overwritten.
//! Epoch `e` lives in slot `(e - 1) % capacity`.
//!
//! Each slot has a stamp used seqlock-style:
//! - `2e - 1` while epoch `e` is being written
//! - `2e` once payload and header for epoch `e` are committed
//!
//! Writers serialise through a short per-ring lock. Readers never lock: they
//! copy the slot, re-check its stamp and claim entries with a CAS on the read
//! cursor.

use std::{
    alloc::Layout,
    ptr::{self, NonNull},
    sync::{
        atomic::{fence, AtomicU64, Ordering},
        Mutex, PoisonError,
    },
};

use crate::error::{BusError, Result};

use super::layout::{SlotHeader, SlotLayout, MAX_HEADER_SIZE};

/// Result of a successful publish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Epoch assigned to the message
    pub epoch: u64,
    /// Unread entries dropped to make room
    pub overwritten: u64,
}

/// A message copied out of the ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Received {
    /// Payload bytes written to the destination buffer
    pub len: usize,
    /// Epoch the message was published with
    pub epoch: u64,
}

#[inline]
fn writing_stamp(epoch: u64) -> u64 {
    epoch * 2 - 1
}

#[inline]
fn committed_stamp(epoch: u64) -> u64 {
    epoch * 2
}

/// Lossy multi-producer multi-consumer ring of fixed-size slots
pub struct SlotRing<L: SlotLayout> {
    /// Header shape and payload contract
    layout: L,
    /// Number of slots
    capacity: usize,
    /// Bytes per slot (header + payload region)
    slot_size: usize,
    /// Slot storage, `capacity * slot_size` bytes
    storage: NonNull<u8>,
    /// Allocation layout of `storage`
    storage_layout: Layout,
    /// Per-slot seqlock stamps
    stamps: Box<[AtomicU64]>,
    /// Latest committed epoch
    write_cursor: AtomicU64,
    /// Entries consumed or overwritten so far
    read_cursor: AtomicU64,
    /// Serialises slot acquisition and commit between writers
    writer: Mutex<()>,
}

impl<L: SlotLayout> SlotRing<L> {
    /// Create a ring with `capacity` slots
    pub fn new(capacity: usize, layout: L) -> Result<Self> {
        if capacity == 0 {
            return Err(BusError::invalid_parameter(
                "capacity",
                "Capacity must be greater than 0",
            ));
        }

        let slot_size = layout.slot_size();
        let total = capacity
            .checked_mul(slot_size)
            .ok_or_else(|| BusError::allocation("Ring size overflows usize"))?;

        let storage_layout = Layout::array::<u8>(total)
            .map_err(|_| BusError::allocation("Failed to create layout for slot ring"))?;

        let storage = unsafe {
            let ptr = std::alloc::alloc_zeroed(storage_layout);
            NonNull::new(ptr).ok_or_else(|| BusError::allocation("Failed to allocate slot ring"))?
        };

        let stamps = (0..capacity).map(|_| AtomicU64::new(0)).collect();

        Ok(Self {
            layout,
            capacity,
            slot_size,
            storage,
            storage_layout,
            stamps,
            write_cursor: AtomicU64::new(0),
            read_cursor: AtomicU64::new(0),
            writer: Mutex::new(()),
        })
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes per slot
    pub fn slot_size(&self) -> usize {
        self.slot_size
    }

    /// Layout this ring was built with
    pub fn layout(&self) -> &L {
        &self.layout
    }

    /// Latest committed epoch, 0 if never published
    pub fn latest_epoch(&self) -> u64 {
        self.write_cursor.load(Ordering::Acquire)
    }

    /// Unread entries, bounded by capacity
    pub fn len(&self) -> usize {
        let read = self.read_cursor.load(Ordering::Acquire);
        let write = self.write_cursor.load(Ordering::Acquire);
        (write.saturating_sub(read) as usize).min(self.capacity)
    }

    /// Whether no unread entries remain
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the next publish will overwrite an unread entry
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity
    }

    #[inline]
    fn slot_index(&self, epoch: u64) -> usize {
        ((epoch - 1) % self.capacity as u64) as usize
    }

    #[inline]
    unsafe fn slot_ptr(&self, index: usize) -> *mut u8 {
        self.storage.as_ptr().add(index * self.slot_size)
    }

    /// Publish a payload, overwriting the oldest unread entry when full
    pub fn publish(&self, payload: &[u8]) -> Result<PublishOutcome> {
        self.layout.check_publish(payload.len())?;

        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        let epoch = self.write_cursor.load(Ordering::Relaxed) + 1;
        let overwritten = self.evict_for(epoch);

        let index = self.slot_index(epoch);
        let stamp = &self.stamps[index];
        let header = self.layout.header(epoch, payload.len());

        stamp.store(writing_stamp(epoch), Ordering::Relaxed);
        fence(Ordering::Release);

        // SAFETY: the writer lock gives exclusive write access to the slot; readers
        // copying it concurrently discard their copy once they see the stamp change.
        unsafe {
            let slot = self.slot_ptr(index);
            ptr::copy_nonoverlapping(payload.as_ptr(), slot.add(L::Header::SIZE), payload.len());

            let mut raw = [0u8; MAX_HEADER_SIZE];
            header.encode(&mut raw[..L::Header::SIZE]);
            ptr::copy_nonoverlapping(raw.as_ptr(), slot, L::Header::SIZE);
        }

        stamp.store(committed_stamp(epoch), Ordering::Release);
        self.write_cursor.store(epoch, Ordering::Release);

        Ok(PublishOutcome { epoch, overwritten })
    }

    /// Advance the read cursor so that `epoch` fits, returning dropped entries
    fn evict_for(&self, epoch: u64) -> u64 {
        let capacity = self.capacity as u64;
        let mut read = self.read_cursor.load(Ordering::Acquire);

        loop {
            if epoch - read <= capacity {
                return 0;
            }

            let oldest_kept = epoch - capacity;
            match self.read_cursor.compare_exchange_weak(
                read,
                oldest_kept,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return oldest_kept - read,
                Err(current) => read = current,
            }
        }
    }

    /// Copy the committed slot of `epoch` into `out`
    ///
    /// `Ok(None)` means the slot changed underneath the reader and the caller
    /// must retry with fresh cursors.
    fn read_slot(&self, epoch: u64, out: &mut [u8]) -> Result<Option<usize>> {
        let index = self.slot_index(epoch);
        let stamp = &self.stamps[index];
        let expected = committed_stamp(epoch);

        if stamp.load(Ordering::Acquire) != expected {
            return Ok(None);
        }

        let header = unsafe {
            let mut raw = [0u8; MAX_HEADER_SIZE];
            ptr::copy_nonoverlapping(self.slot_ptr(index), raw.as_mut_ptr(), L::Header::SIZE);
            L::Header::decode(&raw[..L::Header::SIZE])
        };
        let len = self.layout.payload_len(&header);

        if len > out.len() {
            // Only report the size if it belongs to a stable slot
            fence(Ordering::Acquire);
            if stamp.load(Ordering::Relaxed) != expected {
                return Ok(None);
            }
            return Err(BusError::buffer_too_small(len, out.len()));
        }

        // SAFETY: `len` is clamped to the payload region by the layout and checked
        // against `out`; a concurrent overwrite is detected by the stamp re-check.
        unsafe {
            ptr::copy_nonoverlapping(
                self.slot_ptr(index).add(L::Header::SIZE),
                out.as_mut_ptr(),
                len,
            );
        }

        fence(Ordering::Acquire);
        if stamp.load(Ordering::Relaxed) != expected {
            return Ok(None);
        }

        debug_assert_eq!(header.epoch(), epoch);
        Ok(Some(len))
    }

    /// Consume the oldest unread entry
    ///
    /// Returns `Ok(None)` immediately when nothing is unread. On
    /// `BufferTooSmall` the entry stays in the ring.
    pub fn try_receive(&self, out: &mut [u8]) -> Result<Option<Received>> {
        self.layout.check_buffer(out.len())?;

        loop {
            let read = self.read_cursor.load(Ordering::Acquire);
            let write = self.write_cursor.load(Ordering::Acquire);
            if read >= write {
                return Ok(None);
            }

            let epoch = read + 1;
            let len = match self.read_slot(epoch, out)? {
                Some(len) => len,
                None => continue,
            };

            // Lost to another consumer or to an overwrite: the copy is stale
            if self
                .read_cursor
                .compare_exchange(read, epoch, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return Ok(Some(Received { len, epoch }));
            }
        }
    }

    /// Copy the most recently committed entry without consuming anything
    pub fn peek_latest(&self, out: &mut [u8]) -> Result<Option<Received>> {
        self.layout.check_buffer(out.len())?;

        loop {
            let epoch = self.write_cursor.load(Ordering::Acquire);
            if epoch == 0 {
                return Ok(None);
            }

            if let Some(len) = self.read_slot(epoch, out)? {
                return Ok(Some(Received { len, epoch }));
            }
        }
    }

    /// Copy the oldest unread entry without consuming it
    pub fn peek_oldest(&self, out: &mut [u8]) -> Result<Option<Received>> {
        self.layout.check_buffer(out.len())?;

        loop {
            let read = self.read_cursor.load(Ordering::Acquire);
            let write = self.write_cursor.load(Ordering::Acquire);
            if read >= write {
                return Ok(None);
            }

            let epoch = read + 1;
            if let Some(len) = self.read_slot(epoch, out)? {
                return Ok(Some(Received { len, epoch }));
            }
        }
    }

    /// Raw bytes of the slot holding `epoch`, header included
    ///
    /// `None` if that epoch is not (or no longer) committed in the ring.
    pub fn raw_slot(&self, epoch: u64) -> Option<Vec<u8>> {
        if epoch == 0 || epoch > self.latest_epoch() {
            return None;
        }

        let index = self.slot_index(epoch);
        let stamp = &self.stamps[index];
        let expected = committed_stamp(epoch);
        if stamp.load(Ordering::Acquire) != expected {
            return None;
        }

        let mut raw = vec![0u8; self.slot_size];
        unsafe {
            ptr::copy_nonoverlapping(self.slot_ptr(index), raw.as_mut_ptr(), self.slot_size);
        }

        fence(Ordering::Acquire);
        (stamp.load(Ordering::Relaxed) == expected).then_some(raw)
    }
}

impl<L: SlotLayout> std::fmt::Debug for SlotRing<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlotRing")
            .field("layout", &self.layout)
            .field("capacity", &self.capacity)
            .field("slot_size", &self.slot_size)
            .field("write_cursor", &self.write_cursor.load(Ordering::Relaxed))
            .field("read_cursor", &self.read_cursor.load(Ordering::Relaxed))
            .finish()
    }
}

impl<L: SlotLayout> Drop for SlotRing<L> {
    fn drop(&mut self) {
        unsafe {
            std::alloc::dealloc(self.storage.as_ptr(), self.storage_layout);
        }
    }
}

unsafe impl<L: SlotLayout> Send for SlotRing<L> {}
unsafe impl<L: SlotLayout> Sync for SlotRing<L> {}
