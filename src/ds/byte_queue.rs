//! FIFO byte arena with stable handles.
//!
//! Stores variable-length blobs back to back in one contiguous buffer, each
//! framed by a 4-byte little-endian length header. Every push returns the
//! blob's byte offset as a *handle* that stays valid until the blob is
//! popped, across wraps and growths alike.
//!
//! ## Architecture
//!
//! ```text
//!   Linear geometry (tail ≥ head):
//!
//!   0   1=left margin      head                    tail == right_margin
//!   ┌───┬─────────────────┬───────────────────────┬──────────────────┐
//!   │ / │   popped space  │ [len|blob][len|blob]… │    free          │
//!   └───┴─────────────────┴───────────────────────┴──────────────────┘
//!
//!   Wrapped geometry (tail < head):
//!
//!   0   1            tail          head        right_margin  capacity
//!   ┌───┬────────────┬─────────────┬────────────┬────────────┐
//!   │ / │ [len|blob]…│    free     │ [len|blob]…│  unused    │
//!   └───┴────────────┴─────────────┴────────────┴────────────┘
//!     newer entries                  older entries
//! ```
//!
//! Index 0 is never written: handle zero stays free to mean "absent" in any
//! map that stores handles.
//!
//! ## Growth
//!
//! When neither the space after the tail nor the recycled space before the
//! head fits a push, the buffer doubles. Bytes `[0, right_margin)` are copied
//! as-is, which is what keeps every live handle valid. If the queue was
//! wrapped, the free gap between tail and head is stamped with one synthetic
//! *filler* blob so the live region reads as a single linear run again;
//! subsequent pops traverse the filler like any other entry. Its payload is
//! all zeroes, so consumers that embed identity in their blobs observe a
//! zero hash and skip it.
//!
//! ## Thread Safety
//!
//! Not synchronized. Callers wrap the queue in their own lock.
//!
//! ## Example Usage
//!
//! ```
//! use bytecache::ds::ByteQueue;
//!
//! let mut queue = ByteQueue::new(64, false);
//!
//! let first = queue.push(b"alpha");
//! let second = queue.push(b"beta");
//! assert!(first > 0);
//!
//! // Handles read back their blob until it is popped
//! assert_eq!(queue.get(first).unwrap(), b"alpha");
//! assert_eq!(queue.get(second).unwrap(), b"beta");
//!
//! // FIFO removal
//! assert_eq!(queue.pop().unwrap(), b"alpha");
//! assert_eq!(queue.len(), 1);
//! ```

use std::time::Instant;

use crate::error::QueueError;

/// Bytes used for the blob length header.
pub(crate) const HEADER_SIZE: usize = 4;

/// Lowest valid handle. Index 0 is reserved so that handle zero can mean
/// "no entry" to callers that store handles in maps.
pub(crate) const LEFT_MARGIN: usize = 1;

/// Smallest gap worth wrapping into. Leaves room for the filler blob header
/// plus a payload large enough that entry-format consumers can still read
/// their fixed prefix out of a filler.
const MINIMUM_EMPTY_BLOB_SIZE: usize = 32 + HEADER_SIZE;

/// Contiguous-buffer FIFO of length-framed byte blobs.
///
/// See the [module docs](self) for the geometry and growth rules.
#[derive(Debug)]
pub struct ByteQueue {
    buf: Vec<u8>,
    head: usize,
    tail: usize,
    right_margin: usize,
    count: usize,
    verbose: bool,
}

impl ByteQueue {
    /// Creates a queue backed by `initial_capacity` bytes.
    ///
    /// When `verbose` is set, growth emits a `tracing` debug event with the
    /// new capacity and the time the reallocation took.
    pub fn new(initial_capacity: usize, verbose: bool) -> Self {
        Self {
            buf: vec![0; initial_capacity],
            head: LEFT_MARGIN,
            tail: LEFT_MARGIN,
            right_margin: LEFT_MARGIN,
            count: 0,
            verbose,
        }
    }

    /// Appends `data` as a new blob and returns its handle.
    ///
    /// Wraps the tail back to the left margin when the recycled space before
    /// the head fits the blob; otherwise grows the buffer. Handles returned
    /// by previous pushes stay valid either way.
    pub fn push(&mut self, data: &[u8]) -> usize {
        let required = data.len() + HEADER_SIZE;

        if self.available_after_tail() < required {
            if self.available_before_head() >= required {
                self.tail = LEFT_MARGIN;
            } else {
                self.grow(required);
            }
        }

        let index = self.tail;
        self.append(data);
        index
    }

    /// Removes and returns the oldest blob.
    ///
    /// The returned slice borrows the queue; copy it out before the next
    /// mutating call if it must outlive one.
    pub fn pop(&mut self) -> Result<&[u8], QueueError> {
        if self.count == 0 {
            return Err(QueueError::Empty);
        }

        let index = self.head;
        let len = self.blob_len(index);

        self.head += HEADER_SIZE + len;
        self.count -= 1;

        if self.head == self.right_margin {
            self.head = LEFT_MARGIN;
            if self.tail == self.right_margin {
                self.tail = LEFT_MARGIN;
            }
            self.right_margin = self.tail;
        }

        Ok(&self.buf[index + HEADER_SIZE..index + HEADER_SIZE + len])
    }

    /// Returns the oldest blob without removing it.
    pub fn peek(&self) -> Result<&[u8], QueueError> {
        if self.count == 0 {
            return Err(QueueError::Empty);
        }
        let len = self.blob_len(self.head);
        Ok(&self.buf[self.head + HEADER_SIZE..self.head + HEADER_SIZE + len])
    }

    /// Returns the blob at `handle`.
    ///
    /// Handles come from [`push`](Self::push). Besides rejecting handles
    /// below the left margin, the framed blob must lie entirely inside
    /// `[left_margin, right_margin)`; anything else returns
    /// [`QueueError::InvalidIndex`] rather than reading stale bytes.
    pub fn get(&self, handle: usize) -> Result<&[u8], QueueError> {
        let (start, end) = self.blob_bounds(handle)?;
        Ok(&self.buf[start..end])
    }

    /// Mutable variant of [`get`](Self::get), for callers that patch a blob
    /// in place (e.g. tombstoning an identity field).
    pub fn get_mut(&mut self, handle: usize) -> Result<&mut [u8], QueueError> {
        let (start, end) = self.blob_bounds(handle)?;
        Ok(&mut self.buf[start..end])
    }

    /// Drops all blobs. The backing buffer is retained.
    pub fn clear(&mut self) {
        self.head = LEFT_MARGIN;
        self.tail = LEFT_MARGIN;
        self.right_margin = LEFT_MARGIN;
        self.count = 0;
    }

    /// Returns the size of the backing buffer in bytes.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Returns the number of live blobs, fillers included.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns `true` if the queue holds no blobs.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn append(&mut self, data: &[u8]) {
        let len = data.len();
        self.buf[self.tail..self.tail + HEADER_SIZE]
            .copy_from_slice(&(len as u32).to_le_bytes());
        self.buf[self.tail + HEADER_SIZE..self.tail + HEADER_SIZE + len].copy_from_slice(data);

        self.tail += HEADER_SIZE + len;
        if self.tail > self.head {
            self.right_margin = self.tail;
        }
        self.count += 1;
    }

    fn grow(&mut self, minimum: usize) {
        let started = self.verbose.then(Instant::now);

        let mut new_capacity = self.capacity();
        if new_capacity < minimum {
            new_capacity += minimum;
        }
        new_capacity *= 2;

        let mut new_buf = vec![0; new_capacity];
        if self.right_margin != LEFT_MARGIN {
            new_buf[..self.right_margin].copy_from_slice(&self.buf[..self.right_margin]);
        }
        self.buf = new_buf;

        if self.tail < self.head {
            // Stamp the free gap with one filler blob so the live region is
            // linear again. Offsets below right_margin are untouched, which
            // is what keeps existing handles valid.
            let filler_len = self.head - self.tail - HEADER_SIZE;
            self.append(&vec![0; filler_len]);
            self.head = LEFT_MARGIN;
            self.tail = self.right_margin;
        }

        if let Some(started) = started {
            tracing::debug!(
                capacity = new_capacity,
                elapsed_us = started.elapsed().as_micros() as u64,
                "grew byte queue"
            );
        }
    }

    fn blob_len(&self, index: usize) -> usize {
        let mut len_bytes = [0u8; HEADER_SIZE];
        len_bytes.copy_from_slice(&self.buf[index..index + HEADER_SIZE]);
        u32::from_le_bytes(len_bytes) as usize
    }

    fn blob_bounds(&self, index: usize) -> Result<(usize, usize), QueueError> {
        if index < LEFT_MARGIN || index + HEADER_SIZE > self.right_margin {
            return Err(QueueError::InvalidIndex);
        }
        let end = index + HEADER_SIZE + self.blob_len(index);
        if end > self.right_margin {
            return Err(QueueError::InvalidIndex);
        }
        Ok((index + HEADER_SIZE, end))
    }

    fn available_after_tail(&self) -> usize {
        if self.tail >= self.head {
            self.capacity().saturating_sub(self.tail)
        } else {
            (self.head - self.tail).saturating_sub(MINIMUM_EMPTY_BLOB_SIZE)
        }
    }

    fn available_before_head(&self) -> usize {
        if self.tail >= self.head {
            (self.head - LEFT_MARGIN).saturating_sub(MINIMUM_EMPTY_BLOB_SIZE)
        } else {
            (self.head - self.tail).saturating_sub(MINIMUM_EMPTY_BLOB_SIZE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop_fifo_order() {
        let mut queue = ByteQueue::new(128, false);
        queue.push(b"one");
        queue.push(b"two");
        queue.push(b"three");
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.pop().unwrap(), b"one");
        assert_eq!(queue.pop().unwrap(), b"two");
        assert_eq!(queue.pop().unwrap(), b"three");
        assert_eq!(queue.pop(), Err(QueueError::Empty));
        assert!(queue.is_empty());
    }

    #[test]
    fn handles_start_at_left_margin() {
        let mut queue = ByteQueue::new(64, false);
        let handle = queue.push(b"first");
        assert_eq!(handle, LEFT_MARGIN);
    }

    #[test]
    fn peek_does_not_advance() {
        let mut queue = ByteQueue::new(64, false);
        queue.push(b"only");
        assert_eq!(queue.peek().unwrap(), b"only");
        assert_eq!(queue.peek().unwrap(), b"only");
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn peek_and_pop_on_empty_fail() {
        let mut queue = ByteQueue::new(16, false);
        assert_eq!(queue.peek(), Err(QueueError::Empty));
        assert_eq!(queue.pop(), Err(QueueError::Empty));
    }

    #[test]
    fn get_rejects_handle_zero() {
        let mut queue = ByteQueue::new(64, false);
        queue.push(b"data");
        assert_eq!(queue.get(0), Err(QueueError::InvalidIndex));
    }

    #[test]
    fn get_rejects_out_of_range_handles() {
        let mut queue = ByteQueue::new(64, false);
        let handle = queue.push(b"data");
        assert!(queue.get(handle).is_ok());
        assert_eq!(queue.get(queue.right_margin), Err(QueueError::InvalidIndex));
        assert_eq!(queue.get(queue.capacity() + 10), Err(QueueError::InvalidIndex));
    }

    #[test]
    fn get_mut_allows_in_place_patching() {
        let mut queue = ByteQueue::new(64, false);
        let handle = queue.push(b"abc");
        queue.get_mut(handle).unwrap()[0] = b'x';
        assert_eq!(queue.get(handle).unwrap(), b"xbc");
    }

    #[test]
    fn tail_wraps_into_recycled_space() {
        // Lay out [A: 70][B: 20], pop A, then push C into the reclaimed
        // front. C lands at the left margin while B keeps its handle.
        let mut queue = ByteQueue::new(100, false);
        let a = vec![b'a'; 70];
        let b = vec![b'b'; 20];
        let c = vec![b'c'; 20];

        queue.push(&a);
        let b_handle = queue.push(&b);
        assert_eq!(queue.pop().unwrap(), &a[..]);

        let c_handle = queue.push(&c);
        assert_eq!(c_handle, LEFT_MARGIN);
        assert_eq!(queue.capacity(), 100);

        assert_eq!(queue.get(b_handle).unwrap(), &b[..]);
        assert_eq!(queue.get(c_handle).unwrap(), &c[..]);

        // FIFO order holds across the wrap.
        assert_eq!(queue.pop().unwrap(), &b[..]);
        assert_eq!(queue.pop().unwrap(), &c[..]);
    }

    #[test]
    fn growth_preserves_handles_when_linear() {
        let mut queue = ByteQueue::new(1, false);
        let mut handles = Vec::new();
        let mut payloads = Vec::new();

        for i in 0..100usize {
            let payload = vec![i as u8; i + 1];
            handles.push(queue.push(&payload));
            payloads.push(payload);
        }

        for (handle, payload) in handles.iter().zip(&payloads) {
            assert_eq!(queue.get(*handle).unwrap(), &payload[..]);
        }
        assert!(queue.capacity() > 1);
    }

    #[test]
    fn growth_from_wrapped_inserts_filler() {
        // Build the wrapped state [C: 1..25)(free)[B: 75..99) with head at
        // B, then force a growth. The gap becomes a 46-byte zero filler and
        // pops traverse: C, filler, B, D.
        let mut queue = ByteQueue::new(100, false);
        let a = vec![b'a'; 70];
        let b = vec![b'b'; 20];
        let c = vec![b'c'; 20];
        let d = vec![b'd'; 60];

        queue.push(&a);
        let b_handle = queue.push(&b);
        queue.pop().unwrap();
        let c_handle = queue.push(&c);
        assert_eq!(queue.len(), 2);

        let d_handle = queue.push(&d);
        assert_eq!(queue.capacity(), 200);
        assert_eq!(queue.len(), 4);

        assert_eq!(queue.get(b_handle).unwrap(), &b[..]);
        assert_eq!(queue.get(c_handle).unwrap(), &c[..]);
        assert_eq!(queue.get(d_handle).unwrap(), &d[..]);

        assert_eq!(queue.pop().unwrap(), &c[..]);
        let filler = queue.pop().unwrap().to_vec();
        assert_eq!(filler, vec![0u8; 46]);
        assert_eq!(queue.pop().unwrap(), &b[..]);
        assert_eq!(queue.pop().unwrap(), &d[..]);
        assert_eq!(queue.pop(), Err(QueueError::Empty));
    }

    #[test]
    fn growth_accounts_for_oversized_payloads() {
        let mut queue = ByteQueue::new(10, false);
        let big = vec![b'x'; 500];
        let handle = queue.push(&big);
        assert_eq!(queue.get(handle).unwrap(), &big[..]);
        assert!(queue.capacity() >= big.len() + HEADER_SIZE);
    }

    #[test]
    fn clear_resets_indices_and_retains_buffer() {
        let mut queue = ByteQueue::new(64, false);
        queue.push(b"entry");
        queue.push(b"entry2");

        queue.clear();

        assert_eq!(queue.len(), 0);
        assert_eq!(queue.capacity(), 64);
        assert_eq!(queue.pop(), Err(QueueError::Empty));

        // The queue is reusable after clear.
        let handle = queue.push(b"fresh");
        assert_eq!(handle, LEFT_MARGIN);
        assert_eq!(queue.get(handle).unwrap(), b"fresh");
    }

    #[test]
    fn capacity_never_shrinks() {
        let mut queue = ByteQueue::new(8, false);
        let mut last = queue.capacity();
        for i in 0..50usize {
            queue.push(&vec![b'z'; i * 3 + 1]);
            assert!(queue.capacity() >= last);
            last = queue.capacity();
        }
    }

    #[test]
    fn zero_capacity_queue_grows_on_first_push() {
        let mut queue = ByteQueue::new(0, false);
        let handle = queue.push(b"data");
        assert_eq!(handle, LEFT_MARGIN);
        assert_eq!(queue.get(handle).unwrap(), b"data");
    }
}
