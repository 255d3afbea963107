//! Thread-safe bounded FIFO queue that never blocks.
//!
//! A push into a full queue hands the item straight back and a pop from an
//! empty queue returns `None`, so producers on the request path are never
//! slowed down. Mutex poisoning is recovered transparently.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Returned by [`BoundedQueue::try_push`] at capacity; carries the rejected item.
#[derive(Debug, PartialEq, Eq)]
pub struct QueueFull<T>(pub T);

impl<T> fmt::Display for QueueFull<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("bounded queue is full")
    }
}

impl<T: fmt::Debug> std::error::Error for QueueFull<T> {}

struct Inner<T> {
    queue: VecDeque<T>,
    capacity: usize,
}

/// Bounded FIFO shared between clones.
///
/// ```
/// use paywire_common::collections::{BoundedQueue, QueueFull};
///
/// let queue = BoundedQueue::new(2);
/// queue.try_push(1).unwrap();
/// queue.try_push(2).unwrap();
/// assert_eq!(queue.try_push(3), Err(QueueFull(3)));
///
/// assert_eq!(queue.try_pop(), Some(1));
/// assert_eq!(queue.try_pop(), Some(2));
/// assert_eq!(queue.try_pop(), None);
/// ```
pub struct BoundedQueue<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for BoundedQueue<T> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<T> fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.lock();
        f.debug_struct("BoundedQueue")
            .field("len", &guard.queue.len())
            .field("capacity", &guard.capacity)
            .finish()
    }
}

impl<T> BoundedQueue<T> {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "BoundedQueue capacity must be greater than zero");
        Self {
            inner: Arc::new(Mutex::new(Inner { queue: VecDeque::with_capacity(capacity), capacity })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pushes an element if there is room, otherwise returns it.
    ///
    /// # Errors
    /// [`QueueFull`] holding `item` when the queue is at capacity.
    pub fn try_push(&self, item: T) -> Result<(), QueueFull<T>> {
        let mut guard = self.lock();
        if guard.queue.len() >= guard.capacity {
            return Err(QueueFull(item));
        }
        guard.queue.push_back(item);
        Ok(())
    }

    /// Pops the oldest element, if any.
    #[must_use]
    pub fn try_pop(&self) -> Option<T> {
        self.lock().queue.pop_front()
    }
}
