//! Specialized data structures
//!
//! - **[`bounded_queue`]**: non-blocking bounded FIFO with drop-on-full
//!   backpressure
//!
//! ## Usage
//!
//! ```rust
//! use paywire_common::collections::BoundedQueue;
//!
//! let queue = BoundedQueue::new(16);
//! assert!(queue.try_push(42).is_ok());
//! assert_eq!(queue.try_pop(), Some(42));
//! ```

pub mod bounded_queue;

// Re-export commonly used types
pub use bounded_queue::{BoundedQueue, QueueFull};
