//! # Receive Buffer
//!
//! A fixed-size byte buffer shared by reference count between the packet
//! reader and the socket that fills it.
//!
//! A socket that cannot complete a read immediately keeps a clone of the
//! buffer and writes into it once data arrives, after the reader's own stack
//! frame is gone. Sharing through `Rc<RefCell<_>>` lets both sides reach the
//! same allocation without copying each datagram.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

/// Single-threaded shared receive buffer
#[derive(Debug, Clone)]
pub struct ReadBuffer {
    inner: Rc<RefCell<Box<[u8]>>>,
}

impl ReadBuffer {
    /// Allocate a zeroed buffer of `size` bytes
    pub fn new(size: usize) -> Self {
        Self {
            inner: Rc::new(RefCell::new(vec![0u8; size].into_boxed_slice())),
        }
    }

    /// Capacity of the buffer in bytes
    pub fn len(&self) -> usize {
        self.inner.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow the buffer contents for reading
    ///
    /// # Panics
    /// Panics if the buffer is currently borrowed mutably.
    pub fn borrow(&self) -> Ref<'_, [u8]> {
        Ref::map(self.inner.borrow(), |bytes| &**bytes)
    }

    /// Borrow the buffer contents for writing
    ///
    /// # Panics
    /// Panics if the buffer is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, [u8]> {
        RefMut::map(self.inner.borrow_mut(), |bytes| &mut **bytes)
    }

    /// Copy `data` into the front of the buffer, truncating to capacity.
    ///
    /// Returns the number of bytes written.
    pub fn fill_from(&self, data: &[u8]) -> usize {
        let mut bytes = self.borrow_mut();
        let len = data.len().min(bytes.len());
        bytes[..len].copy_from_slice(&data[..len]);
        len
    }

    /// Whether two handles refer to the same allocation
    pub fn ptr_eq(&self, other: &ReadBuffer) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}
