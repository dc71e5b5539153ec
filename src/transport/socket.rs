//! # Datagram Socket Interface
//!
//! The packet reader talks to the network through [`DatagramSocket`], a
//! callback-style receive interface: a read either completes immediately or
//! reports [`ReadStatus::Pending`] and later fires its completion callback.
//!
//! ## Contract
//! - A socket never invokes the callback from inside [`DatagramSocket::read`];
//!   an immediate result is returned as [`ReadStatus::Complete`].
//! - `Ok(0)` means the peer closed the connection.
//! - Completed reads write their datagram to the front of the supplied buffer.
//! - [`DatagramSocket::cancel_read`] stops any background wait, so a closed
//!   reader never takes a datagram off the socket.

use crate::core::buffer::ReadBuffer;
use std::io;
use std::net::SocketAddr;

/// Outcome of a single receive: number of bytes written to the buffer
pub type ReadResult = io::Result<usize>;

/// Completion callback for a read that returned [`ReadStatus::Pending`]
pub type ReadCallback = Box<dyn FnOnce(ReadResult) + 'static>;

/// Immediate status of a read request
#[derive(Debug)]
pub enum ReadStatus {
    /// The read finished synchronously; the callback will not be called
    Complete(ReadResult),
    /// The read is outstanding; the callback fires once it finishes
    Pending,
}

/// An already-connected datagram socket
pub trait DatagramSocket {
    /// Receive one datagram into `buffer`.
    fn read(&self, buffer: &ReadBuffer, callback: ReadCallback) -> ReadStatus;

    /// Abandon an outstanding read so it neither fires its callback nor
    /// consumes a datagram. Sockets without background work need not override.
    fn cancel_read(&self) {}

    /// Local address the socket is bound to
    fn local_addr(&self) -> io::Result<SocketAddr>;

    /// Address of the connected peer
    fn peer_addr(&self) -> io::Result<SocketAddr>;
}
