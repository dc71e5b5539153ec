//! # Packet Reader
//!
//! Cooperative, back-pressure-aware receive loop for a connected datagram
//! socket.
//!
//! The reader keeps at most one receive outstanding. Reads that complete
//! synchronously are processed inline, but only up to a yield budget: after
//! `yield_after_packets` synchronous reads, or once `yield_after_duration` has
//! passed since the window started, the next result is posted to the task
//! runner instead. That bounds the call depth and hands the thread back to the
//! event loop even when the socket always has data queued.
//!
//! ## Flow
//! ```text
//! start_reading ──read──▶ Pending ─────────────▶ (socket callback) ─┐
//!       ▲                 Complete ─budget left─▶ process ──────────┤
//!       │                          └─exhausted──▶ post_task ────────┤
//!       └──────────────── on_read_complete ◀── process ◀────────────┘
//! ```
//!
//! ## Cancellation
//! Callbacks handed to the socket and the task runner hold only a weak
//! reference and the generation they were issued under. Dropping the reader or
//! calling [`PacketReader::close`] turns any late completion into a no-op.

use crate::config::ReaderConfig;
use crate::core::buffer::ReadBuffer;
use crate::core::packet::ReceivedPacket;
use crate::core::MAX_PACKET_SIZE;
use crate::error::{ProtocolError, Result};
use crate::runtime::{Clock, TaskRunner};
use crate::transport::socket::{DatagramSocket, ReadCallback, ReadResult, ReadStatus};
use crate::utils::metrics::global_metrics;
use std::cell::{Cell, RefCell};
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// Receiver of datagrams and read errors from a [`PacketReader`]
pub trait PacketVisitor {
    /// Called once when the socket fails or the peer closes the connection.
    /// The reader is unusable afterwards.
    fn on_read_error(&mut self, error: ProtocolError, socket: &dyn DatagramSocket);

    /// Called for every received datagram, in socket order.
    ///
    /// Return false to stop the loop without treating it as an error.
    fn on_packet(
        &mut self,
        packet: &ReceivedPacket<'_>,
        local_address: SocketAddr,
        peer_address: SocketAddr,
    ) -> bool;
}

/// Datagram receive loop bound to one socket and one visitor
pub struct PacketReader<S, V>
where
    S: DatagramSocket + 'static,
    V: PacketVisitor + 'static,
{
    inner: Rc<ReaderInner<S, V>>,
}

struct ReaderInner<S, V> {
    weak_self: Weak<ReaderInner<S, V>>,
    socket: Rc<S>,
    visitor: RefCell<V>,
    clock: Rc<dyn Clock>,
    task_runner: Rc<dyn TaskRunner>,
    read_buffer: ReadBuffer,
    yield_after_packets: usize,
    yield_after_duration: Duration,
    read_pending: Cell<bool>,
    num_packets_read: Cell<usize>,
    yield_after: Cell<Instant>,
    dispatching: Cell<bool>,
    closed: Cell<bool>,
    generation: Cell<u64>,
}

impl<S, V> PacketReader<S, V>
where
    S: DatagramSocket + 'static,
    V: PacketVisitor + 'static,
{
    /// Create a reader. Nothing is read until [`start_reading`](Self::start_reading).
    ///
    /// # Errors
    /// Returns `ProtocolError::ConfigError` if either yield limit is zero.
    pub fn new(
        socket: Rc<S>,
        visitor: V,
        clock: Rc<dyn Clock>,
        task_runner: Rc<dyn TaskRunner>,
        config: &ReaderConfig,
    ) -> Result<Self> {
        config.validate_strict()?;

        let yield_after = clock.now();
        let inner = Rc::new_cyclic(|weak_self| ReaderInner {
            weak_self: weak_self.clone(),
            socket,
            visitor: RefCell::new(visitor),
            clock,
            task_runner,
            read_buffer: ReadBuffer::new(MAX_PACKET_SIZE),
            yield_after_packets: config.yield_after_packets,
            yield_after_duration: config.yield_after_duration,
            read_pending: Cell::new(false),
            num_packets_read: Cell::new(0),
            yield_after: Cell::new(yield_after),
            dispatching: Cell::new(false),
            closed: Cell::new(false),
            generation: Cell::new(0),
        });

        Ok(Self { inner })
    }

    /// Run the receive loop until a read goes pending, the yield budget is
    /// spent, the visitor asks to stop, or an error occurs.
    ///
    /// Calling this while a read is outstanding, from inside a visitor
    /// callback, or after the reader is closed does nothing.
    pub fn start_reading(&self) {
        self.inner.start_reading();
    }

    /// Revoke outstanding callbacks, cancel the socket's pending read and stop
    /// reading for good.
    ///
    /// The visitor is not notified.
    pub fn close(&self) {
        self.inner.close();
    }

    /// True while a receive is outstanding or a completed one awaits processing
    pub fn is_read_pending(&self) -> bool {
        self.inner.read_pending.get()
    }

    /// True after a read error or [`close`](Self::close)
    pub fn is_closed(&self) -> bool {
        self.inner.closed.get()
    }

    /// Approximate heap footprint: the receive buffer only
    pub fn estimate_memory_usage(&self) -> usize {
        MAX_PACKET_SIZE
    }

    /// The socket this reader receives from
    pub fn socket(&self) -> &Rc<S> {
        &self.inner.socket
    }

    /// Run `f` with mutable access to the visitor.
    ///
    /// # Panics
    /// Panics if called from inside a visitor callback.
    pub fn with_visitor<R>(&self, f: impl FnOnce(&mut V) -> R) -> R {
        f(&mut self.inner.visitor.borrow_mut())
    }
}

impl<S, V> Drop for PacketReader<S, V>
where
    S: DatagramSocket + 'static,
    V: PacketVisitor + 'static,
{
    fn drop(&mut self) {
        self.inner.close();
    }
}

impl<S, V> ReaderInner<S, V>
where
    S: DatagramSocket + 'static,
    V: PacketVisitor + 'static,
{
    fn start_reading(&self) {
        loop {
            if self.read_pending.get() || self.closed.get() || self.dispatching.get() {
                return;
            }

            if self.num_packets_read.get() == 0 {
                self.yield_after
                    .set(self.clock.now() + self.yield_after_duration);
            }

            self.read_pending.set(true);
            let status = self
                .socket
                .read(&self.read_buffer, self.completion_callback());

            let result = match status {
                ReadStatus::Pending => {
                    global_metrics().async_read();
                    self.num_packets_read.set(0);
                    return;
                }
                ReadStatus::Complete(result) => result,
            };
            global_metrics().sync_read();

            let packets_read = self.num_packets_read.get() + 1;
            self.num_packets_read.set(packets_read);

            if packets_read > self.yield_after_packets || self.clock.now() > self.yield_after.get()
            {
                self.num_packets_read.set(0);
                global_metrics().read_yield();
                trace!(packets_read, "Yield budget spent, deferring read result");

                // Stays pending until the posted task runs
                let callback = self.completion_callback();
                self.task_runner
                    .post_task(Box::new(move || callback(result)));
            } else if !self.process_read_result(result) {
                return;
            }
        }
    }

    fn completion_callback(&self) -> ReadCallback {
        let reader = self.weak_self.clone();
        let generation = self.generation.get();
        Box::new(move |result| {
            if let Some(reader) = reader.upgrade() {
                reader.on_read_complete(generation, result);
            }
        })
    }

    fn on_read_complete(&self, generation: u64, result: ReadResult) {
        if generation != self.generation.get() {
            trace!("Ignoring read completion from a revoked generation");
            return;
        }

        if self.process_read_result(result) {
            self.start_reading();
        }
    }

    fn process_read_result(&self, result: ReadResult) -> bool {
        self.read_pending.set(false);

        let len = match result {
            Ok(0) => Err(ProtocolError::ConnectionClosed),
            Ok(len) => Ok(len),
            Err(e) => Err(ProtocolError::Io(e)),
        };

        let len = match len {
            Ok(len) => len,
            Err(error) => {
                warn!(error = %error, "Packet reader stopped on read error");
                global_metrics().read_error();
                self.closed.set(true);
                let socket: &dyn DatagramSocket = &*self.socket;
                self.dispatch(|visitor| visitor.on_read_error(error, socket));
                return false;
            }
        };

        let receipt_time = self.clock.now();
        let local_address = resolve_address(self.socket.local_addr(), "local");
        let peer_address = resolve_address(self.socket.peer_addr(), "peer");

        let buffer = self.read_buffer.borrow();
        let packet = ReceivedPacket::new(&buffer[..len.min(buffer.len())], receipt_time);
        global_metrics().packet_received(packet.len() as u64);

        self.dispatch(|visitor| visitor.on_packet(&packet, local_address, peer_address))
    }

    fn dispatch<R>(&self, f: impl FnOnce(&mut V) -> R) -> R {
        self.dispatching.set(true);
        let result = f(&mut self.visitor.borrow_mut());
        self.dispatching.set(false);
        result
    }

    fn close(&self) {
        self.generation.set(self.generation.get().wrapping_add(1));
        if self.read_pending.get() && !self.closed.get() {
            self.socket.cancel_read();
        }
        self.closed.set(true);
    }
}

// Address lookups are best effort; the packet is still delivered
fn resolve_address(address: io::Result<SocketAddr>, which: &'static str) -> SocketAddr {
    address.unwrap_or_else(|e| {
        debug!(which, error = %e, "Could not resolve socket address");
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
    })
}
