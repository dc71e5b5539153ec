//! UDP Transport Adapter
//!
//! Bridges a connected `tokio::net::UdpSocket` to the callback-style
//! [`DatagramSocket`] interface used by the packet reader.
//!
//! Reads are attempted with `try_recv` first. When nothing is queued the
//! adapter spawns a local task that waits for readability and then fires the
//! completion callback, so the reader and its task runner must live on a
//! `tokio::task::LocalSet`. The task is aborted by
//! [`cancel_read`](DatagramSocket::cancel_read), leaving any later datagram on
//! the socket for other handles.

use std::cell::RefCell;
use std::io;
use std::net::SocketAddr;
use std::rc::Rc;

use tokio::net::UdpSocket;
use tokio::task::AbortHandle;
use tracing::{debug, instrument};

use crate::core::buffer::ReadBuffer;
use crate::error::Result;
use crate::transport::socket::{DatagramSocket, ReadCallback, ReadStatus};

/// Connected UDP socket usable by a [`PacketReader`](crate::transport::packet_reader::PacketReader)
///
/// Clones share the underlying socket but track their own pending read.
#[derive(Debug)]
pub struct UdpDatagramSocket {
    socket: Rc<UdpSocket>,
    pending_read: RefCell<Option<AbortHandle>>,
}

impl Clone for UdpDatagramSocket {
    fn clone(&self) -> Self {
        Self {
            socket: Rc::clone(&self.socket),
            pending_read: RefCell::new(None),
        }
    }
}

impl UdpDatagramSocket {
    /// Bind to `local` and connect to `peer`
    #[instrument]
    pub async fn bind_connected(local: SocketAddr, peer: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(local).await?;
        socket.connect(peer).await?;
        debug!(local = %socket.local_addr()?, %peer, "UDP socket connected");
        Ok(Self::from_tokio(socket))
    }

    /// Wrap an already-connected tokio socket
    pub fn from_tokio(socket: UdpSocket) -> Self {
        Self {
            socket: Rc::new(socket),
            pending_read: RefCell::new(None),
        }
    }

    pub fn get_ref(&self) -> &UdpSocket {
        &self.socket
    }
}

impl DatagramSocket for UdpDatagramSocket {
    fn read(&self, buffer: &ReadBuffer, callback: ReadCallback) -> ReadStatus {
        let immediate = self.socket.try_recv(&mut buffer.borrow_mut());
        match immediate {
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {}
            result => return ReadStatus::Complete(result),
        }

        let socket = Rc::clone(&self.socket);
        let buffer = buffer.clone();
        let task = tokio::task::spawn_local(async move {
            let result = loop {
                if let Err(e) = socket.readable().await {
                    break Err(e);
                }
                match socket.try_recv(&mut buffer.borrow_mut()) {
                    Err(e) if e.kind() == io::ErrorKind::WouldBlock => continue,
                    result => break result,
                }
            };
            callback(result);
        });
        *self.pending_read.borrow_mut() = Some(task.abort_handle());

        ReadStatus::Pending
    }

    fn cancel_read(&self) {
        if let Some(task) = self.pending_read.borrow_mut().take() {
            debug!("Aborting pending UDP read");
            task.abort();
        }
    }

    fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.socket.peer_addr()
    }
}
