use bytes::Bytes;
use std::time::Instant;

/// A datagram as handed to a [`PacketVisitor`](crate::transport::packet_reader::PacketVisitor).
///
/// The payload borrows the reader's receive buffer and is only valid for the
/// duration of the visitor callback.
#[derive(Debug, Clone, Copy)]
pub struct ReceivedPacket<'a> {
    data: &'a [u8],
    receipt_time: Instant,
}

impl<'a> ReceivedPacket<'a> {
    pub fn new(data: &'a [u8], receipt_time: Instant) -> Self {
        Self { data, receipt_time }
    }

    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Time at which the reader observed the datagram
    pub fn receipt_time(&self) -> Instant {
        self.receipt_time
    }

    /// Copy the payload out of the receive buffer so it can outlive the callback
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(self.data)
    }
}
