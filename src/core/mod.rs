//! # Core Packet Components
//!
//! The received-datagram record and the reusable receive buffer shared between
//! the packet reader and its socket.
//!
//! ## Components
//! - **Packet**: borrowed view over one received datagram plus its receipt time
//! - **Buffer**: reference-counted, single-threaded receive buffer
//!
//! ## Buffer Discipline
//! ```text
//! socket.read(buffer) -> [datagram bytes overwrite buffer[..n]] -> visitor(&buffer[..n])
//! ```
//! The buffer is overwritten on every receive, so a visitor that needs the
//! bytes after its callback returns must copy them.

pub mod buffer;
pub mod packet;

/// Maximum datagram size the reader will accept (64 KiB-class receive buffer)
pub const MAX_PACKET_SIZE: usize = 64 * 1024;
