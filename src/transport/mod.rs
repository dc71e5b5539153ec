//! # Transport Layer
//!
//! Datagram receive path for QUIC-style sessions.
//!
//! ## Components
//! - **Socket**: callback-style datagram socket interface
//! - **Packet Reader**: cooperative receive loop with a packet/time yield budget
//! - **UDP**: tokio `UdpSocket` adapter for the socket interface
//!
//! ## Threading
//! Everything here is single-threaded (`Rc`-based). Run readers on one
//! sequence, e.g. a `tokio::task::LocalSet` with
//! [`LocalTaskRunner`](crate::runtime::LocalTaskRunner).

pub mod packet_reader;
pub mod socket;
pub mod udp;

pub use packet_reader::{PacketReader, PacketVisitor};
pub use socket::{DatagramSocket, ReadCallback, ReadResult, ReadStatus};
pub use udp::UdpDatagramSocket;
