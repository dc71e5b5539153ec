//! # quicwire
//!
//! Datagram receive loop and P-256 key exchange for QUIC-style transports.
//!
//! The crate provides two independent building blocks for a session layer:
//!
//! - [`transport::PacketReader`]: a cooperative, back-pressure-aware receive
//!   loop over a connected datagram socket. It keeps at most one read
//!   outstanding, yields to the event loop after a packet or time budget, and
//!   hands every datagram to a [`transport::PacketVisitor`] in arrival order.
//! - [`crypto::P256KeyExchange`]: ephemeral ECDH over NIST P-256 with SEC1 DER
//!   private keys and strictly validated uncompressed public points.
//!
//! ## Modules
//! - [`config`]: reader yield budget and logging settings (TOML / env)
//! - [`core`]: received-packet record and shared receive buffer
//! - [`crypto`]: key-exchange trait, factory, tags and the P-256 primitive
//! - [`error`]: the crate-wide [`error::ProtocolError`]
//! - [`runtime`]: clocks and task runners the reader schedules on
//! - [`transport`]: socket interface, packet reader and tokio UDP adapter
//! - [`utils`]: logging setup and metrics
//!
//! ## Example
//! ```rust,no_run
//! use std::net::SocketAddr;
//! use std::rc::Rc;
//!
//! use quicwire::config::ReaderConfig;
//! use quicwire::core::packet::ReceivedPacket;
//! use quicwire::error::ProtocolError;
//! use quicwire::runtime::{LocalTaskRunner, SystemClock};
//! use quicwire::transport::{DatagramSocket, PacketReader, PacketVisitor, UdpDatagramSocket};
//!
//! struct Printer;
//!
//! impl PacketVisitor for Printer {
//!     fn on_read_error(&mut self, error: ProtocolError, _socket: &dyn DatagramSocket) {
//!         eprintln!("read failed: {error}");
//!     }
//!
//!     fn on_packet(&mut self, packet: &ReceivedPacket<'_>, _: SocketAddr, peer: SocketAddr) -> bool {
//!         println!("{} bytes from {peer}", packet.len());
//!         true
//!     }
//! }
//!
//! # async fn run() -> quicwire::error::Result<()> {
//! let socket = UdpDatagramSocket::bind_connected(
//!     "127.0.0.1:0".parse().unwrap(),
//!     "127.0.0.1:4433".parse().unwrap(),
//! )
//! .await?;
//!
//! let local = tokio::task::LocalSet::new();
//! local
//!     .run_until(async move {
//!         let reader = PacketReader::new(
//!             Rc::new(socket),
//!             Printer,
//!             Rc::new(SystemClock),
//!             Rc::new(LocalTaskRunner),
//!             &ReaderConfig::default(),
//!         )?;
//!         reader.start_reading();
//!         tokio::time::sleep(std::time::Duration::from_secs(5)).await;
//!         Ok::<(), ProtocolError>(())
//!     })
//!     .await
//! # }
//! ```

pub mod config;
pub mod core;
pub mod crypto;
pub mod error;
pub mod runtime;
pub mod transport;
pub mod utils;
