//! Integration tests for the packet reader over real UDP sockets
//!
//! Readers run on a tokio `LocalSet` with `LocalTaskRunner`, so both the
//! synchronous fast path (datagrams already queued) and the asynchronous path
//! (waiting for readability) are exercised.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use quicwire::config::ReaderConfig;
use quicwire::core::packet::ReceivedPacket;
use quicwire::error::ProtocolError;
use quicwire::runtime::{LocalTaskRunner, SystemClock};
use quicwire::transport::{DatagramSocket, PacketReader, PacketVisitor, UdpDatagramSocket};
use std::cell::RefCell;
use std::net::SocketAddr;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tokio::task::LocalSet;

#[derive(Default)]
struct Received {
    payloads: Vec<Vec<u8>>,
    peers: Vec<SocketAddr>,
    locals: Vec<SocketAddr>,
    receipt_times: Vec<Instant>,
    errors: Vec<String>,
}

struct CollectingVisitor {
    received: Rc<RefCell<Received>>,
}

impl PacketVisitor for CollectingVisitor {
    fn on_read_error(&mut self, error: ProtocolError, _socket: &dyn DatagramSocket) {
        self.received.borrow_mut().errors.push(error.to_string());
    }

    fn on_packet(
        &mut self,
        packet: &ReceivedPacket<'_>,
        local_address: SocketAddr,
        peer_address: SocketAddr,
    ) -> bool {
        let mut received = self.received.borrow_mut();
        received.payloads.push(packet.data().to_vec());
        received.peers.push(peer_address);
        received.locals.push(local_address);
        received.receipt_times.push(packet.receipt_time());
        true
    }
}

async fn connected_pair() -> (UdpSocket, UdpDatagramSocket) {
    let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let receiver = UdpDatagramSocket::bind_connected(
        "127.0.0.1:0".parse().unwrap(),
        sender.local_addr().unwrap(),
    )
    .await
    .unwrap();
    sender
        .connect(receiver.local_addr().unwrap())
        .await
        .unwrap();
    (sender, receiver)
}

async fn wait_for(received: &Rc<RefCell<Received>>, count: usize) {
    for _ in 0..200 {
        if received.borrow().payloads.len() >= count {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

fn small_budget() -> ReaderConfig {
    ReaderConfig {
        yield_after_packets: 2,
        yield_after_duration: Duration::from_secs(1),
    }
}

#[tokio::test]
async fn test_udp_datagrams_delivered_in_order() {
    let local = LocalSet::new();
    local
        .run_until(async {
            let (sender, receiver) = connected_pair().await;
            let sender_addr = sender.local_addr().unwrap();
            let receiver_addr = receiver.local_addr().unwrap();

            // Queued before the reader starts: synchronous reads with yields
            for i in 0u8..5 {
                sender.send(&[i; 16]).await.unwrap();
            }

            let received = Rc::new(RefCell::new(Received::default()));
            let reader = PacketReader::new(
                Rc::new(receiver),
                CollectingVisitor {
                    received: Rc::clone(&received),
                },
                Rc::new(SystemClock),
                Rc::new(LocalTaskRunner),
                &small_budget(),
            )
            .unwrap();

            reader.start_reading();
            wait_for(&received, 5).await;

            // Sent while the reader waits: asynchronous completions
            for i in 5u8..8 {
                sender.send(&[i; 16]).await.unwrap();
            }
            wait_for(&received, 8).await;

            let received = received.borrow();
            let expected: Vec<Vec<u8>> = (0u8..8).map(|i| vec![i; 16]).collect();
            assert_eq!(received.payloads, expected);
            assert!(received.peers.iter().all(|peer| *peer == sender_addr));
            assert!(received.locals.iter().all(|addr| *addr == receiver_addr));
            assert!(received.receipt_times.windows(2).all(|w| w[0] <= w[1]));
            assert!(received.errors.is_empty());
            assert!(reader.is_read_pending());
        })
        .await;
}

#[tokio::test]
async fn test_udp_reader_dropped_while_waiting() {
    let local = LocalSet::new();
    local
        .run_until(async {
            let (sender, receiver) = connected_pair().await;
            let received = Rc::new(RefCell::new(Received::default()));

            let reader = PacketReader::new(
                Rc::new(receiver),
                CollectingVisitor {
                    received: Rc::clone(&received),
                },
                Rc::new(SystemClock),
                Rc::new(LocalTaskRunner),
                &small_budget(),
            )
            .unwrap();

            reader.start_reading();
            assert!(reader.is_read_pending());
            drop(reader);

            sender.send(b"after drop").await.unwrap();
            tokio::time::sleep(Duration::from_millis(50)).await;

            assert!(received.borrow().payloads.is_empty());
            assert!(received.borrow().errors.is_empty());
        })
        .await;
}

#[tokio::test]
async fn test_udp_large_datagram_fits_buffer() {
    let local = LocalSet::new();
    local
        .run_until(async {
            let (sender, receiver) = connected_pair().await;
            let received = Rc::new(RefCell::new(Received::default()));

            let reader = PacketReader::new(
                Rc::new(receiver),
                CollectingVisitor {
                    received: Rc::clone(&received),
                },
                Rc::new(SystemClock),
                Rc::new(LocalTaskRunner),
                &ReaderConfig::default(),
            )
            .unwrap();
            reader.start_reading();

            let payload = vec![0xA5u8; 8192];
            sender.send(&payload).await.unwrap();
            wait_for(&received, 1).await;

            assert_eq!(received.borrow().payloads, vec![payload]);
        })
        .await;
}

#[tokio::test]
async fn test_udp_dropped_reader_leaves_datagrams_for_other_handles() {
    let local = LocalSet::new();
    local
        .run_until(async {
            let (sender, receiver) = connected_pair().await;
            let owner = receiver.clone();
            let received = Rc::new(RefCell::new(Received::default()));

            let reader = PacketReader::new(
                Rc::new(receiver),
                CollectingVisitor {
                    received: Rc::clone(&received),
                },
                Rc::new(SystemClock),
                Rc::new(LocalTaskRunner),
                &small_budget(),
            )
            .unwrap();

            reader.start_reading();
            assert!(reader.is_read_pending());
            drop(reader);
            tokio::task::yield_now().await;

            sender.send(b"for the owner").await.unwrap();

            let mut buf = [0u8; 64];
            let len = tokio::time::timeout(
                Duration::from_millis(500),
                owner.get_ref().recv(&mut buf),
            )
            .await
            .expect("datagram was consumed by the dropped reader")
            .unwrap();

            assert_eq!(&buf[..len], b"for the owner");
            assert!(received.borrow().payloads.is_empty());
        })
        .await;
}
