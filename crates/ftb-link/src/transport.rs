//! ---
//! ftb_section: "02-link-data-model"
//! ftb_subsection: "module"
//! ftb_type: "source"
//! ftb_scope: "code"
//! ftb_description: "Autopilot link schema, transports, and dynamics attachments."
//! ftb_version: "v0.1.0"
//! ftb_owner: "tbd"
//! ---
use std::collections::VecDeque;
use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::sync::{Arc, Mutex};

use crate::messages::LinkMessage;
use crate::{LinkError, Result};

/// Bidirectional autopilot link used by the scheduler and relay.
///
/// Implementations must not block: a slow send delays every channel
/// checked after it within the same tick.
pub trait AutopilotLink: Send + Sync {
    /// Write one telemetry message to the link.
    fn send(&self, msg: LinkMessage) -> Result<()>;
    /// Fetch the next inbound message, if one is pending.
    ///
    /// Undecodable inbound bytes surface as an error rather than being
    /// silently dropped.
    fn poll(&self) -> Result<Option<LinkMessage>>;
    /// Human-readable transport name for logging.
    fn name(&self) -> &'static str;
}

/// In-memory link backed by mutex-protected queues.
///
/// Primarily for tests and single-process integration: the harness side
/// pushes inbound messages and drains what the bridge sent.
#[derive(Clone, Default)]
pub struct InMemoryLink {
    outbound: Arc<Mutex<VecDeque<LinkMessage>>>,
    inbound: Arc<Mutex<VecDeque<LinkMessage>>>,
}

impl InMemoryLink {
    /// Create a new in-memory link.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message as if the autopilot had sent it.
    pub fn push_inbound(&self, msg: LinkMessage) {
        self.inbound.lock().expect("queue poisoned").push_back(msg);
    }

    /// Drain everything the bridge has sent so far.
    pub fn drain_sent(&self) -> Vec<LinkMessage> {
        self.outbound
            .lock()
            .expect("queue poisoned")
            .drain(..)
            .collect()
    }

    /// Number of messages sent and not yet drained.
    pub fn sent_len(&self) -> usize {
        self.outbound.lock().expect("queue poisoned").len()
    }
}

impl AutopilotLink for InMemoryLink {
    fn send(&self, msg: LinkMessage) -> Result<()> {
        self.outbound.lock().expect("queue poisoned").push_back(msg);
        Ok(())
    }

    fn poll(&self) -> Result<Option<LinkMessage>> {
        Ok(self.inbound.lock().expect("queue poisoned").pop_front())
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}

/// UDP link carrying one JSON-encoded [`LinkMessage`] per datagram.
pub struct UdpJsonLink {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl UdpJsonLink {
    /// Bind a non-blocking socket and record the autopilot peer address.
    pub fn bind(bind: SocketAddr, peer: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(bind)?;
        socket.set_nonblocking(true)?;
        Ok(Self { socket, peer })
    }
}

impl AutopilotLink for UdpJsonLink {
    fn send(&self, msg: LinkMessage) -> Result<()> {
        let bytes = serde_json::to_vec(&msg)?;
        self.socket.send_to(&bytes, self.peer)?;
        Ok(())
    }

    fn poll(&self) -> Result<Option<LinkMessage>> {
        let mut buf = [0u8; 64 * 1024];
        match self.socket.recv_from(&mut buf) {
            Ok((len, _from)) => {
                let msg = serde_json::from_slice(&buf[..len])?;
                Ok(Some(msg))
            }
            Err(err) if err.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(err) => Err(LinkError::Io(err)),
        }
    }

    fn name(&self) -> &'static str {
        "udp_json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{ActuatorCommand, LinkPayload, StaticPressure};

    #[test]
    fn in_memory_link_preserves_send_order() {
        let link = InMemoryLink::new();
        for alt in [1000.0, 990.0, 985.0] {
            link.send(LinkMessage::new(LinkPayload::Pressure(StaticPressure {
                time_s: 0.0,
                pressure_pa: 101_325.0,
                pressure_alt_m: alt,
            })))
            .expect("send succeeds");
        }
        let sent = link.drain_sent();
        assert_eq!(sent.len(), 3);
        let alts: Vec<f64> = sent
            .iter()
            .map(|m| match &m.payload {
                LinkPayload::Pressure(p) => p.pressure_alt_m,
                other => panic!("unexpected payload {:?}", other),
            })
            .collect();
        assert_eq!(alts, vec![1000.0, 990.0, 985.0]);
        assert_eq!(link.sent_len(), 0);
    }

    #[test]
    fn in_memory_link_polls_pushed_commands() {
        let link = InMemoryLink::new();
        assert!(link.poll().expect("poll").is_none());
        link.push_inbound(LinkMessage::new(LinkPayload::Actuators(ActuatorCommand {
            elevator: -0.2,
            ..ActuatorCommand::default()
        })));
        let msg = link.poll().expect("poll").expect("message pending");
        assert_eq!(msg.kind(), "actuators");
        assert!(link.poll().expect("poll").is_none());
    }

    #[test]
    fn udp_link_roundtrips_datagrams() {
        let a = UdpJsonLink::bind("127.0.0.1:0".parse().unwrap(), "127.0.0.1:9".parse().unwrap())
            .expect("bind a");
        let a_addr = a.socket.local_addr().expect("addr");
        let b = UdpJsonLink::bind("127.0.0.1:0".parse().unwrap(), a_addr).expect("bind b");

        b.send(LinkMessage::new(LinkPayload::Actuators(ActuatorCommand {
            throttle: 0.6,
            ..ActuatorCommand::default()
        })))
        .expect("send");

        // non-blocking receive; allow the loopback datagram to land
        let mut received = None;
        for _ in 0..50 {
            if let Some(msg) = a.poll().expect("poll") {
                received = Some(msg);
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
        let msg = received.expect("datagram arrives on loopback");
        assert_eq!(msg.kind(), "actuators");
    }
}
