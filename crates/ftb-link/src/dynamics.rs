//! ---
//! ftb_section: "02-link-data-model"
//! ftb_subsection: "module"
//! ftb_type: "source"
//! ftb_scope: "code"
//! ftb_description: "Autopilot link schema, transports, and dynamics attachments."
//! ftb_version: "v0.1.0"
//! ftb_owner: "tbd"
//! ---
use std::io::{BufWriter, ErrorKind, Write};
use std::net::{SocketAddr, TcpStream, UdpSocket};

use tracing::debug;

use crate::{LinkError, Result};

/// Command console of the dynamics engine.
///
/// The engine exposes a line-oriented console; the relay writes one
/// property assignment per line.
pub trait DynamicsConsole: Send {
    /// Write a single console line.
    fn write_line(&mut self, line: &str) -> Result<()>;
    /// Human-readable console name for logging.
    fn name(&self) -> &'static str;
}

/// Console double that records written lines, for tests and dry runs.
#[derive(Debug, Default)]
pub struct InMemoryConsole {
    lines: Vec<String>,
}

impl InMemoryConsole {
    /// Create an empty recording console.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines written so far, in order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl DynamicsConsole for InMemoryConsole {
    fn write_line(&mut self, line: &str) -> Result<()> {
        self.lines.push(line.to_owned());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}

/// TCP console attachment to a running dynamics engine.
pub struct TcpConsole {
    stream: BufWriter<TcpStream>,
}

impl TcpConsole {
    /// Connect to the engine's console endpoint.
    pub fn connect(addr: SocketAddr) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        debug!(console = %addr, "dynamics console connected");
        Ok(Self {
            stream: BufWriter::new(stream),
        })
    }
}

impl DynamicsConsole for TcpConsole {
    fn write_line(&mut self, line: &str) -> Result<()> {
        self.stream.write_all(line.as_bytes())?;
        self.stream.write_all(b"\n")?;
        self.stream.flush()?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "tcp"
    }
}

/// Inbound raw state feed from the dynamics engine.
///
/// Frames arrive as opaque datagrams; decoding belongs to the state
/// crate, so the feed hands out raw bytes.
pub struct FdmFeed {
    socket: UdpSocket,
}

impl FdmFeed {
    /// Bind the non-blocking feed socket.
    pub fn bind(bind: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(bind)?;
        socket.set_nonblocking(true)?;
        Ok(Self { socket })
    }

    /// Fetch the next raw frame, if one is pending.
    pub fn poll(&self) -> Result<Option<Vec<u8>>> {
        let mut buf = [0u8; 64 * 1024];
        match self.socket.recv_from(&mut buf) {
            Ok((len, _from)) => Ok(Some(buf[..len].to_vec())),
            Err(err) if err.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(err) => Err(LinkError::Io(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_console_records_lines_in_order() {
        let mut console = InMemoryConsole::new();
        console.write_line("set fcs/aileron-cmd-norm 0.1").expect("write");
        console.write_line("set fcs/throttle-cmd-norm 0.9").expect("write");
        assert_eq!(
            console.lines(),
            &[
                "set fcs/aileron-cmd-norm 0.1".to_owned(),
                "set fcs/throttle-cmd-norm 0.9".to_owned(),
            ]
        );
    }

    #[test]
    fn fdm_feed_polls_raw_datagrams() {
        let feed = FdmFeed::bind("127.0.0.1:0".parse().unwrap()).expect("bind feed");
        let feed_addr = feed.socket.local_addr().expect("addr");
        let sender = UdpSocket::bind("127.0.0.1:0".parse::<SocketAddr>().unwrap()).expect("bind");
        sender.send_to(b"{\"sim_time_s\":1.0}", feed_addr).expect("send");

        let mut received = None;
        for _ in 0..50 {
            if let Some(bytes) = feed.poll().expect("poll") {
                received = Some(bytes);
                break;
            }
            std::thread::sleep(std::time::Duration::from_millis(2));
        }
        assert_eq!(received.expect("datagram"), b"{\"sim_time_s\":1.0}".to_vec());
    }

    #[test]
    fn feed_poll_is_empty_without_traffic() {
        let feed = FdmFeed::bind("127.0.0.1:0".parse().unwrap()).expect("bind feed");
        assert!(feed.poll().expect("poll").is_none());
    }
}
