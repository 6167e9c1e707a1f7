//! Sources of demodulated symbols.
//!
//! Every source hands out chunks of raw bytes, one byte per symbol. Sources poll
//! rather than block forever so the dispatch loop can observe cancellation between
//! chunks; an idle poll is not an error.
use std::io::{ErrorKind, Read};
use std::time::Duration;

use crossbeam::channel::{Receiver, RecvTimeoutError};
use tracing::debug;

use crate::Result;

/// Default upstream demodulator endpoint.
pub const DEFAULT_ENDPOINT: &str = "tcp://localhost:5555";

/// How long a source waits for data before reporting [Recv::Idle].
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Outcome of a single receive from a [SymbolSource].
#[derive(Debug, Clone, PartialEq)]
pub enum Recv {
    /// Raw bytes, each representing a single symbol.
    Chunk(Vec<u8>),
    /// Nothing arrived within the poll interval.
    Idle,
    /// The source has no more data and never will.
    Closed,
}

pub trait SymbolSource {
    /// Wait up to the source's poll interval for the next chunk.
    ///
    /// # Errors
    /// If the source has failed. Failures are not recoverable.
    fn recv(&mut self) -> Result<Recv>;
}

/// Symbols delivered over an in-process channel. The source closes when all
/// senders are dropped.
pub struct ChannelSource {
    rx: Receiver<Vec<u8>>,
    poll: Duration,
}

impl ChannelSource {
    pub fn new(rx: Receiver<Vec<u8>>) -> Self {
        ChannelSource {
            rx,
            poll: POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll: Duration) -> Self {
        self.poll = poll;
        self
    }
}

impl SymbolSource for ChannelSource {
    fn recv(&mut self) -> Result<Recv> {
        match self.rx.recv_timeout(self.poll) {
            Ok(chunk) => Ok(Recv::Chunk(chunk)),
            Err(RecvTimeoutError::Timeout) => Ok(Recv::Idle),
            Err(RecvTimeoutError::Disconnected) => Ok(Recv::Closed),
        }
    }
}

/// Symbols read from any reader, e.g., a file capture of the demodulator output.
/// The source closes at EOF.
pub struct ReadSource<R>
where
    R: Read,
{
    reader: R,
    buf: Vec<u8>,
}

impl<R> ReadSource<R>
where
    R: Read,
{
    /// Default number of bytes read per chunk.
    pub const CHUNK_SIZE: usize = 4096;

    pub fn new(reader: R) -> Self {
        Self::with_chunk_size(reader, Self::CHUNK_SIZE)
    }

    pub fn with_chunk_size(reader: R, chunk_size: usize) -> Self {
        ReadSource {
            reader,
            buf: vec![0u8; chunk_size.max(1)],
        }
    }
}

impl<R> SymbolSource for ReadSource<R>
where
    R: Read,
{
    fn recv(&mut self) -> Result<Recv> {
        loop {
            match self.reader.read(&mut self.buf) {
                Ok(0) => {
                    debug!("symbol reader reached EOF");
                    return Ok(Recv::Closed);
                }
                Ok(n) => return Ok(Recv::Chunk(self.buf[..n].to_vec())),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }
}

/// Symbols published by the demodulator on a ZeroMQ PUB socket.
///
/// Subscribes to every message; each message is one chunk.
#[cfg(feature = "zmq")]
pub struct ZmqSource {
    // Must drop before the context
    sock: zmq::Socket,
    _ctx: zmq::Context,
}

#[cfg(feature = "zmq")]
impl ZmqSource {
    /// Connect a SUB socket to `endpoint`.
    ///
    /// # Errors
    /// If the socket cannot be created or configured, or `endpoint` is invalid.
    pub fn connect(endpoint: &str) -> Result<Self> {
        let ctx = zmq::Context::new();
        let sock = ctx.socket(zmq::SUB)?;
        sock.connect(endpoint)?;
        sock.set_subscribe(b"")?;
        let timeout = i32::try_from(POLL_INTERVAL.as_millis()).unwrap_or(i32::MAX);
        sock.set_rcvtimeo(timeout)?;
        debug!(endpoint, "subscribed to symbol source");
        Ok(ZmqSource { sock, _ctx: ctx })
    }
}

#[cfg(feature = "zmq")]
impl SymbolSource for ZmqSource {
    fn recv(&mut self) -> Result<Recv> {
        match self.sock.recv_bytes(0) {
            Ok(msg) => Ok(Recv::Chunk(msg)),
            Err(zmq::Error::EAGAIN) => Ok(Recv::Idle),
            Err(err) => Err(err.into()),
        }
    }
}
