use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::decoder::{EotDecoder, PacketDecoder};
use crate::report::Sink;
use crate::source::{Recv, SymbolSource};
use crate::synchronizer::{SyncOpts, Synchronizer};
use crate::Result;

/// How raw source bytes map to symbols. Each byte is always exactly one symbol.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SymbolFormat {
    /// `0x00` is a 0, any other value is a 1.
    #[default]
    Binary,
    /// ASCII `'1'` is a 1, any other value is a 0.
    Ascii,
}

impl SymbolFormat {
    #[must_use]
    pub fn symbol(self, byte: u8) -> bool {
        match self {
            Self::Binary => byte != 0,
            Self::Ascii => byte == b'1',
        }
    }
}

/// Cooperative cancellation for [Dispatcher::run], checked between chunks.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Symbols processed.
    pub symbols: u64,
    /// Valid packets reported.
    pub packets: u64,
}

/// Owns all receive state: the synchronizer and its window, the decoder, and the
/// sinks valid packets are reported to.
///
/// Every symbol is pushed to the synchronizer in arrival order. Each candidate is
/// decoded and, if valid, reported to every sink in the order they were added.
/// Invalid candidates are dropped without a trace. Once a sync occurrence decodes it
/// is not decoded again, even if it is still at the front of a filling window.
pub struct Dispatcher {
    sync: Synchronizer,
    decoder: Box<dyn PacketDecoder>,
    sinks: Vec<Box<dyn Sink>>,
    format: SymbolFormat,
    stats: Stats,
}

impl Dispatcher {
    /// Create a dispatcher using [EotDecoder] and no sinks.
    ///
    /// # Errors
    /// If `opts` are invalid, see [Synchronizer::new].
    pub fn new(opts: &SyncOpts) -> Result<Self> {
        Ok(Dispatcher {
            sync: Synchronizer::new(opts)?,
            decoder: Box::new(EotDecoder),
            sinks: Vec::default(),
            format: SymbolFormat::default(),
            stats: Stats::default(),
        })
    }

    pub fn with_decoder(mut self, decoder: Box<dyn PacketDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Add a sink. Sinks are reported to in the order added.
    pub fn with_sink(mut self, sink: Box<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn with_symbol_format(mut self, format: SymbolFormat) -> Self {
        self.format = format;
        self
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Process every symbol in `chunk`.
    ///
    /// # Errors
    /// If a sink fails. Symbols in `chunk` after the failing packet are not processed.
    pub fn process_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        for &byte in chunk {
            self.process_symbol(self.format.symbol(byte))?;
        }
        Ok(())
    }

    fn process_symbol(&mut self, bit: bool) -> Result<()> {
        self.stats.symbols += 1;
        let Some(candidate) = self.sync.push(bit) else {
            return Ok(());
        };
        let Some(packet) = self.decoder.decode(&candidate.bits) else {
            return Ok(());
        };
        self.sync.confirm(candidate.offset);
        self.stats.packets += 1;
        info!(
            offset = candidate.offset,
            unit_address = packet.unit_address,
            "decoded packet"
        );
        for sink in &mut self.sinks {
            sink.report(&packet)?;
        }
        Ok(())
    }

    /// Receive and process chunks from `source` until it closes or `cancel` is
    /// cancelled. There is no overall timeout; cancellation is only observed between
    /// chunks.
    ///
    /// # Errors
    /// If the source or a sink fails. Nothing is retried.
    pub fn run(&mut self, source: &mut dyn SymbolSource, cancel: &CancelToken) -> Result<Stats> {
        debug!("dispatch loop starting");
        while !cancel.is_cancelled() {
            match source.recv()? {
                Recv::Chunk(chunk) => self.process_chunk(&chunk)?,
                Recv::Idle => {}
                Recv::Closed => {
                    debug!("symbol source closed");
                    break;
                }
            }
        }
        debug!(
            symbols = self.stats.symbols,
            packets = self.stats.packets,
            "dispatch loop done"
        );
        Ok(self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::EotPacket;
    use crate::synchronizer::{FRAME_SYNC, PREAMBLE_LEN};

    #[test]
    fn symbol_formats() {
        assert!(!SymbolFormat::Binary.symbol(0));
        assert!(SymbolFormat::Binary.symbol(1));
        assert!(SymbolFormat::Binary.symbol(0xff));
        assert!(SymbolFormat::Ascii.symbol(b'1'));
        assert!(!SymbolFormat::Ascii.symbol(b'0'));
        assert!(!SymbolFormat::Ascii.symbol(1));
    }

    #[test]
    fn cancel_token_is_shared() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(!token.is_cancelled());
        other.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn counts_symbols() {
        let mut dispatcher = Dispatcher::new(&SyncOpts::new()).unwrap();
        dispatcher.process_chunk(&[0; 300]).unwrap();
        assert_eq!(
            dispatcher.stats(),
            Stats {
                symbols: 300,
                packets: 0
            }
        );
    }

    #[test]
    fn decoded_occurrence_is_confirmed() {
        let mut bits = FRAME_SYNC.to_vec();
        bits.extend(vec![false; PREAMBLE_LEN]);
        bits.extend(vec![true; 10]);
        let bytes: Vec<u8> = bits.iter().map(|b| u8::from(*b)).collect();

        let calls = Arc::new(std::sync::Mutex::new(0usize));
        let decoder = {
            let calls = calls.clone();
            move |bits: &[bool]| -> Option<EotPacket> {
                *calls.lock().unwrap() += 1;
                // accept once the candidate is 4 symbols long
                (bits.len() == 4).then(|| EotPacket::decode(&packet_bits()).unwrap())
            }
        };
        let mut dispatcher = Dispatcher::new(&SyncOpts::new())
            .unwrap()
            .with_decoder(Box::new(decoder));
        dispatcher.process_chunk(&bytes).unwrap();

        assert_eq!(*calls.lock().unwrap(), 4);
        assert_eq!(dispatcher.stats().packets, 1);
    }

    fn packet_bits() -> Vec<bool> {
        EotPacket {
            chaining: 0,
            battery_condition: crate::packet::BatteryCondition::Ok,
            message_type: 0,
            unit_address: 1,
            pressure: 0,
            battery_charge: 0,
            spare: false,
            valve_circuit: false,
            confirm: false,
            turbine: false,
            motion: false,
            marker_light_battery_weak: false,
            marker_light: false,
        }
        .to_bits()
    }
}
