#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use eot::{BatteryCondition, EotPacket, Sink, FRAME_SYNC, PREAMBLE_LEN};

pub fn packet(unit_address: u32) -> EotPacket {
    EotPacket {
        chaining: 3,
        battery_condition: BatteryCondition::Ok,
        message_type: 0,
        unit_address,
        pressure: 87,
        battery_charge: 64,
        spare: false,
        valve_circuit: true,
        confirm: false,
        turbine: true,
        motion: true,
        marker_light_battery_weak: false,
        marker_light: false,
    }
}

/// Frame sync, an alternating preamble, then `body`.
pub fn frame(body: &[bool]) -> Vec<bool> {
    let mut bits = FRAME_SYNC.to_vec();
    bits.extend((0..PREAMBLE_LEN).map(|i| i % 2 == 0));
    bits.extend(body);
    bits
}

/// One byte per symbol, as the demodulator publishes them.
pub fn to_bytes(bits: &[bool]) -> Vec<u8> {
    bits.iter().map(|b| u8::from(*b)).collect()
}

/// Writer that can be read back after being handed to a sink.
#[derive(Clone, Default)]
pub struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sink collecting every packet reported to it.
#[derive(Clone, Default)]
pub struct Collect(pub Arc<Mutex<Vec<EotPacket>>>);

impl Collect {
    pub fn packets(&self) -> Vec<EotPacket> {
        self.0.lock().unwrap().clone()
    }
}

impl Sink for Collect {
    fn report(&mut self, packet: &EotPacket) -> eot::Result<()> {
        self.0.lock().unwrap().push(packet.clone());
        Ok(())
    }
}
