//! EOT data block model.
//!
//! The data block is 45 bits of telemetry, 18 bits of BCH(63,45) parity and a dummy
//! bit. Multi-bit fields are transmitted least significant bit first.
use std::fmt::{self, Display};
use std::ops::Range;

use serde::Serialize;

use crate::bch;

/// Number of bits in an encoded packet following the frame sync and preamble.
pub const PACKET_LEN: usize = 64;

const CHAINING: Range<usize> = 0..2;
const BATTERY_CONDITION: Range<usize> = 2..4;
const MESSAGE_TYPE: Range<usize> = 4..7;
const UNIT_ADDRESS: Range<usize> = 7..24;
const PRESSURE: Range<usize> = 24..31;
const BATTERY_CHARGE: Range<usize> = 31..38;
const SPARE: usize = 38;
const VALVE_CIRCUIT: usize = 39;
const CONFIRM: usize = 40;
const TURBINE: usize = 41;
const MOTION: usize = 42;
const MARKER_LIGHT_BATTERY: usize = 43;
const MARKER_LIGHT: usize = 44;

/// Message type used while arming an EOT with its head-of-train unit.
pub const MESSAGE_TYPE_ARM: u8 = 7;

/// Read an LSB-first unsigned field.
fn field(bits: &[bool], range: Range<usize>) -> u32 {
    bits[range]
        .iter()
        .rev()
        .fold(0, |acc, bit| (acc << 1) | u32::from(*bit))
}

fn put(out: &mut Vec<bool>, value: u32, width: usize) {
    out.extend((0..width).map(|i| (value >> i) & 1 == 1));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BatteryCondition {
    NotAvailable,
    VeryLow,
    Low,
    Ok,
}

impl From<u32> for BatteryCondition {
    fn from(value: u32) -> Self {
        match value & 0x3 {
            0 => Self::NotAvailable,
            1 => Self::VeryLow,
            2 => Self::Low,
            _ => Self::Ok,
        }
    }
}

impl From<BatteryCondition> for u32 {
    fn from(value: BatteryCondition) -> Self {
        match value {
            BatteryCondition::NotAvailable => 0,
            BatteryCondition::VeryLow => 1,
            BatteryCondition::Low => 2,
            BatteryCondition::Ok => 3,
        }
    }
}

impl Display for BatteryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotAvailable => "N/A",
            Self::VeryLow => "Very Low",
            Self::Low => "Low",
            Self::Ok => "OK",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ArmStatus {
    Normal,
    Arming,
    Armed,
}

impl Display for ArmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Normal => "Normal",
            Self::Arming => "Arming",
            Self::Armed => "Armed",
        })
    }
}

/// A single decoded EOT status message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EotPacket {
    pub chaining: u8,
    pub battery_condition: BatteryCondition,
    pub message_type: u8,
    /// 17-bit unit identifier.
    pub unit_address: u32,
    /// Brake pipe pressure in psig.
    pub pressure: u8,
    /// Raw battery charge, 0-127. See [EotPacket::battery_charge_percent].
    pub battery_charge: u8,
    pub spare: bool,
    pub valve_circuit: bool,
    pub confirm: bool,
    pub turbine: bool,
    pub motion: bool,
    pub marker_light_battery_weak: bool,
    pub marker_light: bool,
}

impl EotPacket {
    /// Decode a packet from `bits`, or `None` if there are fewer than [PACKET_LEN]
    /// bits or the parity does not match. Bits beyond [PACKET_LEN] are ignored.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // fields are at most 7 bits wide
    pub fn decode(bits: &[bool]) -> Option<Self> {
        if bits.len() < PACKET_LEN || !bch::check(bits) {
            return None;
        }
        Some(EotPacket {
            chaining: field(bits, CHAINING) as u8,
            battery_condition: BatteryCondition::from(field(bits, BATTERY_CONDITION)),
            message_type: field(bits, MESSAGE_TYPE) as u8,
            unit_address: field(bits, UNIT_ADDRESS),
            pressure: field(bits, PRESSURE) as u8,
            battery_charge: field(bits, BATTERY_CHARGE) as u8,
            spare: bits[SPARE],
            valve_circuit: bits[VALVE_CIRCUIT],
            confirm: bits[CONFIRM],
            turbine: bits[TURBINE],
            motion: bits[MOTION],
            marker_light_battery_weak: bits[MARKER_LIGHT_BATTERY],
            marker_light: bits[MARKER_LIGHT],
        })
    }

    /// Encode to [PACKET_LEN] bits including parity, as they would appear on air
    /// following the frame sync and preamble. Values wider than their field are
    /// truncated.
    #[must_use]
    pub fn to_bits(&self) -> Vec<bool> {
        let mut out = Vec::with_capacity(PACKET_LEN);
        put(&mut out, u32::from(self.chaining), CHAINING.len());
        put(&mut out, u32::from(self.battery_condition), BATTERY_CONDITION.len());
        put(&mut out, u32::from(self.message_type), MESSAGE_TYPE.len());
        put(&mut out, self.unit_address, UNIT_ADDRESS.len());
        put(&mut out, u32::from(self.pressure), PRESSURE.len());
        put(&mut out, u32::from(self.battery_charge), BATTERY_CHARGE.len());
        out.extend([
            self.spare,
            self.valve_circuit,
            self.confirm,
            self.turbine,
            self.motion,
            self.marker_light_battery_weak,
            self.marker_light,
        ]);
        let parity = bch::parity_bits(&out);
        out.extend(parity);
        // dummy
        out.push(false);
        out
    }

    /// Battery charge scaled to 0-100%.
    #[must_use]
    pub fn battery_charge_percent(&self) -> u8 {
        let raw = u32::from(self.battery_charge.min(127));
        u8::try_from((raw * 100 + 63) / 127).unwrap_or(100)
    }

    #[must_use]
    pub fn arm_status(&self) -> ArmStatus {
        match (self.message_type, self.confirm) {
            (MESSAGE_TYPE_ARM, true) => ArmStatus::Armed,
            (MESSAGE_TYPE_ARM, false) => ArmStatus::Arming,
            _ => ArmStatus::Normal,
        }
    }

    #[must_use]
    pub fn motion_text(&self) -> &'static str {
        if self.motion {
            "Moving"
        } else {
            "Stopped"
        }
    }

    #[must_use]
    pub fn turbine_text(&self) -> &'static str {
        if self.turbine {
            "On"
        } else {
            "Off"
        }
    }

    #[must_use]
    pub fn marker_light_text(&self) -> &'static str {
        match (self.marker_light, self.marker_light_battery_weak) {
            (true, false) => "On",
            (true, true) => "On (Battery Weak)",
            (false, false) => "Off",
            (false, true) => "Off (Battery Weak)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn packet() -> EotPacket {
        EotPacket {
            chaining: 3,
            battery_condition: BatteryCondition::Low,
            message_type: 0,
            unit_address: 98_765,
            pressure: 88,
            battery_charge: 100,
            spare: false,
            valve_circuit: true,
            confirm: false,
            turbine: true,
            motion: false,
            marker_light_battery_weak: false,
            marker_light: true,
        }
    }

    #[test]
    fn encoded_packet_decodes() {
        let pkt = packet();
        let bits = pkt.to_bits();
        assert_eq!(bits.len(), PACKET_LEN);
        assert_eq!(EotPacket::decode(&bits), Some(pkt));
    }

    #[test]
    fn fields_are_lsb_first() {
        let bits = packet().to_bits();
        // unit address 98765 = 0b1_1000_0001_1100_1101
        assert_eq!(&bits[7..11], &[true, false, true, true]);
        assert!(bits[23], "address msb");
        // pressure 88 = 0b101_1000
        assert_eq!(&bits[24..31], &[false, false, false, true, true, false, true]);
    }

    #[test]
    fn trailing_bits_are_ignored() {
        let mut bits = packet().to_bits();
        bits.extend(vec![true; 100]);
        assert_eq!(EotPacket::decode(&bits), Some(packet()));
    }

    #[test]
    fn short_or_corrupt_input_is_invalid() {
        let bits = packet().to_bits();
        assert_eq!(EotPacket::decode(&bits[..PACKET_LEN - 1]), None);
        assert_eq!(EotPacket::decode(&[]), None);

        let mut corrupt = bits.clone();
        corrupt[30] = !corrupt[30];
        assert_eq!(EotPacket::decode(&corrupt), None);
    }

    #[test]
    fn battery_charge_percent_scales() {
        let mut pkt = packet();
        pkt.battery_charge = 127;
        assert_eq!(pkt.battery_charge_percent(), 100);
        pkt.battery_charge = 0;
        assert_eq!(pkt.battery_charge_percent(), 0);
        pkt.battery_charge = 64;
        assert_eq!(pkt.battery_charge_percent(), 50);
    }

    #[test]
    fn arm_status_from_message_type() {
        let mut pkt = packet();
        assert_eq!(pkt.arm_status(), ArmStatus::Normal);
        pkt.message_type = MESSAGE_TYPE_ARM;
        assert_eq!(pkt.arm_status(), ArmStatus::Arming);
        pkt.confirm = true;
        assert_eq!(pkt.arm_status(), ArmStatus::Armed);
    }

    #[test]
    fn text_fields() {
        let mut pkt = packet();
        assert_eq!(pkt.motion_text(), "Stopped");
        assert_eq!(pkt.turbine_text(), "On");
        assert_eq!(pkt.marker_light_text(), "On");
        pkt.marker_light_battery_weak = true;
        pkt.marker_light = false;
        assert_eq!(pkt.marker_light_text(), "Off (Battery Weak)");
        assert_eq!(pkt.battery_condition.to_string(), "Low");
    }
}
