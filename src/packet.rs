use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Sentinel for an absent coordinate. Real decodes are clamped to
/// ±90/±180 degrees, so 360 can never be produced by a valid position.
pub const INVALID_COORDINATE: f64 = 360.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PacketType {
    Location,
    Object,
    Item,
    MicE,
    Nmea,
    Wx,
    Message,
    Capabilities,
    Status,
    Telemetry,
    TelemetryMessage,
    DxSpot,
    Experimental,
    Invalid,
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PacketType::Location => "location",
            PacketType::Object => "object",
            PacketType::Item => "item",
            PacketType::MicE => "mic-e",
            PacketType::Nmea => "nmea",
            PacketType::Wx => "wx",
            PacketType::Message => "message",
            PacketType::Capabilities => "capabilities",
            PacketType::Status => "status",
            PacketType::Telemetry => "telemetry",
            PacketType::TelemetryMessage => "telemetry-message",
            PacketType::DxSpot => "dx-spot",
            PacketType::Experimental => "experimental",
            PacketType::Invalid => "invalid",
        };
        write!(f, "{}", name)
    }
}

/// A decoded APRS packet.
///
/// Built fresh for every decode call and owned solely by the caller.
/// `timestamp` is the receipt time, not any time embedded in the packet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Packet {
    pub packet_type: PacketType,
    pub timestamp: DateTime<Utc>,
    pub source_callsign: String,
    pub destination_callsign: String,
    /// Degrees, positive north. `INVALID_COORDINATE` when absent.
    pub latitude: f64,
    /// Degrees, positive east. `INVALID_COORDINATE` when absent.
    pub longitude: f64,
    /// Meters. Zero when absent (indistinguishable from a true zero reading).
    pub altitude: f64,
    /// km/h. Zero when absent.
    pub speed: f64,
    /// Degrees, narrowed to a byte like the original wrapper. Zero when absent.
    pub course: u8,
    /// Symbol table character followed by symbol code, verbatim.
    pub symbol: String,
    pub status: String,
    pub message: String,
    pub comment: String,
    /// Human-readable Mic-E status phrase, empty unless this is a Mic-E packet.
    pub mic_e: String,
    pub weather: Option<WeatherReport>,
    pub telemetry: Option<Telemetry>,
    /// Verbatim input, retained for diagnostics and replay.
    pub raw_message: String,
}

/// Weather fields extracted from a packet's information tail.
///
/// All fields are optional at the protocol level; absent fields are zero,
/// which conflates "reported zero" with "not reported".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct WeatherReport {
    /// Degrees Fahrenheit.
    pub temperature: f64,
    /// Degrees Fahrenheit. The standard weather token grammar has no
    /// indoor-temperature token, so this is always zero; it is part of the
    /// report shape for stations that extend the grammar.
    pub inside_temperature: f64,
    /// Percent, 0-100.
    pub humidity: u8,
    /// Percent, 0-100. Like `inside_temperature`, never set by the
    /// standard token grammar.
    pub inside_humidity: u8,
    /// Miles per hour.
    pub wind_gust: f64,
    /// Degrees, 0-359.
    pub wind_direction: u16,
    /// Miles per hour.
    pub wind_speed: f64,
    /// Millibars.
    pub pressure: f64,
}

/// One standard APRS telemetry frame: a sequence counter, exactly five
/// analog channels and an 8-bit digital field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Telemetry {
    pub sequence: u32,
    pub values: [f64; 5],
    pub digital_bits: u8,
}

impl Packet {
    /// Blank packet with the position sentinel preset, mirroring the
    /// original wrapper's constructor. Decoders fill in what they find.
    pub(crate) fn empty(raw: &str) -> Self {
        Packet {
            packet_type: PacketType::Invalid,
            timestamp: Utc::now(),
            source_callsign: String::new(),
            destination_callsign: String::new(),
            latitude: INVALID_COORDINATE,
            longitude: INVALID_COORDINATE,
            altitude: 0.0,
            speed: 0.0,
            course: 0,
            symbol: String::new(),
            status: String::new(),
            message: String::new(),
            comment: String::new(),
            mic_e: String::new(),
            weather: None,
            telemetry: None,
            raw_message: raw.to_string(),
        }
    }

    /// True iff the packet carries a decoded position on both axes.
    pub fn include_position(&self) -> bool {
        self.latitude != INVALID_COORDINATE && self.longitude != INVALID_COORDINATE
    }
}

/// Callsign without its SSID suffix: `KK6NXK-7` becomes `KK6NXK`.
pub fn short_callsign(call: &str) -> &str {
    match call.find('-') {
        Some(idx) => &call[..idx],
        None => call,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_packet_has_sentinel_position() {
        let packet = Packet::empty("raw");
        assert_eq!(packet.latitude, INVALID_COORDINATE);
        assert_eq!(packet.longitude, INVALID_COORDINATE);
        assert!(!packet.include_position());
        assert_eq!(packet.raw_message, "raw");
    }

    #[test]
    fn test_include_position_requires_both_axes() {
        let mut packet = Packet::empty("raw");
        packet.latitude = 49.05;
        assert!(!packet.include_position());

        packet.longitude = -72.03;
        assert!(packet.include_position());
    }

    #[test]
    fn test_short_callsign() {
        assert_eq!(short_callsign("KK6NXK-7"), "KK6NXK");
        assert_eq!(short_callsign("KK6NXK"), "KK6NXK");
        assert_eq!(short_callsign("WIDE1-1"), "WIDE1");
    }

    #[test]
    fn test_packet_type_display() {
        assert_eq!(PacketType::MicE.to_string(), "mic-e");
        assert_eq!(PacketType::TelemetryMessage.to_string(), "telemetry-message");
    }
}
