use crate::error::DecodeError;
use crate::header::{self, Header};
use crate::packet::{Packet, PacketType};
use crate::position::Position;
use crate::{classifier, mice, nmea, position, telemetry, weather};
use log::{debug, warn};

/// The APRS parser. Stateless between calls; safe to share across threads.
///
/// Kept as a struct rather than a free function so callers hold an explicit
/// handle, matching the original wrapper's `NewParser` surface.
#[derive(Debug, Default)]
pub struct Parser;

impl Parser {
    pub fn new() -> Self {
        Parser
    }

    /// Decodes one raw transmission. `is_ax25` marks `raw` as a binary
    /// AX.25 UI frame whose address/control/PID framing must be stripped;
    /// otherwise it is TNC2 text as delivered by an APRS-IS feed.
    pub fn decode(&self, raw: &[u8], is_ax25: bool) -> Result<Packet, DecodeError> {
        decode_packet(raw, is_ax25)
    }
}

/// Free-function form of [`Parser::decode`].
pub fn decode_packet(raw: &[u8], is_ax25: bool) -> Result<Packet, DecodeError> {
    let text = if is_ax25 {
        header::ax25_to_tnc2(raw)?
    } else {
        String::from_utf8_lossy(raw).into_owned()
    };

    // Position sentinel and receipt timestamp are preset here; decoders only
    // ever overwrite fields they actually produced.
    let mut packet = Packet::empty(&String::from_utf8_lossy(raw));

    let mut header = Header::split(&text)?;

    // Third-party framing tunnels a complete TNC2 packet in the information
    // field; unwrap one level and decode the payload packet.
    if header.information.starts_with('}') {
        let inner = header.information[1..].to_string();
        debug!("unwrapping third-party frame from {}", header.source);
        header = Header::split(&inner)?;
        if header.information.starts_with('}') {
            return Err(DecodeError::MalformedHeader(
                "nested third-party framing".to_string(),
            ));
        }
    }

    packet.source_callsign = header.source.clone();
    packet.destination_callsign = header.destination.clone();

    let information = header.information.as_str();
    packet.packet_type = classifier::classify(information, &header.destination);

    match packet.packet_type {
        PacketType::Location => {
            let pos = position::decode(information)?;
            apply_position(&mut packet, pos);
        }
        PacketType::Object => {
            let pos = position::decode_object(information)?;
            apply_position(&mut packet, pos);
        }
        PacketType::Item => {
            let pos = position::decode_item(information)?;
            apply_position(&mut packet, pos);
        }
        PacketType::MicE => {
            let decoded = mice::decode(&header.destination, information)?;
            packet.latitude = decoded.latitude;
            packet.longitude = decoded.longitude;
            packet.speed = decoded.speed;
            packet.course = decoded.course as u8;
            packet.altitude = decoded.altitude;
            packet.symbol = decoded.symbol;
            packet.mic_e = decoded.message;
            packet.comment = decoded.comment;
        }
        PacketType::Nmea => match nmea::decode(information) {
            Ok(Some(fix)) => {
                packet.latitude = fix.latitude;
                packet.longitude = fix.longitude;
                packet.speed = fix.speed;
                packet.course = fix.course as u8;
                packet.altitude = fix.altitude;
            }
            Ok(None) => {}
            Err(DecodeError::Checksum(detail)) => {
                // Still a typed NMEA packet, just without a trustworthy fix.
                warn!("NMEA checksum failure from {}: {}", packet.source_callsign, detail);
            }
            Err(e) => return Err(e),
        },
        PacketType::Wx => {
            match weather::decode_positionless(information) {
                Some((report, rest)) => {
                    packet.weather = Some(report);
                    packet.comment = rest;
                }
                None => packet.comment = information[1..].to_string(),
            }
        }
        PacketType::Message => {
            packet.message = message_text(information);
        }
        PacketType::TelemetryMessage => {
            // Parameter/unit/equation definitions ride through verbatim.
            packet.message = information[11..].to_string();
        }
        PacketType::Telemetry => {
            packet.telemetry = Some(telemetry::decode(information)?);
        }
        PacketType::Status => {
            packet.status = information[1..].to_string();
        }
        PacketType::Capabilities => {
            packet.comment = information[1..].to_string();
        }
        PacketType::DxSpot => {
            packet.message = information[1..].trim_start().to_string();
        }
        PacketType::Experimental => {
            packet.comment = information[1..].to_string();
        }
        PacketType::Invalid => {
            return Err(DecodeError::UnrecognizedDataType(format!(
                "no decoder for information field {information:?}"
            )));
        }
    }

    Ok(packet)
}

fn apply_position(packet: &mut Packet, pos: Position) {
    packet.latitude = pos.latitude;
    packet.longitude = pos.longitude;
    packet.symbol = pos.symbol;
    packet.speed = pos.speed;
    packet.course = pos.course as u8;
    packet.altitude = pos.altitude;
    packet.comment = pos.comment;

    // The weather-station symbol hands its comment tail to the weather scan.
    if packet.symbol.ends_with('_') {
        if let Some((report, rest)) = weather::scan(&packet.comment) {
            packet.weather = Some(report);
            packet.comment = rest;
        }
    }
}

/// `:ADDRESSEE:text{id` — the text without the line number suffix.
fn message_text(information: &str) -> String {
    let body = match information.get(11..) {
        Some(body) if information.as_bytes().get(10) == Some(&b':') => body,
        _ => &information[1..],
    };
    match body.rfind('{') {
        Some(idx) => body[..idx].to_string(),
        None => body.to_string(),
    }
}
