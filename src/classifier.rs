use crate::packet::PacketType;

/// Mic-E data type identifiers. The two control characters are the original
/// TAPR definitions, backtick/quote are the current and old GPS forms.
const MICE_LEADS: [u8; 4] = [0x1c, 0x1d, b'`', b'\''];

/// Picks the packet variant from the first byte(s) of the information field
/// and, for Mic-E, the destination callsign. Never mutates its input;
/// ambiguous leads come back as `Invalid` rather than a guess.
pub fn classify(information: &str, destination: &str) -> PacketType {
    let bytes = information.as_bytes();
    if bytes.is_empty() {
        return PacketType::Invalid;
    }

    match bytes[0] {
        b'!' | b'=' | b'/' | b'@' => PacketType::Location,
        b';' => refine_dx(&information[1..], PacketType::Object),
        b')' => PacketType::Item,
        b'$' => PacketType::Nmea,
        b'_' => PacketType::Wx,
        b':' => classify_message(information),
        b'<' => PacketType::Capabilities,
        b'>' => refine_dx(&information[1..], PacketType::Status),
        b'T' if bytes.len() > 1 && bytes[1] == b'#' => PacketType::Telemetry,
        b'{' => PacketType::Experimental,
        lead if MICE_LEADS.contains(&lead) => PacketType::MicE,
        _ if is_mice_destination(destination) => PacketType::MicE,
        _ => PacketType::Invalid,
    }
}

/// Messages addressed with a `PARM.`/`UNIT.`/`EQNS.`/`BITS.` payload are
/// telemetry parameter definitions, everything else is a plain message.
fn classify_message(information: &str) -> PacketType {
    let bytes = information.as_bytes();
    // ":ADDRESSEE:payload" with a fixed 9-character addressee.
    if bytes.len() > 11 && bytes[10] == b':' {
        let payload = &information[11..];
        for prefix in ["PARM.", "UNIT.", "EQNS.", "BITS."] {
            if payload.starts_with(prefix) {
                return PacketType::TelemetryMessage;
            }
        }
    }
    PacketType::Message
}

/// DX cluster spots ride inside status and object bodies as `DX de CALL ...`.
fn refine_dx(body: &str, fallback: PacketType) -> PacketType {
    if body.trim_start().starts_with("DX de ") {
        PacketType::DxSpot
    } else {
        fallback
    }
}

/// True when the destination callsign matches the Mic-E digit-substitution
/// pattern: six significant characters, each drawn from the per-position
/// alphabet (SSID suffix ignored).
pub fn is_mice_destination(destination: &str) -> bool {
    let call = crate::packet::short_callsign(destination);
    if call.len() != 6 {
        return false;
    }
    let bytes = call.as_bytes();
    bytes[..3].iter().all(|&b| is_mice_lat_digit(b))
        && bytes[3..].iter().all(|&b| is_mice_flag_digit(b))
}

// Positions 1-3 encode a latitude digit plus a message bit.
fn is_mice_lat_digit(b: u8) -> bool {
    b.is_ascii_digit() || (b'A'..=b'L').contains(&b) || (b'P'..=b'Z').contains(&b)
}

// Positions 4-6 encode a latitude digit plus N/S, +100 and W/E flags.
fn is_mice_flag_digit(b: u8) -> bool {
    b.is_ascii_digit() || b == b'L' || (b'P'..=b'Z').contains(&b)
}
