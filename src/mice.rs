use crate::error::DecodeError;
use crate::position::KNOTS_TO_KMH;

/// Everything a Mic-E transmission encodes across its two channels: the
/// digit-substituted destination callsign and the information field.
#[derive(Debug, Clone, PartialEq)]
pub struct MicE {
    pub latitude: f64,
    pub longitude: f64,
    /// km/h.
    pub speed: f64,
    pub course: u16,
    /// Meters, 0 when the altitude extension is absent.
    pub altitude: f64,
    pub symbol: String,
    /// Human-readable status phrase derived from the message bits.
    pub message: String,
    pub comment: String,
}

/// One decoded destination character: a latitude digit (space ambiguity
/// becomes zero), its message/flag bit and whether the bit is custom.
struct DestDigit {
    digit: u8,
    bit: bool,
    custom: bool,
}

// Positions 1-3: digit plus one message bit.
fn decode_lat_digit(b: u8) -> Option<DestDigit> {
    match b {
        b'0'..=b'9' => Some(DestDigit { digit: b - b'0', bit: false, custom: false }),
        b'A'..=b'J' => Some(DestDigit { digit: b - b'A', bit: true, custom: true }),
        b'K' => Some(DestDigit { digit: 0, bit: true, custom: true }),
        b'L' => Some(DestDigit { digit: 0, bit: false, custom: false }),
        b'P'..=b'Y' => Some(DestDigit { digit: b - b'P', bit: true, custom: false }),
        b'Z' => Some(DestDigit { digit: 0, bit: true, custom: false }),
        _ => None,
    }
}

// Positions 4-6: digit plus the N/S, +100 degree and E/W flags.
fn decode_flag_digit(b: u8) -> Option<(u8, bool)> {
    match b {
        b'0'..=b'9' => Some((b - b'0', false)),
        b'L' => Some((0, false)),
        b'P'..=b'Y' => Some((b - b'P', true)),
        b'Z' => Some((0, true)),
        _ => None,
    }
}

/// Renders the three message bits as the fixed APRS status phrase.
fn message_phrase(bits: [bool; 3], custom: [bool; 3], standard: [bool; 3]) -> String {
    let any_custom = custom.iter().any(|&c| c);
    let any_standard = standard.iter().any(|&s| s);
    if any_custom && any_standard {
        return "Unknown".to_string();
    }

    let code = (bits[0] as u8) << 2 | (bits[1] as u8) << 1 | bits[2] as u8;
    if code == 0 {
        return "Emergency".to_string();
    }
    if any_custom {
        return format!("Custom-{}", 7 - code);
    }
    match code {
        0b111 => "Off Duty",
        0b110 => "En Route",
        0b101 => "In Service",
        0b100 => "Returning",
        0b011 => "Committed",
        0b010 => "Special",
        0b001 => "Priority",
        _ => unreachable!(),
    }
    .to_string()
}

/// Decodes a Mic-E packet from both encoding channels at once. The
/// destination supplies latitude digits, message bits and the sign/offset
/// flags that the information-field longitude depends on.
pub fn decode(destination: &str, information: &str) -> Result<MicE, DecodeError> {
    let call = crate::packet::short_callsign(destination);
    if call.len() < 6 {
        return Err(DecodeError::InvalidMicE(format!(
            "destination {destination:?} shorter than 6 characters"
        )));
    }
    let dest = call.as_bytes();

    let mut digits = [0u8; 6];
    let mut bits = [false; 3];
    let mut custom = [false; 3];
    let mut standard = [false; 3];
    for i in 0..3 {
        let d = decode_lat_digit(dest[i]).ok_or_else(|| {
            DecodeError::InvalidMicE(format!("destination byte {:?} at {}", dest[i] as char, i))
        })?;
        digits[i] = d.digit;
        bits[i] = d.bit;
        custom[i] = d.bit && d.custom;
        standard[i] = d.bit && !d.custom;
    }
    let mut flags = [false; 3];
    for i in 3..6 {
        let (digit, flag) = decode_flag_digit(dest[i]).ok_or_else(|| {
            DecodeError::InvalidMicE(format!("destination byte {:?} at {}", dest[i] as char, i))
        })?;
        digits[i] = digit;
        flags[i - 3] = flag;
    }
    let [north, offset100, west] = flags;

    let lat_degrees = (digits[0] * 10 + digits[1]) as f64;
    let lat_minutes = (digits[2] * 10 + digits[3]) as f64 + (digits[4] * 10 + digits[5]) as f64 / 100.0;
    if lat_degrees > 90.0 || lat_minutes >= 60.0 {
        return Err(DecodeError::InvalidMicE(format!(
            "latitude out of range in destination {destination:?}"
        )));
    }
    let mut latitude = lat_degrees + lat_minutes / 60.0;
    if latitude > 90.0 {
        return Err(DecodeError::InvalidMicE(format!(
            "latitude out of range in destination {destination:?}"
        )));
    }
    if !north {
        latitude = -latitude;
    }

    // The information field carries longitude, speed/course and the symbol
    // after the data type identifier byte.
    let info = information.as_bytes();
    if info.len() < 9 {
        return Err(DecodeError::InvalidMicE(format!(
            "information field too short: {information:?}"
        )));
    }
    for &b in &info[1..7] {
        if b < 28 {
            return Err(DecodeError::InvalidMicE(format!(
                "information byte {b:#04x} below the d+28 floor"
            )));
        }
    }

    let mut lon_degrees = (info[1] - 28) as i32;
    if offset100 {
        lon_degrees += 100;
    }
    // Documented off-by-one quirks of the d+28 encoding.
    if (180..=189).contains(&lon_degrees) {
        lon_degrees -= 80;
    } else if (190..=199).contains(&lon_degrees) {
        lon_degrees -= 190;
    }

    let mut lon_minutes = (info[2] - 28) as i32;
    if lon_minutes >= 60 {
        lon_minutes -= 60;
    }
    let lon_hundredths = (info[3] - 28) as i32;
    if lon_degrees > 180 || lon_minutes > 59 || lon_hundredths > 99 {
        return Err(DecodeError::InvalidMicE(format!(
            "longitude out of range in {information:?}"
        )));
    }
    let mut longitude =
        lon_degrees as f64 + (lon_minutes as f64 + lon_hundredths as f64 / 100.0) / 60.0;
    if longitude > 180.0 {
        return Err(DecodeError::InvalidMicE(format!(
            "longitude out of range in {information:?}"
        )));
    }
    if west {
        longitude = -longitude;
    }

    let sp = (info[4] - 28) as u32;
    let dc = (info[5] - 28) as u32;
    let se = (info[6] - 28) as u32;
    let mut speed = sp * 10 + dc / 10;
    if speed >= 800 {
        speed -= 800;
    }
    let mut course = (dc % 10) * 100 + se;
    if course >= 400 {
        course -= 400;
    }

    let symbol = format!("{}{}", info[8] as char, info[7] as char);

    let mut comment = information.get(9..).unwrap_or_default().to_string();
    // Kenwood radios prefix the comment with a device identifier byte.
    if comment.starts_with(']') || comment.starts_with('>') {
        comment.remove(0);
    }
    let altitude = extract_altitude(&mut comment);

    Ok(MicE {
        latitude,
        longitude,
        speed: speed as f64 * KNOTS_TO_KMH,
        course: course as u16,
        altitude,
        symbol,
        message: message_phrase(bits, custom, standard),
        comment,
    })
}

/// Mic-E altitude rides at the front of the comment as three base-91
/// characters and a closing brace, offset 10 km below sea level.
fn extract_altitude(comment: &mut String) -> f64 {
    let bytes = comment.as_bytes();
    if bytes.len() >= 4 && bytes[3] == b'}' && bytes[..3].iter().all(|&b| (33..=123).contains(&b)) {
        let value = bytes[..3]
            .iter()
            .fold(0i64, |acc, &b| acc * 91 + (b - 33) as i64);
        comment.replace_range(..4, "");
        return (value - 10000) as f64;
    }
    0.0
}
