use crate::error::DecodeError;
use log::debug;

pub const KNOTS_TO_KMH: f64 = 1.852;
pub const FEET_TO_METERS: f64 = 0.3048;

// Base-91 coordinate scaling, APRS 1.0.1 chapter 9.
const COMPRESSED_LAT_SCALE: f64 = 380926.0;
const COMPRESSED_LON_SCALE: f64 = 190463.0;

/// A decoded position report: coordinates, symbol and whatever the
/// extension bytes carried. Course stays a full 0-360 here; the assembler
/// narrows it to the output entity's byte.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    /// Symbol table character followed by symbol code.
    pub symbol: String,
    /// km/h, 0 when the extension is absent.
    pub speed: f64,
    /// Degrees, 0 when absent.
    pub course: u16,
    /// Meters, 0 when absent.
    pub altitude: f64,
    /// Unconsumed tail of the information field.
    pub comment: String,
}

/// Decodes a Location information field (`!`, `=`, `/`, `@` leads). The
/// timestamped forms skip their 7-character DHM/HMS timestamp; receipt time
/// is stamped by the assembler instead.
pub fn decode(information: &str) -> Result<Position, DecodeError> {
    let bytes = information.as_bytes();
    let body = match bytes.first() {
        Some(b'!') | Some(b'=') => &information[1..],
        Some(b'/') | Some(b'@') => information.get(8..).ok_or_else(|| {
            DecodeError::CoordinateOutOfRange(format!(
                "timestamped position too short: {information:?}"
            ))
        })?,
        _ => {
            return Err(DecodeError::CoordinateOutOfRange(format!(
                "not a position information field: {information:?}"
            )))
        }
    };
    decode_body(body)
}

/// Decodes an Object report: `;NAME_____*DDHHMMz<position>`. The name and
/// live/killed flag are validated but not carried in the output entity.
pub fn decode_object(information: &str) -> Result<Position, DecodeError> {
    // 1 lead + 9 name + 1 flag + 7 timestamp, then a position body.
    if information.len() < 18 || !information.starts_with(';') {
        return Err(DecodeError::CoordinateOutOfRange(format!(
            "object report too short: {information:?}"
        )));
    }
    let flag = information.as_bytes()[10];
    if flag != b'*' && flag != b'_' {
        return Err(DecodeError::CoordinateOutOfRange(format!(
            "object live/killed flag missing in {information:?}"
        )));
    }
    let body = information.get(18..).ok_or_else(|| {
        DecodeError::CoordinateOutOfRange(format!("object report too short: {information:?}"))
    })?;
    decode_body(body)
}

/// Decodes an Item report: `)NAME!<position>` with a 3-9 character name
/// terminated by the live (`!`) or killed (`_`) flag.
pub fn decode_item(information: &str) -> Result<Position, DecodeError> {
    if !information.starts_with(')') {
        return Err(DecodeError::CoordinateOutOfRange(format!(
            "not an item report: {information:?}"
        )));
    }
    let name_end = information[1..]
        .find(['!', '_'])
        .map(|idx| idx + 1)
        .ok_or_else(|| {
            DecodeError::CoordinateOutOfRange(format!(
                "item name terminator missing in {information:?}"
            ))
        })?;
    if !(4..=10).contains(&name_end) {
        return Err(DecodeError::CoordinateOutOfRange(format!(
            "item name length out of range in {information:?}"
        )));
    }
    decode_body(&information[name_end + 1..])
}

/// Dispatches between the uncompressed (ASCII digits) and compressed
/// (base-91) layouts, which share the lat/table/lon/code frame.
fn decode_body(body: &str) -> Result<Position, DecodeError> {
    match body.as_bytes().first() {
        Some(b) if b.is_ascii_digit() || *b == b' ' => decode_uncompressed(body),
        Some(_) => decode_compressed(body),
        None => Err(DecodeError::CoordinateOutOfRange(
            "empty position body".to_string(),
        )),
    }
}

/// `DDMM.mmN/DDDMM.mmW` plus symbol table and code, 19 bytes, then the
/// optional course/speed extension and free-text comment.
fn decode_uncompressed(body: &str) -> Result<Position, DecodeError> {
    // The comment may be any text, but the fixed 19-byte frame must be ASCII.
    if body.len() < 19 || !body.as_bytes()[..19].is_ascii() {
        return Err(DecodeError::CoordinateOutOfRange(format!(
            "uncompressed position too short: {body:?}"
        )));
    }

    let latitude = parse_latitude(&body[0..8])?;
    let sym_table = &body[8..9];
    let longitude = parse_longitude(&body[9..18])?;
    let sym_code = &body[18..19];

    let mut position = Position {
        latitude,
        longitude,
        symbol: format!("{}{}", sym_table, sym_code),
        speed: 0.0,
        course: 0,
        altitude: 0.0,
        comment: body[19..].to_string(),
    };

    // The 7-byte CSE/SPD extension, unless the weather symbol claims those
    // bytes as wind direction/speed for the weather scan.
    if sym_code != "_" {
        if let Some((course, speed)) = parse_course_speed(&position.comment) {
            position.course = course;
            position.speed = speed;
            position.comment = position.comment[7..].to_string();
        }
    }

    extract_altitude(&mut position);
    Ok(position)
}

/// Base-91 compressed layout: table, 4+4 coordinate digits, code, two
/// course/speed-or-altitude bytes and the compression type byte, 13 bytes.
fn decode_compressed(body: &str) -> Result<Position, DecodeError> {
    if body.len() < 13 || !body.as_bytes()[..13].is_ascii() {
        return Err(DecodeError::CoordinateOutOfRange(format!(
            "compressed position too short: {body:?}"
        )));
    }
    let bytes = body.as_bytes();

    let lat_value = base91_value(&bytes[1..5])?;
    let lon_value = base91_value(&bytes[5..9])?;
    let latitude = 90.0 - lat_value / COMPRESSED_LAT_SCALE;
    let longitude = -180.0 + lon_value / COMPRESSED_LON_SCALE;
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(DecodeError::CoordinateOutOfRange(format!(
            "compressed coordinate out of range in {body:?}"
        )));
    }

    let mut position = Position {
        latitude,
        longitude,
        symbol: format!("{}{}", &body[0..1], &body[9..10]),
        speed: 0.0,
        course: 0,
        altitude: 0.0,
        comment: body[13..].to_string(),
    };

    let c = bytes[10];
    let s = bytes[11];
    let comp_type = bytes[12].wrapping_sub(33);
    if c != b' ' && (b'!'..=b'{').contains(&c) && (b'!'..=b'{').contains(&s) {
        let c = (c - 33) as f64;
        let s = (s - 33) as f64;
        if comp_type & 0x18 == 0x10 {
            // GGA-sourced fix: the two bytes are a pre-computed altitude.
            position.altitude = 1.002_f64.powf(c * 91.0 + s) * FEET_TO_METERS;
        } else if c <= 89.0 {
            position.course = (c * 4.0) as u16;
            position.speed = (1.08_f64.powf(s) - 1.0) * KNOTS_TO_KMH;
        }
    }

    extract_altitude(&mut position);
    Ok(position)
}

fn parse_latitude(field: &str) -> Result<f64, DecodeError> {
    // Ambiguity positions come over the air as spaces; treat them as zero.
    let field = field.replace(' ', "0");
    let degrees: f64 = field[0..2]
        .parse()
        .map_err(|_| DecodeError::CoordinateOutOfRange(format!("bad latitude {field:?}")))?;
    let minutes: f64 = field[2..7]
        .parse()
        .map_err(|_| DecodeError::CoordinateOutOfRange(format!("bad latitude {field:?}")))?;
    let sign = match &field[7..8] {
        "N" | "n" => 1.0,
        "S" | "s" => -1.0,
        _ => {
            return Err(DecodeError::CoordinateOutOfRange(format!(
                "bad latitude hemisphere {field:?}"
            )))
        }
    };
    if degrees > 90.0 || minutes >= 60.0 {
        return Err(DecodeError::CoordinateOutOfRange(format!(
            "latitude {field:?} exceeds 90 degrees"
        )));
    }
    let value = degrees + minutes / 60.0;
    if value > 90.0 {
        return Err(DecodeError::CoordinateOutOfRange(format!(
            "latitude {field:?} exceeds 90 degrees"
        )));
    }
    Ok(sign * value)
}

fn parse_longitude(field: &str) -> Result<f64, DecodeError> {
    let field = field.replace(' ', "0");
    let degrees: f64 = field[0..3]
        .parse()
        .map_err(|_| DecodeError::CoordinateOutOfRange(format!("bad longitude {field:?}")))?;
    let minutes: f64 = field[3..8]
        .parse()
        .map_err(|_| DecodeError::CoordinateOutOfRange(format!("bad longitude {field:?}")))?;
    let sign = match &field[8..9] {
        "E" | "e" => 1.0,
        "W" | "w" => -1.0,
        _ => {
            return Err(DecodeError::CoordinateOutOfRange(format!(
                "bad longitude hemisphere {field:?}"
            )))
        }
    };
    if degrees > 180.0 || minutes >= 60.0 {
        return Err(DecodeError::CoordinateOutOfRange(format!(
            "longitude {field:?} exceeds 180 degrees"
        )));
    }
    let value = degrees + minutes / 60.0;
    if value > 180.0 {
        return Err(DecodeError::CoordinateOutOfRange(format!(
            "longitude {field:?} exceeds 180 degrees"
        )));
    }
    Ok(sign * value)
}

/// `CCC/SSS` data extension: three-digit course, three-digit speed in knots.
fn parse_course_speed(comment: &str) -> Option<(u16, f64)> {
    let bytes = comment.as_bytes();
    if bytes.len() < 7 || bytes[3] != b'/' {
        return None;
    }
    if !bytes[0..3].iter().all(u8::is_ascii_digit) || !bytes[4..7].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let course: u16 = comment[0..3].parse().ok()?;
    let speed: f64 = comment[4..7].parse().ok()?;
    if course > 360 {
        debug!("ignoring out-of-range course extension {:?}", &comment[..7]);
        return None;
    }
    Some((course % 360, speed * KNOTS_TO_KMH))
}

/// Pulls a `/A=ffffff` altitude (feet) out of the comment, wherever it sits.
fn extract_altitude(position: &mut Position) {
    let comment = position.comment.clone();
    if let Some(idx) = comment.find("/A=") {
        let token = &comment[idx..];
        if token.len() >= 9 && token.as_bytes()[3..9].iter().all(u8::is_ascii_digit) {
            if let Ok(feet) = token[3..9].parse::<f64>() {
                position.altitude = feet * FEET_TO_METERS;
                position.comment = format!("{}{}", &comment[..idx], &comment[idx + 9..]);
            }
        }
    }
}

fn base91_value(digits: &[u8]) -> Result<f64, DecodeError> {
    let mut value = 0.0;
    for &digit in digits {
        if !(33..=123).contains(&digit) {
            return Err(DecodeError::CoordinateOutOfRange(format!(
                "byte {digit:#04x} outside the base-91 alphabet"
            )));
        }
        value = value * 91.0 + (digit - 33) as f64;
    }
    Ok(value)
}
