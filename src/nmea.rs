use crate::error::DecodeError;
use crate::position::KNOTS_TO_KMH;
use log::debug;

/// Position fields pulled out of one supported NMEA sentence.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NmeaFix {
    pub latitude: f64,
    pub longitude: f64,
    /// km/h.
    pub speed: f64,
    pub course: u16,
    /// Meters, only `GPGGA` reports it.
    pub altitude: f64,
}

/// Validates the sentence checksum: XOR of every byte between `$` and `*`,
/// compared case-insensitively against the trailing hex pair.
pub fn checksum_valid(sentence: &str) -> Result<(), DecodeError> {
    let sentence = sentence.trim_end();
    let body = sentence
        .strip_prefix('$')
        .ok_or_else(|| DecodeError::Checksum(format!("missing '$' in {sentence:?}")))?;
    let star = body
        .rfind('*')
        .ok_or_else(|| DecodeError::Checksum(format!("missing '*' in {sentence:?}")))?;
    let (data, tail) = body.split_at(star);
    let tail = &tail[1..];
    if tail.len() != 2 || !tail.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(DecodeError::Checksum(format!(
            "bad checksum field {tail:?} in {sentence:?}"
        )));
    }

    let expected = u8::from_str_radix(tail, 16)
        .map_err(|_| DecodeError::Checksum(format!("bad checksum field {tail:?}")))?;
    let computed = data.bytes().fold(0u8, |acc, b| acc ^ b);
    if computed != expected {
        return Err(DecodeError::Checksum(format!(
            "computed {computed:02X}, sentence says {expected:02X} in {sentence:?}"
        )));
    }
    Ok(())
}

/// Decodes a supported NMEA sentence into position fields. `Ok(None)` means
/// the sentence was valid but carried no usable fix (void status, zero fix
/// quality, or a sentence type this decoder does not handle).
pub fn decode(information: &str) -> Result<Option<NmeaFix>, DecodeError> {
    checksum_valid(information)?;

    let body = information.trim_end();
    let star = body.rfind('*').unwrap_or(body.len());
    let fields: Vec<&str> = body[1..star].split(',').collect();

    match fields[0] {
        "GPRMC" => decode_rmc(&fields),
        "GPGGA" => decode_gga(&fields),
        "GPGLL" => decode_gll(&fields),
        "GPWPL" | "GPWPT" => decode_wpl(&fields),
        "GPBWC" => decode_bwc(&fields),
        name => {
            debug!("unsupported NMEA sentence {}", name);
            Ok(None)
        }
    }
}

// $GPRMC,time,status,lat,N/S,lon,E/W,speed(knots),course,date,...
fn decode_rmc(fields: &[&str]) -> Result<Option<NmeaFix>, DecodeError> {
    if fields.len() < 9 {
        return Ok(None);
    }
    if fields[2] != "A" {
        // Void fix.
        return Ok(None);
    }
    let Some((latitude, longitude)) = coordinates(fields[3], fields[4], fields[5], fields[6])?
    else {
        return Ok(None);
    };
    let speed = fields[7].parse::<f64>().unwrap_or(0.0) * KNOTS_TO_KMH;
    let course = fields[8].parse::<f64>().unwrap_or(0.0) as u16 % 360;
    Ok(Some(NmeaFix {
        latitude,
        longitude,
        speed,
        course,
        altitude: 0.0,
    }))
}

// $GPGGA,time,lat,N/S,lon,E/W,quality,sats,hdop,altitude,M,...
fn decode_gga(fields: &[&str]) -> Result<Option<NmeaFix>, DecodeError> {
    if fields.len() < 10 {
        return Ok(None);
    }
    if fields[6] == "0" || fields[6].is_empty() {
        return Ok(None);
    }
    let Some((latitude, longitude)) = coordinates(fields[2], fields[3], fields[4], fields[5])?
    else {
        return Ok(None);
    };
    let altitude = fields[9].parse::<f64>().unwrap_or(0.0);
    Ok(Some(NmeaFix {
        latitude,
        longitude,
        speed: 0.0,
        course: 0,
        altitude,
    }))
}

// $GPGLL,lat,N/S,lon,E/W,time,status
fn decode_gll(fields: &[&str]) -> Result<Option<NmeaFix>, DecodeError> {
    if fields.len() < 5 {
        return Ok(None);
    }
    // Old senders omit the status field; reject only an explicit void.
    if fields.len() > 6 && fields[6] == "V" {
        return Ok(None);
    }
    let Some((latitude, longitude)) = coordinates(fields[1], fields[2], fields[3], fields[4])?
    else {
        return Ok(None);
    };
    Ok(Some(NmeaFix {
        latitude,
        longitude,
        ..NmeaFix::default()
    }))
}

// $GPWPL,lat,N/S,lon,E/W,name
fn decode_wpl(fields: &[&str]) -> Result<Option<NmeaFix>, DecodeError> {
    if fields.len() < 5 {
        return Ok(None);
    }
    let Some((latitude, longitude)) = coordinates(fields[1], fields[2], fields[3], fields[4])?
    else {
        return Ok(None);
    };
    Ok(Some(NmeaFix {
        latitude,
        longitude,
        ..NmeaFix::default()
    }))
}

// $GPBWC,time,lat,N/S,lon,E/W,bearing(T),...
fn decode_bwc(fields: &[&str]) -> Result<Option<NmeaFix>, DecodeError> {
    if fields.len() < 7 {
        return Ok(None);
    }
    let Some((latitude, longitude)) = coordinates(fields[2], fields[3], fields[4], fields[5])?
    else {
        return Ok(None);
    };
    let course = fields[6].parse::<f64>().unwrap_or(0.0) as u16 % 360;
    Ok(Some(NmeaFix {
        latitude,
        longitude,
        course,
        ..NmeaFix::default()
    }))
}

/// `DDMM.mmmm` + hemisphere for both axes. Empty fields mean no fix.
fn coordinates(
    lat: &str,
    ns: &str,
    lon: &str,
    ew: &str,
) -> Result<Option<(f64, f64)>, DecodeError> {
    if lat.is_empty() || lon.is_empty() {
        return Ok(None);
    }
    let latitude = parse_axis(lat, 2).ok_or_else(|| {
        DecodeError::CoordinateOutOfRange(format!("bad NMEA latitude {lat:?}"))
    })?;
    let longitude = parse_axis(lon, 3).ok_or_else(|| {
        DecodeError::CoordinateOutOfRange(format!("bad NMEA longitude {lon:?}"))
    })?;
    if latitude > 90.0 || longitude > 180.0 {
        return Err(DecodeError::CoordinateOutOfRange(format!(
            "NMEA coordinate {lat:?}/{lon:?} out of range"
        )));
    }
    let latitude = match ns {
        "N" | "n" => latitude,
        "S" | "s" => -latitude,
        _ => {
            return Err(DecodeError::CoordinateOutOfRange(format!(
                "bad hemisphere {ns:?}"
            )))
        }
    };
    let longitude = match ew {
        "E" | "e" => longitude,
        "W" | "w" => -longitude,
        _ => {
            return Err(DecodeError::CoordinateOutOfRange(format!(
                "bad hemisphere {ew:?}"
            )))
        }
    };
    Ok(Some((latitude, longitude)))
}

fn parse_axis(field: &str, degree_digits: usize) -> Option<f64> {
    if field.len() < degree_digits + 2 || !field.is_ascii() {
        return None;
    }
    let degrees: f64 = field[..degree_digits].parse().ok()?;
    let minutes: f64 = field[degree_digits..].parse().ok()?;
    if minutes >= 60.0 {
        return None;
    }
    Some(degrees + minutes / 60.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn close(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn test_checksum_valid() {
        assert!(checksum_valid(
            "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A"
        )
        .is_ok());
        // Lowercase hex digits are accepted.
        assert!(checksum_valid(
            "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6a"
        )
        .is_ok());
    }

    #[test]
    fn test_checksum_mismatch() {
        assert_matches!(
            checksum_valid("$GPGLL,4916.45,N,12311.12,W,225444,A*32"),
            Err(DecodeError::Checksum(_))
        );
        assert_matches!(
            checksum_valid("$GPGLL,4916.45,N,12311.12,W,225444,A"),
            Err(DecodeError::Checksum(_))
        );
    }

    #[test]
    fn test_single_byte_mutation_flips_checksum() {
        let sentence = "$GPGLL,4916.45,N,12311.12,W,225444,A*31";
        assert!(checksum_valid(sentence).is_ok());
        let mutated = sentence.replacen("4916", "4917", 1);
        assert_matches!(checksum_valid(&mutated), Err(DecodeError::Checksum(_)));
    }

    #[test]
    fn test_gprmc() {
        let fix = decode("$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A")
            .unwrap()
            .unwrap();
        assert!(close(fix.latitude, 48.0 + 7.038 / 60.0, 0.0001));
        assert!(close(fix.longitude, 11.0 + 31.0 / 60.0, 0.0001));
        assert!(close(fix.speed, 22.4 * KNOTS_TO_KMH, 0.001));
        assert_eq!(fix.course, 84);
    }

    #[test]
    fn test_gprmc_void_fix() {
        let fix = decode("$GPRMC,123519,V,,,,,,,230394,,*33").unwrap();
        assert_eq!(fix, None);
    }

    #[test]
    fn test_gpgga_with_altitude() {
        let fix = decode("$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47")
            .unwrap()
            .unwrap();
        assert!(close(fix.latitude, 48.0 + 7.038 / 60.0, 0.0001));
        assert!(close(fix.altitude, 545.4, 0.001));
        assert_eq!(fix.speed, 0.0);
    }

    #[test]
    fn test_gpgga_no_fix() {
        let fix = decode("$GPGGA,123519,4807.038,N,01131.000,E,0,00,,,M,,M,,*52").unwrap();
        assert_eq!(fix, None);
    }

    #[test]
    fn test_gpgll() {
        let fix = decode("$GPGLL,4916.45,N,12311.12,W,225444,A*31")
            .unwrap()
            .unwrap();
        assert!(close(fix.latitude, 49.0 + 16.45 / 60.0, 0.0001));
        assert!(close(fix.longitude, -(123.0 + 11.12 / 60.0), 0.0001));
    }

    #[test]
    fn test_gpwpl() {
        let fix = decode("$GPWPL,4917.16,N,12310.64,W,003*65").unwrap().unwrap();
        assert!(close(fix.latitude, 49.0 + 17.16 / 60.0, 0.0001));
    }

    #[test]
    fn test_gpbwc() {
        let fix =
            decode("$GPBWC,081837,4917.24,N,12309.57,W,051.9,T,031.6,M,001.3,N,004*2D")
                .unwrap()
                .unwrap();
        assert!(close(fix.latitude, 49.0 + 17.24 / 60.0, 0.0001));
        assert_eq!(fix.course, 51);
    }

    #[test]
    fn test_unsupported_sentence() {
        let fix = decode("$GPZDA,201530.00,04,07,2002,00,00*60").unwrap();
        assert_eq!(fix, None);
    }
}
