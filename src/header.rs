use crate::error::DecodeError;

/// Longest digipeater path the AX.25 address field allows.
const MAX_PATH_HOPS: usize = 8;

/// Split header of a TNC2-formatted packet: source, destination, digipeater
/// path and the information field.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub source: String,
    pub destination: String,
    pub path: Vec<String>,
    pub information: String,
}

impl Header {
    /// Splits `SRC>DST,PATH1,PATH2:INFO` on the first `:`.
    ///
    /// Callsigns come out uppercased and with the `*` digipeated marker
    /// stripped from path entries. Fails when the separator is missing, the
    /// source or destination is empty, or the path exceeds 8 hops.
    pub fn split(raw: &str) -> Result<Header, DecodeError> {
        let raw = raw.trim_start();

        let sep = raw
            .find(':')
            .ok_or_else(|| DecodeError::MalformedHeader(format!("no ':' separator in {raw:?}")))?;
        let (header, information) = raw.split_at(sep);
        let header = header.trim();
        let information = &information[1..];

        if information.is_empty() {
            return Err(DecodeError::MalformedHeader(format!(
                "empty information field in {raw:?}"
            )));
        }

        let (source, rest) = header
            .split_once('>')
            .ok_or_else(|| DecodeError::MalformedHeader(format!("no '>' in header {header:?}")))?;
        if source.is_empty() {
            return Err(DecodeError::MalformedHeader(format!(
                "empty source callsign in {header:?}"
            )));
        }

        let mut hops = rest.split(',');
        let destination = hops.next().unwrap_or_default();
        if destination.is_empty() {
            return Err(DecodeError::MalformedHeader(format!(
                "empty destination callsign in {header:?}"
            )));
        }

        let path: Vec<String> = hops
            .map(|hop| hop.trim_end_matches('*').to_uppercase())
            .collect();
        if path.len() > MAX_PATH_HOPS {
            return Err(DecodeError::MalformedHeader(format!(
                "path has {} hops in {header:?}",
                path.len()
            )));
        }
        if path.iter().any(|hop| hop.is_empty()) {
            return Err(DecodeError::MalformedHeader(format!(
                "empty path element in {header:?}"
            )));
        }

        Ok(Header {
            source: source.to_uppercase(),
            destination: destination.trim_end_matches('*').to_uppercase(),
            path,
            information: information.to_string(),
        })
    }
}

/// Converts a raw AX.25 UI frame (shifted address fields, control and PID
/// bytes) into TNC2 text so it can go through the normal header split.
pub fn ax25_to_tnc2(frame: &[u8]) -> Result<String, DecodeError> {
    // Two address fields, control, PID and at least one payload byte.
    if frame.len() < 17 {
        return Err(DecodeError::MalformedHeader(format!(
            "AX.25 frame too short ({} bytes)",
            frame.len()
        )));
    }

    let mut i = 0;
    let dest = decode_ax25_address(&frame[i..i + 7])?;
    i += 7;
    let src = decode_ax25_address(&frame[i..i + 7])?;
    i += 7;

    let mut result = format!("{}>{}", src, dest);

    // Address extension bit clear means more digipeater fields follow.
    while (frame[i - 1] & 0x01) == 0 {
        if i + 7 > frame.len() {
            return Err(DecodeError::MalformedHeader(
                "truncated AX.25 address field".to_string(),
            ));
        }
        let digi = decode_ax25_address(&frame[i..i + 7])?;
        result.push(',');
        result.push_str(&digi);
        if frame[i + 6] & 0x80 != 0 {
            result.push('*');
        }
        i += 7;
    }

    if i + 2 > frame.len() || frame[i] != 0x03 || frame[i + 1] != 0xF0 {
        return Err(DecodeError::MalformedHeader(
            "not an AX.25 UI frame (control/PID mismatch)".to_string(),
        ));
    }
    i += 2;

    result.push(':');
    result.push_str(&String::from_utf8_lossy(&frame[i..]));
    Ok(result)
}

fn decode_ax25_address(data: &[u8]) -> Result<String, DecodeError> {
    if data.len() < 7 {
        return Err(DecodeError::MalformedHeader(
            "AX.25 address shorter than 7 bytes".to_string(),
        ));
    }

    let mut call = String::new();
    for &byte in data.iter().take(6) {
        let c = (byte >> 1) as char;
        if c != ' ' {
            call.push(c);
        }
    }
    if call.is_empty() {
        return Err(DecodeError::MalformedHeader(
            "empty AX.25 address".to_string(),
        ));
    }

    let ssid = (data[6] >> 1) & 0x0F;
    if ssid > 0 {
        call.push_str(&format!("-{}", ssid));
    }

    Ok(call)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn ax25_address(call: &str, ssid: u8, last: bool) -> Vec<u8> {
        let mut addr = vec![0x20u8 << 1; 7];
        for (i, c) in call.bytes().enumerate().take(6) {
            addr[i] = c << 1;
        }
        addr[6] = 0x60 | (ssid << 1) | if last { 1 } else { 0 };
        addr
    }

    #[test]
    fn test_split_basic() {
        let header = Header::split("N0CALL>APRS:>Test status").unwrap();
        assert_eq!(header.source, "N0CALL");
        assert_eq!(header.destination, "APRS");
        assert!(header.path.is_empty());
        assert_eq!(header.information, ">Test status");
    }

    #[test]
    fn test_split_with_path() {
        let header =
            Header::split("n0call-5>APRS,WIDE1-1*,WIDE2-2:!4903.50N/07201.75W>").unwrap();
        assert_eq!(header.source, "N0CALL-5");
        assert_eq!(header.path, vec!["WIDE1-1", "WIDE2-2"]);
    }

    #[test]
    fn test_split_preserves_trailing_spaces() {
        let header = Header::split(" N0CALL>APRS:>Test status ").unwrap();
        assert_eq!(header.information, ">Test status ");
    }

    #[test]
    fn test_split_colon_inside_information() {
        let header = Header::split("N0CALL>APRS::N1CALL   :Hello{001").unwrap();
        assert_eq!(header.information, ":N1CALL   :Hello{001");
    }

    #[test]
    fn test_split_errors() {
        assert_matches!(
            Header::split("N0CALL>APRS"),
            Err(DecodeError::MalformedHeader(_))
        );
        assert_matches!(
            Header::split(">APRS:test"),
            Err(DecodeError::MalformedHeader(_))
        );
        assert_matches!(
            Header::split("N0CALL>:test"),
            Err(DecodeError::MalformedHeader(_))
        );
        assert_matches!(
            Header::split("N0CALL>APRS:"),
            Err(DecodeError::MalformedHeader(_))
        );
        // Nine hops is one over the AX.25 limit.
        assert_matches!(
            Header::split("N0CALL>APRS,A,B,C,D,E,F,G,H,I:test"),
            Err(DecodeError::MalformedHeader(_))
        );
    }

    #[test]
    fn test_split_max_path() {
        let header = Header::split("N0CALL>APRS,A,B,C,D,E,F,G,H:test").unwrap();
        assert_eq!(header.path.len(), 8);
    }

    #[test]
    fn test_ax25_to_tnc2() {
        let mut frame = Vec::new();
        frame.extend(ax25_address("APRS", 0, false));
        frame.extend(ax25_address("N0CALL", 5, false));
        frame.extend(ax25_address("WIDE1", 1, true));
        frame.push(0x03);
        frame.push(0xF0);
        frame.extend(b">Test status");

        let tnc2 = ax25_to_tnc2(&frame).unwrap();
        assert_eq!(tnc2, "N0CALL-5>APRS,WIDE1-1:>Test status");
    }

    #[test]
    fn test_ax25_to_tnc2_rejects_non_ui() {
        let mut frame = Vec::new();
        frame.extend(ax25_address("APRS", 0, false));
        frame.extend(ax25_address("N0CALL", 0, true));
        frame.push(0x3F); // SABM, not UI
        frame.push(0xF0);
        frame.extend(b"payload");

        assert_matches!(ax25_to_tnc2(&frame), Err(DecodeError::MalformedHeader(_)));
    }

    #[test]
    fn test_ax25_to_tnc2_too_short() {
        assert_matches!(
            ax25_to_tnc2(&[0u8; 10]),
            Err(DecodeError::MalformedHeader(_))
        );
    }
}
