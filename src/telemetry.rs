use crate::error::DecodeError;
use crate::packet::Telemetry;

/// Decodes a standard telemetry frame: `T#seq,a1,a2,a3,a4,a5,bbbbbbbb`.
///
/// The five analog channels are mandatory; the digital field is folded
/// most-significant-bit first and tolerated when short or malformed (real
/// trackers truncate it), coming back as zero. The Kenwood `T#MIC` sequence
/// quirk parses as sequence zero.
pub fn decode(information: &str) -> Result<Telemetry, DecodeError> {
    let body = information.strip_prefix("T#").ok_or_else(|| {
        DecodeError::MalformedTelemetry(format!("missing T# lead in {information:?}"))
    })?;

    let mut fields = body.split(',');
    let seq_field = fields.next().unwrap_or_default().trim();
    let sequence = if seq_field.eq_ignore_ascii_case("MIC") {
        0
    } else {
        seq_field.parse::<u32>().map_err(|_| {
            DecodeError::MalformedTelemetry(format!("bad sequence number {seq_field:?}"))
        })?
    };

    let mut values = [0.0f64; 5];
    for (channel, slot) in values.iter_mut().enumerate() {
        let field = fields.next().ok_or_else(|| {
            DecodeError::MalformedTelemetry(format!(
                "only {channel} analog values in {information:?}"
            ))
        })?;
        *slot = field.trim().parse::<f64>().map_err(|_| {
            DecodeError::MalformedTelemetry(format!("bad analog value {field:?}"))
        })?;
    }

    let digital_bits = fields.next().map(parse_digital).unwrap_or(0);

    Ok(Telemetry {
        sequence,
        values,
        digital_bits,
    })
}

fn parse_digital(field: &str) -> u8 {
    let mut bits = 0u8;
    let mut count = 0;
    for c in field.chars().take(8) {
        match c {
            '0' => bits <<= 1,
            '1' => bits = (bits << 1) | 1,
            _ => return 0,
        }
        count += 1;
    }
    if count == 0 {
        return 0;
    }
    bits
}
