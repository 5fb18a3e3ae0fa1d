use crate::packet::WeatherReport;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Mandatory leading wind pair of a comment-embedded report: direction
    /// and speed, three digits each, dots or spaces when the station has no
    /// sensor for them.
    static ref WIND_PAIR: Regex = Regex::new(r"^(\d{3}|\.{3}| {3})/(\d{3}|\.{3}| {3})").unwrap();

    /// Positionless (`_`) reports spell the wind pair as `cDDDsSSS`.
    static ref WIND_PAIR_POSITIONLESS: Regex =
        Regex::new(r"^c(\d{3}|\.{3})s(\d{3}|\.{3})").unwrap();

    /// One weather token: a prefix letter and its fixed-width value, or a
    /// dotted placeholder for a missing sensor.
    static ref WX_TOKEN: Regex = Regex::new(
        r"^(?:g(\d{3})|t(-\d{2}|\d{3})|r(\d{3})|p(\d{3})|P(\d{3})|h(\d{2})|b(\d{5})|s(\d{3})|[gtrpPhbs](\.{2,5}))"
    )
    .unwrap();
}

/// Scans a position packet's comment tail for an embedded weather block.
/// Returns the report and the unconsumed remainder, or `None` when the tail
/// does not open with the wind direction/speed pair.
pub fn scan(tail: &str) -> Option<(WeatherReport, String)> {
    let caps = WIND_PAIR.captures(tail)?;
    let mut report = WeatherReport::default();
    if let Ok(direction) = caps[1].parse::<u16>() {
        report.wind_direction = direction % 360;
    }
    if let Ok(speed) = caps[2].parse::<f64>() {
        report.wind_speed = speed;
    }
    let rest = consume_tokens(&tail[7..], &mut report);
    Some((report, rest.to_string()))
}

/// Decodes a positionless report (`_MMDDHHMM` timestamp then tokens).
/// The embedded timestamp is skipped; only receipt time is reported.
pub fn decode_positionless(information: &str) -> Option<(WeatherReport, String)> {
    let body = information.strip_prefix('_')?;
    let bytes = body.as_bytes();
    if bytes.len() < 8 || !bytes[..8].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let tail = &body[8..];

    let caps = WIND_PAIR_POSITIONLESS.captures(tail)?;
    let mut report = WeatherReport::default();
    if let Ok(direction) = caps[1].parse::<u16>() {
        report.wind_direction = direction % 360;
    }
    if let Ok(speed) = caps[2].parse::<f64>() {
        report.wind_speed = speed;
    }
    let rest = consume_tokens(&tail[caps[0].len()..], &mut report);
    Some((report, rest.to_string()))
}

/// Walks the token stream until the first thing that is not a recognized
/// weather token; everything after that is comment text. Rain accumulators
/// are consumed so they do not pollute the comment, but the output entity
/// carries no rain fields so their values are dropped. `999` temperature
/// and dotted placeholders leave the zero default in place.
fn consume_tokens<'a>(mut tail: &'a str, report: &mut WeatherReport) -> &'a str {
    while let Some(caps) = WX_TOKEN.captures(tail) {
        if let Some(gust) = caps.get(1) {
            report.wind_gust = gust.as_str().parse().unwrap_or(0.0);
        } else if let Some(temp) = caps.get(2) {
            if temp.as_str() != "999" {
                report.temperature = temp.as_str().parse().unwrap_or(0.0);
            }
        } else if let Some(humidity) = caps.get(6) {
            let value: u8 = humidity.as_str().parse().unwrap_or(0);
            report.humidity = if value == 0 { 100 } else { value.min(100) };
        } else if let Some(pressure) = caps.get(7) {
            let tenths: f64 = pressure.as_str().parse().unwrap_or(0.0);
            report.pressure = tenths / 10.0;
        }
        // Groups 3-5 (rain) and 8 (snow) are consumed without being stored.
        tail = &tail[caps[0].len()..];
    }
    tail
}
