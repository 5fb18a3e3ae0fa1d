use thiserror::Error;

/// Errors produced while decoding a raw APRS transmission.
///
/// Each variant carries the offending fragment of the input so callers can
/// log or display what tripped the decoder.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    #[error("coordinate out of range: {0}")]
    CoordinateOutOfRange(String),

    #[error("invalid Mic-E encoding: {0}")]
    InvalidMicE(String),

    #[error("malformed telemetry: {0}")]
    MalformedTelemetry(String),

    #[error("NMEA checksum mismatch: {0}")]
    Checksum(String),

    #[error("unrecognized data type: {0}")]
    UnrecognizedDataType(String),
}
