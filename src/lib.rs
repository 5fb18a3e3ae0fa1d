//! APRS packet decoder.
//!
//! Turns raw Automatic Packet Reporting System transmissions — TNC2 text
//! lines from an APRS-IS feed or binary AX.25 UI frames from a TNC — into a
//! structured [`Packet`]: header callsigns, data type, position (legacy,
//! compressed base-91, Mic-E or NMEA encoded), weather, telemetry and
//! free-text payloads.
//!
//! Decoding is synchronous and stateless per call; a [`Parser`] can be
//! shared freely between threads. Units are uniform across the payload
//! formats: speeds in km/h, altitudes in meters, weather fields in the raw
//! APRS units (degrees Fahrenheit, mph, millibars). Positions use the
//! [`INVALID_COORDINATE`] sentinel (360) when absent; see
//! [`Packet::include_position`].
//!
//! ```
//! use hamaprs::{Parser, PacketType};
//!
//! let parser = Parser::new();
//! let packet = parser
//!     .decode(b"N0CALL-9>APRS,WIDE1-1:!4903.50N/07201.75W>Mobile", false)
//!     .unwrap();
//! assert_eq!(packet.packet_type, PacketType::Location);
//! assert!(packet.include_position());
//! ```

pub mod classifier;
pub mod error;
pub mod header;
pub mod mice;
pub mod nmea;
pub mod packet;
pub mod parser;
pub mod position;
pub mod telemetry;
pub mod weather;

pub use error::DecodeError;
pub use packet::{
    short_callsign, Packet, PacketType, Telemetry, WeatherReport, INVALID_COORDINATE,
};
pub use parser::{decode_packet, Parser};
