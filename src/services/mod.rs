// Business logic services
// Reverse geocoding client and the live location stream

pub mod geocode;
pub mod location_stream;

pub use geocode::{GeocodeError, MapboxGeocoder, Place, ReverseGeocoder};
pub use location_stream::{LocationStream, StreamEvent};
