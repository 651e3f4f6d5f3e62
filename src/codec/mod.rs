//! Endpoint Codec
//!
//! Packs a network endpoint into a fixed-width blob for storage in a row payload: the raw address
//! bytes followed by the port as a big-endian `u16`. IPv4 endpoints take 6 bytes, IPv6 endpoints
//! take 18. Decoding validates only the total length.

pub mod endpoint;

pub use endpoint::{
    V4_ENCODED_LEN, V6_ENCODED_LEN, decode, encode, encode_ip, extract_ip, extract_port,
};

#[cfg(test)]
mod tests;
