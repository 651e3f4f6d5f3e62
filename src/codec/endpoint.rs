use crate::error::CodecError;

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

pub const V4_ENCODED_LEN: usize = 6;
pub const V6_ENCODED_LEN: usize = 18;

const PORT_LEN: usize = 2;

/// Encodes `address` and `port`. The port arrives as a signed integer and must fit a `u16`.
pub fn encode(address: &str, port: i32) -> Result<Vec<u8>, CodecError> {
    let ip: IpAddr = address
        .trim()
        .parse()
        .map_err(|_| CodecError::InvalidAddress(address.to_string()))?;
    let port = u16::try_from(port).map_err(|_| CodecError::InvalidPort(port))?;

    Ok(encode_ip(ip, port))
}

pub fn encode_ip(ip: IpAddr, port: u16) -> Vec<u8> {
    let mut buf = match ip {
        IpAddr::V4(v4) => {
            let mut buf = Vec::with_capacity(V4_ENCODED_LEN);
            buf.extend_from_slice(&v4.octets());
            buf
        }
        IpAddr::V6(v6) => {
            let mut buf = Vec::with_capacity(V6_ENCODED_LEN);
            buf.extend_from_slice(&v6.octets());
            buf
        }
    };
    buf.extend_from_slice(&port.to_be_bytes());
    buf
}

fn validate(bytes: &[u8]) -> Result<(), CodecError> {
    if bytes.len() != V4_ENCODED_LEN && bytes.len() != V6_ENCODED_LEN {
        return Err(CodecError::InvalidLength(bytes.len()));
    }
    Ok(())
}

pub fn extract_ip(bytes: &[u8]) -> Result<IpAddr, CodecError> {
    validate(bytes)?;
    let addr = &bytes[..bytes.len() - PORT_LEN];

    let ip = if let Ok(octets) = <[u8; 4]>::try_from(addr) {
        IpAddr::V4(Ipv4Addr::from(octets))
    } else if let Ok(octets) = <[u8; 16]>::try_from(addr) {
        IpAddr::V6(Ipv6Addr::from(octets))
    } else {
        return Err(CodecError::InvalidLength(bytes.len()));
    };
    Ok(ip)
}

pub fn extract_port(bytes: &[u8]) -> Result<u16, CodecError> {
    validate(bytes)?;
    let tail = &bytes[bytes.len() - PORT_LEN..];
    Ok(u16::from_be_bytes([tail[0], tail[1]]))
}

pub fn decode(bytes: &[u8]) -> Result<(IpAddr, u16), CodecError> {
    Ok((extract_ip(bytes)?, extract_port(bytes)?))
}
