//! Endpoint Codec Tests
//!
//! Covers both address families, the port range check and length validation on decode.

#[cfg(test)]
mod tests {
    use crate::codec::{V4_ENCODED_LEN, V6_ENCODED_LEN, decode, encode, extract_ip, extract_port};
    use crate::error::{CasError, CodecError};
    use std::net::IpAddr;

    // ============================================================
    // ENCODE
    // ============================================================

    #[test]
    fn test_encode_ipv4_layout() {
        let bytes = encode("192.168.1.10", 8080).unwrap();

        assert_eq!(bytes.len(), V4_ENCODED_LEN);
        assert_eq!(&bytes[..4], &[192, 168, 1, 10]);
        // 8080 = 0x1F90, big-endian
        assert_eq!(&bytes[4..], &[0x1F, 0x90]);
    }

    #[test]
    fn test_encode_ipv6_length() {
        let bytes = encode("2001:db8::1", 443).unwrap();

        assert_eq!(bytes.len(), V6_ENCODED_LEN);
        assert_eq!(&bytes[16..], &443u16.to_be_bytes());
    }

    #[test]
    fn test_encode_port_bounds() {
        assert!(encode("10.0.0.1", 0).is_ok());
        assert!(encode("10.0.0.1", 65535).is_ok());

        assert_eq!(
            encode("10.0.0.1", 65536),
            Err(CodecError::InvalidPort(65536))
        );
        assert_eq!(encode("10.0.0.1", -1), Err(CodecError::InvalidPort(-1)));
    }

    #[test]
    fn test_encode_rejects_garbage_address() {
        let result = encode("not-an-ip", 80);
        assert!(matches!(result, Err(CodecError::InvalidAddress(_))));
    }

    // ============================================================
    // DECODE
    // ============================================================

    #[test]
    fn test_high_port_decodes_unsigned() {
        let bytes = encode("127.0.0.1", 65000).unwrap();

        // Would be negative if read as a signed short
        assert_eq!(extract_port(&bytes).unwrap(), 65000);
    }

    #[test]
    fn test_decode_both_families() {
        let v4 = encode("8.8.4.4", 53).unwrap();
        let v6 = encode("::1", 9000).unwrap();

        assert_eq!(
            decode(&v4).unwrap(),
            ("8.8.4.4".parse::<IpAddr>().unwrap(), 53)
        );
        assert_eq!(
            decode(&v6).unwrap(),
            ("::1".parse::<IpAddr>().unwrap(), 9000)
        );
    }

    #[test]
    fn test_decode_rejects_wrong_lengths() {
        for len in [0usize, 2, 5, 7, 16, 17, 19] {
            let bytes = vec![0u8; len];
            assert_eq!(extract_ip(&bytes), Err(CodecError::InvalidLength(len)));
            assert_eq!(extract_port(&bytes), Err(CodecError::InvalidLength(len)));
        }
    }

    #[test]
    fn test_codec_error_maps_to_invalid_input() {
        let err: CasError = CodecError::InvalidPort(70000).into();
        assert!(matches!(err, CasError::InvalidInput(_)));
    }
}
