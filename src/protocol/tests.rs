//! Protocol Module Tests
//!
//! ## Test Scopes
//! - **Value Types**: Address parsing/equality and ordinal mappings.
//! - **Envelope Layout**: Byte-exact header and payload encoding.
//! - **Malformed Input**: Every decode failure is reported, never panics.

#[cfg(test)]
mod tests {
    use crate::protocol::codec::{decode_address, encode_address};
    use crate::protocol::{
        Address, DecodeError, EncodeError, Envelope, MAX_DATAGRAM, MessageKind, Role,
        ServiceCategory,
    };
    use std::collections::HashSet;
    use std::net::SocketAddr;

    // ============================================================
    // ADDRESS TESTS
    // ============================================================

    #[test]
    fn test_address_equality_and_hash() {
        let mut set = HashSet::new();
        set.insert(Address::new("10.0.0.5", 9001));
        set.insert(Address::new("10.0.0.5", 9001)); // duplicate
        set.insert(Address::new("10.0.0.5", 9002));

        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_address_parse() {
        let addr: Address = "127.0.0.1:8080".parse().unwrap();
        assert_eq!(addr, Address::new("127.0.0.1", 8080));

        let named: Address = "  linker-a.local:9000 ".parse().unwrap();
        assert_eq!(named.host, "linker-a.local");
        assert_eq!(named.port, 9000);

        let v6: Address = "[::1]:7000".parse().unwrap();
        assert_eq!(v6.host, "::1");
        assert_eq!(v6.to_string(), "[::1]:7000");
    }

    #[test]
    fn test_address_parse_rejects_garbage() {
        assert!("no-port".parse::<Address>().is_err());
        assert!(":9000".parse::<Address>().is_err());
        assert!("host:99999".parse::<Address>().is_err());
        assert!("host:abc".parse::<Address>().is_err());
    }

    #[test]
    fn test_address_from_socket_addr() {
        let sock: SocketAddr = "192.168.1.7:4000".parse().unwrap();
        assert_eq!(Address::from(sock), Address::new("192.168.1.7", 4000));
    }

    // ============================================================
    // ORDINAL TESTS
    // ============================================================

    #[test]
    fn test_category_ordinals() {
        assert_eq!(ServiceCategory::Reply.ordinal(), 0);
        assert_eq!(ServiceCategory::Time.ordinal(), 1);
        assert_eq!(ServiceCategory::from_ordinal(1), Some(ServiceCategory::Time));
        assert_eq!(ServiceCategory::from_ordinal(2), None);
        assert_eq!("TIME".parse::<ServiceCategory>(), Ok(ServiceCategory::Time));
    }

    #[test]
    fn test_message_kind_ordinals_are_stable() {
        let expected = [
            MessageKind::RegisterService,
            MessageKind::RequestService,
            MessageKind::ServiceDown,
            MessageKind::RemoveService,
            MessageKind::Ping,
            MessageKind::Ack,
            MessageKind::Response,
            MessageKind::RegisterServiceFromLinker,
        ];

        for (i, kind) in expected.iter().enumerate() {
            assert_eq!(kind.ordinal() as usize, i);
            assert_eq!(MessageKind::from_ordinal(i as u8), Some(*kind));
        }
        assert_eq!(MessageKind::from_ordinal(8), None);
    }

    // ============================================================
    // ENVELOPE LAYOUT TESTS
    // ============================================================

    #[test]
    fn test_register_layout() {
        let bytes = Envelope::register(ServiceCategory::Time).encode().unwrap();
        assert_eq!(bytes, vec![0, 1, 1]);
    }

    #[test]
    fn test_ack_has_empty_payload() {
        let bytes = Envelope::ack(Role::Linker).encode().unwrap();
        assert_eq!(bytes, vec![5, 2]);
    }

    #[test]
    fn test_response_address_layout() {
        let addr = Address::new("10.0.0.5", 9001);
        let bytes = Envelope::response_address(&addr).unwrap().encode().unwrap();

        let mut expected = vec![6, 2, 8];
        expected.extend_from_slice(b"10.0.0.5");
        expected.extend_from_slice(&[0x23, 0x29]); // 9001 big-endian
        assert_eq!(bytes, expected);

        let decoded = Envelope::decode(&bytes).unwrap();
        assert_eq!(decoded.kind, MessageKind::Response);
        assert_eq!(decoded.sender, Role::Linker);
        assert_eq!(decoded.payload_address().unwrap(), addr);
    }

    #[test]
    fn test_register_from_linker_carries_category_and_address() {
        let addr = Address::new("service.local", 7000);
        let env = Envelope::register_from_linker(ServiceCategory::Reply, &addr).unwrap();
        let decoded = Envelope::decode(&env.encode().unwrap()).unwrap();

        let (category, relayed) = decoded.payload_category_and_address().unwrap();
        assert_eq!(category, ServiceCategory::Reply);
        assert_eq!(relayed, addr);
    }

    #[test]
    fn test_request_with_body_keeps_category_first() {
        let env = Envelope::request_with_body(ServiceCategory::Reply, b"hello");
        assert_eq!(env.payload_category().unwrap(), ServiceCategory::Reply);
        assert_eq!(env.payload_body(), b"hello");

        let bare = Envelope::request(ServiceCategory::Reply);
        assert!(bare.payload_body().is_empty());
    }

    #[test]
    fn test_encode_rejects_long_host() {
        let addr = Address::new("h".repeat(256), 1);
        assert!(matches!(
            Envelope::service_down(&addr),
            Err(EncodeError::HostTooLong(_))
        ));
    }

    #[test]
    fn test_encode_rejects_oversized() {
        let env = Envelope::response_body(vec![0u8; MAX_DATAGRAM]);
        assert_eq!(env.encode(), Err(EncodeError::Oversized(MAX_DATAGRAM + 2)));
    }

    // ============================================================
    // MALFORMED INPUT TESTS
    // ============================================================

    #[test]
    fn test_decode_empty_and_short() {
        assert_eq!(
            Envelope::decode(&[]),
            Err(DecodeError::Truncated { needed: 2, got: 0 })
        );
        assert_eq!(
            Envelope::decode(&[0]),
            Err(DecodeError::Truncated { needed: 2, got: 1 })
        );
    }

    #[test]
    fn test_decode_unknown_kind_and_role() {
        assert_eq!(Envelope::decode(&[42, 0]), Err(DecodeError::UnknownKind(42)));
        assert_eq!(Envelope::decode(&[0, 9]), Err(DecodeError::UnknownRole(9)));
    }

    #[test]
    fn test_missing_or_unknown_category() {
        let empty = Envelope::decode(&[1, 0]).unwrap();
        assert!(matches!(
            empty.payload_category(),
            Err(DecodeError::Truncated { .. })
        ));

        let unknown = Envelope::decode(&[1, 0, 77]).unwrap();
        assert_eq!(
            unknown.payload_category(),
            Err(DecodeError::UnknownCategory(77))
        );
    }

    #[test]
    fn test_truncated_address() {
        // host length says 9, only 3 host bytes present
        let env = Envelope::decode(&[2, 0, 9, b'a', b'b', b'c']).unwrap();
        assert_eq!(
            env.payload_address(),
            Err(DecodeError::Truncated { needed: 12, got: 4 })
        );
    }

    #[test]
    fn test_address_with_trailing_bytes() {
        let mut payload = Vec::new();
        encode_address(&Address::new("a", 1), &mut payload).unwrap();
        payload.push(0xff);

        let env = Envelope::new(MessageKind::RemoveService, Role::Linker, payload);
        assert_eq!(env.payload_address(), Err(DecodeError::TrailingBytes(1)));
    }

    #[test]
    fn test_invalid_utf8_host() {
        let buf = [2u8, 0xff, 0xfe, 0x00, 0x01];
        assert_eq!(decode_address(&buf), Err(DecodeError::InvalidHost));
    }
}
