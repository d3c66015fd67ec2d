//! Wire-level tests across the container codec, compatibility layer, and
//! record decoders, driving them the way the engine does: encode a command,
//! feed back a scripted device response, normalize, parse the payload.

use protocol::codes::{op, rc};
use protocol::compat::normalize;
use protocol::container::{CONTAINER_HEADER_LEN, ContainerType, decode_header, encode_command};
use protocol::object::{parse_object_info, parse_u32_array};
use protocol::test_utils::{build_container, object_info_payload, u32_array_payload};

#[test]
fn command_header_fields_are_little_endian() {
    let buf = encode_command(op::GET_OBJECT_INFO, 0x01020304, &[0xAABBCCDD]);

    assert_eq!(&buf[0..4], &[16, 0, 0, 0]);
    assert_eq!(&buf[4..6], &[1, 0]);
    assert_eq!(&buf[6..8], &[0x08, 0x10]);
    assert_eq!(&buf[8..12], &[0x04, 0x03, 0x02, 0x01]);
    assert_eq!(&buf[12..16], &[0xDD, 0xCC, 0xBB, 0xAA]);
}

#[test]
fn short_buffers_never_parse_and_never_panic() {
    for len in 0..CONTAINER_HEADER_LEN {
        assert!(decode_header(&vec![0xA5u8; len]).is_none());
    }
}

#[test]
fn storage_id_listing_through_normalization() {
    // Data container for GetStorageIDs with one storage, sent by a device
    // that zeroes the code and transaction-id fields
    let payload = u32_array_payload(&[0x00010001]);
    let raw = build_container(ContainerType::Data as u16, 0, 0, &payload);

    let resp = normalize(&raw, 3);
    assert!(resp.is_ok());
    assert_eq!(resp.transaction_id, 3);
    assert!(resp.substituted);

    let ids = parse_u32_array(resp.payload());
    assert_eq!(ids, vec![0x00010001]);
}

#[test]
fn object_info_through_normalization() {
    let payload = object_info_payload(0x00010001, 0x3001, "Screenshots");
    let raw = build_container(ContainerType::Data as u16, 0, 5, &payload);

    let resp = normalize(&raw, 5);
    let info = parse_object_info(resp.payload()).unwrap();

    assert_eq!(info.filename, "Screenshots");
    assert!(info.is_folder());
}

#[test]
fn misreported_length_field_does_not_extend_reads() {
    // The device claims an 8 KiB container but sends 20 bytes; parsing is
    // bounded by the received buffer
    let mut raw = build_container(ContainerType::Data as u16, rc::OK, 2, &u32_array_payload(&[9]));
    raw[0] = 0x00;
    raw[1] = 0x20; // length = 0x2000

    let resp = normalize(&raw, 2);
    assert_eq!(parse_u32_array(resp.payload()), vec![9]);
}

#[test]
fn substitution_flag_distinguishes_assumed_ok() {
    let genuine = normalize(&build_container(3, rc::OK, 4, &[]), 4);
    assert!(genuine.is_ok());
    assert!(!genuine.substituted);

    let assumed = normalize(&[0u8; 3], 4);
    assert!(assumed.is_ok());
    assert!(assumed.substituted);
}

#[test]
fn non_ok_codes_survive_normalization() {
    let raw = build_container(3, rc::SESSION_NOT_OPEN, 8, &[]);
    let resp = normalize(&raw, 8);

    assert!(!resp.is_ok());
    assert_eq!(resp.code, rc::SESSION_NOT_OPEN);
    assert_eq!(protocol::response_name(resp.code), "SessionNotOpen");
}
