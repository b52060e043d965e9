use ferrous_hooks_domain::{RecordData, RecordType, ResourceRecord};
use std::net::Ipv6Addr;
use std::str::FromStr;

mod helpers;
use helpers::ResourceRecordBuilder;

#[test]
fn test_record_type_codes_round_trip_for_supported_types() {
    for record_type in RecordType::all() {
        assert_eq!(RecordType::from_u16(record_type.to_u16()), Some(*record_type));
    }
}

#[test]
fn test_record_type_unknown_code() {
    assert_eq!(RecordType::from_u16(0), None);
    assert_eq!(RecordType::from_u16(257), None);
}

#[test]
fn test_record_type_from_str_is_case_insensitive() {
    assert_eq!(RecordType::from_str("txt").unwrap(), RecordType::TXT);
    assert_eq!(RecordType::from_str("Aaaa").unwrap(), RecordType::AAAA);
    assert!(RecordType::from_str("BOGUS").is_err());
}

#[test]
fn test_script_constant_names() {
    assert_eq!(RecordType::A.script_constant(), "typeA");
    assert_eq!(RecordType::TXT.script_constant(), "typeTXT");
    assert_eq!(RecordType::SRV.script_constant(), "typeSRV");
}

#[test]
fn test_record_type_follows_payload() {
    let record = ResourceRecordBuilder::new().text("hello").build();
    assert_eq!(record.record_type(), RecordType::TXT);

    let record = ResourceRecord::new(
        "v6.example.com.",
        60,
        RecordData::AAAA(Ipv6Addr::LOCALHOST),
    );
    assert_eq!(record.record_type(), RecordType::AAAA);
}

#[test]
fn test_with_ttl_keeps_payload() {
    let record = ResourceRecordBuilder::new()
        .name("test.example.com.")
        .address("1.2.3.4")
        .ttl(20)
        .build()
        .with_ttl(3600);

    assert_eq!(record.ttl, 3600);
    assert_eq!(record.name.as_ref(), "test.example.com.");
    assert_eq!(record.data, RecordData::A("1.2.3.4".parse().unwrap()));
}
