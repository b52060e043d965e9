use ferrous_hooks_domain::{RecordData, ResourceRecord};
use ferrous_hooks_infrastructure::dns::{answers_from_hickory, from_hickory, to_hickory};
use hickory_proto::rr::rdata::SOA;
use hickory_proto::rr::{Name, RData, Record, RecordType as WireType};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

fn soa_record(name: &str) -> Record {
    let name = Name::from_str(name).unwrap();
    let mname = Name::from_str("ns1.example.com.").unwrap();
    let rname = Name::from_str("admin.example.com.").unwrap();
    let soa = SOA::new(mname, rname, 1, 3600, 900, 604800, 300);
    Record::from_rdata(name, 300, RData::SOA(soa))
}

// ── to_hickory ─────────────────────────────────────────────────────────────

#[test]
fn test_a_record_to_wire() {
    let record = ResourceRecord::new("host.example.com.", 120, RecordData::A(Ipv4Addr::new(1, 2, 3, 4)));

    let wire = to_hickory(&record).unwrap();

    assert_eq!(wire.record_type(), WireType::A);
    assert_eq!(wire.ttl(), 120);
    assert_eq!(wire.name().to_utf8(), "host.example.com.");
}

#[test]
fn test_srv_record_keeps_fields() {
    let record = ResourceRecord::new(
        "_sip._tcp.example.com.",
        60,
        RecordData::SRV {
            priority: 10,
            weight: 20,
            port: 5060,
            target: "sip.example.com.".into(),
        },
    );

    let wire = to_hickory(&record).unwrap();
    let RData::SRV(srv) = wire.data() else {
        panic!("expected SRV rdata");
    };

    assert_eq!(srv.priority(), 10);
    assert_eq!(srv.weight(), 20);
    assert_eq!(srv.port(), 5060);
    assert_eq!(srv.target().to_utf8(), "sip.example.com.");
}

#[test]
fn test_invalid_owner_name_is_rejected() {
    let label = "a".repeat(70);
    let record = ResourceRecord::new(
        format!("{}.example.com.", label),
        60,
        RecordData::A(Ipv4Addr::LOCALHOST),
    );

    assert!(to_hickory(&record).is_err());
}

// ── from_hickory ───────────────────────────────────────────────────────────

#[test]
fn test_supported_types_survive_conversion() {
    let records = vec![
        ResourceRecord::new("h.example.", 300, RecordData::A(Ipv4Addr::new(10, 0, 0, 1))),
        ResourceRecord::new("h.example.", 300, RecordData::AAAA(Ipv6Addr::LOCALHOST)),
        ResourceRecord::new("h.example.", 300, RecordData::CNAME("alias.example.".into())),
        ResourceRecord::new("example.", 300, RecordData::NS("ns1.example.".into())),
        ResourceRecord::new("1.0.0.10.in-addr.arpa.", 300, RecordData::PTR("h.example.".into())),
        ResourceRecord::new(
            "example.",
            300,
            RecordData::MX {
                preference: 5,
                exchange: "mail.example.".into(),
            },
        ),
        ResourceRecord::new("h.example.", 300, RecordData::TXT("v=spf1 -all".to_string())),
    ];

    for record in records {
        let wire = to_hickory(&record).unwrap();
        assert_eq!(from_hickory(&wire), Some(record));
    }
}

#[test]
fn test_unsupported_type_is_not_converted() {
    assert_eq!(from_hickory(&soa_record("example.com.")), None);
}

#[test]
fn test_answers_skip_unsupported_types() {
    let a = ResourceRecord::new("www.example.com.", 60, RecordData::A(Ipv4Addr::new(5, 6, 7, 8)));
    let wire = vec![soa_record("example.com."), to_hickory(&a).unwrap()];

    let answers = answers_from_hickory(&wire);

    assert_eq!(answers, vec![a]);
}
