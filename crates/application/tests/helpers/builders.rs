#![allow(dead_code)]

use ferrous_hooks_domain::{HookQuery, RecordData, RecordType, ResourceRecord};
use std::net::Ipv4Addr;

pub fn query(name: &str, record_type: RecordType) -> HookQuery {
    HookQuery::new(name, record_type)
}

pub fn a_record(name: &str, ttl: u32, ip: [u8; 4]) -> ResourceRecord {
    ResourceRecord::new(name, ttl, RecordData::A(Ipv4Addr::from(ip)))
}

pub fn txt_record(name: &str, ttl: u32, text: &str) -> ResourceRecord {
    ResourceRecord::new(name, ttl, RecordData::TXT(text.to_string()))
}
