//! Conversion between hook records and `hickory_proto` records, for
//! pipelines built on hickory.

use ferrous_hooks_domain::{HookError, RecordData, ResourceRecord};
use hickory_proto::rr::rdata::{A, AAAA, CNAME, MX, NS, PTR, SRV, TXT};
use hickory_proto::rr::{Name, RData, Record};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

pub fn to_hickory(record: &ResourceRecord) -> Result<Record, HookError> {
    let rdata = match &record.data {
        RecordData::A(ip) => RData::A(A(*ip)),
        RecordData::AAAA(ip) => RData::AAAA(AAAA(*ip)),
        RecordData::CNAME(target) => RData::CNAME(CNAME(parse_name(target)?)),
        RecordData::NS(target) => RData::NS(NS(parse_name(target)?)),
        RecordData::PTR(target) => RData::PTR(PTR(parse_name(target)?)),
        RecordData::MX {
            preference,
            exchange,
        } => RData::MX(MX::new(*preference, parse_name(exchange)?)),
        RecordData::SRV {
            priority,
            weight,
            port,
            target,
        } => RData::SRV(SRV::new(*priority, *weight, *port, parse_name(target)?)),
        RecordData::TXT(text) => RData::TXT(TXT::new(vec![text.clone()])),
    };

    Ok(Record::from_rdata(parse_name(&record.name)?, record.ttl, rdata))
}

/// `None` for record types hooks do not model.
pub fn from_hickory(record: &Record) -> Option<ResourceRecord> {
    let data = match record.data() {
        RData::A(a) => RecordData::A(a.0),
        RData::AAAA(aaaa) => RecordData::AAAA(aaaa.0),
        RData::CNAME(cname) => RecordData::CNAME(name_text(&cname.0)),
        RData::NS(ns) => RecordData::NS(name_text(&ns.0)),
        RData::PTR(ptr) => RecordData::PTR(name_text(&ptr.0)),
        RData::MX(mx) => RecordData::MX {
            preference: mx.preference(),
            exchange: name_text(mx.exchange()),
        },
        RData::SRV(srv) => RecordData::SRV {
            priority: srv.priority(),
            weight: srv.weight(),
            port: srv.port(),
            target: name_text(srv.target()),
        },
        RData::TXT(txt) => RecordData::TXT(
            txt.txt_data()
                .iter()
                .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
                .collect(),
        ),
        _ => return None,
    };

    Some(ResourceRecord::new(
        name_text(record.name()),
        record.ttl(),
        data,
    ))
}

/// Answer set as scripts see it; unsupported record types are left out.
pub fn answers_from_hickory(records: &[Record]) -> Vec<ResourceRecord> {
    records
        .iter()
        .filter_map(|record| {
            let converted = from_hickory(record);
            if converted.is_none() {
                debug!(
                    name = %record.name(),
                    record_type = %record.record_type(),
                    "Record type not visible to hooks"
                );
            }
            converted
        })
        .collect()
}

fn parse_name(name: &str) -> Result<Name, HookError> {
    Name::from_str(name).map_err(|e| HookError::malformed(format!("invalid name '{}': {}", name, e)))
}

fn name_text(name: &Name) -> Arc<str> {
    Arc::from(name.to_utf8())
}
