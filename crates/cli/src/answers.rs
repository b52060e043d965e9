//! `--answer` values for the `run` command, standing in for what an upstream
//! resolver would have returned.

use anyhow::{anyhow, bail, Context};
use ferrous_hooks_domain::{RecordData, RecordType, ResourceRecord};
use serde_json::{json, Value};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

/// Parses `TYPE DATA`, e.g. `A 1.2.3.4`, `MX 10 mail.example.com.` or
/// `SRV 10 5 5060 sip.example.com.`. The record is owned by `owner`.
pub fn parse_answer(owner: &Arc<str>, ttl: u32, text: &str) -> anyhow::Result<ResourceRecord> {
    let (kind, rest) = text
        .trim()
        .split_once(char::is_whitespace)
        .ok_or_else(|| anyhow!("answer '{}' must look like 'TYPE DATA'", text))?;
    let rest = rest.trim();

    let record_type: RecordType = kind.parse().map_err(|e: String| anyhow!(e))?;
    let fields: Vec<&str> = rest.split_whitespace().collect();

    let data = match record_type {
        RecordType::A => RecordData::A(
            rest.parse::<Ipv4Addr>()
                .with_context(|| format!("'{}' is not an IPv4 address", rest))?,
        ),
        RecordType::AAAA => RecordData::AAAA(
            rest.parse::<Ipv6Addr>()
                .with_context(|| format!("'{}' is not an IPv6 address", rest))?,
        ),
        RecordType::CNAME => RecordData::CNAME(absolute(rest)),
        RecordType::NS => RecordData::NS(absolute(rest)),
        RecordType::PTR => RecordData::PTR(absolute(rest)),
        RecordType::TXT => RecordData::TXT(rest.to_string()),
        RecordType::MX => match fields.as_slice() {
            [preference, exchange] => RecordData::MX {
                preference: preference.parse::<u16>().context("invalid MX preference")?,
                exchange: absolute(exchange),
            },
            _ => bail!("MX answer must be 'MX PREFERENCE EXCHANGE'"),
        },
        RecordType::SRV => match fields.as_slice() {
            [priority, weight, port, target] => RecordData::SRV {
                priority: priority.parse::<u16>().context("invalid SRV priority")?,
                weight: weight.parse::<u16>().context("invalid SRV weight")?,
                port: port.parse::<u16>().context("invalid SRV port")?,
                target: absolute(target),
            },
            _ => bail!("SRV answer must be 'SRV PRIORITY WEIGHT PORT TARGET'"),
        },
        RecordType::SOA => bail!("SOA answers are not supported"),
    };

    Ok(ResourceRecord::new(Arc::clone(owner), ttl, data))
}

fn absolute(name: &str) -> Arc<str> {
    if name.ends_with('.') {
        Arc::from(name)
    } else {
        Arc::from(format!("{}.", name))
    }
}

/// Presentation form used in the `run` output.
pub fn render(record: &ResourceRecord) -> Value {
    let data = match &record.data {
        RecordData::A(ip) => ip.to_string(),
        RecordData::AAAA(ip) => ip.to_string(),
        RecordData::CNAME(name) | RecordData::NS(name) | RecordData::PTR(name) => name.to_string(),
        RecordData::MX {
            preference,
            exchange,
        } => format!("{} {}", preference, exchange),
        RecordData::SRV {
            priority,
            weight,
            port,
            target,
        } => format!("{} {} {} {}", priority, weight, port, target),
        RecordData::TXT(text) => text.clone(),
    };

    json!({
        "name": record.name.as_ref(),
        "type": record.record_type().as_str(),
        "ttl": record.ttl,
        "data": data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Arc<str> {
        Arc::from("test.example.com.")
    }

    #[test]
    fn test_parse_a_answer() {
        let record = parse_answer(&owner(), 300, "A 1.2.3.4").unwrap();
        assert_eq!(record.data, RecordData::A(Ipv4Addr::new(1, 2, 3, 4)));
        assert_eq!(record.name.as_ref(), "test.example.com.");
        assert_eq!(record.ttl, 300);
    }

    #[test]
    fn test_parse_mx_answer_makes_exchange_absolute() {
        let record = parse_answer(&owner(), 60, "mx 10 mail.example.com").unwrap();
        assert_eq!(
            record.data,
            RecordData::MX {
                preference: 10,
                exchange: Arc::from("mail.example.com."),
            }
        );
    }

    #[test]
    fn test_parse_txt_keeps_spaces() {
        let record = parse_answer(&owner(), 60, "TXT hello   world").unwrap();
        assert_eq!(record.data, RecordData::TXT("hello   world".to_string()));
    }

    #[test]
    fn test_parse_rejects_bad_answers() {
        assert!(parse_answer(&owner(), 60, "A").is_err());
        assert!(parse_answer(&owner(), 60, "A not-an-ip").is_err());
        assert!(parse_answer(&owner(), 60, "SRV 1 2 sip.example.com.").is_err());
        assert!(parse_answer(&owner(), 60, "SOA whatever").is_err());
        assert!(parse_answer(&owner(), 60, "BOGUS 1").is_err());
    }

    #[test]
    fn test_render() {
        let record = parse_answer(&owner(), 60, "SRV 10 5 5060 sip.example.com.").unwrap();
        assert_eq!(
            render(&record),
            json!({
                "name": "test.example.com.",
                "type": "SRV",
                "ttl": 60,
                "data": "10 5 5060 sip.example.com.",
            })
        );
    }
}
