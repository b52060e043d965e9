use ferrous_hooks_domain::{
    is_fqdn, Action, ActionKind, HookError, HookQuery, Phase, RecordData, RecordType,
    ResourceRecord,
};
use serde_json::{Map, Value};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

type Fields = Map<String, Value>;

/// Turns the untyped value returned by a script into an [`Action`].
#[derive(Debug, Clone)]
pub struct ActionInterpreter {
    default_ttl: u32,
}

impl ActionInterpreter {
    pub fn new(default_ttl: u32) -> Self {
        Self { default_ttl }
    }

    pub fn interpret(
        &self,
        phase: Phase,
        query: &HookQuery,
        raw: &Value,
    ) -> Result<Action, HookError> {
        let Some(fields) = raw.as_object() else {
            return Ok(Action::Empty);
        };

        let kind = match fields.get("action") {
            None | Some(Value::Null) => return Ok(Action::Empty),
            Some(value) => parse_kind(value)?,
        };

        if !kind.allowed_in(phase) {
            return Err(HookError::malformed(format!(
                "{} is not allowed in the {} phase",
                kind, phase
            )));
        }

        let done = flag(fields, "Done", "done")?;
        let stop = flag(fields, "Stop", "stop")?;

        match kind {
            ActionKind::Noop => Ok(Action::Empty),
            ActionKind::Reply => Ok(Action::Reply {
                records: self.records(fields, query)?,
                done,
                stop,
            }),
            ActionKind::Rewrite => Ok(Action::Rewrite {
                records: self.records(fields, query)?,
                done,
                stop,
            }),
            ActionKind::Question => Ok(Action::Question {
                query: parse_question(fields)?,
                done,
                stop,
            }),
        }
    }

    /// Same as [`interpret`](Self::interpret), but a malformed result is
    /// logged and treated as a passthrough.
    pub fn interpret_or_empty(&self, phase: Phase, query: &HookQuery, raw: &Value) -> Action {
        match self.interpret(phase, query, raw) {
            Ok(action) => action,
            Err(e) => {
                warn!(
                    phase = %phase,
                    qname = %query.name,
                    error = %e,
                    "Discarding malformed hook action"
                );
                Action::Empty
            }
        }
    }

    fn records(&self, fields: &Fields, query: &HookQuery) -> Result<Vec<ResourceRecord>, HookError> {
        let entries = match fields.get("RR") {
            Some(Value::Array(entries)) if !entries.is_empty() => entries,
            Some(Value::Array(_)) => return Err(HookError::malformed("RR must not be empty")),
            Some(_) => return Err(HookError::malformed("RR must be an array")),
            None => return Err(HookError::malformed("missing RR")),
        };

        let default_type = match fields.get("type") {
            Some(value) => parse_type(value)?,
            None => query.record_type,
        };
        let default_ttl = match fields.get("TTL") {
            Some(value) => parse_ttl(value)?,
            None => self.default_ttl,
        };

        entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                let entry = entry
                    .as_object()
                    .ok_or_else(|| HookError::malformed(format!("RR[{}] is not an object", idx)))?;
                build_record(entry, &query.name, default_type, default_ttl)
                    .map_err(|e| HookError::malformed(format!("RR[{}]: {}", idx, e)))
            })
            .collect()
    }
}

fn parse_kind(value: &Value) -> Result<ActionKind, HookError> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(ActionKind::from_code)
            .ok_or_else(|| HookError::malformed(format!("unknown action code {}", n))),
        Value::String(name) => ActionKind::from_str(name).map_err(HookError::MalformedAction),
        other => Err(HookError::malformed(format!("invalid action value {}", other))),
    }
}

fn flag(fields: &Fields, name: &str, alias: &str) -> Result<bool, HookError> {
    match fields.get(name).or_else(|| fields.get(alias)) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(HookError::malformed(format!(
            "{} must be a boolean, got {}",
            name, other
        ))),
    }
}

fn parse_type(value: &Value) -> Result<RecordType, HookError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|code| u16::try_from(code).ok())
            .and_then(RecordType::from_u16)
            .ok_or_else(|| HookError::malformed(format!("unsupported record type {}", n))),
        Value::String(s) => RecordType::from_str(s).map_err(HookError::MalformedAction),
        other => Err(HookError::malformed(format!("invalid record type {}", other))),
    }
}

fn parse_ttl(value: &Value) -> Result<u32, HookError> {
    value
        .as_u64()
        .and_then(|ttl| u32::try_from(ttl).ok())
        .ok_or_else(|| HookError::malformed(format!("invalid TTL {}", value)))
}

fn parse_question(fields: &Fields) -> Result<HookQuery, HookError> {
    let question = fields
        .get("question")
        .and_then(Value::as_object)
        .ok_or_else(|| HookError::malformed("Question requires a question object"))?;

    let record_type = parse_type(
        question
            .get("type")
            .ok_or_else(|| HookError::malformed("question.type is missing"))?,
    )?;
    let name = question
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| HookError::malformed("question.name is missing"))?;

    if !is_fqdn(name) {
        return Err(HookError::malformed(format!(
            "question.name '{}' is not fully qualified",
            name
        )));
    }

    Ok(HookQuery::new(name, record_type))
}

fn build_record(
    entry: &Fields,
    owner: &Arc<str>,
    default_type: RecordType,
    default_ttl: u32,
) -> Result<ResourceRecord, String> {
    let record_type = match entry.get("type") {
        Some(value) => parse_type(value).map_err(|e| e.to_string())?,
        None => default_type,
    };
    let ttl = match entry.get("TTL").or_else(|| entry.get("ttl")) {
        Some(value) => parse_ttl(value).map_err(|e| e.to_string())?,
        None => default_ttl,
    };

    let data = match record_type {
        RecordType::A => {
            let ip = text(entry, "ip")?;
            RecordData::A(
                Ipv4Addr::from_str(ip).map_err(|_| format!("'{}' is not an IPv4 address", ip))?,
            )
        }
        RecordType::AAAA => {
            let ip = text(entry, "ip")?;
            RecordData::AAAA(
                Ipv6Addr::from_str(ip).map_err(|_| format!("'{}' is not an IPv6 address", ip))?,
            )
        }
        RecordType::TXT => RecordData::TXT(text(entry, "target")?.to_string()),
        RecordType::CNAME => RecordData::CNAME(domain(entry, "aliased")?),
        RecordType::NS => RecordData::NS(domain(entry, "host")?),
        RecordType::PTR => RecordData::PTR(domain(entry, "target")?),
        RecordType::MX => RecordData::MX {
            preference: number(entry, "priority")?,
            exchange: domain(entry, "host")?,
        },
        RecordType::SRV => RecordData::SRV {
            priority: number(entry, "priority")?,
            weight: number(entry, "weight")?,
            port: number(entry, "port")?,
            target: domain(entry, "target")?,
        },
        RecordType::SOA => return Err("SOA records cannot be built by scripts".to_string()),
    };

    Ok(ResourceRecord::new(Arc::clone(owner), ttl, data))
}

fn text<'a>(entry: &'a Fields, key: &str) -> Result<&'a str, String> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("missing string field '{}'", key))
}

fn number(entry: &Fields, key: &str) -> Result<u16, String> {
    entry
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|n| u16::try_from(n).ok())
        .ok_or_else(|| format!("field '{}' must be an integer between 0 and 65535", key))
}

/// Names returned by scripts are made absolute so they can go straight on the wire.
fn domain(entry: &Fields, key: &str) -> Result<Arc<str>, String> {
    let name = text(entry, key)?.trim();
    if name.is_empty() {
        return Err(format!("field '{}' is empty", key));
    }
    if name.ends_with('.') {
        Ok(Arc::from(name))
    } else {
        Ok(Arc::from(format!("{}.", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_domain_appends_trailing_dot() {
        let entry = json!({ "host": "mail.example.com" });
        let fields = entry.as_object().unwrap();
        assert_eq!(domain(fields, "host").unwrap().as_ref(), "mail.example.com.");
    }

    #[test]
    fn test_number_rejects_out_of_range() {
        let entry = json!({ "port": 70000 });
        assert!(number(entry.as_object().unwrap(), "port").is_err());
    }
}
