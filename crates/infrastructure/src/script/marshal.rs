use ferrous_hooks_domain::{HookError, RecordData, ResourceRecord};
use rquickjs::{Ctx, Value};
use serde_json::{json, Value as JsonValue};

/// Plain JSON view of the answers, turned into frozen accessor objects by
/// the prelude.
pub fn answers_to_json(records: &[ResourceRecord]) -> JsonValue {
    JsonValue::Array(records.iter().map(record_to_json).collect())
}

fn record_to_json(record: &ResourceRecord) -> JsonValue {
    let mut view = json!({
        "name": record.name.as_ref(),
        "type": record.record_type().to_u16(),
        "ttl": record.ttl,
    });

    let payload = match &record.data {
        RecordData::A(ip) => json!({ "ip": ip.to_string() }),
        RecordData::AAAA(ip) => json!({ "ip": ip.to_string() }),
        RecordData::CNAME(target) | RecordData::NS(target) | RecordData::PTR(target) => {
            json!({ "target": target.as_ref() })
        }
        RecordData::MX {
            preference,
            exchange,
        } => json!({ "target": exchange.as_ref(), "preference": preference }),
        RecordData::SRV {
            priority,
            weight,
            port,
            target,
        } => json!({
            "target": target.as_ref(),
            "priority": priority,
            "weight": weight,
            "port": port,
        }),
        RecordData::TXT(text) => json!({ "txt": text }),
    };

    if let (Some(view), JsonValue::Object(payload)) = (view.as_object_mut(), payload) {
        view.extend(payload);
    }
    view
}

/// Parses JSON produced on the Rust side into a value of `ctx`.
pub fn json_to_js<'js>(ctx: &Ctx<'js>, value: &JsonValue) -> rquickjs::Result<Value<'js>> {
    ctx.json_parse(value.to_string())
}

/// Serializes a script result through `JSON.stringify`. `undefined`,
/// functions and symbols come back as `Null`.
pub fn js_to_json<'js>(ctx: &Ctx<'js>, value: Value<'js>) -> rquickjs::Result<Option<String>> {
    match ctx.json_stringify(value)? {
        Some(text) => Ok(Some(text.to_string()?)),
        None => Ok(None),
    }
}

pub fn parse_result(text: Option<String>) -> Result<JsonValue, HookError> {
    match text {
        Some(text) => serde_json::from_str(&text)
            .map_err(|e| HookError::ScriptRuntime(format!("Unreadable script result: {}", e))),
        None => Ok(JsonValue::Null),
    }
}
