//! Converts the platform's raw option JSON into the internal tagged-variant
//! tree (spec §9 "Dynamic-typed option trees"). Discord-shaped options carry
//! either a scalar `value` or a nested `options` array; never both.

use serde_json::Value;

use syrus_core::types::{CommandOption, OptionValue};

pub fn parse_options(raw: &Value) -> Vec<CommandOption> {
    let Some(items) = raw.as_array() else { return Vec::new() };
    items.iter().filter_map(parse_one).collect()
}

fn parse_one(raw: &Value) -> Option<CommandOption> {
    let name = raw.get("name")?.as_str()?.to_string();
    let value = match raw.get("options") {
        Some(children) if children.is_array() => OptionValue::Sequence(parse_options(children)),
        _ => OptionValue::Scalar(raw.get("value").cloned().unwrap_or(Value::Null)),
    };
    Some(CommandOption { name, value })
}
