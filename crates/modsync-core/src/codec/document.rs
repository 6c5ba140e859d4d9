//! Rendering of whole cache documents with per-backend options.

use crate::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a backend's cache file is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializerOptions {
    /// Indent the output.
    pub pretty: bool,
    /// Drop object members whose value is `null`.
    pub omit_nulls: bool,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            omit_nulls: true,
        }
    }
}

/// Serialize `value` according to `options`.
///
/// Object member order is preserved in both paths.
pub fn to_string<T: Serialize>(value: &T, options: &SerializerOptions) -> Result<String> {
    if options.omit_nulls {
        let mut tree = serde_json::to_value(value)?;
        strip_nulls(&mut tree);
        render(&tree, options.pretty)
    } else {
        render(value, options.pretty)
    }
}

fn render<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(rendered)
}

fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, member| !member.is_null());
            for member in map.values_mut() {
                strip_nulls(member);
            }
        }
        Value::Array(items) => {
            for item in items {
                strip_nulls(item);
            }
        }
        _ => {}
    }
}
