//! The `/models` listing probe.

use anyhow::Result;
use serde_json::Value;

use crate::probe::Prober;

/// List available models across candidate base URLs, dumping the result to
/// stdout. The model list is the body's `data` field when present, else the
/// whole body.
pub async fn list(prober: &Prober) -> Result<Value> {
    let body = prober.get_first("models", "/models").await?;
    let models = extract_models(body);
    println!("{}", serde_json::to_string_pretty(&models)?);
    Ok(models)
}

fn extract_models(body: Value) -> Value {
    match body {
        Value::Object(mut map) => match map.remove("data") {
            Some(data) => data,
            None => Value::Object(map),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_data_field_when_present() {
        let body = json!({"data": [{"id": "m1"}], "object": "list"});
        assert_eq!(extract_models(body), json!([{"id": "m1"}]));
    }

    #[test]
    fn falls_back_to_whole_body_without_data() {
        let body = json!({"models": [{"id": "m1"}]});
        assert_eq!(extract_models(body.clone()), body);
    }

    #[test]
    fn non_object_bodies_pass_through() {
        let body = json!([{"id": "m1"}]);
        assert_eq!(extract_models(body.clone()), body);
    }
}
