//! Test fixtures

/// One ntfy JSON stream line, newline terminated
pub fn ndjson(event: &str, topic: &str, message: Option<&str>) -> String {
    let mut value = serde_json::json!({
        "id": "test",
        "time": 1_700_000_000,
        "event": event,
        "topic": topic,
    });
    if let Some(message) = message {
        value["message"] = serde_json::Value::from(message);
    }
    format!("{}\n", value)
}
