use crate::command::query::HlQuery;
use serde_json::{Value, json};
use std::collections::HashMap;

const HOUR_NS: i64 = 3_600_000_000_000;

/// Builds `HlQuery` values through their JSON input form.
pub struct HlQueryFactory {
    params: HashMap<String, Value>,
}

impl HlQueryFactory {
    pub fn new() -> Self {
        let mut params = HashMap::new();
        params.insert("human_label".into(), json!("Cassandra max cpu, rand 1 host, rand 1hr by 1m"));
        params.insert("human_description".into(), json!("test query"));
        params.insert("id".into(), json!(1));
        params.insert("measurement_name".into(), json!("cpu"));
        params.insert("field_name".into(), json!("usage_user"));
        params.insert("aggregation_type".into(), json!("max"));
        params.insert("time_start".into(), json!("2016-01-01T00:00:00Z"));
        params.insert("time_end".into(), json!("2016-01-01T03:00:00Z"));
        params.insert("group_by_duration".into(), json!(HOUR_NS));
        params.insert("tag_sets".into(), json!([["hostname=host_0"]]));
        Self { params }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    pub fn create(self) -> HlQuery {
        let obj: serde_json::Map<String, Value> = self.params.into_iter().collect();
        serde_json::from_value(Value::Object(obj)).expect("factory query should deserialize")
    }

    pub fn to_json_line(self) -> String {
        let obj: serde_json::Map<String, Value> = self.params.into_iter().collect();
        Value::Object(obj).to_string()
    }
}
