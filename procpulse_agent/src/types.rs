//! Record payload appended to the metrics stream.
//! Keep this module minimal and stable; it defines the wire format.

use serde::Serialize;

/// One observation of a running process. Serialized as the `data` field of a
/// stream record; the aggregator relies on exactly these four fields.
#[derive(Debug, Serialize, Clone)]
pub struct ProcessSample {
    pub pid: u32,
    pub cpu_percent: f64,
    pub mem_mb: f64,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_serializes_with_exactly_four_fields() {
        let s = ProcessSample {
            pid: 1042,
            cpu_percent: 12.5,
            mem_mb: 80.0,
            name: "nginx".into(),
        };
        let v = serde_json::to_value(&s).unwrap();
        let obj = v.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        assert!(obj["pid"].is_u64());
        assert!(obj["cpu_percent"].is_f64());
        assert!(obj["mem_mb"].is_f64());
        assert!(obj["name"].is_string());
        assert_eq!(obj["pid"], 1042);
        assert_eq!(obj["name"], "nginx");
    }
}
