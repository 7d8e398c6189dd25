//! Detection request model
//!
//! One network-flow record as submitted through the detection form, and the
//! label the classifier maps it to.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Form fields in model column order
pub const DETECTION_FIELDS: [&str; 10] = [
    "timestamp",
    "src_ip_octet",
    "dst_ip_octet",
    "src_port",
    "dst_port",
    "protocol",
    "service",
    "packet_count",
    "byte_count",
    "duration",
];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("missing required field `{0}`")]
    Missing(&'static str),

    #[error("field `{field}` must be an integer, got {value:?}")]
    NotInteger { field: &'static str, value: String },

    #[error("field `{field}` must be a number, got {value:?}")]
    NotNumber { field: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionRecord {
    pub timestamp: String,
    pub src_ip_octet: String,
    pub dst_ip_octet: String,
    pub src_port: i64,
    pub dst_port: i64,
    pub protocol: String,
    pub service: String,
    pub packet_count: i64,
    pub byte_count: i64,
    pub duration: f64,
}

/// A single cell of the one-row model input
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColumnValue<'a> {
    Text(&'a str),
    Int(i64),
    Float(f64),
}

impl DetectionRecord {
    /// Parse and coerce the submitted form. Every field must be present.
    /// Text fields may be blank and are passed on as empty strings; numeric
    /// fields must hold a value.
    pub fn from_form(form: &HashMap<String, String>) -> Result<Self, FieldError> {
        Ok(Self {
            timestamp: text(form, "timestamp")?,
            src_ip_octet: text(form, "src_ip_octet")?,
            dst_ip_octet: text(form, "dst_ip_octet")?,
            src_port: integer(form, "src_port")?,
            dst_port: integer(form, "dst_port")?,
            protocol: text(form, "protocol")?,
            service: text(form, "service")?,
            packet_count: integer(form, "packet_count")?,
            byte_count: integer(form, "byte_count")?,
            duration: number(form, "duration")?,
        })
    }

    /// Look up a column by its model input name
    pub fn column(&self, name: &str) -> Option<ColumnValue<'_>> {
        let value = match name {
            "timestamp" => ColumnValue::Text(&self.timestamp),
            "src_ip_octet" => ColumnValue::Text(&self.src_ip_octet),
            "dst_ip_octet" => ColumnValue::Text(&self.dst_ip_octet),
            "src_port" => ColumnValue::Int(self.src_port),
            "dst_port" => ColumnValue::Int(self.dst_port),
            "protocol" => ColumnValue::Text(&self.protocol),
            "service" => ColumnValue::Text(&self.service),
            "packet_count" => ColumnValue::Int(self.packet_count),
            "byte_count" => ColumnValue::Int(self.byte_count),
            "duration" => ColumnValue::Float(self.duration),
            _ => return None,
        };
        Some(value)
    }
}

fn raw<'a>(form: &'a HashMap<String, String>, field: &'static str) -> Result<&'a str, FieldError> {
    form.get(field)
        .map(|v| v.trim())
        .ok_or(FieldError::Missing(field))
}

/// Like `raw`, but a blank value counts as missing
fn filled<'a>(form: &'a HashMap<String, String>, field: &'static str) -> Result<&'a str, FieldError> {
    raw(form, field).and_then(|v| {
        if v.is_empty() {
            Err(FieldError::Missing(field))
        } else {
            Ok(v)
        }
    })
}

fn text(form: &HashMap<String, String>, field: &'static str) -> Result<String, FieldError> {
    raw(form, field).map(str::to_string)
}

fn integer(form: &HashMap<String, String>, field: &'static str) -> Result<i64, FieldError> {
    let value = filled(form, field)?;
    value.parse().map_err(|_| FieldError::NotInteger {
        field,
        value: value.to_string(),
    })
}

fn number(form: &HashMap<String, String>, field: &'static str) -> Result<f64, FieldError> {
    let value = filled(form, field)?;
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FieldError::NotNumber {
            field,
            value: value.to_string(),
        })
}

/// Binary classifier output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Anomaly,
    Normal,
}

impl Label {
    /// Map the model's first output: any non-zero value is an anomaly
    pub fn from_prediction(value: i64) -> Self {
        if value != 0 {
            Label::Anomaly
        } else {
            Label::Normal
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Anomaly => write!(f, "Anomaly detected!"),
            Label::Normal => write!(f, "Normal traffic."),
        }
    }
}

/// What the detect page shows after a submission
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionOutcome {
    Label(Label),
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> HashMap<String, String> {
        [
            ("timestamp", "2024-05-01 10:00:00"),
            ("src_ip_octet", "192"),
            ("dst_ip_octet", "10"),
            ("src_port", "51515"),
            ("dst_port", "443"),
            ("protocol", "TCP"),
            ("service", "https"),
            ("packet_count", "12"),
            ("byte_count", "5120"),
            ("duration", "0.75"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn test_from_form_valid() {
        let record = DetectionRecord::from_form(&valid_form()).unwrap();
        assert_eq!(record.src_port, 51515);
        assert_eq!(record.dst_port, 443);
        assert_eq!(record.packet_count, 12);
        assert_eq!(record.byte_count, 5120);
        assert_eq!(record.duration, 0.75);
        assert_eq!(record.protocol, "TCP");
    }

    #[test]
    fn test_from_form_trims_values() {
        let mut form = valid_form();
        form.insert("dst_port".into(), " 80 ".into());
        let record = DetectionRecord::from_form(&form).unwrap();
        assert_eq!(record.dst_port, 80);
    }

    #[test]
    fn test_non_numeric_port() {
        let mut form = valid_form();
        form.insert("src_port".into(), "abc".into());
        let err = DetectionRecord::from_form(&form).unwrap_err();
        assert_eq!(
            err,
            FieldError::NotInteger { field: "src_port", value: "abc".into() }
        );
        assert!(err.to_string().contains("src_port"));
    }

    #[test]
    fn test_float_count_is_rejected() {
        let mut form = valid_form();
        form.insert("packet_count".into(), "1.5".into());
        assert!(matches!(
            DetectionRecord::from_form(&form),
            Err(FieldError::NotInteger { field: "packet_count", .. })
        ));
    }

    #[test]
    fn test_bad_duration() {
        let mut form = valid_form();
        form.insert("duration".into(), "NaN".into());
        assert!(matches!(
            DetectionRecord::from_form(&form),
            Err(FieldError::NotNumber { field: "duration", .. })
        ));
    }

    #[test]
    fn test_missing_field() {
        let mut form = valid_form();
        form.remove("service");
        assert_eq!(
            DetectionRecord::from_form(&form),
            Err(FieldError::Missing("service"))
        );
    }

    #[test]
    fn test_blank_text_field_is_accepted() {
        let mut form = valid_form();
        form.insert("protocol".into(), "".into());
        form.insert("timestamp".into(), "  ".into());
        let record = DetectionRecord::from_form(&form).unwrap();
        assert_eq!(record.protocol, "");
        assert_eq!(record.timestamp, "");
    }

    #[test]
    fn test_blank_numeric_field_is_missing() {
        let mut form = valid_form();
        form.insert("dst_port".into(), " ".into());
        assert_eq!(
            DetectionRecord::from_form(&form),
            Err(FieldError::Missing("dst_port"))
        );
    }

    #[test]
    fn test_every_field_is_a_column() {
        let record = DetectionRecord::from_form(&valid_form()).unwrap();
        for field in DETECTION_FIELDS {
            assert!(record.column(field).is_some(), "{field}");
        }
        assert_eq!(record.column("src_port"), Some(ColumnValue::Int(51515)));
        assert_eq!(record.column("duration"), Some(ColumnValue::Float(0.75)));
        assert_eq!(record.column("label"), None);
    }

    #[test]
    fn test_label_mapping() {
        assert_eq!(Label::from_prediction(1), Label::Anomaly);
        assert_eq!(Label::from_prediction(-1), Label::Anomaly);
        assert_eq!(Label::from_prediction(0), Label::Normal);
        assert_eq!(Label::Anomaly.to_string(), "Anomaly detected!");
        assert_eq!(Label::Normal.to_string(), "Normal traffic.");
    }
}
