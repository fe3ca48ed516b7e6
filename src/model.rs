use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize, Clone)]
pub struct VendorItem {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub header: Option<String>,
    #[serde(default = "default_vendors")]
    pub vendors: Vec<VendorItem>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            header: None,
            vendors: default_vendors(),
        }
    }
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_request_timeout_secs() -> u64 {
    15
}

fn default_vendors() -> Vec<VendorItem> {
    [
        ("huawei", "Huawei"),
        ("h3c", "H3C"),
        ("cisco", "Cisco"),
        ("ruijie", "Ruijie"),
    ]
    .iter()
    .map(|(id, title)| VendorItem {
        id: id.to_string(),
        title: title.to_string(),
    })
    .collect()
}

/// Load the app config anchored by CONFGEN_CONFIG, falling back to
/// ./confgen.yaml, falling back to the built-in defaults.
pub fn load_config() -> anyhow::Result<AppConfig> {
    use anyhow::Context;
    let path = match std::env::var("CONFGEN_CONFIG") {
        Ok(p) if !p.is_empty() => Some(std::path::PathBuf::from(p)),
        _ => {
            let default = std::path::PathBuf::from("confgen.yaml");
            if default.exists() {
                Some(default)
            } else {
                None
            }
        }
    };
    match path {
        Some(p) => {
            let s = std::fs::read_to_string(&p).with_context(|| format!("reading {p:?}"))?;
            let cfg: AppConfig =
                serde_yaml::from_str(&s).with_context(|| format!("parsing {p:?}"))?;
            Ok(cfg)
        }
        None => Ok(AppConfig::default()),
    }
}

pub(crate) fn validate_config(cfg: &AppConfig) -> Result<(), String> {
    use std::collections::HashSet;
    if cfg.api_base_url.trim().is_empty() {
        return Err("api_base_url must not be empty".to_string());
    }
    if cfg.vendors.is_empty() {
        return Err("at least one vendor must be configured".to_string());
    }
    let mut ids = HashSet::new();
    for (i, v) in cfg.vendors.iter().enumerate() {
        if v.id.trim().is_empty() {
            return Err(format!("vendor at index {i} has an empty id"));
        }
        if !ids.insert(&v.id) {
            return Err(format!("duplicate vendor id: '{}' at index {}", v.id, i));
        }
    }
    Ok(())
}

// ---- Backend data model ---------------------------------------------------

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ConfigTypeOption {
    pub value: String,
    pub name: String,
}

/// One parameter entry of a template schema. `type` is kept as a raw string
/// so unrecognized values degrade to a plain text field instead of failing
/// the whole template.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ParameterSpec {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(rename = "type", default)]
    pub type_name: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub range: Option<(i64, i64)>,
    #[serde(default)]
    pub max_length: Option<usize>,
}

/// Template schema as served by `/api/template_info/{vendor}/{config_type}`.
/// Parameter order of the source JSON object is not contractual; a BTreeMap
/// keeps iteration stable and reproducible for a given schema.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct TemplateInfo {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, ParameterSpec>,
    #[serde(default)]
    pub example: Option<BTreeMap<String, JsonValue>>,
}

/// Render an example value for insertion into an input: sequences join with
/// ", ", scalars insert verbatim.
pub fn example_text(v: &JsonValue) -> String {
    match v {
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(items) => items
            .iter()
            .map(|item| match item {
                JsonValue::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        JsonValue::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validate_detects_duplicate_vendor_ids() {
        let cfg = AppConfig {
            vendors: vec![
                VendorItem {
                    id: "cisco".into(),
                    title: "Cisco".into(),
                },
                VendorItem {
                    id: "cisco".into(),
                    title: "Cisco again".into(),
                },
            ],
            ..Default::default()
        };
        let err = validate_config(&cfg).unwrap_err();
        assert!(err.contains("duplicate vendor id"));
    }

    #[test]
    fn validate_rejects_empty_vendor_list() {
        let cfg = AppConfig {
            vendors: vec![],
            ..Default::default()
        };
        assert!(validate_config(&cfg).is_err());
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn parameter_spec_parses_range_and_defaults() {
        let spec: ParameterSpec = serde_json::from_value(json!({
            "type": "integer",
            "required": true,
            "range": [1, 4094]
        }))
        .unwrap();
        assert!(spec.required);
        assert_eq!(spec.type_name.as_deref(), Some("integer"));
        assert_eq!(spec.range, Some((1, 4094)));
        assert!(spec.options.is_none());

        let bare: ParameterSpec = serde_json::from_value(json!({})).unwrap();
        assert!(!bare.required);
        assert!(bare.type_name.is_none());
    }

    #[test]
    fn template_info_tolerates_missing_sections() {
        let info: TemplateInfo = serde_json::from_value(json!({})).unwrap();
        assert!(info.parameters.is_empty());
        assert!(info.example.is_none());

        let info: TemplateInfo = serde_json::from_value(json!({
            "description": "VLAN",
            "parameters": {"vlan_id": {"type": "integer"}},
            "example": {"vlan_id": "100"}
        }))
        .unwrap();
        assert_eq!(info.parameters.len(), 1);
        assert!(info.example.is_some());
    }

    #[test]
    fn example_text_joins_sequences_and_keeps_scalars() {
        assert_eq!(example_text(&json!("192.168.1.1/24")), "192.168.1.1/24");
        assert_eq!(example_text(&json!(["1", "2"])), "1, 2");
        assert_eq!(example_text(&json!([10, 20])), "10, 20");
        assert_eq!(example_text(&json!(100)), "100");
        assert_eq!(example_text(&json!(null)), "");
    }
}
