use super::*;

#[test]
fn decode_config_types_success() {
    let body = r#"{
        "success": true,
        "config_types": [
            {"value": "vlan_management", "name": "VLAN Management"},
            {"value": "static_route", "name": "Static Route"}
        ]
    }"#;
    let opts = decode_config_types(body).unwrap();
    assert_eq!(opts.len(), 2);
    assert_eq!(opts[0].value, "vlan_management");
    assert_eq!(opts[0].name, "VLAN Management");
    assert_eq!(opts[1].value, "static_route");
}

#[test]
fn decode_config_types_backend_failure_carries_message() {
    let body = r#"{"success": false, "error": "unknown vendor"}"#;
    match decode_config_types(body) {
        Err(ApiError::Backend(msg)) => assert_eq!(msg, "unknown vendor"),
        other => panic!("expected Backend error, got {other:?}"),
    }
}

#[test]
fn decode_config_types_backend_failure_without_message_uses_default() {
    let body = r#"{"success": false}"#;
    match decode_config_types(body) {
        Err(ApiError::Backend(msg)) => assert!(msg.contains("config types")),
        other => panic!("expected Backend error, got {other:?}"),
    }
}

#[test]
fn decode_config_types_malformed_body_is_fetch_error() {
    match decode_config_types("not json at all") {
        Err(ApiError::Fetch(_)) => {}
        other => panic!("expected Fetch error, got {other:?}"),
    }
}

#[test]
fn decode_template_info_success() {
    let body = r#"{
        "success": true,
        "template_info": {
            "description": "VLAN configuration",
            "parameters": {
                "vlan_id": {"type": "integer", "required": true, "range": [1, 4094]},
                "vlan_name": {"type": "text", "max_length": 32}
            },
            "example": {"vlan_id": "100"}
        }
    }"#;
    let info = decode_template_info(body).unwrap();
    assert_eq!(info.description.as_deref(), Some("VLAN configuration"));
    assert_eq!(info.parameters.len(), 2);
    assert_eq!(info.parameters["vlan_id"].range, Some((1, 4094)));
    assert_eq!(info.parameters["vlan_name"].max_length, Some(32));
    assert_eq!(
        info.example.as_ref().and_then(|e| e.get("vlan_id")),
        Some(&serde_json::json!("100"))
    );
}

#[test]
fn decode_template_info_missing_payload_is_fetch_error() {
    let body = r#"{"success": true}"#;
    match decode_template_info(body) {
        Err(ApiError::Fetch(msg)) => assert!(msg.contains("template_info")),
        other => panic!("expected Fetch error, got {other:?}"),
    }
}

#[test]
fn decode_generate_returns_commands_in_order() {
    let body = r#"{
        "success": true,
        "commands": ["system-view", "vlan 100", "quit"]
    }"#;
    let commands = decode_generate(body).unwrap();
    assert_eq!(commands, vec!["system-view", "vlan 100", "quit"]);
}

#[test]
fn decode_generate_backend_failure() {
    let body = r#"{"success": false, "error": "rendered commands are empty", "commands": []}"#;
    match decode_generate(body) {
        Err(ApiError::Backend(msg)) => assert!(msg.contains("empty")),
        other => panic!("expected Backend error, got {other:?}"),
    }
}
