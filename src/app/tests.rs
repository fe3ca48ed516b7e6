use super::*;
use crate::model::{ConfigTypeOption, TemplateInfo};
use crate::widgets::form::FieldKind;
use serde_json::json;

fn config_types(pairs: &[(&str, &str)]) -> Vec<ConfigTypeOption> {
    pairs
        .iter()
        .map(|(value, name)| ConfigTypeOption {
            value: value.to_string(),
            name: name.to_string(),
        })
        .collect()
}

fn template(v: serde_json::Value) -> TemplateInfo {
    serde_json::from_value(v).unwrap()
}

fn fetch_generation(effects: &[Effect]) -> u64 {
    match effects {
        [Effect::FetchConfigTypes { generation, .. }] => *generation,
        [Effect::FetchTemplate { generation, .. }] => *generation,
        _ => panic!("expected a single fetch effect"),
    }
}

#[test]
fn vendor_selection_starts_config_type_load() {
    let mut st = AppState::default();
    let effs = update(&mut st, AppMsg::SelectVendor("huawei".into()));
    assert_eq!(st.vendor, "huawei");
    assert!(st.config_type.is_empty());
    assert!(st.config_type_selector.loading);
    assert!(!st.config_type_selector.enabled);
    assert!(matches!(st.pane, ParamsPane::Hidden));
    assert!(!st.generate_enabled);
    match &effs[..] {
        [Effect::FetchConfigTypes { vendor, generation }] => {
            assert_eq!(vendor, "huawei");
            assert_eq!(*generation, st.generation);
        }
        _ => panic!("expected a config types fetch"),
    }
}

#[test]
fn cascade_end_to_end_builds_required_number_field() {
    let mut st = AppState::default();
    let effs = update(&mut st, AppMsg::SelectVendor("huawei".into()));
    let generation = fetch_generation(&effs);
    let _ = update(
        &mut st,
        AppMsg::LoadedConfigTypes {
            generation,
            outcome: Ok(LoadOutcome::ConfigTypes(config_types(&[("vlan", "VLAN")]))),
        },
    );
    // leading deselect entry plus the one option
    assert_eq!(st.config_type_selector.options.len(), 2);
    assert_eq!(st.config_type_selector.options[1].value, "vlan");
    assert_eq!(st.config_type_selector.options[1].label, "VLAN");
    assert!(st.config_type_selector.enabled);
    assert_eq!(st.focus, Focus::ConfigType);

    let effs = update(&mut st, AppMsg::SelectConfigType("vlan".into()));
    let generation = match &effs[..] {
        [Effect::FetchTemplate {
            vendor,
            config_type,
            generation,
        }] => {
            assert_eq!(vendor, "huawei");
            assert_eq!(config_type, "vlan");
            *generation
        }
        _ => panic!("expected a template fetch"),
    };
    let info = template(json!({
        "parameters": {
            "vlan_id": {"type": "integer", "required": true, "range": [1, 4094]}
        },
        "example": {"vlan_id": "100"}
    }));
    let _ = update(
        &mut st,
        AppMsg::LoadedTemplate {
            generation,
            outcome: Ok(LoadOutcome::Template(info)),
        },
    );
    assert!(st.generate_enabled);
    assert_eq!(st.focus, Focus::Params);
    let ParamsPane::Form(form) = &st.pane else {
        panic!("expected a parameter form");
    };
    assert_eq!(form.fields.len(), 1);
    let fld = &form.fields[0];
    assert_eq!(fld.name, "vlan_id");
    assert!(fld.required);
    assert_eq!(
        fld.kind,
        FieldKind::Number {
            min: Some(1),
            max: Some(4094)
        }
    );

    let _ = update(&mut st, AppMsg::ApplyExample);
    let ParamsPane::Form(form) = &st.pane else {
        panic!("expected a parameter form");
    };
    assert_eq!(form.fields[0].value, "100");
}

#[test]
fn stale_config_types_response_is_dropped() {
    let mut st = AppState::default();
    let effs = update(&mut st, AppMsg::SelectVendor("cisco".into()));
    let stale_generation = fetch_generation(&effs);

    // user clears the vendor before the fetch resolves
    let _ = update(&mut st, AppMsg::SelectVendor(String::new()));
    assert!(!st.config_type_selector.enabled);
    assert_eq!(st.config_type_selector.placeholder, CONFIG_TYPE_IDLE);

    let effs = update(
        &mut st,
        AppMsg::LoadedConfigTypes {
            generation: stale_generation,
            outcome: Ok(LoadOutcome::ConfigTypes(config_types(&[("vlan", "VLAN")]))),
        },
    );
    assert!(effs.is_empty());
    assert!(st.config_type_selector.options.is_empty());
    assert!(!st.config_type_selector.enabled);
    assert_eq!(st.config_type_selector.placeholder, CONFIG_TYPE_IDLE);
}

#[test]
fn config_type_load_failure_is_retryable() {
    let mut st = AppState::default();
    let effs = update(&mut st, AppMsg::SelectVendor("cisco".into()));
    let generation = fetch_generation(&effs);
    let effs = update(
        &mut st,
        AppMsg::LoadedConfigTypes {
            generation,
            outcome: Err(ApiError::Backend("unknown vendor".into())),
        },
    );
    assert!(st.config_type_selector.enabled);
    assert!(st.config_type_selector.options.is_empty());
    assert_eq!(st.config_type_selector.placeholder, CONFIG_TYPE_FAILED);
    assert!(matches!(
        &effs[..],
        [Effect::ShowToast {
            level: ToastLevel::Error,
            ..
        }]
    ));

    // re-selecting the same vendor issues a fresh request, no cached failure
    let old_generation = st.generation;
    let effs = update(&mut st, AppMsg::SelectVendor("cisco".into()));
    let generation = fetch_generation(&effs);
    assert!(generation > old_generation);
}

#[test]
fn template_failure_hides_parameter_section() {
    let mut st = AppState::default();
    let effs = update(&mut st, AppMsg::SelectVendor("h3c".into()));
    let generation = fetch_generation(&effs);
    let _ = update(
        &mut st,
        AppMsg::LoadedConfigTypes {
            generation,
            outcome: Ok(LoadOutcome::ConfigTypes(config_types(&[("acl", "ACL")]))),
        },
    );
    let effs = update(&mut st, AppMsg::SelectConfigType("acl".into()));
    let generation = fetch_generation(&effs);
    let effs = update(
        &mut st,
        AppMsg::LoadedTemplate {
            generation,
            outcome: Err(ApiError::Fetch("connection refused".into())),
        },
    );
    assert!(matches!(st.pane, ParamsPane::Hidden));
    assert!(!st.generate_enabled);
    assert!(matches!(
        &effs[..],
        [Effect::ShowToast {
            level: ToastLevel::Error,
            ..
        }]
    ));
}

#[test]
fn empty_template_shows_no_params_notice() {
    let mut st = AppState::default();
    let effs = update(&mut st, AppMsg::SelectVendor("ruijie".into()));
    let generation = fetch_generation(&effs);
    let _ = update(
        &mut st,
        AppMsg::LoadedConfigTypes {
            generation,
            outcome: Ok(LoadOutcome::ConfigTypes(config_types(&[("save", "Save")]))),
        },
    );
    let effs = update(&mut st, AppMsg::SelectConfigType("save".into()));
    let generation = fetch_generation(&effs);
    let _ = update(
        &mut st,
        AppMsg::LoadedTemplate {
            generation,
            outcome: Ok(LoadOutcome::Template(template(json!({"parameters": {}})))),
        },
    );
    assert!(matches!(st.pane, ParamsPane::NoParams));
    assert!(st.generate_enabled);
}

#[test]
fn clearing_config_type_hides_form_without_refetch() {
    let mut st = form_ready_state();
    let effs = update(&mut st, AppMsg::SelectConfigType(String::new()));
    assert!(effs.is_empty());
    assert!(matches!(st.pane, ParamsPane::Hidden));
    assert!(!st.generate_enabled);
    // config type options survive; only the selection cleared
    assert_eq!(st.config_type_selector.options.len(), 2);
}

#[test]
fn vendor_change_clears_config_type_selection() {
    let mut st = form_ready_state();
    assert_eq!(st.config_type, "vlan");
    let effs = update(&mut st, AppMsg::SelectVendor("h3c".into()));
    assert_eq!(st.vendor, "h3c");
    assert!(st.config_type.is_empty());
    assert!(matches!(st.pane, ParamsPane::Hidden));
    assert!(matches!(&effs[..], [Effect::FetchConfigTypes { .. }]));
}

#[test]
fn reset_returns_to_idle_from_any_state() {
    let mut st = form_ready_state();
    st.vendor_selector.chosen = Some(1);
    let effs = update(&mut st, AppMsg::Reset);
    assert!(st.vendor.is_empty());
    assert!(st.config_type.is_empty());
    assert!(st.vendor_selector.chosen.is_none());
    assert!(!st.config_type_selector.enabled);
    assert_eq!(st.config_type_selector.placeholder, CONFIG_TYPE_IDLE);
    assert!(matches!(st.pane, ParamsPane::Hidden));
    assert!(!st.generate_enabled);
    assert_eq!(st.focus, Focus::Vendor);
    assert!(matches!(
        &effs[..],
        [Effect::ShowToast {
            level: ToastLevel::Success,
            ..
        }]
    ));
}

#[test]
fn generate_validates_before_submitting() {
    let mut st = form_ready_state();
    let effs = update(&mut st, AppMsg::Generate);
    assert!(matches!(
        &effs[..],
        [Effect::ShowToast {
            level: ToastLevel::Error,
            ..
        }]
    ));
    assert!(!st.submitting);
    let ParamsPane::Form(form) = &st.pane else {
        panic!("expected a parameter form");
    };
    assert!(form.fields[0].error.is_some());
}

#[test]
fn generate_submits_and_shows_result() {
    let mut st = form_ready_state();
    if let ParamsPane::Form(form) = &mut st.pane {
        form.fields[0].value = "100".into();
    }
    let effs = update(&mut st, AppMsg::Generate);
    let generation = match &effs[..] {
        [Effect::SubmitGenerate {
            vendor,
            config_type,
            parameters,
            generation,
        }] => {
            assert_eq!(vendor, "huawei");
            assert_eq!(config_type, "vlan");
            assert_eq!(parameters, &json!({"vlan_id": "100"}));
            *generation
        }
        _ => panic!("expected a generate submission"),
    };
    assert!(st.submitting);
    if let ParamsPane::Form(form) = &st.pane {
        assert!(form.disabled);
    }

    let effs = update(
        &mut st,
        AppMsg::LoadedGenerate {
            generation,
            outcome: Ok(LoadOutcome::Generated(vec![
                "vlan 100".into(),
                "quit".into(),
            ])),
        },
    );
    assert!(!st.submitting);
    let ParamsPane::Result { view, form } = &st.pane else {
        panic!("expected the result pane");
    };
    assert_eq!(view.commands, vec!["vlan 100", "quit"]);
    assert!(form.is_some());
    assert!(matches!(
        &effs[..],
        [Effect::ShowToast {
            level: ToastLevel::Success,
            ..
        }]
    ));
}

#[test]
fn stale_generate_response_is_dropped() {
    let mut st = form_ready_state();
    if let ParamsPane::Form(form) = &mut st.pane {
        form.fields[0].value = "100".into();
    }
    let effs = update(&mut st, AppMsg::Generate);
    let generation = match &effs[..] {
        [Effect::SubmitGenerate { generation, .. }] => *generation,
        _ => panic!("expected a generate submission"),
    };
    let _ = update(&mut st, AppMsg::SelectVendor(String::new()));
    let effs = update(
        &mut st,
        AppMsg::LoadedGenerate {
            generation,
            outcome: Ok(LoadOutcome::Generated(vec!["vlan 100".into()])),
        },
    );
    assert!(effs.is_empty());
    assert!(matches!(st.pane, ParamsPane::Hidden));
}

#[test]
fn generate_from_no_params_template_submits_empty_object() {
    let mut st = AppState::default();
    let effs = update(&mut st, AppMsg::SelectVendor("cisco".into()));
    let generation = fetch_generation(&effs);
    let _ = update(
        &mut st,
        AppMsg::LoadedConfigTypes {
            generation,
            outcome: Ok(LoadOutcome::ConfigTypes(config_types(&[("save", "Save")]))),
        },
    );
    let effs = update(&mut st, AppMsg::SelectConfigType("save".into()));
    let generation = fetch_generation(&effs);
    let _ = update(
        &mut st,
        AppMsg::LoadedTemplate {
            generation,
            outcome: Ok(LoadOutcome::Template(template(json!({})))),
        },
    );
    let effs = update(&mut st, AppMsg::Generate);
    match &effs[..] {
        [Effect::SubmitGenerate { parameters, .. }] => {
            assert_eq!(parameters, &json!({}));
        }
        _ => panic!("expected a generate submission"),
    }
}

/// Drive the workflow to FormReady for huawei/vlan with one required
/// vlan_id field.
fn form_ready_state() -> AppState {
    let mut st = AppState::default();
    let effs = update(&mut st, AppMsg::SelectVendor("huawei".into()));
    let generation = fetch_generation(&effs);
    let _ = update(
        &mut st,
        AppMsg::LoadedConfigTypes {
            generation,
            outcome: Ok(LoadOutcome::ConfigTypes(config_types(&[("vlan", "VLAN")]))),
        },
    );
    let effs = update(&mut st, AppMsg::SelectConfigType("vlan".into()));
    let generation = fetch_generation(&effs);
    let _ = update(
        &mut st,
        AppMsg::LoadedTemplate {
            generation,
            outcome: Ok(LoadOutcome::Template(template(json!({
                "parameters": {
                    "vlan_id": {"type": "integer", "required": true, "range": [1, 4094]}
                }
            })))),
        },
    );
    st
}
