use crate::services::api::ApiError;
use crate::ui::{AppState, Focus, LoadOutcome, ParamsPane, ToastLevel};
use crate::widgets::form;
use crate::widgets::result_viewer::ResultView;
use crate::widgets::selector::SelectOption;
use serde_json::Value as JsonValue;

pub(crate) const CONFIG_TYPE_IDLE: &str = "Select a vendor first";
pub(crate) const CONFIG_TYPE_LOADING: &str = "Loading config types...";
pub(crate) const CONFIG_TYPE_FAILED: &str = "Load failed — press Enter to retry";
pub(crate) const SELECT_NONE: &str = "(none)";

pub enum AppMsg {
    SelectVendor(String),
    SelectConfigType(String),
    LoadedConfigTypes {
        generation: u64,
        outcome: Result<LoadOutcome, ApiError>,
    },
    LoadedTemplate {
        generation: u64,
        outcome: Result<LoadOutcome, ApiError>,
    },
    ApplyExample,
    Generate,
    LoadedGenerate {
        generation: u64,
        outcome: Result<LoadOutcome, ApiError>,
    },
    Reset,
}

pub enum Effect {
    FetchConfigTypes {
        vendor: String,
        generation: u64,
    },
    FetchTemplate {
        vendor: String,
        config_type: String,
        generation: u64,
    },
    SubmitGenerate {
        vendor: String,
        config_type: String,
        parameters: JsonValue,
        generation: u64,
    },
    ShowToast {
        text: String,
        level: ToastLevel,
        seconds: u64,
    },
}

fn toast(text: impl Into<String>, level: ToastLevel, seconds: u64) -> Effect {
    Effect::ShowToast {
        text: text.into(),
        level,
        seconds,
    }
}

/// The cascading selection workflow. Every selection-changing message bumps
/// `state.generation`; fetch effects capture it and completions echo it
/// back, so a completion that no longer matches the current selection is
/// dropped on arrival instead of overwriting newer state.
pub fn update(state: &mut AppState, msg: AppMsg) -> Vec<Effect> {
    use AppMsg::*;
    let mut effects: Vec<Effect> = Vec::new();
    match msg {
        SelectVendor(vendor) => {
            state.generation += 1;
            state.vendor = vendor.clone();
            state.config_type.clear();
            state.pane = ParamsPane::Hidden;
            state.generate_enabled = false;
            state.submitting = false;
            if vendor.is_empty() {
                state.dbg("vendor selection cleared");
                state.config_type_selector.reset(CONFIG_TYPE_IDLE, false);
                state.status_text = None;
            } else {
                state.dbg(format!("vendor selected: {vendor}"));
                state
                    .config_type_selector
                    .begin_loading(CONFIG_TYPE_LOADING);
                state.status_text = Some(format!("Loading config types for {vendor}..."));
                effects.push(Effect::FetchConfigTypes {
                    vendor,
                    generation: state.generation,
                });
            }
        }
        SelectConfigType(config_type) => {
            state.generation += 1;
            state.config_type = config_type.clone();
            state.pane = ParamsPane::Hidden;
            state.generate_enabled = false;
            state.submitting = false;
            if config_type.is_empty() || state.vendor.is_empty() {
                state.status_text = None;
            } else {
                state.dbg(format!("config type selected: {config_type}"));
                state.status_text = Some(format!("Loading template for {config_type}..."));
                effects.push(Effect::FetchTemplate {
                    vendor: state.vendor.clone(),
                    config_type,
                    generation: state.generation,
                });
            }
        }
        LoadedConfigTypes {
            generation,
            outcome,
        } => {
            if generation != state.generation {
                state.dbg(format!(
                    "dropping stale config types response (generation {generation}, now {})",
                    state.generation
                ));
                return effects;
            }
            state.status_text = None;
            match outcome {
                Ok(LoadOutcome::ConfigTypes(options)) => {
                    state.dbg(format!("loaded {} config types", options.len()));
                    let options: Vec<SelectOption> = options
                        .into_iter()
                        .map(|o| SelectOption::new(o.value, o.name))
                        .collect();
                    state.config_type_selector.set_options(options, SELECT_NONE);
                    state.focus = Focus::ConfigType;
                }
                Ok(_) => state.dbg("unexpected payload for config types load"),
                Err(e) => {
                    state.dbg(format!("config types load failed: {e}"));
                    state.config_type_selector.fail(CONFIG_TYPE_FAILED);
                    effects.push(toast(
                        format!("Failed to load config types: {e}"),
                        ToastLevel::Error,
                        4,
                    ));
                }
            }
        }
        LoadedTemplate {
            generation,
            outcome,
        } => {
            if generation != state.generation {
                state.dbg(format!(
                    "dropping stale template response (generation {generation}, now {})",
                    state.generation
                ));
                return effects;
            }
            state.status_text = None;
            match outcome {
                Ok(LoadOutcome::Template(info)) => {
                    if info.parameters.is_empty() {
                        state.dbg("template has no parameters");
                        state.pane = ParamsPane::NoParams;
                    } else {
                        state.dbg(format!(
                            "template loaded with {} parameters",
                            info.parameters.len()
                        ));
                        state.pane = ParamsPane::Form(form::build_form(&info));
                    }
                    state.generate_enabled = true;
                    state.focus = Focus::Params;
                }
                Ok(_) => state.dbg("unexpected payload for template load"),
                Err(e) => {
                    state.dbg(format!("template load failed: {e}"));
                    state.pane = ParamsPane::Hidden;
                    state.generate_enabled = false;
                    effects.push(toast(
                        format!("Failed to load template info: {e}"),
                        ToastLevel::Error,
                        4,
                    ));
                }
            }
        }
        ApplyExample => {
            if let ParamsPane::Form(f) = &mut state.pane {
                let applied = form::apply_example(f);
                state.dbg(format!("example applied to {applied} fields"));
                effects.push(toast("Example data filled in", ToastLevel::Success, 3));
            }
        }
        Generate => {
            if !state.generate_enabled || state.submitting {
                return effects;
            }
            let parameters = match &mut state.pane {
                ParamsPane::Form(f) => {
                    if !form::validate_form(f) {
                        effects.push(toast(
                            "Please fill in all required fields",
                            ToastLevel::Error,
                            4,
                        ));
                        return effects;
                    }
                    f.disabled = true;
                    f.editing = false;
                    JsonValue::Object(form::form_parameters(f))
                }
                ParamsPane::NoParams => JsonValue::Object(serde_json::Map::new()),
                _ => return effects,
            };
            state.submitting = true;
            state.status_text = Some("Generating configuration...".to_string());
            effects.push(Effect::SubmitGenerate {
                vendor: state.vendor.clone(),
                config_type: state.config_type.clone(),
                parameters,
                generation: state.generation,
            });
        }
        LoadedGenerate {
            generation,
            outcome,
        } => {
            if generation != state.generation {
                state.dbg(format!(
                    "dropping stale generate response (generation {generation}, now {})",
                    state.generation
                ));
                return effects;
            }
            state.submitting = false;
            state.status_text = None;
            if let ParamsPane::Form(f) = &mut state.pane {
                f.disabled = false;
            }
            match outcome {
                Ok(LoadOutcome::Generated(commands)) => {
                    state.dbg(format!("generated {} commands", commands.len()));
                    let title = format!(
                        "Generated Configuration — {}/{}",
                        state.vendor, state.config_type
                    );
                    let view = ResultView::new(title, commands);
                    let prev = std::mem::replace(&mut state.pane, ParamsPane::Hidden);
                    let form = match prev {
                        ParamsPane::Form(f) => Some(f),
                        _ => None,
                    };
                    state.pane = ParamsPane::Result { view, form };
                    state.focus = Focus::Params;
                    effects.push(toast("Configuration generated", ToastLevel::Success, 3));
                }
                Ok(_) => state.dbg("unexpected payload for generate"),
                Err(e) => {
                    effects.push(toast(
                        format!("Failed to generate configuration: {e}"),
                        ToastLevel::Error,
                        4,
                    ));
                }
            }
        }
        Reset => {
            state.generation += 1;
            state.vendor.clear();
            state.config_type.clear();
            state.submitting = false;
            state.status_text = None;
            state.vendor_selector.chosen = None;
            state.config_type_selector.reset(CONFIG_TYPE_IDLE, false);
            state.pane = ParamsPane::Hidden;
            state.generate_enabled = false;
            state.focus = Focus::Vendor;
            state.dbg("form reset");
            effects.push(toast("Form reset", ToastLevel::Success, 3));
        }
    }
    effects
}

#[cfg(test)]
mod tests;
