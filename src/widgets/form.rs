use crate::model::{example_text, ParameterSpec, TemplateInfo};
use crate::widgets::chrome::panel_block;
use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::*;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

pub const OPTIONS_VISIBLE: usize = 8;

pub const PLEASE_CHOOSE: &str = "(please choose)";

#[derive(Clone, Debug, PartialEq)]
pub enum FieldKind {
    /// Choice among fixed options. `values` holds the raw option strings
    /// preceded by exactly one synthetic empty "please choose" entry.
    Select {
        values: Vec<String>,
        labels: Vec<String>,
        cursor: usize,
        selected: usize,
        offset: usize,
    },
    /// Free text carrying a comma-separated list of scalar values.
    ListText,
    /// Integer input with optional inclusive bounds.
    Number { min: Option<i64>, max: Option<i64> },
    /// Plain free text with an optional length cap.
    Text { max_length: Option<usize> },
}

#[derive(Clone, Debug)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub required: bool,
    pub kind: FieldKind,
    pub value: String,
    pub help: Option<String>,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct FormState {
    pub title: String,
    pub fields: Vec<FormField>,
    pub selected: usize,
    pub editing: bool,
    pub message: Option<String>,
    pub disabled: bool,
    pub example: Option<BTreeMap<String, JsonValue>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormAction {
    Generate,
    ApplyExample,
    Reset,
}

/// Map one parameter schema entry to its input field. Total over any
/// well-formed spec; first match wins: options > list > integer > text,
/// and an unrecognized `type` falls through to plain text.
pub fn field_from_param(name: &str, spec: &ParameterSpec) -> FormField {
    let label = match spec.description.as_deref() {
        Some(d) if !d.is_empty() => d.to_string(),
        _ => name.to_string(),
    };
    let (kind, help) = if let Some(opts) = &spec.options {
        let values: Vec<String> = std::iter::once(String::new())
            .chain(opts.iter().cloned())
            .collect();
        let labels: Vec<String> = std::iter::once(PLEASE_CHOOSE.to_string())
            .chain(opts.iter().cloned())
            .collect();
        (
            FieldKind::Select {
                values,
                labels,
                cursor: 0,
                selected: 0,
                offset: 0,
            },
            None,
        )
    } else {
        match spec.type_name.as_deref() {
            Some("list") => (
                FieldKind::ListText,
                Some("Separate multiple values with commas".to_string()),
            ),
            Some("integer") => {
                let (min, max) = match spec.range {
                    Some((lo, hi)) => (Some(lo), Some(hi)),
                    None => (None, None),
                };
                let help = spec.range.map(|(lo, hi)| format!("Range: {lo} - {hi}"));
                (FieldKind::Number { min, max }, help)
            }
            _ => {
                let help = spec
                    .max_length
                    .map(|n| format!("Max length: {n} characters"));
                (
                    FieldKind::Text {
                        max_length: spec.max_length,
                    },
                    help,
                )
            }
        }
    };
    FormField {
        name: name.to_string(),
        label,
        required: spec.required,
        kind,
        value: String::new(),
        help,
        error: None,
    }
}

/// Build the full parameter form for a template: one field per schema entry
/// in the schema's iteration order, plus the example payload when present.
pub fn build_form(info: &TemplateInfo) -> FormState {
    let title = match info.description.as_deref() {
        Some(d) if !d.is_empty() => d.to_string(),
        _ => "Parameters".to_string(),
    };
    FormState {
        title,
        fields: info
            .parameters
            .iter()
            .map(|(name, spec)| field_from_param(name, spec))
            .collect(),
        example: info.example.clone(),
        ..Default::default()
    }
}

/// Write the attached example values into matching fields. Sequences join
/// with ", "; keys without a matching field are ignored. Returns how many
/// fields were filled.
pub fn apply_example(form: &mut FormState) -> usize {
    let Some(example) = form.example.clone() else {
        return 0;
    };
    let mut applied = 0;
    for (key, value) in &example {
        if let Some(fld) = form.fields.iter_mut().find(|f| f.name == *key) {
            let text = example_text(value);
            match &mut fld.kind {
                FieldKind::Select {
                    values,
                    cursor,
                    selected,
                    ..
                } => {
                    if let Some(idx) = values.iter().position(|v| *v == text) {
                        *selected = idx;
                        *cursor = idx;
                        applied += 1;
                    }
                }
                _ => {
                    fld.value = text;
                    applied += 1;
                }
            }
            fld.error = None;
        }
    }
    applied
}

fn list_items(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect()
}

pub fn validate_form(form: &mut FormState) -> bool {
    let mut ok = true;
    for fld in &mut form.fields {
        fld.error = None;
        match &fld.kind {
            FieldKind::Select { values, selected, .. } => {
                let chosen_empty = values
                    .get(*selected)
                    .map(|v| v.is_empty())
                    .unwrap_or(true);
                if fld.required && chosen_empty {
                    fld.error = Some("Please choose a value".into());
                    ok = false;
                }
            }
            FieldKind::ListText => {
                if fld.required && list_items(&fld.value).is_empty() {
                    fld.error = Some("This field is required".into());
                    ok = false;
                }
            }
            FieldKind::Number { min, max } => {
                let (min, max) = (*min, *max);
                let raw = fld.value.trim().to_string();
                if fld.required && raw.is_empty() {
                    fld.error = Some("This field is required".into());
                    ok = false;
                } else if !raw.is_empty() {
                    match raw.parse::<i64>() {
                        Ok(mut v) => {
                            // inclusive bounds clamp rather than reject
                            if let Some(lo) = min {
                                if v < lo {
                                    v = lo;
                                }
                            }
                            if let Some(hi) = max {
                                if v > hi {
                                    v = hi;
                                }
                            }
                            fld.value = v.to_string();
                        }
                        Err(_) => {
                            fld.error = Some("Invalid integer".into());
                            ok = false;
                        }
                    }
                }
            }
            FieldKind::Text { max_length } => {
                let st = fld.value.trim();
                if fld.required && st.is_empty() {
                    fld.error = Some("This field is required".into());
                    ok = false;
                } else if let Some(maxl) = max_length {
                    if st.chars().count() > *maxl {
                        fld.error = Some(format!("Must be at most {maxl} characters"));
                        ok = false;
                    }
                }
            }
        }
    }
    form.message = if ok {
        None
    } else {
        Some("Please fix the highlighted errors".into())
    };
    ok
}

/// Collect non-empty field values as the `parameters` payload for the
/// generate request. List fields become arrays of their comma-separated
/// items; everything else is sent as the raw string.
pub fn form_parameters(form: &FormState) -> serde_json::Map<String, JsonValue> {
    let mut out = serde_json::Map::new();
    for fld in &form.fields {
        match &fld.kind {
            FieldKind::Select { values, selected, .. } => {
                if let Some(v) = values.get(*selected) {
                    if !v.is_empty() {
                        out.insert(fld.name.clone(), JsonValue::String(v.clone()));
                    }
                }
            }
            FieldKind::ListText => {
                let items = list_items(&fld.value);
                if !items.is_empty() {
                    out.insert(
                        fld.name.clone(),
                        JsonValue::Array(items.into_iter().map(JsonValue::String).collect()),
                    );
                }
            }
            _ => {
                let s = fld.value.trim();
                if !s.is_empty() {
                    out.insert(fld.name.clone(), JsonValue::String(s.to_string()));
                }
            }
        }
    }
    out
}

fn buttons(form: &FormState) -> Vec<FormAction> {
    let mut b = vec![FormAction::Generate];
    if form.example.is_some() {
        b.push(FormAction::ApplyExample);
    }
    b.push(FormAction::Reset);
    b
}

fn slide_window(cursor: usize, offset: &mut usize) {
    if cursor < *offset {
        *offset = cursor;
    } else if cursor >= *offset + OPTIONS_VISIBLE {
        *offset = cursor + 1 - OPTIONS_VISIBLE;
    }
}

/// Route a key into the form; returns the triggered button action, if any.
pub fn form_on_key(form: &mut FormState, key: KeyCode) -> Option<FormAction> {
    if form.disabled {
        return None;
    }
    let button_row = buttons(form);
    let total = form.fields.len() + button_row.len();
    if form.editing {
        let sel = form.selected.min(form.fields.len().saturating_sub(1));
        if let Some(fld) = form.fields.get_mut(sel) {
            match &mut fld.kind {
                FieldKind::Select {
                    values,
                    cursor,
                    selected,
                    offset,
                    ..
                } => match key {
                    KeyCode::Up => {
                        *cursor = cursor.saturating_sub(1);
                        slide_window(*cursor, offset);
                    }
                    KeyCode::Down => {
                        if *cursor + 1 < values.len() {
                            *cursor += 1;
                        }
                        slide_window(*cursor, offset);
                    }
                    KeyCode::Enter => {
                        *selected = *cursor;
                        form.editing = false;
                    }
                    KeyCode::Esc => {
                        form.editing = false;
                    }
                    _ => {}
                },
                kind => match key {
                    KeyCode::Enter | KeyCode::Esc => {
                        form.editing = false;
                    }
                    KeyCode::Backspace => {
                        fld.value.pop();
                    }
                    KeyCode::Char(c) => match kind {
                        FieldKind::Number { .. } => {
                            if c.is_ascii_digit() || (c == '-' && fld.value.is_empty()) {
                                fld.value.push(c);
                            }
                        }
                        FieldKind::Text { max_length } => {
                            let within = max_length
                                .map(|maxl| fld.value.chars().count() < maxl)
                                .unwrap_or(true);
                            if within {
                                fld.value.push(c);
                            }
                        }
                        _ => fld.value.push(c),
                    },
                    _ => {}
                },
            }
        }
        return None;
    }
    match key {
        KeyCode::Up => {
            form.selected = form.selected.saturating_sub(1);
        }
        KeyCode::Down => {
            if total > 0 && form.selected + 1 < total {
                form.selected += 1;
            }
        }
        KeyCode::Enter => {
            if form.selected < form.fields.len() {
                if let Some(fld) = form.fields.get_mut(form.selected) {
                    if let FieldKind::Select {
                        cursor,
                        selected,
                        offset,
                        ..
                    } = &mut fld.kind
                    {
                        *cursor = *selected;
                        *offset = 0;
                        slide_window(*cursor, offset);
                    }
                    form.editing = true;
                    form.message = None;
                }
            } else {
                let idx = form.selected - form.fields.len();
                return button_row.get(idx).copied();
            }
        }
        _ => {}
    }
    None
}

pub fn draw_form(
    f: &mut Frame,
    area: Rect,
    form: &mut FormState,
    highlight: bool,
    cursor_on: bool,
) {
    let mut lines: Vec<Line> = Vec::new();
    for (i, fld) in form.fields.iter().enumerate() {
        let sel = if i == form.selected && highlight {
            '›'
        } else {
            ' '
        };
        let req = if fld.required { " *" } else { "" };
        match &fld.kind {
            FieldKind::Select {
                labels,
                cursor,
                selected,
                offset,
                ..
            } => {
                let summary = labels
                    .get(*selected)
                    .cloned()
                    .unwrap_or_else(|| PLEASE_CHOOSE.into());
                let header_style = if i == form.selected && form.editing {
                    crate::theme::text_editing_bold()
                } else if i == form.selected && highlight {
                    crate::theme::text_active_bold()
                } else {
                    Style::default()
                };
                lines.push(Line::from(vec![
                    Span::raw(format!("{sel} {}{req}: ", fld.label)),
                    Span::styled(summary, header_style),
                ]));
                if form.editing && i == form.selected {
                    let start = (*offset).min(labels.len());
                    let end = (start + OPTIONS_VISIBLE).min(labels.len());
                    for (oi, opt) in labels.iter().enumerate().take(end).skip(start) {
                        let mark = if oi == *selected { "(•)" } else { "( )" };
                        let cur = if oi == *cursor { '›' } else { ' ' };
                        let st = if oi == *cursor {
                            crate::theme::list_cursor_style()
                        } else {
                            crate::theme::text_muted()
                        };
                        lines.push(Line::from(Span::styled(
                            format!("  {cur} {mark} {opt}"),
                            st,
                        )));
                    }
                }
            }
            _ => {
                let mut val = fld.value.clone();
                if form.editing && i == form.selected && cursor_on {
                    val.push('▏');
                }
                let value_style = if i == form.selected && form.editing {
                    crate::theme::text_editing_bold()
                } else if i == form.selected && highlight {
                    crate::theme::text_active_bold()
                } else {
                    Style::default()
                };
                lines.push(Line::from(vec![
                    Span::raw(format!("{sel} {}{req}: ", fld.label)),
                    Span::styled(val, value_style),
                ]));
            }
        }
        if let Some(help) = &fld.help {
            lines.push(Line::from(Span::styled(
                format!("  {help}"),
                crate::theme::text_muted(),
            )));
        }
        if let Some(err) = &fld.error {
            lines.push(Line::from(Span::styled(
                format!("  ! {err}"),
                crate::theme::text_error(),
            )));
        }
    }
    if !form.fields.is_empty() {
        lines.push(Line::from(""));
    }
    // Buttons: Generate | Example (when available) | Reset
    let button_row = buttons(form);
    let mut spans: Vec<Span> = Vec::new();
    for (bi, action) in button_row.iter().enumerate() {
        let idx = form.fields.len() + bi;
        let label = match action {
            FormAction::Generate => "[ Generate ]".to_string(),
            FormAction::ApplyExample => "Example".to_string(),
            FormAction::Reset => "Reset".to_string(),
        };
        let mut style = match action {
            FormAction::Generate if !form.disabled => crate::theme::text_active_bold(),
            _ => crate::theme::text_muted(),
        };
        if form.selected == idx && highlight && !form.editing {
            style = crate::theme::list_cursor_style();
        }
        spans.push(Span::styled(format!("  {label}"), style));
    }
    lines.push(Line::from(spans));
    if let Some(msg) = &form.message {
        lines.push(Line::from(Span::styled(
            msg.clone(),
            crate::theme::text_muted(),
        )));
    }
    let title = if form.editing {
        format!("{} — editing", form.title)
    } else {
        form.title.clone()
    };
    let block = panel_block(&title, highlight);
    let p = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);
}
