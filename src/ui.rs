use crate::app::{update, AppMsg, Effect};
use crate::model::{load_config, validate_config, AppConfig, ConfigTypeOption, TemplateInfo};
use crate::services::api::{self, ApiClient, ApiError};
use crate::widgets::chrome::panel_block;
use crate::widgets::form::{self, FormAction, FormState};
use crate::widgets::result_viewer::{draw_result, ResultView};
use crate::widgets::selector::{draw_selector, SelectOption, SelectorState};
use anyhow::{anyhow, Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

const HELP_TEXT: &str = "Tab focus · Enter select · g generate · r reset · q quit";

const SELECTOR_VISIBLE: usize = 8;

#[derive(Clone, Copy, Debug)]
pub enum LoadKind {
    ConfigTypes,
    Template,
    Generate,
}

pub enum LoadOutcome {
    ConfigTypes(Vec<ConfigTypeOption>),
    Template(TemplateInfo),
    Generated(Vec<String>),
}

/// One completed background fetch, tagged with the generation captured when
/// the request was issued.
pub struct LoadMsg {
    pub generation: u64,
    pub kind: LoadKind,
    pub outcome: Result<LoadOutcome, ApiError>,
}

#[derive(Clone, Copy, Debug)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

pub struct Toast {
    pub text: String,
    pub level: ToastLevel,
    pub expires_at_tick: u64,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Focus {
    #[default]
    Vendor,
    ConfigType,
    Params,
}

/// Content of the parameter pane. `Result` keeps the form it replaced so
/// Esc returns to it.
#[derive(Default)]
pub(crate) enum ParamsPane {
    #[default]
    Hidden,
    NoParams,
    Form(FormState),
    Result {
        view: ResultView,
        form: Option<FormState>,
    },
}

#[derive(Default)]
pub(crate) struct AppState {
    pub(crate) config: AppConfig,
    pub(crate) vendor: String,
    pub(crate) config_type: String,
    pub(crate) generation: u64,
    pub(crate) vendor_selector: SelectorState,
    pub(crate) config_type_selector: SelectorState,
    pub(crate) pane: ParamsPane,
    pub(crate) generate_enabled: bool,
    pub(crate) submitting: bool,
    pub(crate) focus: Focus,
    pub(crate) status_text: Option<String>,
    pub(crate) toast: Option<Toast>,
    pub(crate) tick: u64,
    pub(crate) debug_log: VecDeque<String>,
    client: Option<Arc<ApiClient>>,
    tx: Option<Sender<LoadMsg>>,
    rx: Option<Receiver<LoadMsg>>,
}

impl AppState {
    pub(crate) fn new(config: AppConfig) -> Self {
        let mut vendor_selector = SelectorState::new("Vendor", "", true);
        vendor_selector.set_options(
            config
                .vendors
                .iter()
                .map(|v| SelectOption::new(v.id.clone(), v.title.clone()))
                .collect(),
            crate::app::SELECT_NONE,
        );
        let config_type_selector = SelectorState::new(
            "Configuration type",
            crate::app::CONFIG_TYPE_IDLE,
            false,
        );
        Self {
            config,
            vendor_selector,
            config_type_selector,
            ..Default::default()
        }
    }

    pub fn dbg(&mut self, msg: impl Into<String>) {
        const MAX_LOG_LINES: usize = 200;
        if self.debug_log.len() >= MAX_LOG_LINES {
            self.debug_log.pop_front();
        }
        self.debug_log.push_back(msg.into());
    }
}

fn run_effects(state: &mut AppState, effects: Vec<Effect>) {
    for eff in effects {
        match eff {
            Effect::FetchConfigTypes { vendor, generation } => {
                state.dbg(format!("fetch config types for {vendor} (gen {generation})"));
                if let (Some(client), Some(tx)) = (&state.client, &state.tx) {
                    api::spawn_fetch_config_types(client.clone(), vendor, generation, tx.clone());
                }
            }
            Effect::FetchTemplate {
                vendor,
                config_type,
                generation,
            } => {
                state.dbg(format!(
                    "fetch template for {vendor}/{config_type} (gen {generation})"
                ));
                if let (Some(client), Some(tx)) = (&state.client, &state.tx) {
                    api::spawn_fetch_template_info(
                        client.clone(),
                        vendor,
                        config_type,
                        generation,
                        tx.clone(),
                    );
                }
            }
            Effect::SubmitGenerate {
                vendor,
                config_type,
                parameters,
                generation,
            } => {
                state.dbg(format!("generate {vendor}/{config_type} (gen {generation})"));
                if let (Some(client), Some(tx)) = (&state.client, &state.tx) {
                    api::spawn_generate(
                        client.clone(),
                        vendor,
                        config_type,
                        parameters,
                        generation,
                        tx.clone(),
                    );
                }
            }
            Effect::ShowToast {
                text,
                level,
                seconds,
            } => {
                let ticks = seconds.saturating_mul(5); // ~200ms tick
                let exp = state.tick.saturating_add(ticks);
                state.toast = Some(Toast {
                    text,
                    level,
                    expires_at_tick: exp,
                });
            }
        }
    }
}

pub fn run() -> Result<()> {
    let cfg = load_config()?;
    validate_config(&cfg).map_err(|e| anyhow!("invalid configuration: {e}"))?;
    let client = Arc::new(
        ApiClient::new(
            &cfg.api_base_url,
            Duration::from_secs(cfg.request_timeout_secs),
        )
        .context("building API client")?,
    );
    let mut state = AppState::new(cfg);
    state.client = Some(client);
    let (tx, rx) = mpsc::channel::<LoadMsg>();
    state.tx = Some(tx);
    state.rx = Some(rx);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();
    let res = loop {
        terminal.draw(|f| ui(f, &mut state))?;
        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_millis(0));
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if handle_key(&mut state, key) {
                    break Ok(());
                }
            }
        }
        // Pump async loader results
        let mut drained: Vec<LoadMsg> = Vec::new();
        if let Some(rx) = &state.rx {
            while let Ok(msg) = rx.try_recv() {
                drained.push(msg);
            }
        }
        for msg in drained {
            let LoadMsg {
                generation,
                kind,
                outcome,
            } = msg;
            let effects = match kind {
                LoadKind::ConfigTypes => update(
                    &mut state,
                    AppMsg::LoadedConfigTypes {
                        generation,
                        outcome,
                    },
                ),
                LoadKind::Template => update(
                    &mut state,
                    AppMsg::LoadedTemplate {
                        generation,
                        outcome,
                    },
                ),
                LoadKind::Generate => update(
                    &mut state,
                    AppMsg::LoadedGenerate {
                        generation,
                        outcome,
                    },
                ),
            };
            run_effects(&mut state, effects);
        }
        if last_tick.elapsed() >= tick_rate {
            state.tick = state.tick.wrapping_add(1);
            last_tick = Instant::now();
            if let Some(t) = &state.toast {
                if state.tick >= t.expires_at_tick {
                    state.toast = None;
                }
            }
        }
    };
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

/// Returns true when the app should quit.
fn handle_key(state: &mut AppState, key: event::KeyEvent) -> bool {
    let form_editing = state.focus == Focus::Params
        && matches!(&state.pane, ParamsPane::Form(f) if f.editing);
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            copy_result_to_clipboard(state);
        }
        KeyCode::Char('q') if !form_editing => return true,
        KeyCode::Char('r') if !form_editing => {
            let effs = update(state, AppMsg::Reset);
            run_effects(state, effs);
        }
        KeyCode::Char('g') if !form_editing => {
            let effs = update(state, AppMsg::Generate);
            run_effects(state, effs);
        }
        KeyCode::Tab if !form_editing => cycle_focus(state, true),
        KeyCode::BackTab if !form_editing => cycle_focus(state, false),
        code => match state.focus {
            Focus::Vendor => handle_vendor_key(state, code),
            Focus::ConfigType => handle_config_type_key(state, code),
            Focus::Params => handle_params_key(state, code),
        },
    }
    false
}

fn handle_vendor_key(state: &mut AppState, code: KeyCode) {
    match code {
        KeyCode::Up => state.vendor_selector.move_cursor(-1, SELECTOR_VISIBLE),
        KeyCode::Down => state.vendor_selector.move_cursor(1, SELECTOR_VISIBLE),
        KeyCode::Enter => {
            if let Some(value) = state.vendor_selector.cursor_value().map(str::to_string) {
                state.vendor_selector.choose_cursor();
                let effs = update(state, AppMsg::SelectVendor(value));
                run_effects(state, effs);
            }
        }
        _ => {}
    }
}

fn handle_config_type_key(state: &mut AppState, code: KeyCode) {
    if !state.config_type_selector.enabled {
        return;
    }
    match code {
        KeyCode::Up => state.config_type_selector.move_cursor(-1, SELECTOR_VISIBLE),
        KeyCode::Down => state.config_type_selector.move_cursor(1, SELECTOR_VISIBLE),
        KeyCode::Enter => {
            if state.config_type_selector.options.is_empty() {
                // failed-load state: retry the config type fetch
                if !state.vendor.is_empty() {
                    let vendor = state.vendor.clone();
                    let effs = update(state, AppMsg::SelectVendor(vendor));
                    run_effects(state, effs);
                }
            } else if let Some(value) = state
                .config_type_selector
                .cursor_value()
                .map(str::to_string)
            {
                state.config_type_selector.choose_cursor();
                let effs = update(state, AppMsg::SelectConfigType(value));
                run_effects(state, effs);
            }
        }
        _ => {}
    }
}

fn handle_params_key(state: &mut AppState, code: KeyCode) {
    if matches!(state.pane, ParamsPane::Result { .. }) {
        match code {
            KeyCode::Char('c') => copy_result_to_clipboard(state),
            KeyCode::Esc | KeyCode::Backspace => back_to_form(state),
            other => {
                if let ParamsPane::Result { view, .. } = &mut state.pane {
                    view.on_key(other);
                }
            }
        }
        return;
    }
    let action = if let ParamsPane::Form(form) = &mut state.pane {
        form::form_on_key(form, code)
    } else {
        None
    };
    if let Some(action) = action {
        let msg = match action {
            FormAction::Generate => AppMsg::Generate,
            FormAction::ApplyExample => AppMsg::ApplyExample,
            FormAction::Reset => AppMsg::Reset,
        };
        let effs = update(state, msg);
        run_effects(state, effs);
    }
}

fn back_to_form(state: &mut AppState) {
    let prev = std::mem::replace(&mut state.pane, ParamsPane::Hidden);
    state.pane = match prev {
        ParamsPane::Result { form: Some(f), .. } => ParamsPane::Form(f),
        ParamsPane::Result { form: None, .. } => ParamsPane::NoParams,
        other => other,
    };
}

fn copy_result_to_clipboard(state: &mut AppState) {
    let content = match &state.pane {
        ParamsPane::Result { view, .. } => view.text(),
        _ => return,
    };
    if content.is_empty() {
        return;
    }
    if let Ok(mut clipboard) = arboard::Clipboard::new() {
        let _ = clipboard.set_text(&content);
        state.status_text = Some("Copied to clipboard!".to_string());
    }
}

fn focus_ring(state: &AppState) -> Vec<Focus> {
    let mut ring = vec![Focus::Vendor];
    if state.config_type_selector.enabled {
        ring.push(Focus::ConfigType);
    }
    if !matches!(state.pane, ParamsPane::Hidden) {
        ring.push(Focus::Params);
    }
    ring
}

fn cycle_focus(state: &mut AppState, forward: bool) {
    let ring = focus_ring(state);
    let cur = ring.iter().position(|f| *f == state.focus).unwrap_or(0);
    let next = if forward {
        (cur + 1) % ring.len()
    } else {
        (cur + ring.len() - 1) % ring.len()
    };
    state.focus = ring[next];
}

fn ui(f: &mut Frame, state: &mut AppState) {
    let debug_pane = std::env::var("CONFGEN_DEBUG")
        .map(|v| v == "1")
        .unwrap_or(false);
    let mut constraints = vec![
        Constraint::Length(3),
        Constraint::Min(8),
        Constraint::Length(1),
    ];
    if debug_pane {
        constraints.push(Constraint::Length(4));
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());
    crate::widgets::header::draw_header(f, chunks[0], state);
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(30)])
        .split(chunks[1]);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(body[0]);
    draw_selector(
        f,
        left[0],
        &state.vendor_selector,
        state.focus == Focus::Vendor,
        state.tick,
    );
    draw_selector(
        f,
        left[1],
        &state.config_type_selector,
        state.focus == Focus::ConfigType,
        state.tick,
    );
    draw_params(f, body[1], state);
    crate::widgets::status_bar::draw_footer(f, chunks[2], state, HELP_TEXT);
    if debug_pane {
        draw_debug(f, chunks[3], state);
    }
}

fn draw_params(f: &mut Frame, area: Rect, state: &mut AppState) {
    let focused = state.focus == Focus::Params;
    let cursor_on = state.tick % 2 == 0;
    match &mut state.pane {
        ParamsPane::Hidden => {
            let p = Paragraph::new(" Select a vendor and a configuration type to begin.")
                .style(crate::theme::text_muted())
                .block(panel_block("Parameters", false))
                .wrap(Wrap { trim: false });
            f.render_widget(p, area);
        }
        ParamsPane::NoParams => {
            let lines = vec![
                Line::from(" This configuration type needs no extra parameters."),
                Line::from(""),
                Line::from(Span::styled(
                    " g generate",
                    crate::theme::text_muted(),
                )),
            ];
            let p = Paragraph::new(lines)
                .block(panel_block("Parameters", focused))
                .wrap(Wrap { trim: false });
            f.render_widget(p, area);
        }
        ParamsPane::Form(form) => {
            form::draw_form(f, area, form, focused, cursor_on);
        }
        ParamsPane::Result { view, .. } => {
            draw_result(f, area, view, focused);
        }
    }
}

fn draw_debug(f: &mut Frame, area: Rect, state: &AppState) {
    let lines: Vec<Line> = state
        .debug_log
        .iter()
        .rev()
        .take(area.height.saturating_sub(1) as usize)
        .rev()
        .map(|l| Line::from(l.clone()))
        .collect();
    let p = Paragraph::new(lines)
        .style(crate::theme::text_muted())
        .block(Block::default().borders(Borders::TOP).title("debug"));
    f.render_widget(p, area);
}
