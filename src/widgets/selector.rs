use crate::widgets::chrome::panel_block;
use ratatui::prelude::*;
use ratatui::widgets::*;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// One dropdown-equivalent pane: a windowed list of options with a cursor,
/// the currently chosen entry, and a placeholder shown while the list is
/// empty (disabled, loading or failed).
#[derive(Clone, Debug, Default)]
pub struct SelectorState {
    pub title: String,
    pub options: Vec<SelectOption>,
    pub cursor: usize,
    pub chosen: Option<usize>,
    pub placeholder: String,
    pub enabled: bool,
    pub loading: bool,
    pub offset: usize,
}

impl SelectorState {
    pub fn new(title: impl Into<String>, placeholder: impl Into<String>, enabled: bool) -> Self {
        Self {
            title: title.into(),
            placeholder: placeholder.into(),
            enabled,
            ..Default::default()
        }
    }

    /// Empty the list and show `placeholder`; used for the pre-selection
    /// state ("select a vendor first").
    pub fn reset(&mut self, placeholder: &str, enabled: bool) {
        self.options.clear();
        self.cursor = 0;
        self.chosen = None;
        self.offset = 0;
        self.loading = false;
        self.enabled = enabled;
        self.placeholder = placeholder.to_string();
    }

    pub fn begin_loading(&mut self, placeholder: &str) {
        self.reset(placeholder, false);
        self.loading = true;
    }

    /// Populate and re-enable the selector. A leading empty entry is
    /// prepended so the user can always deselect.
    pub fn set_options(&mut self, options: Vec<SelectOption>, none_label: &str) {
        self.options = std::iter::once(SelectOption::new("", none_label))
            .chain(options)
            .collect();
        self.cursor = 0;
        self.chosen = None;
        self.offset = 0;
        self.loading = false;
        self.enabled = true;
    }

    /// Enter the retryable failed state: no options, retry-prompt
    /// placeholder, still enabled so Enter can re-issue the request.
    pub fn fail(&mut self, placeholder: &str) {
        self.reset(placeholder, true);
    }

    pub fn cursor_value(&self) -> Option<&str> {
        self.options.get(self.cursor).map(|o| o.value.as_str())
    }

    pub fn choose_cursor(&mut self) {
        if !self.options.is_empty() {
            self.chosen = Some(self.cursor.min(self.options.len() - 1));
        }
    }

    pub fn move_cursor(&mut self, delta: i64, visible: usize) {
        if self.options.is_empty() {
            return;
        }
        let max = self.options.len() - 1;
        let cur = self.cursor as i64 + delta;
        self.cursor = cur.clamp(0, max as i64) as usize;
        if visible > 0 {
            if self.cursor < self.offset {
                self.offset = self.cursor;
            } else if self.cursor >= self.offset + visible {
                self.offset = self.cursor + 1 - visible;
            }
        }
    }
}

pub(crate) fn compute_scroll_window(total: usize, offset: usize, inner_h: u16) -> (usize, usize) {
    if inner_h == 0 || total == 0 {
        return (0, 0);
    }
    let ih = inner_h as usize;
    let max_start = total.saturating_sub(ih);
    let start = offset.min(max_start);
    let end = (start + ih).min(total);
    (start, end)
}

pub fn draw_selector(f: &mut Frame, area: Rect, s: &SelectorState, focused: bool, tick: u64) {
    let block = panel_block(&s.title, focused && s.enabled);
    if s.loading {
        let spinner = ["⠋", "⠙", "⠸", "⠴", "⠦", "⠇"][tick as usize % 6];
        let p = Paragraph::new(format!(" {spinner} {}", s.placeholder))
            .style(crate::theme::text_muted())
            .block(block);
        f.render_widget(p, area);
        return;
    }
    if s.options.is_empty() {
        let p = Paragraph::new(format!(" {}", s.placeholder))
            .style(crate::theme::text_muted())
            .block(block)
            .wrap(Wrap { trim: false });
        f.render_widget(p, area);
        return;
    }
    let inner_h = area.height.saturating_sub(2);
    let (start, end) = compute_scroll_window(s.options.len(), s.offset, inner_h);
    let items: Vec<ListItem> = s
        .options
        .iter()
        .enumerate()
        .skip(start)
        .take(end - start)
        .map(|(idx, opt)| {
            let cur = if idx == s.cursor && focused { '›' } else { ' ' };
            let mark = if Some(idx) == s.chosen { "(•)" } else { "( )" };
            let label = format!("{cur} {mark} {}", opt.label);
            let style = if idx == s.cursor && focused {
                crate::theme::list_cursor_style()
            } else if opt.value.is_empty() {
                crate::theme::text_muted()
            } else if Some(idx) == s.chosen {
                crate::theme::text_active_bold()
            } else {
                Style::default()
            };
            ListItem::new(label).style(style)
        })
        .collect();
    let list = List::new(items).block(block);
    f.render_widget(list, area);
}
