use crate::widgets::chrome::panel_block;
use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::*;

/// Scrollable view of the backend-rendered configuration commands.
#[derive(Clone, Debug, Default)]
pub struct ResultView {
    pub title: String,
    pub commands: Vec<String>,
    pub scroll: usize,
    pub viewport_h: usize,
}

impl ResultView {
    pub fn new(title: impl Into<String>, commands: Vec<String>) -> Self {
        Self {
            title: title.into(),
            commands,
            scroll: 0,
            viewport_h: 0,
        }
    }

    /// Full command text, one command per line; also what lands on the
    /// clipboard on copy.
    pub fn text(&self) -> String {
        self.commands.join("\n")
    }

    pub fn on_key(&mut self, key: KeyCode) {
        let page = self.viewport_h.max(1);
        let max_scroll = self.commands.len().saturating_sub(1);
        match key {
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down => self.scroll = (self.scroll + 1).min(max_scroll),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(page),
            KeyCode::PageDown => self.scroll = (self.scroll + page).min(max_scroll),
            KeyCode::Home => self.scroll = 0,
            KeyCode::End => self.scroll = max_scroll,
            _ => {}
        }
    }
}

pub fn draw_result(f: &mut Frame, area: Rect, view: &mut ResultView, focused: bool) {
    view.viewport_h = area.height.saturating_sub(3) as usize;
    let mut lines: Vec<Line> = view
        .commands
        .iter()
        .skip(view.scroll)
        .map(|cmd| Line::from(cmd.clone()))
        .collect();
    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "(no commands)",
            crate::theme::text_muted(),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "c copy to clipboard · Esc back to form",
        crate::theme::text_muted(),
    )));
    let block = panel_block(&view.title, focused);
    let p = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrolling_is_bounded() {
        let mut v = ResultView::new("t", (0..5).map(|i| format!("cmd {i}")).collect());
        v.viewport_h = 2;
        v.on_key(KeyCode::Up);
        assert_eq!(v.scroll, 0);
        v.on_key(KeyCode::PageDown);
        assert_eq!(v.scroll, 2);
        v.on_key(KeyCode::End);
        assert_eq!(v.scroll, 4);
        v.on_key(KeyCode::Down);
        assert_eq!(v.scroll, 4);
        v.on_key(KeyCode::Home);
        assert_eq!(v.scroll, 0);
    }

    #[test]
    fn text_joins_commands_with_newlines() {
        let v = ResultView::new("t", vec!["system-view".into(), "vlan 100".into()]);
        assert_eq!(v.text(), "system-view\nvlan 100");
    }
}
