use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::ui::AppState;

pub fn draw_header(f: &mut Frame, area: Rect, state: &AppState) {
    let title = state
        .config
        .header
        .clone()
        .unwrap_or_else(|| "ConfGen — Network Device Configuration Generator".to_string());
    let lines = vec![
        Line::from(Span::styled(title, crate::theme::title_style())),
        Line::from(Span::styled(
            format!("backend: {}", state.config.api_base_url),
            crate::theme::text_muted(),
        )),
    ];
    let p = Paragraph::new(lines).block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(p, area);
}
