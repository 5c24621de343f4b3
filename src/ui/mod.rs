use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Popup};
use crate::picker::{Focus, PickerState};

const SEARCH_LABEL: &str = "Search (Case-Sensitive)";

pub fn draw(f: &mut Frame, app: &mut App) {
    let area = f.area();
    let dialog_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 95 } else { 75 },
        area,
    );

    f.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(Span::styled(
            format!(" {} ", app.title),
            Style::default().fg(app.theme.accent).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.accent));
    f.render_widget(block, dialog_area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1), // Label
            Constraint::Length(3), // Search field
            Constraint::Min(3),    // Entity list
            Constraint::Length(1), // Status line
            Constraint::Length(3), // OK / Cancel
            Constraint::Length(1), // Key hints
        ])
        .split(dialog_area);

    let label = Paragraph::new(Span::styled(SEARCH_LABEL, Style::default().fg(app.theme.text_dim)));
    f.render_widget(label, chunks[0]);

    draw_search_field(f, app, chunks[1]);
    draw_entity_list(f, app, chunks[2]);
    draw_status_line(f, app, chunks[3]);
    draw_buttons(f, app, chunks[4]);
    draw_hints(f, app, chunks[5]);

    if app.popup == Popup::Help {
        draw_help_popup(f, app);
    }
}

fn border_color(app: &App, focus: Focus) -> Color {
    if app.picker.focus() == focus {
        app.theme.accent
    } else {
        app.theme.inactive
    }
}

fn draw_search_field(f: &mut Frame, app: &App, area: Rect) {
    let query = app.picker.query();
    let width = Span::raw(query).width() as u16;
    let offset = search_scroll(width, area.width.saturating_sub(2));

    let input = Paragraph::new(Span::styled(query, Style::default().fg(app.theme.text)))
        .scroll((0, offset))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border_color(app, Focus::Search))),
        );
    f.render_widget(input, area);

    if app.picker.focus() == Focus::Search && app.popup == Popup::None {
        let x = area.x + 1 + width - offset;
        f.set_cursor_position(Position::new(x, area.y + 1));
    }
}

/// Columns to scroll so the end of the query and the cursor cell stay visible
fn search_scroll(query_width: u16, inner_width: u16) -> u16 {
    query_width.saturating_sub(inner_width.saturating_sub(1))
}

fn draw_entity_list(f: &mut Frame, app: &mut App, area: Rect) {
    // Inner height, minus the borders
    app.page_size = area.height.saturating_sub(2).max(1) as usize;

    let heading = match app.picker.state() {
        PickerState::OpenFiltered => "Matches",
        _ => "Entities",
    };
    let title = if app.show_counts {
        format!(" {} {}/{} ", heading, app.picker.filtered_len(), app.picker.catalog().len())
    } else {
        format!(" {} ", heading)
    };

    let block = Block::default()
        .title(Span::styled(title, Style::default().fg(app.theme.text_dim)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(app, Focus::List)));

    if app.picker.filtered_len() == 0 {
        let empty = if app.picker.catalog().is_empty() {
            "No entities"
        } else {
            "No matches"
        };
        let placeholder = Paragraph::new(Span::styled(
            format!("  {}", empty),
            Style::default().fg(app.theme.text_dim),
        ))
        .block(block);
        f.render_widget(placeholder, area);
        return;
    }

    let items: Vec<ListItem> = app
        .picker
        .filtered()
        .map(|name| ListItem::new(Span::styled(name.as_str(), Style::default().fg(app.theme.text))))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(app.theme.bg_selected)
                .fg(app.theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    let mut state = ListState::default().with_selected(app.picker.highlighted_row());
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_status_line(f: &mut Frame, app: &App, area: Rect) {
    let line = match &app.status_message {
        Some(msg) => Line::from(Span::styled(msg.as_str(), Style::default().fg(app.theme.danger))),
        None => match app.picker.highlighted() {
            Some(name) => Line::from(vec![
                Span::styled("Selected: ", Style::default().fg(app.theme.text_dim)),
                Span::styled(name.as_str(), Style::default().fg(app.theme.text)),
            ]),
            None => Line::from(Span::styled("Nothing selected", Style::default().fg(app.theme.text_dim))),
        },
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_buttons(f: &mut Frame, app: &App, area: Rect) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let ok_color = if app.picker.can_confirm() {
        app.theme.accent
    } else {
        app.theme.text_dim
    };
    draw_button(f, app, halves[0], "OK", 'O', ok_color, Focus::Ok);
    draw_button(f, app, halves[1], "Cancel", 'C', app.theme.danger, Focus::Cancel);
}

fn draw_button(f: &mut Frame, app: &App, area: Rect, label: &str, mnemonic: char, color: Color, focus: Focus) {
    let focused = app.picker.focus() == focus;
    let mut style = Style::default().fg(color);
    if focused {
        style = style.add_modifier(Modifier::REVERSED);
    }

    // Underline the mnemonic letter
    let (first, rest) = label.split_at(mnemonic.len_utf8());
    let line = Line::from(vec![
        Span::styled(first, style.add_modifier(Modifier::UNDERLINED)),
        Span::styled(rest, style),
    ]);

    let button = Paragraph::new(line).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color(app, focus))),
    );
    f.render_widget(button, area);
}

fn draw_hints(f: &mut Frame, app: &App, area: Rect) {
    let key = Style::default().fg(app.theme.accent);
    let hint = Paragraph::new(Line::from(vec![
        Span::styled("↑/↓", key),
        Span::raw(" select │ "),
        Span::styled("Enter", key),
        Span::raw(" ok │ "),
        Span::styled("Esc", key),
        Span::raw(" cancel │ "),
        Span::styled("F1", key),
        Span::raw(" help"),
    ]))
    .alignment(Alignment::Center)
    .style(Style::default().fg(app.theme.text_dim));
    f.render_widget(hint, area);
}

fn draw_help_popup(f: &mut Frame, app: &App) {
    let area = f.area();
    let popup_area = centered_rect(
        if area.width < 80 { 95 } else { 60 },
        if area.height < 30 { 95 } else { 70 },
        area,
    );

    f.render_widget(Clear, popup_area);

    let key = Style::default().fg(app.theme.accent);
    let header = Style::default().fg(app.theme.danger).add_modifier(Modifier::BOLD);
    let row = |k: &'static str, desc: &'static str| Line::from(vec![Span::styled(k, key), Span::raw(desc)]);

    let help_text = vec![
        Line::from(Span::styled("═══ Search ═══", header)),
        row("  type        ", "Filter entities (case-sensitive substring)"),
        row("  Backspace   ", "Delete last character"),
        row("  Ctrl-W      ", "Delete last word"),
        row("  Ctrl-U      ", "Clear search"),
        Line::from(""),
        Line::from(Span::styled("═══ List ═══", header)),
        row("  ↑/↓ Ctrl-P/N", "Move highlight"),
        row("  PgUp/PgDn   ", "Move by a page"),
        row("  Home/End    ", "First/last entity"),
        Line::from(""),
        Line::from(Span::styled("═══ Dialog ═══", header)),
        row("  Enter Alt-O ", "OK: pick the highlighted entity"),
        row("  Esc Alt-C   ", "Cancel"),
        row("  Tab         ", "Search → List → OK → Cancel"),
        row("  Space       ", "Press the focused button"),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", Style::default().fg(app.theme.text_dim)),
            Span::styled("F1", key),
            Span::styled("/", Style::default().fg(app.theme.text_dim)),
            Span::styled("Esc", key),
            Span::styled(" to close", Style::default().fg(app.theme.text_dim)),
        ]),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .title(Span::styled(" Help ", key))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.accent)),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PickerConfig;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};

    fn render(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_renders_dialog_parts() {
        let mut app = App::new(
            ["Player", "player_spawn", "Enemy"].into_iter().collect(),
            None,
            &PickerConfig::default(),
        );
        let screen = render(&mut app, 60, 30);
        assert!(screen.contains("Pick Entity"));
        assert!(screen.contains(SEARCH_LABEL));
        assert!(screen.contains("player_spawn"));
        assert!(screen.contains("Entities 3/3"));
        assert!(screen.contains("OK"));
        assert!(screen.contains("Cancel"));
        assert!(screen.contains("Nothing selected"));
    }

    #[test]
    fn test_renders_filtered_view_and_highlight() {
        let mut app = App::new(
            ["Player", "player_spawn", "Enemy"].into_iter().collect(),
            Some("player"),
            &PickerConfig::default(),
        );
        press(&mut app, KeyCode::Down);
        let screen = render(&mut app, 60, 30);
        assert!(screen.contains("Matches 1/3"));
        assert!(screen.contains("▶ player_spawn"));
        assert!(!screen.contains("Enemy"));
        assert!(screen.contains("Selected: player_spawn"));
    }

    #[test]
    fn test_renders_empty_states() {
        let mut app = App::new(Default::default(), None, &PickerConfig::default());
        assert!(render(&mut app, 60, 30).contains("No entities"));

        let mut app = App::new(["Enemy"].into_iter().collect(), Some("zzz"), &PickerConfig::default());
        assert!(render(&mut app, 60, 30).contains("No matches"));
    }

    #[test]
    fn test_search_scroll_keeps_tail_visible() {
        assert_eq!(search_scroll(5, 20), 0);
        assert_eq!(search_scroll(19, 20), 0);
        assert_eq!(search_scroll(20, 20), 1);
        assert_eq!(search_scroll(30, 20), 11);
        assert_eq!(search_scroll(3, 0), 3);

        let long_name = format!("{}Tail", "x".repeat(80));
        let mut app = App::new(
            [long_name.as_str()].into_iter().collect(),
            Some(long_name.as_str()),
            &PickerConfig::default(),
        );
        let mut terminal = Terminal::new(TestBackend::new(60, 30)).unwrap();
        terminal.draw(|f| draw(f, &mut app)).unwrap();
        let search_row: String = {
            let buffer = terminal.backend().buffer();
            // Dialog fills 95% of 60 columns; the search text sits on row 3 of it
            let area = centered_rect(95, 75, Rect::new(0, 0, 60, 30));
            (area.x..area.right())
                .map(|x| buffer[(x, area.y + 3)].symbol().to_string())
                .collect()
        };
        assert!(search_row.contains("xxTail"), "search row: {search_row:?}");
    }

    #[test]
    fn test_page_size_follows_list_height() {
        let mut app = App::new(["A"].into_iter().collect(), None, &PickerConfig::default());
        render(&mut app, 60, 30);
        let small = app.page_size;
        render(&mut app, 60, 50);
        assert!(app.page_size > small);
    }

    #[test]
    fn test_help_popup() {
        let mut app = App::new(["A"].into_iter().collect(), None, &PickerConfig::default());
        press(&mut app, KeyCode::F(1));
        let screen = render(&mut app, 80, 40);
        assert!(screen.contains("Search → List → OK → Cancel"));
    }
}
