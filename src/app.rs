use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::catalog::EntityCatalog;
use crate::config::PickerConfig;
use crate::picker::{EntityPicker, Focus, Selection};
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

pub struct App {
    pub picker: EntityPicker,
    pub popup: Popup,
    pub title: String,
    pub show_counts: bool,
    pub theme: Theme,

    // Status message (shown above the buttons, cleared on next key)
    pub status_message: Option<String>,

    // Rows visible in the list, updated by the renderer for PageUp/PageDown
    pub page_size: usize,
}

impl App {
    pub fn new(catalog: EntityCatalog, query: Option<&str>, config: &PickerConfig) -> Self {
        let picker = match query {
            Some(q) => EntityPicker::with_query(catalog, q),
            None => EntityPicker::new(catalog),
        }
        .wrap_navigation(config.wrap_navigation);

        Self {
            picker,
            popup: Popup::None,
            title: config.title.clone(),
            show_counts: config.show_counts,
            theme: Theme::from_overrides(&config.theme),
            status_message: None,
            page_size: 10,
        }
    }

    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
    }

    pub fn outcome(&self) -> Option<Selection> {
        self.picker.outcome()
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press || !self.picker.is_open() {
            return;
        }
        self.status_message = None;

        // Handle popups first
        if self.popup != Popup::None {
            self.handle_popup_key(key);
            return;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let alt = key.modifiers.contains(KeyModifiers::ALT);

        match key.code {
            // Standard dismiss
            KeyCode::Esc => self.picker.cancel(),
            KeyCode::Char('c') if ctrl => self.picker.cancel(),

            // Mnemonics (&OK, &Cancel)
            KeyCode::Char('o') | KeyCode::Char('O') if alt => self.confirm(),
            KeyCode::Char('c') | KeyCode::Char('C') if alt => self.picker.cancel(),

            KeyCode::F(1) => self.popup = Popup::Help,

            // Focus order: search -> list -> OK -> Cancel
            KeyCode::Tab => self.picker.focus_next(),
            KeyCode::BackTab => self.picker.focus_prev(),

            // Enter is the accept gesture unless Cancel has focus
            KeyCode::Enter => match self.picker.focus() {
                Focus::Cancel => self.picker.cancel(),
                _ => self.confirm(),
            },
            KeyCode::Char(' ') if matches!(self.picker.focus(), Focus::Ok | Focus::Cancel) => {
                if self.picker.focus() == Focus::Ok {
                    self.confirm();
                } else {
                    self.picker.cancel();
                }
            }

            // List navigation
            KeyCode::Down => self.picker.highlight_next(),
            KeyCode::Up => self.picker.highlight_prev(),
            KeyCode::Char('n') if ctrl => self.picker.highlight_next(),
            KeyCode::Char('p') if ctrl => self.picker.highlight_prev(),
            KeyCode::Home => self.picker.highlight_first(),
            KeyCode::End => self.picker.highlight_last(),
            KeyCode::PageDown => self.picker.move_highlight(self.page_size.max(1) as isize),
            KeyCode::PageUp => self.picker.move_highlight(-(self.page_size.max(1) as isize)),

            // Query editing
            KeyCode::Char('u') if ctrl => {
                self.picker.set_focus(Focus::Search);
                self.picker.clear_query();
            }
            KeyCode::Char('w') if ctrl => {
                self.picker.set_focus(Focus::Search);
                self.picker.delete_word();
            }
            KeyCode::Backspace => {
                self.picker.set_focus(Focus::Search);
                self.picker.pop_char();
            }
            KeyCode::Char(c) if !ctrl && !alt => {
                self.picker.set_focus(Focus::Search);
                self.picker.push_char(c);
            }

            _ => {}
        }
    }

    fn handle_popup_key(&mut self, key: KeyEvent) {
        match self.popup {
            Popup::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Enter) {
                    self.popup = Popup::None;
                }
            }
            Popup::None => {}
        }
    }

    fn confirm(&mut self) {
        if !self.picker.confirm() {
            if self.picker.filtered_len() == 0 {
                self.set_status("No matching entities");
            } else {
                self.set_status("Select an entity first (↑/↓)");
            }
        }
    }
}
