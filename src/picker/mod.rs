//! Entity picker dialog state
//!
//! Holds the catalog, the search query, the filtered view and the highlight.
//! No terminal access happens here; `app` feeds key events in and `ui` reads
//! the state back out for rendering.

use crate::catalog::{EntityCatalog, EntityName};

/// Result of a finished modal interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Confirmed(EntityName),
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerState {
    OpenEmptyQuery,
    OpenFiltered,
    ClosedConfirmed,
    ClosedCancelled,
}

impl PickerState {
    pub fn is_closed(self) -> bool {
        matches!(self, PickerState::ClosedConfirmed | PickerState::ClosedCancelled)
    }
}

/// Keyboard focus, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    List,
    Ok,
    Cancel,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Search => Focus::List,
            Focus::List => Focus::Ok,
            Focus::Ok => Focus::Cancel,
            Focus::Cancel => Focus::Search,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Search => Focus::Cancel,
            Focus::List => Focus::Search,
            Focus::Ok => Focus::List,
            Focus::Cancel => Focus::Ok,
        }
    }
}

/// Catalog indices of the entries containing `query`, in catalog order.
/// Matching is a plain case-sensitive substring test.
pub fn filter_view(catalog: &EntityCatalog, query: &str) -> Vec<usize> {
    catalog
        .iter()
        .enumerate()
        .filter(|(_, name)| name.as_str().contains(query))
        .map(|(i, _)| i)
        .collect()
}

pub struct EntityPicker {
    catalog: EntityCatalog,
    query: String,
    filtered: Vec<usize>,      // catalog indices currently visible
    highlighted: Option<usize>, // catalog index, always a member of `filtered`
    focus: Focus,
    state: PickerState,
    wrap_navigation: bool,
}

impl EntityPicker {
    pub fn new(catalog: EntityCatalog) -> Self {
        Self::with_query(catalog, "")
    }

    /// Open with a preset query (starts in `OpenFiltered` when non-empty)
    pub fn with_query(catalog: EntityCatalog, query: &str) -> Self {
        let mut picker = Self {
            filtered: Vec::new(),
            catalog,
            query: String::new(),
            highlighted: None,
            focus: Focus::Search,
            state: PickerState::OpenEmptyQuery,
            wrap_navigation: true,
        };
        picker.apply_query(query.to_string());
        picker
    }

    pub fn wrap_navigation(mut self, wrap: bool) -> Self {
        self.wrap_navigation = wrap;
        self
    }

    pub fn state(&self) -> PickerState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        !self.state.is_closed()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn catalog(&self) -> &EntityCatalog {
        &self.catalog
    }

    /// Entities currently visible, in catalog order
    pub fn filtered(&self) -> impl Iterator<Item = &EntityName> + '_ {
        self.filtered.iter().filter_map(|&i| self.catalog.get(i))
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn highlighted(&self) -> Option<&EntityName> {
        self.highlighted.and_then(|i| self.catalog.get(i))
    }

    /// Row of the highlighted entity inside the filtered view
    pub fn highlighted_row(&self) -> Option<usize> {
        let idx = self.highlighted?;
        self.filtered.iter().position(|&i| i == idx)
    }

    pub fn can_confirm(&self) -> bool {
        self.is_open() && self.highlighted.is_some()
    }

    /// Final result, available once the dialog is closed
    pub fn outcome(&self) -> Option<Selection> {
        match self.state {
            PickerState::ClosedConfirmed => self.highlighted().cloned().map(Selection::Confirmed),
            PickerState::ClosedCancelled => Some(Selection::Cancelled),
            _ => None,
        }
    }

    // Query editing

    pub fn set_query(&mut self, query: &str) {
        if self.is_open() {
            self.apply_query(query.to_string());
        }
    }

    pub fn push_char(&mut self, c: char) {
        if self.is_open() {
            let mut query = self.query.clone();
            query.push(c);
            self.apply_query(query);
        }
    }

    pub fn pop_char(&mut self) {
        if self.is_open() && !self.query.is_empty() {
            let mut query = self.query.clone();
            query.pop();
            self.apply_query(query);
        }
    }

    pub fn clear_query(&mut self) {
        self.set_query("");
    }

    /// Drop the trailing word along with any whitespace after it
    pub fn delete_word(&mut self) {
        if !self.is_open() || self.query.is_empty() {
            return;
        }
        let trimmed = self.query.trim_end();
        let cut = trimmed
            .rfind(char::is_whitespace)
            .map(|i| i + trimmed[i..].chars().next().map_or(1, char::len_utf8))
            .unwrap_or(0);
        let query = self.query[..cut].to_string();
        self.apply_query(query);
    }

    fn apply_query(&mut self, query: String) {
        self.filtered = filter_view(&self.catalog, &query);
        if let Some(idx) = self.highlighted {
            if !self.filtered.contains(&idx) {
                self.highlighted = None;
            }
        }
        self.state = if query.is_empty() {
            PickerState::OpenEmptyQuery
        } else {
            PickerState::OpenFiltered
        };
        tracing::trace!("query {:?} matches {} entities", query, self.filtered.len());
        self.query = query;
    }

    // Highlight navigation

    pub fn highlight_next(&mut self) {
        let len = self.filtered.len();
        if !self.is_open() || len == 0 {
            return;
        }
        let row = match self.highlighted_row() {
            None => 0,
            Some(r) if r + 1 < len => r + 1,
            Some(_) if self.wrap_navigation => 0,
            Some(r) => r,
        };
        self.highlight_row(row);
    }

    pub fn highlight_prev(&mut self) {
        let len = self.filtered.len();
        if !self.is_open() || len == 0 {
            return;
        }
        let row = match self.highlighted_row() {
            None => len - 1,
            Some(0) if self.wrap_navigation => len - 1,
            Some(0) => 0,
            Some(r) => r - 1,
        };
        self.highlight_row(row);
    }

    pub fn highlight_first(&mut self) {
        self.highlight_row(0);
    }

    pub fn highlight_last(&mut self) {
        if let Some(last) = self.filtered.len().checked_sub(1) {
            self.highlight_row(last);
        }
    }

    /// Move by `delta` rows, clamped to the view (page up/down)
    pub fn move_highlight(&mut self, delta: isize) {
        let len = self.filtered.len();
        if !self.is_open() || len == 0 {
            return;
        }
        let row = match self.highlighted_row() {
            None if delta < 0 => len - 1,
            None => 0,
            Some(r) => r.saturating_add_signed(delta).min(len - 1),
        };
        self.highlight_row(row);
    }

    /// Highlight the entity at `row` of the filtered view; out-of-range rows are ignored
    pub fn highlight_row(&mut self, row: usize) {
        if !self.is_open() {
            return;
        }
        if let Some(&idx) = self.filtered.get(row) {
            self.highlighted = Some(idx);
        }
    }

    /// Highlight the first visible entity named `name`
    pub fn highlight_entity(&mut self, name: &EntityName) -> bool {
        let row = self.filtered().position(|n| n == name);
        match row {
            Some(r) if self.is_open() => {
                self.highlight_row(r);
                true
            }
            _ => false,
        }
    }

    // Focus

    pub fn focus_next(&mut self) {
        if self.is_open() {
            self.focus = self.focus.next();
        }
    }

    pub fn focus_prev(&mut self) {
        if self.is_open() {
            self.focus = self.focus.prev();
        }
    }

    pub fn set_focus(&mut self, focus: Focus) {
        if self.is_open() {
            self.focus = focus;
        }
    }

    // Terminal transitions

    /// Close with the highlighted entity. Returns false (and stays open)
    /// when nothing is highlighted.
    pub fn confirm(&mut self) -> bool {
        if !self.can_confirm() {
            return false;
        }
        self.state = PickerState::ClosedConfirmed;
        tracing::info!("Confirmed entity {:?}", self.highlighted().map(EntityName::as_str));
        true
    }

    pub fn cancel(&mut self) {
        if self.is_open() {
            self.query.clear();
            self.highlighted = None;
            self.state = PickerState::ClosedCancelled;
            tracing::info!("Entity picker cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(names: &[&str]) -> EntityCatalog {
        names.iter().copied().collect()
    }

    fn visible(picker: &EntityPicker) -> Vec<&str> {
        picker.filtered().map(EntityName::as_str).collect()
    }

    #[test]
    fn test_filter_is_case_sensitive_substring() {
        let c = catalog(&["Player", "player_spawn", "Enemy", "EnemySpawner"]);
        let picked: Vec<&str> = filter_view(&c, "player")
            .into_iter()
            .filter_map(|i| c.get(i).map(EntityName::as_str))
            .collect();
        assert_eq!(picked, vec!["player_spawn"]);

        assert_eq!(filter_view(&c, "Spawn"), vec![3]);
        assert_eq!(filter_view(&c, "emy"), vec![2, 3]);
        assert!(filter_view(&c, "ENEMY").is_empty());
    }

    #[test]
    fn test_empty_query_matches_everything_in_order() {
        let c = catalog(&["b", "a", "b", "c"]);
        assert_eq!(filter_view(&c, ""), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_initial_states() {
        let picker = EntityPicker::new(catalog(&["A"]));
        assert_eq!(picker.state(), PickerState::OpenEmptyQuery);
        assert_eq!(picker.focus(), Focus::Search);
        assert!(picker.highlighted().is_none());

        let picker = EntityPicker::with_query(catalog(&["Alpha", "Beta"]), "Be");
        assert_eq!(picker.state(), PickerState::OpenFiltered);
        assert_eq!(visible(&picker), vec!["Beta"]);
    }

    #[test]
    fn test_query_edits_switch_open_states() {
        let mut picker = EntityPicker::new(catalog(&["Alpha", "Beta"]));
        picker.push_char('l');
        assert_eq!(picker.state(), PickerState::OpenFiltered);
        assert_eq!(visible(&picker), vec!["Alpha"]);
        picker.pop_char();
        assert_eq!(picker.state(), PickerState::OpenEmptyQuery);
        assert_eq!(visible(&picker), vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_confirm_highlighted_entity() {
        let mut picker = EntityPicker::new(catalog(&["A", "B", "C"]));
        assert!(picker.highlight_entity(&EntityName::from("B")));
        assert!(picker.confirm());
        assert_eq!(picker.state(), PickerState::ClosedConfirmed);
        assert_eq!(picker.outcome(), Some(Selection::Confirmed(EntityName::from("B"))));
    }

    #[test]
    fn test_confirm_without_highlight_is_noop() {
        let mut picker = EntityPicker::new(catalog(&["A", "B"]));
        assert!(!picker.confirm());
        assert!(picker.is_open());
        assert_eq!(picker.outcome(), None);
    }

    #[test]
    fn test_empty_catalog() {
        let mut picker = EntityPicker::with_query(EntityCatalog::default(), "anything");
        assert_eq!(picker.filtered_len(), 0);
        picker.highlight_next();
        picker.highlight_last();
        assert!(!picker.can_confirm());
        assert!(!picker.confirm());
        picker.cancel();
        assert_eq!(picker.outcome(), Some(Selection::Cancelled));
    }

    #[test]
    fn test_cancel_discards_query_and_highlight() {
        let mut picker = EntityPicker::new(catalog(&["A", "AB"]));
        picker.set_query("A");
        picker.highlight_last();
        assert!(picker.can_confirm());
        picker.cancel();
        assert_eq!(picker.state(), PickerState::ClosedCancelled);
        assert_eq!(picker.query(), "");
        assert_eq!(picker.outcome(), Some(Selection::Cancelled));
    }

    #[test]
    fn test_highlight_dropped_when_filtered_out() {
        let mut picker = EntityPicker::new(catalog(&["Player", "Enemy"]));
        picker.highlight_entity(&EntityName::from("Enemy"));
        picker.set_query("Play");
        assert!(picker.highlighted().is_none());
        // Clearing the query does not bring the old highlight back
        picker.clear_query();
        assert!(picker.highlighted().is_none());
        assert!(!picker.confirm());
    }

    #[test]
    fn test_highlight_kept_when_still_visible() {
        let mut picker = EntityPicker::new(catalog(&["Enemy", "EnemySpawner", "Player"]));
        picker.highlight_entity(&EntityName::from("EnemySpawner"));
        picker.set_query("Enemy");
        assert_eq!(picker.highlighted(), Some(&EntityName::from("EnemySpawner")));
        assert_eq!(picker.highlighted_row(), Some(1));
    }

    #[test]
    fn test_confirm_yields_catalog_member_with_duplicates() {
        let mut picker = EntityPicker::new(catalog(&["Tree", "Rock", "Tree"]));
        picker.set_query("Tree");
        picker.highlight_last();
        picker.confirm();
        let Some(Selection::Confirmed(name)) = picker.outcome() else {
            panic!("expected confirmation");
        };
        assert!(picker.catalog().iter().any(|n| *n == name));
    }

    #[test]
    fn test_navigation_wraps() {
        let mut picker = EntityPicker::new(catalog(&["A", "B", "C"]));
        picker.highlight_prev();
        assert_eq!(picker.highlighted_row(), Some(2));
        picker.highlight_next();
        assert_eq!(picker.highlighted_row(), Some(0));
        picker.highlight_prev();
        assert_eq!(picker.highlighted_row(), Some(2));
    }

    #[test]
    fn test_navigation_without_wrap_clamps() {
        let mut picker = EntityPicker::new(catalog(&["A", "B", "C"])).wrap_navigation(false);
        picker.highlight_next();
        picker.highlight_prev();
        assert_eq!(picker.highlighted_row(), Some(0));
        picker.move_highlight(10);
        assert_eq!(picker.highlighted_row(), Some(2));
        picker.highlight_next();
        assert_eq!(picker.highlighted_row(), Some(2));
        picker.move_highlight(-1);
        assert_eq!(picker.highlighted_row(), Some(1));
    }

    #[test]
    fn test_delete_word() {
        let mut picker = EntityPicker::new(catalog(&["big tree", "big rock"]));
        picker.set_query("big tr");
        picker.delete_word();
        assert_eq!(picker.query(), "big ");
        picker.delete_word();
        assert_eq!(picker.query(), "");
    }

    #[test]
    fn test_focus_cycle() {
        let mut picker = EntityPicker::new(catalog(&["A"]));
        let order: Vec<Focus> = (0..4)
            .map(|_| {
                picker.focus_next();
                picker.focus()
            })
            .collect();
        assert_eq!(order, vec![Focus::List, Focus::Ok, Focus::Cancel, Focus::Search]);
        picker.focus_prev();
        assert_eq!(picker.focus(), Focus::Cancel);
    }

    #[test]
    fn test_closed_state_ignores_input() {
        let mut picker = EntityPicker::new(catalog(&["A", "B"]));
        picker.highlight_first();
        picker.confirm();
        picker.set_query("B");
        picker.highlight_next();
        picker.cancel();
        assert_eq!(picker.state(), PickerState::ClosedConfirmed);
        assert_eq!(picker.query(), "");
        assert_eq!(picker.outcome(), Some(Selection::Confirmed(EntityName::from("A"))));
    }

    #[test]
    fn test_catalog_not_mutated() {
        let original = catalog(&["A", "B", "C"]);
        let mut picker = EntityPicker::new(original.clone());
        picker.set_query("B");
        picker.highlight_first();
        picker.confirm();
        assert_eq!(picker.catalog(), &original);
    }
}
