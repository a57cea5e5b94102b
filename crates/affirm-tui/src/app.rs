use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use affirm_core::fetcher::resolve;
use affirm_core::{
    AffirmationDraft, AffirmationPanel, AffirmationsClient, ApiResult, CategoryEntry,
    CategoryFilter, Config, DashboardTab, FetchCompletion, FetchState, Feedback, Mutation,
    RandomFetcher,
};
use ratatui::widgets::ListState;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogKind {
    FilterById,
    SelectCategory,
    AddCategory,
    EditCategory,
    DeleteCategory,
    AddAffirmation,
    EditAffirmation,
    DeleteAffirmation,
}

impl DialogKind {
    pub fn title(&self) -> &'static str {
        match self {
            DialogKind::FilterById => " Filter by category ",
            DialogKind::SelectCategory => " Add to category ",
            DialogKind::AddCategory => " New category ",
            DialogKind::EditCategory => " Rename category ",
            DialogKind::DeleteCategory => " Delete category ",
            DialogKind::AddAffirmation => " New affirmation ",
            DialogKind::EditAffirmation => " Edit affirmation ",
            DialogKind::DeleteAffirmation => " Delete affirmation ",
        }
    }

    fn labels(&self) -> &'static [&'static str] {
        match self {
            DialogKind::FilterById => &["Category ID (or all)"],
            DialogKind::SelectCategory => &["Affirmation ID", "Category ID"],
            DialogKind::AddCategory => &["Name"],
            DialogKind::EditCategory => &["Category ID", "Name"],
            DialogKind::DeleteCategory => &["Category ID"],
            DialogKind::AddAffirmation => &["Affirmation", "Category IDs (comma separated)"],
            DialogKind::EditAffirmation => &["Affirmation ID", "Affirmation", "Category IDs (comma separated)"],
            DialogKind::DeleteAffirmation => &["Affirmation ID"],
        }
    }
}

#[derive(Debug, Clone)]
pub struct DialogField {
    pub label: &'static str,
    pub value: String,
}

/// A modal form. Only one is open at a time.
#[derive(Debug, Clone)]
pub struct Dialog {
    pub kind: DialogKind,
    pub fields: Vec<DialogField>,
    pub focus: usize,
    pub error: Option<String>,
}

impl Dialog {
    pub fn new(kind: DialogKind) -> Self {
        let fields = kind
            .labels()
            .iter()
            .map(|label| DialogField { label: *label, value: String::new() })
            .collect();
        Self { kind, fields, focus: 0, error: None }
    }

    /// Pre-fill the first field and move focus past it.
    pub fn with_first(mut self, value: impl Into<String>) -> Self {
        if let Some(field) = self.fields.first_mut() {
            field.value = value.into();
            if self.fields.len() > 1 {
                self.focus = 1;
            }
        }
        self
    }

    pub fn value(&self, idx: usize) -> &str {
        self.fields.get(idx).map(|f| f.value.trim()).unwrap_or("")
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            field.value.pop();
        }
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    fn id(&self, idx: usize) -> Result<i64, String> {
        let raw = self.value(idx);
        raw.parse()
            .map_err(|_| format!("{} must be a number", self.fields[idx].label))
    }

    fn text(&self, idx: usize) -> Result<String, String> {
        let raw = self.value(idx);
        if raw.is_empty() {
            return Err(format!("{} is required", self.fields[idx].label));
        }
        Ok(raw.to_string())
    }

    fn draft(&self, text_idx: usize) -> Result<AffirmationDraft, String> {
        let text = self.text(text_idx)?;
        let ids = AffirmationDraft::parse_category_ids(self.value(text_idx + 1))?;
        Ok(AffirmationDraft::new(&text, ids))
    }
}

/// What submitting a dialog asks the app to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogAction {
    Filter(CategoryFilter),
    Send(Mutation),
}

impl Dialog {
    pub fn action(&self) -> Result<DialogAction, String> {
        let action = match self.kind {
            DialogKind::FilterById => {
                let filter = CategoryFilter::from_str(self.value(0))
                    .ok_or_else(|| "Enter a category ID or \"all\"".to_string())?;
                DialogAction::Filter(filter)
            }
            DialogKind::SelectCategory => DialogAction::Send(Mutation::SelectCategory {
                affirmation_id: self.id(0)?,
                category_id: self.id(1)?,
            }),
            DialogKind::AddCategory => DialogAction::Send(Mutation::AddCategory(self.text(0)?)),
            DialogKind::EditCategory => DialogAction::Send(Mutation::EditCategory {
                category_id: self.id(0)?,
                name: self.text(1)?,
            }),
            DialogKind::DeleteCategory => DialogAction::Send(Mutation::DeleteCategory(self.id(0)?)),
            DialogKind::AddAffirmation => DialogAction::Send(Mutation::AddAffirmation(self.draft(0)?)),
            DialogKind::EditAffirmation => DialogAction::Send(Mutation::EditAffirmation {
                affirmation_id: self.id(0)?,
                draft: self.draft(1)?,
            }),
            DialogKind::DeleteAffirmation => {
                DialogAction::Send(Mutation::DeleteAffirmation(self.id(0)?))
            }
        };
        Ok(action)
    }
}

/// An affirmation rendered during this session, for the dashboard.
#[derive(Debug, Clone)]
pub struct SeenAffirmation {
    pub id: Option<i64>,
    pub text: String,
    pub categories: String,
    pub seen_at: String,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,

    // Random affirmation
    pub fetcher: RandomFetcher<AffirmationPanel>,
    pub filter_state: ListState,
    pub in_flight: usize,
    /// Ids typed into the filter dialog. Kept for this session only.
    pub typed_categories: Vec<CategoryEntry>,

    // Dashboard
    pub dashboard_tab: DashboardTab,
    pub seen: Vec<SeenAffirmation>,

    // Overlays
    pub dialog: Option<Dialog>,
    pub feedback: Option<Feedback>,

    // Animation state
    pub animation_frame: u8,

    // Data
    pub config: Config,
    config_path: Option<PathBuf>,
    client: Arc<AffirmationsClient>,
    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(
        config: Config,
        config_path: Option<PathBuf>,
        client: AffirmationsClient,
        events: UnboundedSender<AppEvent>,
    ) -> Self {
        let dashboard_tab = config.active_tab();

        let initial = config.default_filter();
        let mut filter_state = ListState::default();
        let idx = filter_index(&picker_options(&config.categories, &[]), initial).unwrap_or(0);
        filter_state.select(Some(idx));

        Self {
            should_quit: false,
            screen: Screen::Home,

            fetcher: RandomFetcher::new(AffirmationPanel::new()),
            filter_state,
            in_flight: 0,
            typed_categories: Vec::new(),

            dashboard_tab,
            seen: Vec::new(),

            dialog: None,
            feedback: None,

            animation_frame: 0,

            config,
            config_path,
            client: Arc::new(client),
            events,
        }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Filter picker rows: `All`, the configured categories, then ids typed this session.
    pub fn filter_options(&self) -> Vec<(CategoryFilter, String)> {
        picker_options(&self.config.categories, &self.typed_categories)
    }

    pub fn current_filter(&self) -> CategoryFilter {
        let idx = self.filter_state.selected().unwrap_or(0);
        self.filter_options()
            .get(idx)
            .map(|(filter, _)| *filter)
            .unwrap_or_default()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    // Random affirmation

    /// Issue a lookup for the selected filter. Any lookup still in flight is superseded.
    pub fn request_affirmation(&mut self) {
        let pending = self.fetcher.begin(self.current_filter());
        info!(intent = pending.intent().value(), filter = %pending.filter(), "fetching affirmation");
        self.in_flight += 1;

        let client = self.client.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let completion = resolve(client.as_ref(), pending).await;
            let _ = events.send(AppEvent::Fetched(completion));
        });
    }

    pub fn on_fetched(&mut self, completion: FetchCompletion) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let state = self.fetcher.complete(completion, Instant::now());
        if state == FetchState::Rendered {
            self.remember_current();
        }
    }

    fn remember_current(&mut self) {
        let panel = self.fetcher.view();
        let id = panel.pin.affirmation_id();
        if id.is_some() && self.seen.iter().any(|s| s.id == id) {
            return;
        }
        self.seen.push(SeenAffirmation {
            id,
            text: panel.text.clone(),
            categories: panel.categories.clone(),
            seen_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        });
    }

    pub fn next_filter(&mut self) {
        let len = self.filter_options().len();
        let i = self.filter_state.selected().unwrap_or(0);
        let next = (i + 1).min(len.saturating_sub(1));
        if next != i {
            self.filter_state.select(Some(next));
            self.request_affirmation();
        }
    }

    pub fn prev_filter(&mut self) {
        let i = self.filter_state.selected().unwrap_or(0);
        if i > 0 {
            self.filter_state.select(Some(i - 1));
            self.request_affirmation();
        }
    }

    /// Jump to a filter typed by id. Unknown ids join the picker unnamed until the app exits.
    pub fn set_filter(&mut self, filter: CategoryFilter) {
        if filter_index(&self.filter_options(), filter).is_none() {
            if let CategoryFilter::Category(id) = filter {
                self.typed_categories.push(CategoryEntry { id, name: format!("#{}", id) });
            }
        }
        let idx = filter_index(&self.filter_options(), filter).unwrap_or(0);
        self.filter_state.select(Some(idx));
        self.request_affirmation();
    }

    pub fn pin_target(&self) -> Option<i64> {
        self.fetcher.view().pin.affirmation_id()
    }

    // Mutations

    pub fn send(&mut self, mutation: Mutation) {
        let client = self.client.clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let reply = mutation.run(&client).await;
            let _ = events.send(AppEvent::Mutated { mutation, reply });
        });
    }

    /// Act on the current affirmation, or explain why the control is disabled.
    pub fn send_for_current(&mut self, make: fn(i64) -> Mutation) {
        match self.pin_target() {
            Some(id) => self.send(make(id)),
            None => self.feedback = Some(Feedback::error("No affirmation selected")),
        }
    }

    pub fn on_mutated(&mut self, mutation: Mutation, reply: ApiResult<Option<String>>) {
        self.feedback = Some(mutation.feedback(&reply));
        if reply.is_err() {
            return;
        }

        let changed = match &mutation {
            Mutation::EditCategory { category_id, name } => {
                for entry in self.config.categories.iter_mut().filter(|c| c.id == *category_id) {
                    entry.name = name.clone();
                }
                true
            }
            Mutation::DeleteCategory(id) => {
                let selected = self.current_filter();
                self.config.categories.retain(|c| c.id != *id);
                self.typed_categories.retain(|c| c.id != *id);
                let idx = filter_index(&self.filter_options(), selected).unwrap_or(0);
                self.filter_state.select(Some(idx));
                if self.current_filter() != selected {
                    self.request_affirmation();
                }
                true
            }
            Mutation::DeleteAffirmation(id) => {
                self.seen.retain(|s| s.id != Some(*id));
                false
            }
            _ => false,
        };

        if changed {
            self.persist_config();
        }
    }

    // Dialogs

    pub fn open_dialog(&mut self, kind: DialogKind) {
        let dialog = Dialog::new(kind);
        let dialog = match (kind, self.pin_target()) {
            (DialogKind::SelectCategory | DialogKind::EditAffirmation | DialogKind::DeleteAffirmation, Some(id)) => {
                dialog.with_first(id.to_string())
            }
            _ => dialog,
        };
        self.dialog = Some(dialog);
    }

    pub fn submit_dialog(&mut self) {
        let Some(dialog) = self.dialog.as_mut() else {
            return;
        };

        match dialog.action() {
            Ok(action) => {
                self.dialog = None;
                match action {
                    DialogAction::Filter(filter) => self.set_filter(filter),
                    DialogAction::Send(mutation) => self.send(mutation),
                }
            }
            Err(message) => dialog.error = Some(message),
        }
    }

    pub fn close_dialog(&mut self) {
        self.dialog = None;
    }

    pub fn dismiss_feedback(&mut self) {
        self.feedback = None;
    }

    // Dashboard

    pub fn set_tab(&mut self, tab: DashboardTab) {
        if self.dashboard_tab == tab {
            return;
        }
        self.dashboard_tab = tab;
        self.config.active_tab = Some(tab.as_str().to_string());
        self.persist_config();
    }

    /// Write back only what the UI owns. Overrides from env and flags stay out of the file.
    fn persist_config(&self) {
        let Some(path) = &self.config_path else {
            return;
        };
        let result = Config::load_from(path).and_then(|mut stored| {
            stored.active_tab = self.config.active_tab.clone();
            stored.categories = self.config.categories.clone();
            stored.save_to(path)
        });
        if let Err(e) = result {
            warn!("could not save config to {}: {}", path.display(), e);
        }
    }

    // Animation

    pub fn tick(&mut self) {
        self.animation_frame = (self.animation_frame + 1) % 3;
        self.fetcher.view_mut().expire_notice(Instant::now());
    }
}

fn picker_options(configured: &[CategoryEntry], typed: &[CategoryEntry]) -> Vec<(CategoryFilter, String)> {
    let mut options = vec![(CategoryFilter::All, "All".to_string())];
    options.extend(
        configured
            .iter()
            .chain(typed)
            .map(|c| (CategoryFilter::Category(c.id), c.name.clone())),
    );
    options
}

fn filter_index(options: &[(CategoryFilter, String)], filter: CategoryFilter) -> Option<usize> {
    options.iter().position(|(f, _)| *f == filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use affirm_core::ApiError;
    use tokio::sync::mpsc;

    fn app_with(categories: Vec<CategoryEntry>, path: Option<PathBuf>) -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut config = Config::new();
        config.categories = categories;
        App::new(config, path, AffirmationsClient::new("http://127.0.0.1:9"), tx)
    }

    fn calm() -> Vec<CategoryEntry> {
        vec![
            CategoryEntry { id: 2, name: "Calm".to_string() },
            CategoryEntry { id: 5, name: "Focus".to_string() },
        ]
    }

    #[test]
    fn test_dialog_builds_mutations() {
        let mut dialog = Dialog::new(DialogKind::EditAffirmation).with_first("7");
        assert_eq!(dialog.focus, 1);
        for c in "I am steady".chars() {
            dialog.push_char(c);
        }
        dialog.focus_next();
        for c in "2, 5".chars() {
            dialog.push_char(c);
        }

        assert_eq!(
            dialog.action(),
            Ok(DialogAction::Send(Mutation::EditAffirmation {
                affirmation_id: 7,
                draft: AffirmationDraft::new("I am steady", vec![2, 5]),
            }))
        );
    }

    #[test]
    fn test_dialog_reports_bad_input() {
        let mut dialog = Dialog::new(DialogKind::DeleteCategory);
        dialog.push_char('x');
        assert_eq!(dialog.action(), Err("Category ID must be a number".to_string()));

        let dialog = Dialog::new(DialogKind::AddCategory);
        assert_eq!(dialog.action(), Err("Name is required".to_string()));
    }

    #[test]
    fn test_filter_dialog_accepts_all() {
        let dialog = Dialog::new(DialogKind::FilterById).with_first("all");
        assert_eq!(dialog.action(), Ok(DialogAction::Filter(CategoryFilter::All)));
    }

    #[tokio::test]
    async fn test_filter_change_supersedes_earlier_lookup() {
        let mut app = app_with(calm(), None);
        app.request_affirmation();
        let first = app.fetcher.latest();
        app.next_filter();

        assert_eq!(app.current_filter(), CategoryFilter::Category(2));
        assert!(!app.fetcher.is_current(first));
        assert_eq!(app.in_flight, 2);
    }

    #[tokio::test]
    async fn test_set_filter_adds_unknown_category() {
        let mut app = app_with(calm(), None);
        app.set_filter(CategoryFilter::Category(9));
        assert_eq!(app.current_filter(), CategoryFilter::Category(9));
        assert_eq!(app.filter_options().last(), Some(&(CategoryFilter::Category(9), "#9".to_string())));
        assert_eq!(app.config.category_name(9), None);
    }

    #[tokio::test]
    async fn test_typed_category_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut app = app_with(calm(), Some(path.clone()));

        app.set_filter(CategoryFilter::Category(999));
        app.set_tab(DashboardTab::Categories);

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.active_tab(), DashboardTab::Categories);
        assert_eq!(reloaded.categories, calm());
        assert_eq!(app.current_filter(), CategoryFilter::Category(999));
    }

    #[test]
    fn test_tab_change_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut app = app_with(Vec::new(), Some(path.clone()));
        assert_eq!(app.dashboard_tab, DashboardTab::Users);

        app.set_tab(DashboardTab::Affirmations);

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.active_tab(), DashboardTab::Affirmations);
    }

    #[test]
    fn test_deleted_category_leaves_picker() {
        let mut app = app_with(calm(), None);
        app.filter_state.select(Some(2));

        app.on_mutated(Mutation::DeleteCategory(2), Ok(None));

        assert_eq!(app.config.category_name(2), None);
        assert_eq!(app.current_filter(), CategoryFilter::Category(5));
        assert_eq!(app.feedback, Some(Feedback::success("Category deleted")));
    }

    #[tokio::test]
    async fn test_deleting_selected_category_fetches_again() {
        let mut app = app_with(calm(), None);
        app.filter_state.select(Some(1));
        assert_eq!(app.current_filter(), CategoryFilter::Category(2));

        app.on_mutated(Mutation::DeleteCategory(2), Ok(None));

        assert_eq!(app.current_filter(), CategoryFilter::All);
        assert_eq!(app.in_flight, 1);
    }

    #[test]
    fn test_deleting_other_category_keeps_view() {
        let mut app = app_with(calm(), None);
        app.filter_state.select(Some(1));

        app.on_mutated(Mutation::DeleteCategory(5), Ok(None));

        assert_eq!(app.current_filter(), CategoryFilter::Category(2));
        assert_eq!(app.in_flight, 0);
    }

    #[test]
    fn test_pin_limit_opens_blocking_dialog() {
        let mut app = app_with(Vec::new(), None);
        app.on_mutated(Mutation::Pin(4), Err(ApiError::PinLimitReached));
        assert!(app.feedback.as_ref().is_some_and(Feedback::is_blocking));
    }

    #[test]
    fn test_action_without_affirmation_is_refused() {
        let mut app = app_with(Vec::new(), None);
        app.send_for_current(Mutation::Pin);
        assert_eq!(app.feedback, Some(Feedback::error("No affirmation selected")));
    }
}
