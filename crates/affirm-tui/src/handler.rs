use affirm_core::{DashboardTab, Mutation};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, DialogKind, Screen};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick(),
        AppEvent::Fetched(completion) => app.on_fetched(completion),
        AppEvent::Mutated { mutation, reply } => app.on_mutated(mutation, reply),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // A blocking dialog swallows everything until acknowledged
    if app.feedback.as_ref().is_some_and(|f| f.is_blocking()) {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.dismiss_feedback();
        }
        return;
    }

    if app.dialog.is_some() {
        handle_dialog(app, key);
        return;
    }

    match app.screen {
        Screen::Home => handle_home(app, key),
        Screen::Dashboard => handle_dashboard(app, key),
    }
}

fn handle_dialog(app: &mut App, key: KeyEvent) {
    let Some(dialog) = app.dialog.as_mut() else {
        return;
    };

    match key.code {
        KeyCode::Esc => app.close_dialog(),
        KeyCode::Enter => app.submit_dialog(),
        KeyCode::Tab | KeyCode::Down => dialog.focus_next(),
        KeyCode::BackTab | KeyCode::Up => dialog.focus_prev(),
        KeyCode::Backspace => dialog.pop_char(),
        KeyCode::Char(c) => dialog.push_char(c),
        _ => {}
    }
}

fn handle_home(app: &mut App, key: KeyEvent) {
    match key.code {
        // Quit
        KeyCode::Char('q') => app.should_quit = true,

        // Filter picker; every change issues a new lookup
        KeyCode::Char('j') | KeyCode::Down => app.next_filter(),
        KeyCode::Char('k') | KeyCode::Up => app.prev_filter(),
        KeyCode::Char('f') => app.open_dialog(DialogKind::FilterById),

        // Another one
        KeyCode::Char('r') | KeyCode::Char(' ') | KeyCode::Enter => app.request_affirmation(),

        // Actions on the current affirmation
        KeyCode::Char('p') => app.send_for_current(Mutation::Pin),
        KeyCode::Char('u') => app.send_for_current(Mutation::Unpin),
        KeyCode::Char('s') => app.send_for_current(Mutation::Save),
        KeyCode::Char('S') => app.send_for_current(Mutation::Unsave),
        KeyCode::Char('F') => app.send_for_current(Mutation::Favorite),
        KeyCode::Char('c') => app.open_dialog(DialogKind::SelectCategory),
        KeyCode::Char('e') => app.open_dialog(DialogKind::EditAffirmation),

        // Screen switching
        KeyCode::Tab | KeyCode::Char('d') => app.screen = Screen::Dashboard,
        KeyCode::Esc => app.dismiss_feedback(),

        _ => {}
    }
}

fn handle_dashboard(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Esc | KeyCode::Tab | KeyCode::Char('b') => {
            if app.feedback.is_some() && key.code == KeyCode::Esc {
                app.dismiss_feedback();
            } else {
                app.screen = Screen::Home;
            }
        }

        // Tabs
        KeyCode::Char('l') | KeyCode::Right => app.set_tab(app.dashboard_tab.next()),
        KeyCode::Char('h') | KeyCode::Left => app.set_tab(app.dashboard_tab.prev()),
        KeyCode::Char('1') => app.set_tab(DashboardTab::Users),
        KeyCode::Char('2') => app.set_tab(DashboardTab::Affirmations),
        KeyCode::Char('3') => app.set_tab(DashboardTab::Categories),

        // CRUD for the tab's records; the users tab is read-only
        KeyCode::Char(c @ ('a' | 'e' | 'x')) => {
            if let Some(kind) = record_dialog(app.dashboard_tab, c) {
                app.open_dialog(kind);
            }
        }

        _ => {}
    }
}

fn record_dialog(tab: DashboardTab, key: char) -> Option<DialogKind> {
    let kind = match (tab, key) {
        (DashboardTab::Categories, 'a') => DialogKind::AddCategory,
        (DashboardTab::Categories, 'e') => DialogKind::EditCategory,
        (DashboardTab::Categories, 'x') => DialogKind::DeleteCategory,
        (DashboardTab::Affirmations, 'a') => DialogKind::AddAffirmation,
        (DashboardTab::Affirmations, 'e') => DialogKind::EditAffirmation,
        (DashboardTab::Affirmations, 'x') => DialogKind::DeleteAffirmation,
        _ => return None,
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use affirm_core::{AffirmationsClient, ApiError, Config, Feedback};
    use tokio::sync::mpsc;

    fn app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        App::new(Config::new(), None, AffirmationsClient::new("http://127.0.0.1:9"), tx)
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_event(app, AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_blocking_dialog_swallows_keys() {
        let mut app = app();
        handle_event(
            &mut app,
            AppEvent::Mutated { mutation: Mutation::Pin(1), reply: Err(ApiError::PinLimitReached) },
        );

        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Enter);
        assert!(app.feedback.is_none());
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_dialog_typing_and_cancel() {
        let mut app = app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.screen, Screen::Dashboard);
        press(&mut app, KeyCode::Char('3'));
        press(&mut app, KeyCode::Char('a'));

        type_text(&mut app, "Gratitudex");
        press(&mut app, KeyCode::Backspace);
        let dialog = app.dialog.as_ref().unwrap();
        assert_eq!(dialog.kind, DialogKind::AddCategory);
        assert_eq!(dialog.value(0), "Gratitude");

        // 'q' while typing is text, not quit
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Esc);
        assert!(app.dialog.is_none());
        assert_eq!(app.screen, Screen::Dashboard);
    }

    #[test]
    fn test_invalid_submit_keeps_dialog_open() {
        let mut app = app();
        press(&mut app, KeyCode::Char('f'));
        type_text(&mut app, "calm");
        press(&mut app, KeyCode::Enter);

        let dialog = app.dialog.as_ref().unwrap();
        assert!(dialog.error.is_some());
    }

    #[test]
    fn test_pin_without_affirmation_shows_banner() {
        let mut app = app();
        press(&mut app, KeyCode::Char('p'));
        assert_eq!(app.feedback, Some(Feedback::error("No affirmation selected")));
        press(&mut app, KeyCode::Esc);
        assert!(app.feedback.is_none());
    }

    #[test]
    fn test_users_tab_has_no_record_dialogs() {
        let mut app = app();
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.dashboard_tab, DashboardTab::Users);

        for key in ['a', 'e', 'x'] {
            press(&mut app, KeyCode::Char(key));
            assert!(app.dialog.is_none());
        }

        press(&mut app, KeyCode::Char('2'));
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.dialog.as_ref().map(|d| d.kind), Some(DialogKind::DeleteAffirmation));
    }

    #[test]
    fn test_dashboard_tabs_cycle() {
        let mut app = app();
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Right);
        assert_eq!(app.dashboard_tab, DashboardTab::Affirmations);
        press(&mut app, KeyCode::Left);
        press(&mut app, KeyCode::Left);
        assert_eq!(app.dashboard_tab, DashboardTab::Categories);
    }
}
