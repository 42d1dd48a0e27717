use std::path::PathBuf;
use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use tokio::sync::mpsc;

use crate::action::Action;
use crate::event::Event;
use crate::source::RepoSource;
use crate::types::{RepoDetail, RepoSummary};

/// Interactive repository browser state. One instance per session, owned by
/// the event loop; search results define a fixed navigation order.
///
/// Invariants: `selected` stays inside `[0, summaries.len())`, and `detail`
/// is either absent or belongs to `summaries[selected]`. Every selection
/// change bumps `load_id`, so a detail fetch that was in flight for the old
/// selection is dropped when it lands.
pub struct Browser {
    summaries: Vec<RepoSummary>,
    pub selected: usize,
    pub detail: Option<RepoDetail>,
    pub loading: bool,
    pub notice: Option<String>,
    pub should_quit: bool,
    load_id: u64,
    clone_dir: Option<PathBuf>,
    source: Arc<dyn RepoSource>,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl Browser {
    /// `summaries` must be non-empty; the caller shows the empty-state
    /// message instead of starting a browser over nothing.
    pub fn new(
        summaries: Vec<RepoSummary>,
        source: Arc<dyn RepoSource>,
        action_tx: mpsc::UnboundedSender<Action>,
        clone_dir: Option<PathBuf>,
    ) -> Self {
        debug_assert!(!summaries.is_empty());
        Self {
            summaries,
            selected: 0,
            detail: None,
            loading: false,
            notice: None,
            should_quit: false,
            load_id: 0,
            clone_dir,
            source,
            action_tx,
        }
    }

    pub fn summaries(&self) -> &[RepoSummary] {
        &self.summaries
    }

    pub fn selected_summary(&self) -> &RepoSummary {
        &self.summaries[self.selected]
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Key(key) => self.handle_key(key),
            _ => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Action::Quit,
            KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') => Action::MoveUp,
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') => Action::MoveDown,
            KeyCode::Enter | KeyCode::Char(' ') => Action::LoadDetail,
            KeyCode::Char('o') | KeyCode::Char('O') => Action::OpenExternal,
            KeyCode::Char('c') | KeyCode::Char('C') => Action::CloneRepo,
            _ => Action::None,
        }
    }

    pub fn update(&mut self, action: Action) {
        // A keypress dismisses the previous notice.
        if matches!(
            action,
            Action::MoveUp
                | Action::MoveDown
                | Action::LoadDetail
                | Action::OpenExternal
                | Action::CloneRepo
        ) {
            self.notice = None;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::MoveUp => {
                self.selected = self.selected.saturating_sub(1);
                self.invalidate_detail();
            }
            Action::MoveDown => {
                self.selected = (self.selected + 1).min(self.summaries.len().saturating_sub(1));
                self.invalidate_detail();
            }
            Action::LoadDetail => {
                if self.detail.is_some() || self.loading {
                    return;
                }
                self.loading = true;
                self.spawn_fetch_detail();
            }
            Action::DetailLoaded(detail, id) => {
                if id != self.load_id {
                    tracing::debug!(stale_id = id, current = self.load_id, "dropping stale detail");
                    return;
                }
                self.loading = false;
                self.detail = Some(*detail);
            }
            Action::FetchFailed(msg, id) => {
                if id != self.load_id {
                    tracing::debug!(stale_id = id, current = self.load_id, "dropping stale failure");
                    return;
                }
                self.loading = false;
                self.notice = Some(msg);
            }
            Action::OpenExternal => {
                self.spawn_open();
            }
            Action::CloneRepo => {
                self.spawn_clone();
            }
            Action::Notice(msg) => {
                self.loading = false;
                self.notice = Some(msg);
            }
            Action::None => {}
        }
    }

    /// Selection moved: the old detail (and any in-flight fetch for it) is
    /// dead, even when the clamp left the index in place.
    fn invalidate_detail(&mut self) {
        self.detail = None;
        self.loading = false;
        self.load_id += 1;
    }

    fn spawn_fetch_detail(&self) {
        let full_name = self.selected_summary().full_name.clone();
        let id = self.load_id;
        let tx = self.action_tx.clone();
        let source = Arc::clone(&self.source);
        tokio::spawn(async move {
            match source.fetch_detail(&full_name).await {
                Ok(detail) => {
                    tx.send(Action::DetailLoaded(Box::new(detail), id)).ok();
                }
                Err(err) => {
                    tx.send(Action::FetchFailed(
                        format!("Error fetching {}: {}", full_name, err),
                        id,
                    ))
                    .ok();
                }
            }
        });
    }

    fn spawn_open(&self) {
        let full_name = self.selected_summary().full_name.clone();
        let tx = self.action_tx.clone();
        let source = Arc::clone(&self.source);
        tokio::spawn(async move {
            match source.open_in_browser(&full_name).await {
                Ok(()) => {
                    tx.send(Action::Notice("Opened in browser".to_string())).ok();
                }
                Err(err) => {
                    tx.send(Action::Notice(format!("Error opening {}: {}", full_name, err)))
                        .ok();
                }
            }
        });
    }

    fn spawn_clone(&self) {
        let full_name = self.selected_summary().full_name.clone();
        let dir = self.clone_dir.clone();
        let tx = self.action_tx.clone();
        let source = Arc::clone(&self.source);
        tokio::spawn(async move {
            match source.clone_repo(&full_name, dir.as_deref()).await {
                Ok(msg) => {
                    tx.send(Action::Notice(msg)).ok();
                }
                Err(err) => {
                    tx.send(Action::Notice(format!("Error cloning {}: {}", full_name, err)))
                        .ok();
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GhxError, Result};
    use crate::source::RepoSource;
    use crate::types::{CodeMatch, SearchFilters};
    use async_trait::async_trait;
    use crossterm::event::KeyModifiers;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct StubSource {
        fetches: AtomicUsize,
        fail_not_found: bool,
    }

    #[async_trait]
    impl RepoSource for StubSource {
        async fn search_repos(
            &self,
            _query: &str,
            _filters: &SearchFilters,
        ) -> Result<Vec<RepoSummary>> {
            Ok(vec![])
        }

        async fn fetch_detail(&self, full_name: &str) -> Result<RepoDetail> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_not_found {
                return Err(GhxError::NotFound(format!("{} does not exist", full_name)));
            }
            Ok(RepoDetail {
                full_name: full_name.to_string(),
                description: Some("desc".to_string()),
                stars: 10,
                forks: 2,
                language: Some("Rust".to_string()),
                url: Some(format!("https://github.com/{}", full_name)),
                updated_at: None,
                readme: Some("# hi".to_string()),
                files: vec![],
            })
        }

        async fn search_code(
            &self,
            _query: &str,
            _limit: u32,
            _language: Option<&str>,
        ) -> Result<Vec<CodeMatch>> {
            Ok(vec![])
        }

        async fn open_in_browser(&self, _full_name: &str) -> Result<()> {
            Ok(())
        }

        async fn clone_repo(&self, full_name: &str, _dir: Option<&Path>) -> Result<String> {
            Ok(format!("Cloned {}", full_name))
        }

        async fn create_gist(
            &self,
            _path: &Path,
            _description: Option<&str>,
            _public: bool,
        ) -> Result<String> {
            Ok("https://gist.github.com/x".to_string())
        }
    }

    fn summary(full_name: &str, stars: u64) -> RepoSummary {
        RepoSummary {
            full_name: full_name.to_string(),
            description: None,
            stars,
            forks: 0,
            language: None,
            url: None,
            updated_at: None,
        }
    }

    fn browser_with(
        source: StubSource,
    ) -> (Browser, mpsc::UnboundedReceiver<Action>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let browser = Browser::new(
            vec![summary("a/b", 10), summary("c/d", 2)],
            Arc::new(source),
            tx,
            None,
        );
        (browser, rx)
    }

    #[test]
    fn selection_clamps_at_both_ends() {
        let (mut browser, _rx) = browser_with(StubSource::default());
        browser.update(Action::MoveDown);
        assert_eq!(browser.selected, 1);
        browser.update(Action::MoveUp);
        assert_eq!(browser.selected, 0);
        browser.update(Action::MoveUp);
        assert_eq!(browser.selected, 0);
        browser.update(Action::MoveDown);
        browser.update(Action::MoveDown);
        browser.update(Action::MoveDown);
        assert_eq!(browser.selected, 1);
    }

    #[tokio::test]
    async fn load_detail_installs_detail() {
        let (mut browser, mut rx) = browser_with(StubSource::default());
        browser.update(Action::LoadDetail);
        assert!(browser.loading);
        let action = rx.recv().await.unwrap();
        browser.update(action);
        assert!(!browser.loading);
        assert_eq!(browser.detail.as_ref().unwrap().full_name, "a/b");
    }

    #[tokio::test]
    async fn load_detail_is_idempotent_while_loaded() {
        let source = Arc::new(StubSource::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut browser = Browser::new(
            vec![summary("a/b", 10), summary("c/d", 2)],
            Arc::clone(&source) as Arc<dyn RepoSource>,
            tx,
            None,
        );

        browser.update(Action::LoadDetail);
        let action = rx.recv().await.unwrap();
        browser.update(action);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);

        // Second request without an intervening move: no new fetch.
        browser.update(Action::LoadDetail);
        tokio::task::yield_now().await;
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn load_detail_is_noop_while_in_flight() {
        let source = Arc::new(StubSource::default());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut browser = Browser::new(
            vec![summary("a/b", 10)],
            Arc::clone(&source) as Arc<dyn RepoSource>,
            tx,
            None,
        );

        browser.update(Action::LoadDetail);
        browser.update(Action::LoadDetail);
        let action = rx.recv().await.unwrap();
        browser.update(action);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn any_move_clears_loaded_detail() {
        let (mut browser, _rx) = browser_with(StubSource::default());
        browser.detail = Some(RepoDetail {
            full_name: "a/b".to_string(),
            description: None,
            stars: 10,
            forks: 0,
            language: None,
            url: None,
            updated_at: None,
            readme: None,
            files: vec![],
        });

        // Even a clamped move (selection unchanged) drops the detail.
        browser.update(Action::MoveUp);
        assert!(browser.detail.is_none());
        assert_eq!(browser.selected, 0);
    }

    #[tokio::test]
    async fn stale_fetch_result_is_dropped() {
        let (mut browser, mut rx) = browser_with(StubSource::default());
        browser.update(Action::LoadDetail);
        // Selection changes while the fetch is in flight.
        browser.update(Action::MoveDown);
        let action = rx.recv().await.unwrap();
        assert!(matches!(action, Action::DetailLoaded(_, 0)));
        browser.update(action);
        assert!(browser.detail.is_none());
        assert_eq!(browser.selected, 1);
    }

    #[tokio::test]
    async fn not_found_posts_one_notice_and_leaves_detail_absent() {
        let (mut browser, mut rx) = browser_with(StubSource {
            fail_not_found: true,
            ..Default::default()
        });
        browser.update(Action::LoadDetail);
        let action = rx.recv().await.unwrap();
        assert!(matches!(action, Action::FetchFailed(_, 0)));
        browser.update(action);

        assert!(browser.detail.is_none());
        assert!(!browser.loading);
        assert!(browser.notice.as_ref().unwrap().contains("does not exist"));
        assert!(rx.try_recv().is_err(), "exactly one notice expected");
    }

    #[tokio::test]
    async fn stale_fetch_failure_is_dropped() {
        let (mut browser, mut rx) = browser_with(StubSource {
            fail_not_found: true,
            ..Default::default()
        });
        browser.update(Action::LoadDetail);
        // Selection changes while the failing fetch is in flight; the error
        // belongs to the old selection and must not surface.
        browser.update(Action::MoveDown);
        let action = rx.recv().await.unwrap();
        assert!(matches!(action, Action::FetchFailed(_, 0)));
        browser.update(action);

        assert_eq!(browser.selected, 1);
        assert!(browser.notice.is_none());
        assert!(!browser.loading);
        assert!(browser.detail.is_none());
    }

    #[tokio::test]
    async fn open_and_clone_do_not_change_state() {
        let (mut browser, mut rx) = browser_with(StubSource::default());
        browser.update(Action::MoveDown);

        browser.update(Action::OpenExternal);
        let action = rx.recv().await.unwrap();
        browser.update(action);
        assert_eq!(browser.selected, 1);
        assert!(browser.detail.is_none());
        assert_eq!(browser.notice.as_deref(), Some("Opened in browser"));

        browser.update(Action::CloneRepo);
        let action = rx.recv().await.unwrap();
        browser.update(action);
        assert_eq!(browser.selected, 1);
        assert_eq!(browser.notice.as_deref(), Some("Cloned c/d"));
    }

    #[test]
    fn quit_sets_flag_from_any_state() {
        let (mut browser, _rx) = browser_with(StubSource::default());
        browser.update(Action::MoveDown);
        browser.update(Action::Quit);
        assert!(browser.should_quit);
    }

    #[test]
    fn key_map_covers_spec_bindings() {
        let (browser, _rx) = browser_with(StubSource::default());
        let key = |code| Event::Key(KeyEvent::new(code, KeyModifiers::NONE));

        assert!(matches!(browser.handle_event(key(KeyCode::Char('q'))), Action::Quit));
        assert!(matches!(browser.handle_event(key(KeyCode::Char('Q'))), Action::Quit));
        assert!(matches!(browser.handle_event(key(KeyCode::Esc)), Action::Quit));
        assert!(matches!(browser.handle_event(key(KeyCode::Up)), Action::MoveUp));
        assert!(matches!(browser.handle_event(key(KeyCode::Char('k'))), Action::MoveUp));
        assert!(matches!(browser.handle_event(key(KeyCode::Down)), Action::MoveDown));
        assert!(matches!(browser.handle_event(key(KeyCode::Char('j'))), Action::MoveDown));
        assert!(matches!(browser.handle_event(key(KeyCode::Enter)), Action::LoadDetail));
        assert!(matches!(browser.handle_event(key(KeyCode::Char(' '))), Action::LoadDetail));
        assert!(matches!(browser.handle_event(key(KeyCode::Char('o'))), Action::OpenExternal));
        assert!(matches!(browser.handle_event(key(KeyCode::Char('O'))), Action::OpenExternal));
        assert!(matches!(browser.handle_event(key(KeyCode::Char('c'))), Action::CloneRepo));
        assert!(matches!(browser.handle_event(key(KeyCode::Char('C'))), Action::CloneRepo));
        // Unrecognized keys are silently ignored.
        assert!(matches!(browser.handle_event(key(KeyCode::Char('x'))), Action::None));
        assert!(matches!(browser.handle_event(key(KeyCode::Tab)), Action::None));
    }
}
