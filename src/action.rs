use crate::types::RepoDetail;

#[derive(Debug)]
pub enum Action {
    Quit,
    MoveUp,
    MoveDown,
    LoadDetail,
    /// Fetched detail tagged with the load generation it belongs to.
    /// A stale generation is dropped on arrival.
    DetailLoaded(Box<RepoDetail>, u64),
    /// A detail fetch failed. Carries the same generation tag so an error
    /// for a no-longer-selected repository is dropped, not surfaced.
    FetchFailed(String, u64),
    OpenExternal,
    CloneRepo,
    /// Transient, non-fatal message for the status bar. Never mutates
    /// selection or detail state.
    Notice(String),
    None,
}
