//! Home screen controller.
//!
//! Owns the per-screen state (query, stats, snackbar notice) for as long as the
//! screen is open. Every server failure is caught here and turned into a
//! notice or an error indicator; nothing propagates past this boundary.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::clients::RoutineSource;
use crate::clients::models::responses::{PaginatedRoutines, Routine, Stats};
use crate::services::editor::{RoutineEditor, ValidationError};
use crate::services::export;
use crate::services::query::{ApplyOutcome, QueryKind, QueryRequest, QueryState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Run the fetch a [`QueryKind`] describes.
pub async fn fetch_page<S: RoutineSource>(source: &S, kind: &QueryKind) -> Result<PaginatedRoutines> {
    match kind {
        QueryKind::Browse {
            page,
            page_size,
            day,
        } => source.list(*page, *page_size, *day).await,
        QueryKind::Search {
            term,
            page,
            page_size,
            day,
        } => source.search(term, *page, *page_size, *day).await,
    }
}

/// A one-off request made from the home screen besides the routine query.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Open(i64),
    Delete(i64),
    Duplicate {
        routine_id: i64,
        new_name: Option<String>,
    },
    Export(PathBuf),
}

impl Action {
    fn failure_message(&self) -> &'static str {
        match self {
            Action::Open(_) => "Could not load the routine.",
            Action::Delete(_) => "Could not delete the routine.",
            Action::Duplicate { .. } => "Could not duplicate the routine.",
            Action::Export(_) => "Could not export the CSV.",
        }
    }
}

/// What a successful [`Action`] produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Done {
    Opened(Routine),
    Deleted(i64),
    Duplicated(Routine),
    Exported(PathBuf),
}

impl Done {
    pub fn reloads_stats(&self) -> bool {
        matches!(self, Done::Deleted(_) | Done::Duplicated(_))
    }

    /// A duplicate may land on the visible page, so the list is fetched again.
    pub fn refetches(&self) -> bool {
        matches!(self, Done::Duplicated(_))
    }
}

/// Run the server side of an action. Touches no screen state, so it can run
/// on its own task.
pub async fn perform<S: RoutineSource>(source: &S, action: &Action) -> Result<Done> {
    match action {
        Action::Open(routine_id) => source.get(*routine_id).await.map(Done::Opened),
        Action::Delete(routine_id) => {
            source.delete(*routine_id).await?;
            Ok(Done::Deleted(*routine_id))
        }
        Action::Duplicate {
            routine_id,
            new_name,
        } => source
            .duplicate(*routine_id, new_name.as_deref())
            .await
            .map(Done::Duplicated),
        Action::Export(path) => {
            let bytes = source.export().await?;
            export::save_export(&bytes, path).await.map(Done::Exported)
        }
    }
}

pub struct HomeScreen<S> {
    source: S,
    pub query: QueryState,
    stats: Option<Stats>,
    notice: Option<Notice>,
}

impl<S: RoutineSource> HomeScreen<S> {
    pub fn new(source: S, page_size: u32) -> Self {
        Self {
            source,
            query: QueryState::new(page_size),
            stats: None,
            notice: None,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn stats(&self) -> Option<&Stats> {
        self.stats.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// First load when the screen opens.
    pub async fn enter(&mut self) {
        self.load_stats().await;
        self.refresh().await;
    }

    /// Fetch for the current query state and land the response.
    pub async fn refresh(&mut self) -> ApplyOutcome {
        let request = self.query.next_request();
        let result = fetch_page(&self.source, &request.kind).await;
        self.land(&request, result)
    }

    /// Land a response for a request issued through `self.query`, possibly
    /// out of order.
    pub fn land(&mut self, request: &QueryRequest, result: Result<PaginatedRoutines>) -> ApplyOutcome {
        let result = result.map_err(|e| {
            let message = match request.kind {
                QueryKind::Browse { .. } => "Could not load routines.",
                QueryKind::Search { .. } => "Could not run the search.",
            };
            tracing::error!(error = %e, seq = request.seq, "query.request_failed");
            message.to_string()
        });
        self.query.apply(request, result)
    }

    pub async fn load_stats(&mut self) {
        let result = self.source.stats().await;
        self.land_stats(result);
    }

    /// Stats failures are only logged; the rest of the screen still works.
    pub fn land_stats(&mut self, result: Result<Stats>) {
        match result {
            Ok(stats) => {
                self.query.note_routines_exist(stats.total_routines);
                self.stats = Some(stats);
            }
            Err(e) => {
                tracing::error!(error = %e, "stats.load_failed");
            }
        }
    }

    /// Turn the outcome of an action into a notice and local list changes.
    /// Follow-up loads are left to the caller (see [`Done::reloads_stats`]
    /// and [`Done::refetches`]).
    pub fn settle(&mut self, action: &Action, result: Result<Done>) -> Option<Done> {
        let done = match result {
            Ok(done) => done,
            Err(e) => {
                tracing::error!(error = %e, action = ?action, "routine.action_failed");
                self.notice = Some(Notice::error(action.failure_message()));
                return None;
            }
        };

        match &done {
            Done::Opened(_) => {}
            Done::Deleted(routine_id) => {
                tracing::info!(routine_id, "routine.deleted");
                self.query.remove_routine(*routine_id);
                self.notice = Some(Notice::success("Routine deleted."));
            }
            Done::Duplicated(copy) => {
                tracing::info!(copy_id = copy.id, name = %copy.name, "routine.duplicated");
                self.notice = Some(Notice::success("Routine duplicated."));
            }
            Done::Exported(path) => {
                self.notice = Some(Notice::success(format!("Exported CSV: {}", path.display())));
            }
        }
        Some(done)
    }

    /// Perform an action and wait for it, including its follow-up loads.
    pub async fn run(&mut self, action: Action) -> Option<Done> {
        let result = perform(&self.source, &action).await;
        let done = self.settle(&action, result)?;
        if done.reloads_stats() {
            self.load_stats().await;
        }
        if done.refetches() {
            self.refresh().await;
        }
        Some(done)
    }

    pub async fn open_routine(&mut self, routine_id: i64) -> Option<Routine> {
        match self.run(Action::Open(routine_id)).await {
            Some(Done::Opened(routine)) => Some(routine),
            _ => None,
        }
    }

    /// Create or update from the editor. Validation problems come back to the
    /// form and no request is sent; server failures become a notice.
    pub async fn submit(&mut self, editor: &RoutineEditor) -> Result<Option<Routine>, ValidationError> {
        let payload = editor.build_payload()?;

        let result = match editor.editing_id() {
            Some(routine_id) => self.source.update(routine_id, &payload).await,
            None => self.source.create(&payload).await,
        };

        match result {
            Ok(routine) => {
                tracing::info!(routine_id = routine.id, name = %routine.name, "routine.saved");
                self.notice = Some(Notice::success(if editor.editing_id().is_some() {
                    "Routine updated."
                } else {
                    "Routine created."
                }));
                self.query.reset_search();
                self.load_stats().await;
                self.refresh().await;
                Ok(Some(routine))
            }
            Err(e) => {
                tracing::error!(error = %e, "routine.save_failed");
                self.notice = Some(Notice::error("There was an error saving the routine."));
                Ok(None)
            }
        }
    }

    pub async fn delete(&mut self, routine_id: i64) -> bool {
        self.run(Action::Delete(routine_id)).await.is_some()
    }

    pub async fn duplicate(&mut self, routine_id: i64, new_name: Option<&str>) -> Option<Routine> {
        let action = Action::Duplicate {
            routine_id,
            new_name: new_name.map(str::to_string),
        };
        match self.run(action).await {
            Some(Done::Duplicated(copy)) => Some(copy),
            _ => None,
        }
    }

    /// Download the server's CSV and write it to `path` as is.
    pub async fn export_csv(&mut self, path: &Path) -> Option<PathBuf> {
        match self.run(Action::Export(path.to_path_buf())).await {
            Some(Done::Exported(saved)) => Some(saved),
            _ => None,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fake::FakeSource;
    use super::*;
    use crate::clients::models::common::{DayOfWeek, Exercise};
    use crate::services::query::Mode;

    fn names(screen: &HomeScreen<FakeSource>) -> Vec<String> {
        screen.query.displayed().iter().map(|r| r.name.clone()).collect()
    }

    #[tokio::test]
    async fn test_enter_loads_stats_and_first_page() {
        let mut screen = HomeScreen::new(FakeSource::with_names(&["Torso", "Pierna"]), 6);
        screen.enter().await;

        assert_eq!(names(&screen), vec!["Torso", "Pierna"]);
        assert_eq!(screen.stats().map(|s| s.total_routines), Some(2));
    }

    #[tokio::test]
    async fn test_invalid_editor_sends_nothing() {
        let mut screen = HomeScreen::new(FakeSource::default(), 6);

        let mut editor = RoutineEditor::new();
        editor.exercises[0].name = "Sentadilla".to_string();
        assert_eq!(screen.submit(&editor).await, Err(ValidationError::NameRequired));

        editor.set_name("Pierna");
        editor.exercises[0].series = 0;
        assert!(matches!(
            screen.submit(&editor).await,
            Err(ValidationError::InvalidExercise { .. })
        ));

        assert_eq!(screen.source().calls(), 0);
        assert!(screen.notice().is_none());
    }

    #[tokio::test]
    async fn test_submit_creates_and_resets_search() {
        let mut screen = HomeScreen::new(FakeSource::with_names(&["Torso"]), 6);
        screen.query.set_input("tor");
        screen.query.commit_term("tor");
        screen.refresh().await;

        let mut editor = RoutineEditor::new();
        editor.set_name("Pierna");
        editor.exercises[0] = Exercise {
            name: "Sentadilla".to_string(),
            day_of_week: DayOfWeek::Lunes,
            order: 5,
            ..Exercise::blank(5)
        };

        let created = screen.submit(&editor).await.unwrap().unwrap();

        assert_eq!(created.exercises[0].order, 1);
        assert_eq!(screen.query.mode(), Mode::Browsing);
        assert_eq!(screen.query.input(), "");
        assert_eq!(names(&screen), vec!["Torso", "Pierna"]);
        assert_eq!(screen.notice().map(|n| n.severity), Some(Severity::Success));
        assert_eq!(screen.stats().map(|s| s.total_routines), Some(2));
    }

    #[tokio::test]
    async fn test_submit_failure_becomes_error_notice() {
        let mut screen = HomeScreen::new(FakeSource::default(), 6);
        screen.source().fail(true);

        let mut editor = RoutineEditor::new();
        editor.set_name("Pierna");
        editor.exercises[0].name = "Prensa".to_string();

        assert_eq!(screen.submit(&editor).await, Ok(None));
        let notice = screen.take_notice().unwrap();
        assert_eq!(notice.severity, Severity::Error);
        assert!(screen.notice().is_none());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_routines() {
        let mut screen = HomeScreen::new(FakeSource::with_names(&["Torso"]), 6);
        screen.refresh().await;

        screen.source().fail(true);
        screen.query.set_page(2);
        screen.refresh().await;

        assert_eq!(names(&screen), vec!["Torso"]);
        assert_eq!(screen.query.error(), Some("Could not load routines."));
    }

    #[tokio::test]
    async fn test_delete_and_duplicate() {
        let mut screen = HomeScreen::new(FakeSource::with_names(&["Torso", "Pierna"]), 6);
        screen.enter().await;

        assert!(screen.delete(1).await);
        assert_eq!(names(&screen), vec!["Pierna"]);

        let copy = screen.duplicate(2, None).await.unwrap();
        assert_eq!(copy.name, "Pierna (Copia)");
        assert_eq!(names(&screen), vec!["Pierna", "Pierna (Copia)"]);

        screen.source().fail(true);
        assert!(!screen.delete(2).await);
        assert_eq!(screen.notice().map(|n| n.severity), Some(Severity::Error));
        assert_eq!(names(&screen).len(), 2);
    }

    #[tokio::test]
    async fn test_open_missing_routine_sets_notice() {
        let mut screen = HomeScreen::new(FakeSource::default(), 6);
        assert!(screen.open_routine(42).await.is_none());
        assert_eq!(
            screen.notice().map(|n| n.message.as_str()),
            Some("Could not load the routine.")
        );
    }

    #[tokio::test]
    async fn test_export_writes_bytes_verbatim() {
        let mut screen = HomeScreen::new(FakeSource::default(), 6);
        let path = std::env::temp_dir().join(format!("rutinas_export_{}.csv", std::process::id()));

        let saved = screen.export_csv(&path).await.unwrap();
        let written = std::fs::read(&saved).unwrap();
        assert_eq!(written, b"rutina_id,rutina_nombre\n1,Torso\n");
        let _ = std::fs::remove_file(saved);
    }
}
