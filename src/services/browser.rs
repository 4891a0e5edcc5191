//! Non-blocking driver for the interactive home screen.
//!
//! Every server call runs on its own task and reports back on one channel.
//! The event loop keeps reading input and landing query responses while a slow
//! export or delete is still outstanding.

use anyhow::Result;
use tokio::sync::mpsc::UnboundedSender;

use crate::clients::RoutineSource;
use crate::clients::models::responses::{PaginatedRoutines, Stats};
use crate::services::query::{ApplyOutcome, QueryRequest};
use crate::services::screen::{Action, Done, HomeScreen, fetch_page, perform};

/// A finished background task.
#[derive(Debug)]
pub enum BrowseEvent {
    Query(QueryRequest, Result<PaginatedRoutines>),
    Action(Action, Result<Done>),
    Stats(Result<Stats>),
}

#[derive(Debug, PartialEq)]
pub enum Handled {
    Query(ApplyOutcome),
    Action(Option<Done>),
    Stats,
}

pub struct Browser<S> {
    pub screen: HomeScreen<S>,
    events: UnboundedSender<BrowseEvent>,
    pending_actions: usize,
}

impl<S> Browser<S>
where
    S: RoutineSource + Clone + Send + Sync + 'static,
{
    pub fn new(screen: HomeScreen<S>, events: UnboundedSender<BrowseEvent>) -> Self {
        Self {
            screen,
            events,
            pending_actions: 0,
        }
    }

    /// Actions started and not yet handled.
    pub fn pending_actions(&self) -> usize {
        self.pending_actions
    }

    /// Issue the current query without waiting for it.
    pub fn fetch(&mut self) {
        let request = self.screen.query.next_request();
        let source = self.screen.source().clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = fetch_page(&source, &request.kind).await;
            let _ = events.send(BrowseEvent::Query(request, result));
        });
    }

    pub fn start(&mut self, action: Action) {
        tracing::debug!(action = ?action, "browse.action_started");
        self.pending_actions += 1;
        let source = self.screen.source().clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = perform(&source, &action).await;
            let _ = events.send(BrowseEvent::Action(action, result));
        });
    }

    pub fn reload_stats(&self) {
        let source = self.screen.source().clone();
        let events = self.events.clone();
        tokio::spawn(async move {
            let result = source.stats().await;
            let _ = events.send(BrowseEvent::Stats(result));
        });
    }

    /// Fold a finished task into the screen, starting any follow-up loads.
    pub fn handle(&mut self, event: BrowseEvent) -> Handled {
        match event {
            BrowseEvent::Query(request, result) => Handled::Query(self.screen.land(&request, result)),
            BrowseEvent::Action(action, result) => {
                self.pending_actions = self.pending_actions.saturating_sub(1);
                let done = self.screen.settle(&action, result);
                if let Some(done) = &done {
                    if done.reloads_stats() {
                        self.reload_stats();
                    }
                    if done.refetches() {
                        self.fetch();
                    }
                }
                Handled::Action(done)
            }
            BrowseEvent::Stats(result) => {
                self.screen.land_stats(result);
                Handled::Stats
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::screen::Severity;
    use crate::services::screen::fake::FakeSource;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn browser(source: &FakeSource) -> (Browser<FakeSource>, UnboundedReceiver<BrowseEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Browser::new(HomeScreen::new(source.clone(), 6), tx), rx)
    }

    fn names(browser: &Browser<FakeSource>) -> Vec<String> {
        browser
            .screen
            .query
            .displayed()
            .iter()
            .map(|r| r.name.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_query_lands_while_export_is_pending() {
        let source = FakeSource::with_names(&["Torso", "Pierna"]);
        source.hold_exports();
        let (mut browser, mut rx) = browser(&source);
        let path = std::env::temp_dir().join(format!("rutinas_browse_{}.csv", std::process::id()));

        browser.start(Action::Export(path));
        assert!(browser.screen.query.commit_term("tor"));
        browser.fetch();

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, BrowseEvent::Query(..)));
        assert_eq!(browser.handle(event), Handled::Query(ApplyOutcome::Applied));
        assert_eq!(names(&browser), vec!["Torso"]);
        assert_eq!(browser.pending_actions(), 1);
        assert!(browser.screen.notice().is_none());

        source.release_exports();
        let event = rx.recv().await.unwrap();
        let Handled::Action(Some(Done::Exported(saved))) = browser.handle(event) else {
            panic!("export did not finish");
        };
        assert_eq!(browser.pending_actions(), 0);
        assert_eq!(
            browser.screen.notice().map(|n| n.severity),
            Some(Severity::Success)
        );
        let _ = std::fs::remove_file(saved);
    }

    #[tokio::test]
    async fn test_delete_reloads_stats_in_background() {
        let source = FakeSource::with_names(&["Torso", "Pierna"]);
        let (mut browser, mut rx) = browser(&source);
        browser.fetch();
        let event = rx.recv().await.unwrap();
        browser.handle(event);

        browser.start(Action::Delete(1));
        let event = rx.recv().await.unwrap();
        assert_eq!(browser.handle(event), Handled::Action(Some(Done::Deleted(1))));
        assert_eq!(names(&browser), vec!["Pierna"]);

        let event = rx.recv().await.unwrap();
        assert_eq!(browser.handle(event), Handled::Stats);
        assert_eq!(browser.screen.stats().map(|s| s.total_routines), Some(1));
    }

    #[tokio::test]
    async fn test_failed_action_becomes_error_notice() {
        let source = FakeSource::default();
        let (mut browser, mut rx) = browser(&source);

        browser.start(Action::Open(42));
        let event = rx.recv().await.unwrap();

        assert_eq!(browser.handle(event), Handled::Action(None));
        assert_eq!(
            browser.screen.notice().map(|n| n.message.as_str()),
            Some("Could not load the routine.")
        );
    }
}
