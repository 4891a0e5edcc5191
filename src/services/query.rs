//! Home-screen query state: search term, weekday filter and page.
//!
//! Every fetch is tagged with a sequence number. A response is applied only if
//! no newer response has landed already, so the last issued request wins
//! regardless of arrival order.

use crate::clients::models::common::DayOfWeek;
use crate::clients::models::responses::{PaginatedRoutines, PaginationMeta, Routine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Browsing,
    Searching,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryKind {
    Browse {
        page: u32,
        page_size: u32,
        day: Option<DayOfWeek>,
    },
    Search {
        term: String,
        page: u32,
        page_size: u32,
        day: Option<DayOfWeek>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub seq: u64,
    pub kind: QueryKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied,
    Stale,
}

#[derive(Debug, Clone)]
pub struct QueryState {
    input: String,
    term: String,
    mode: Mode,
    day_filter: Option<DayOfWeek>,
    page: u32,
    page_size: u32,
    next_seq: u64,
    applied_seq: u64,
    in_flight: usize,
    browse: Option<PaginatedRoutines>,
    search: Option<PaginatedRoutines>,
    has_any_routine: bool,
    error: Option<String>,
}

impl QueryState {
    pub fn new(page_size: u32) -> Self {
        Self {
            input: String::new(),
            term: String::new(),
            mode: Mode::Browsing,
            day_filter: None,
            page: 1,
            page_size: page_size.max(1),
            next_seq: 0,
            applied_seq: 0,
            in_flight: 0,
            browse: None,
            search: None,
            has_any_routine: false,
            error: None,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn day_filter(&self) -> Option<DayOfWeek> {
        self.day_filter
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn is_searching(&self) -> bool {
        self.mode == Mode::Searching && self.in_flight > 0
    }

    /// Raw keystroke. Never issues a request and leaves the page alone; the
    /// debounced value reaches [`QueryState::commit_term`], which resets the
    /// page when the term actually changes.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Apply the debounced search input. Returns whether a fetch is needed.
    pub fn commit_term(&mut self, text: &str) -> bool {
        let term = text.trim();
        if term.is_empty() {
            if self.mode == Mode::Browsing {
                return false;
            }
            tracing::debug!("query.search_cleared");
            self.mode = Mode::Browsing;
            self.term.clear();
            self.search = None;
            self.page = 1;
            // any search still in flight must not land
            self.applied_seq = self.next_seq;
            return true;
        }

        if self.mode == Mode::Searching && self.term == term {
            return false;
        }
        tracing::debug!(term = %term, "query.search_started");
        self.mode = Mode::Searching;
        self.term = term.to_string();
        self.page = 1;
        true
    }

    /// Clear the search box and term at once, e.g. after a save.
    pub fn reset_search(&mut self) {
        self.input.clear();
        self.commit_term("");
        self.page = 1;
    }

    pub fn set_day_filter(&mut self, day: Option<DayOfWeek>) -> bool {
        if self.day_filter == day {
            return false;
        }
        self.day_filter = day;
        self.page = 1;
        true
    }

    pub fn set_page(&mut self, page: u32) -> bool {
        let page = page.max(1);
        if self.page == page {
            return false;
        }
        self.page = page;
        true
    }

    /// Describe the fetch for the current state and tag it.
    pub fn next_request(&mut self) -> QueryRequest {
        self.next_seq += 1;
        self.in_flight += 1;

        let kind = match self.mode {
            Mode::Browsing => QueryKind::Browse {
                page: self.page,
                page_size: self.page_size,
                day: self.day_filter,
            },
            Mode::Searching => QueryKind::Search {
                term: self.term.clone(),
                page: self.page,
                page_size: self.page_size,
                day: self.day_filter,
            },
        };

        QueryRequest {
            seq: self.next_seq,
            kind,
        }
    }

    /// Land a response. Failures keep the previously shown routines.
    pub fn apply(
        &mut self,
        request: &QueryRequest,
        result: Result<PaginatedRoutines, String>,
    ) -> ApplyOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);

        let is_search = matches!(request.kind, QueryKind::Search { .. });
        if request.seq <= self.applied_seq || (is_search && self.mode == Mode::Browsing) {
            tracing::debug!(
                seq = request.seq,
                applied_seq = self.applied_seq,
                "query.response_stale"
            );
            return ApplyOutcome::Stale;
        }
        self.applied_seq = request.seq;

        match result {
            Ok(routines) => {
                if let QueryKind::Browse { day: None, .. } = request.kind
                    && routines.meta.total > 0
                {
                    self.has_any_routine = true;
                }
                if is_search {
                    self.search = Some(routines);
                } else {
                    self.browse = Some(routines);
                }
                self.error = None;
            }
            Err(message) => {
                tracing::warn!(seq = request.seq, error = %message, "query.response_failed");
                self.error = Some(message);
            }
        }
        ApplyOutcome::Applied
    }

    /// Remember that routines exist, e.g. from the stats endpoint.
    pub fn note_routines_exist(&mut self, total_routines: u64) {
        if total_routines > 0 {
            self.has_any_routine = true;
        }
    }

    fn displayed_set(&self) -> Option<&PaginatedRoutines> {
        match self.mode {
            Mode::Searching => self.search.as_ref().or(self.browse.as_ref()),
            Mode::Browsing => self.browse.as_ref(),
        }
    }

    /// Routines on screen: search results when a search has landed, else the browse page.
    pub fn displayed(&self) -> &[Routine] {
        self.displayed_set()
            .map(|set| set.items.as_slice())
            .unwrap_or_default()
    }

    pub fn meta(&self) -> Option<&PaginationMeta> {
        self.displayed_set().map(|set| &set.meta)
    }

    pub fn show_pagination(&self) -> bool {
        self.meta().is_some_and(|meta| meta.pages > 1)
    }

    pub fn empty_message(&self) -> &'static str {
        if self.mode == Mode::Searching && self.search.is_some() {
            "No routines match that name."
        } else if self.day_filter.is_some() && self.has_any_routine {
            "No routines for this day yet."
        } else {
            "No routines yet."
        }
    }

    /// Keep the visible lists in step with a local delete.
    pub fn remove_routine(&mut self, routine_id: i64) {
        for set in [self.browse.as_mut(), self.search.as_mut()].into_iter().flatten() {
            set.items.retain(|routine| routine.id != routine_id);
        }
    }
}
