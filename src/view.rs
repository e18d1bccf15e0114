//! Search view state machine: `Idle -> Loading -> {Empty, Results, Failed}`.
//!
//! Every submission gets a [`Ticket`]. Only the ticket of the latest submission
//! may resolve the view, so a slow response to an earlier search can never
//! overwrite a newer one.

use crate::entity::SearchOutcome;
use crate::error::SearchError;
use crate::query::Query;
use crate::render::ResultsView;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Idle,
    Loading(Query),
    Empty(Query),
    Results(ResultsView),
    Failed(String),
}

impl ViewState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading(_))
    }

    pub fn query(&self) -> Option<&str> {
        match self {
            ViewState::Loading(query) | ViewState::Empty(query) => Some(query.as_str()),
            ViewState::Results(results) => Some(results.query.as_str()),
            ViewState::Idle | ViewState::Failed(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    query: Query,
}

impl Ticket {
    pub fn query(&self) -> &Query {
        &self.query
    }
}

#[derive(Debug)]
pub struct ViewController {
    state: ViewState,
    generation: u64,
}

impl Default for ViewController {
    fn default() -> Self {
        Self {
            state: ViewState::Idle,
            generation: 0,
        }
    }
}

impl ViewController {
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn into_state(self) -> ViewState {
        self.state
    }

    /// Starts a search. Blank input leaves the state untouched and returns `None`.
    pub fn submit(&mut self, raw: &str) -> Option<Ticket> {
        let query = Query::parse(raw)?;
        self.generation += 1;
        self.state = ViewState::Loading(query.clone());
        Some(Ticket {
            generation: self.generation,
            query,
        })
    }

    /// Applies the result of a search. Returns `false` when the ticket has been
    /// superseded by a later submission; the state is then left alone.
    pub fn resolve(
        &mut self,
        ticket: Ticket,
        result: Result<SearchOutcome, SearchError>,
    ) -> bool {
        if ticket.generation != self.generation || !self.state.is_loading() {
            return false;
        }
        self.state = match result {
            Ok(SearchOutcome::Empty) => ViewState::Empty(ticket.query),
            Ok(SearchOutcome::Found(items)) => {
                ViewState::Results(ResultsView::build(&ticket.query, &items))
            }
            Err(err) => ViewState::Failed(err.to_string()),
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Entity, RawEntity, ResultItem};

    fn found(names: &[&str]) -> SearchOutcome {
        SearchOutcome::Found(
            names
                .iter()
                .map(|name| ResultItem {
                    entity: Entity::from(RawEntity {
                        name: Some(name.to_string()),
                        ..RawEntity::default()
                    }),
                    score: 1.0,
                })
                .collect(),
        )
    }

    #[test]
    fn blank_submission_changes_nothing() {
        let mut view = ViewController::default();
        assert!(view.submit("   ").is_none());
        assert_eq!(view.state(), &ViewState::Idle);
    }

    #[test]
    fn submission_enters_loading() {
        let mut view = ViewController::default();
        let ticket = view.submit(" rust ").unwrap();
        assert_eq!(ticket.query().as_str(), "rust");
        assert!(view.state().is_loading());
    }

    #[test]
    fn empty_outcome_is_not_a_failure() {
        let mut view = ViewController::default();
        let ticket = view.submit("nothing").unwrap();
        assert!(view.resolve(ticket, Ok(SearchOutcome::Empty)));
        assert_eq!(view.state(), &ViewState::Empty(Query::parse("nothing").unwrap()));
    }

    #[test]
    fn results_carry_the_query_and_count() {
        let mut view = ViewController::default();
        let ticket = view.submit("einstein").unwrap();
        view.resolve(ticket, Ok(found(&["a", "b"])));
        let ViewState::Results(results) = view.state() else {
            panic!("expected results");
        };
        assert_eq!(results.total, 2);
        assert_eq!(results.headline(), "Found 2 results for \"einstein\"");
    }

    #[test]
    fn errors_surface_their_message() {
        let mut view = ViewController::default();
        let ticket = view.submit("einstein").unwrap();
        view.resolve(ticket, Err(SearchError::HttpStatus { status: 403 }));
        assert_eq!(
            view.state(),
            &ViewState::Failed("Failed to fetch results (403)".to_string())
        );
    }

    #[test]
    fn failure_needs_a_fresh_submission() {
        let mut view = ViewController::default();
        let first = view.submit("a").unwrap();
        view.resolve(first.clone(), Err(SearchError::HttpStatus { status: 500 }));
        assert!(!view.resolve(first, Ok(found(&["late"]))));
        assert!(matches!(view.state(), ViewState::Failed(_)));

        let retry = view.submit("a").unwrap();
        assert!(view.resolve(retry, Ok(SearchOutcome::Empty)));
    }

    #[test]
    fn stale_response_cannot_overwrite_newer_search() {
        let mut view = ViewController::default();
        let slow = view.submit("first").unwrap();
        let fast = view.submit("second").unwrap();
        assert!(view.resolve(fast, Ok(found(&["second hit"]))));
        assert!(!view.resolve(slow, Ok(found(&["first hit"]))));
        assert_eq!(view.state().query(), Some("second"));
    }
}
