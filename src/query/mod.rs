//! Routing of "special" launcher queries.
//!
//! Some launcher inputs are not application searches: `=1+2` evaluates
//! an arithmetic expression and `?rust lifetimes` offers a web search.
//! [`route_special_query`] tries each handler in order; the first one
//! that recognises the query *consumes* it and supplies the result rows
//! plus the [`QueryAction`] to run when a row is activated.

pub mod calculator;
pub mod web_search;

use std::collections::HashMap;

/// Prefix of every row id produced by a special handler.
pub const SPECIAL_PREFIX: &str = "__special__:";

/// What activating a special row does.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryAction {
    /// Copy the evaluated result.
    CalcResult { expression: String, result: String },
    /// Open a web search for `term`.
    WebSearch { term: String },
}

/// Rows and actions produced for a query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouterResult {
    /// `(id, label)` rows.
    pub items: Vec<(String, String)>,
    /// Actions keyed by row id.  Hint and error rows have none.
    pub actions: HashMap<String, QueryAction>,
    /// Whether the query was handled and application search must be
    /// skipped.
    pub consume: bool,
}

impl RouterResult {
    pub fn empty() -> Self {
        Self::default()
    }

    fn consumed() -> Self {
        Self {
            consume: true,
            ..Self::default()
        }
    }

    fn push(&mut self, id: String, label: String, action: Option<QueryAction>) {
        if let Some(action) = action {
            self.actions.insert(id.clone(), action);
        }
        self.items.push((id, label));
    }
}

/// Whether `id` belongs to a special row rather than an application.
pub fn is_special_id(id: &str) -> bool {
    id.starts_with(SPECIAL_PREFIX)
}

type Handler = fn(&str) -> Option<RouterResult>;

const HANDLERS: &[Handler] = &[calculator::handle_query, web_search::handle_query];

/// Run `query` through the special handlers.
///
/// Returns an empty, non-consuming result when no handler applies.
pub fn route_special_query(query: &str) -> RouterResult {
    if query.is_empty() {
        return RouterResult::empty();
    }
    HANDLERS
        .iter()
        .find_map(|handler| handler(query))
        .unwrap_or_default()
}
