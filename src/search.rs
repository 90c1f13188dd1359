//! Free-text search input.

use crate::api::SearchQuery;

/// Search state.
#[derive(Debug)]
pub struct SearchState {
    is_active: bool,
    buffer: String,
    query: SearchQuery,
}

impl SearchState {
    /// Create a new search state.
    pub fn new() -> Self {
        Self::with_query(SearchQuery::default())
    }

    /// Create a search state with an already submitted query.
    pub fn with_query(query: SearchQuery) -> Self {
        Self {
            is_active: false,
            buffer: String::new(),
            query,
        }
    }

    /// Check if search input is active.
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Start typing a search, prefilled with the current query.
    pub fn start(&mut self) {
        self.is_active = true;
        self.buffer = self.query.text.clone();
    }

    /// Add a character to the search buffer.
    pub fn input(&mut self, c: char) {
        self.buffer.push(c);
    }

    /// Remove the last character from the search buffer.
    pub fn backspace(&mut self) {
        self.buffer.pop();
    }

    /// Submit the search.
    ///
    /// Returns the query to run when it differs from the previous one. An
    /// empty buffer clears the search.
    pub fn submit(&mut self) -> Option<SearchQuery> {
        self.is_active = false;
        let text = std::mem::take(&mut self.buffer).trim().to_string();
        if text == self.query.text {
            return None;
        }
        self.query = SearchQuery::new(text);
        Some(self.query.clone())
    }

    /// Cancel the search input, keeping the previous query.
    pub fn cancel(&mut self) {
        self.is_active = false;
        self.buffer.clear();
    }

    /// Get the search buffer.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Get the submitted query.
    pub fn query(&self) -> &SearchQuery {
        &self.query
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new()
    }
}
