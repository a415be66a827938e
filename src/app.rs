use chrono::Local;
use ratatui::widgets::ListState;

use crate::error::LoadError;
use crate::load::{LoadListener, LoadResult};
use crate::source::Article;

/// Empty-list text after a load that found nothing or failed.
pub const NO_ARTICLES: &str = "No articles found.";
/// Empty-list text when the connectivity check failed.
pub const NO_CONNECTION: &str = "No internet connection.";

pub struct App {
    /// Articles of the last successful load, in response order.
    pub articles: Vec<Article>,
    /// List selection state for scrolling.
    pub list_state: ListState,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last load status / hint message.
    pub status: String,
    /// A load cycle is running.
    pub loading: bool,
    /// Shown in place of the list when it is empty.
    pub empty_message: &'static str,
    /// Search text being edited; `None` when the search box is closed.
    pub search_input: Option<String>,
    /// Search text of the last submitted query.
    pub query: String,
}

impl App {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            articles: Vec::new(),
            list_state: ListState::default(),
            quit: false,
            status: "Starting…".into(),
            loading: false,
            empty_message: NO_ARTICLES,
            search_input: None,
            query: query.into(),
        }
    }

    pub fn selected_article(&self) -> Option<&Article> {
        self.list_state.selected().and_then(|i| self.articles.get(i))
    }

    /// Put the selected article's link in the status bar.
    pub fn show_selected_link(&mut self) {
        if let Some(url) = self.selected_article().map(|a| a.url().to_string()) {
            self.status = url;
        }
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        if self.articles.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.articles.len() - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.articles.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.articles.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.articles.is_empty() {
            self.list_state.select(Some(self.articles.len() - 1));
        }
    }

    // -- search box ----------------------------------------------------------

    pub fn open_search(&mut self) {
        self.search_input = Some(self.query.clone());
    }

    pub fn search_push(&mut self, c: char) {
        if let Some(input) = self.search_input.as_mut() {
            input.push(c);
        }
    }

    pub fn search_pop(&mut self) {
        if let Some(input) = self.search_input.as_mut() {
            input.pop();
        }
    }

    pub fn close_search(&mut self) {
        self.search_input = None;
    }

    /// Close the search box and remember its text as the current query.
    pub fn submit_search(&mut self) -> Option<String> {
        let text = self.search_input.take()?;
        self.query = text.clone();
        Some(text)
    }

    fn clear_articles(&mut self) {
        self.articles.clear();
        self.list_state.select(None);
    }
}

impl LoadListener for App {
    fn on_load_started(&mut self) {
        self.loading = true;
        self.status = if self.query.trim().is_empty() {
            "Loading latest articles…".into()
        } else {
            format!("Searching for \"{}\"…", self.query.trim())
        };
    }

    fn on_load_finished(&mut self, result: LoadResult) {
        self.loading = false;
        self.clear_articles();
        self.empty_message = NO_ARTICLES;

        let at = Local::now().format("%H:%M:%S");
        match result {
            LoadResult::Success(articles) => {
                self.status = format!("Loaded {} articles at {at}", articles.len());
                self.articles = articles;
                self.select_first();
            }
            LoadResult::Empty => {
                self.status = format!("No results at {at}");
            }
            LoadResult::Failure(LoadError::NoConnectivity) => {
                self.empty_message = NO_CONNECTION;
                self.status = "Offline".into();
            }
            LoadResult::Failure(e) => {
                self.status = format!("Error: {e}");
            }
        }
    }

    fn on_load_reset(&mut self) {
        self.loading = false;
        self.clear_articles();
        self.empty_message = NO_ARTICLES;
        self.status = "Cleared".into();
    }
}
