//! The normalized article type shown in the list.
//!
//! `Article` is what the parser produces from one search result record.  All
//! five fields are plain strings that are always present: contributors are
//! pre-joined for display and the publication date is already cut down to
//! the calendar day.

/// Placeholder shown when a result carries no contributor tags.
pub const NO_CONTRIBUTORS: &str = "Contributors N/A";

/// A single news article, normalized from the search API's JSON.
///
/// Values are immutable once built; construct them through [`Article::new`]
/// (the parser only does so after every required field was read).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    title: String,
    contributor: String,
    date_published: String,
    section: String,
    url: String,
}

impl Article {
    pub fn new(
        title: impl Into<String>,
        contributor: impl Into<String>,
        date_published: impl Into<String>,
        section: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            contributor: contributor.into(),
            date_published: date_published.into(),
            section: section.into(),
            url: url.into(),
        }
    }

    /// Headline (`webTitle`).
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Contributor names joined with `", "`, or [`NO_CONTRIBUTORS`].
    pub fn contributor(&self) -> &str {
        &self.contributor
    }

    /// Publication date without the time of day, e.g. `2017-06-19`.
    pub fn date_published(&self) -> &str {
        &self.date_published
    }

    /// Section label (`sectionName`), e.g. `World news`.
    pub fn section(&self) -> &str {
        &self.section
    }

    /// Absolute link to the full article.
    pub fn url(&self) -> &str {
        &self.url
    }
}
