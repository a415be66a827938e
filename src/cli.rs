//! Command-line interface.
//!
//! Every option can also come from the environment, so the API key does not
//! have to appear in shell history.

use std::path::PathBuf;

use clap::Parser;

/// Search a news API and browse the results in the terminal.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Search endpoint of the content API
    #[arg(
        long,
        env = "HEADLINES_ENDPOINT",
        default_value = "https://content.guardianapis.com/search"
    )]
    pub endpoint: String,

    /// API key sent with every request
    #[arg(long, env = "GUARDIAN_API_KEY", default_value = "test")]
    pub api_key: String,

    /// Search text for the initial load (empty loads the latest articles)
    #[arg(short, long, default_value = "")]
    pub query: String,

    /// File that receives the log output (the terminal is taken by the UI)
    #[arg(long, env = "HEADLINES_LOG")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Endpoint with the API key and contributor tags requested, ending in
    /// the `q=` parameter the search text is appended to.
    pub fn base_query_url(&self) -> String {
        format!(
            "{}?api-key={}&show-tags=contributor&q=",
            self.endpoint, self.api_key
        )
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("headlines.log"))
    }
}
