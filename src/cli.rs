//! Minimal CLI parsing for run mode selection.

use std::env;

/// What the binary should do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Command {
    /// Serve the HTTP API (default)
    #[default]
    Serve,
    /// Crawl once and print the catalog JSON to stdout
    Scan,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub command: Command,
    pub folder_id_override: Option<String>,
    pub search: Option<String>,
}

impl CliOptions {
    pub fn from_args() -> Self {
        Self::parse(env::args().skip(1))
    }

    pub fn parse<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = CliOptions::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--scan" => options.command = Command::Scan,
                "--serve" => options.command = Command::Serve,
                "--folder-id" => options.folder_id_override = args.next(),
                "--search" => options.search = args.next(),
                _ if arg.starts_with("--folder-id=") => {
                    if let Some(value) = arg.split_once('=').map(|(_, v)| v) {
                        options.folder_id_override = Some(value.to_string());
                    }
                }
                _ => {}
            }
        }
        options
    }
}
