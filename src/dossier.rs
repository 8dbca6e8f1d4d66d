//! Dossier loading.
//!
//! A dossier is free text describing a brand. It can come from a local text
//! file, a PDF, or a webpage (fetched with reqwest, reduced to readable text
//! with scraper).

use reqwest::Client;
use scraper::{Html, Selector};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// User-Agent string identifying the dossier fetcher
const USER_AGENT: &str = concat!(
    "ideaforge/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/cladam/ideaforge)"
);

/// Default timeout for HTTP requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const MIN_PROSE_CHARS: usize = 20;

#[derive(Error, Debug)]
pub enum DossierError {
    #[error("failed to fetch URL: {0}")]
    FetchError(#[from] reqwest::Error),
    #[error("failed to read {}: {source}", .path.display())]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to extract text from PDF {}: {reason}", .path.display())]
    PdfError { path: PathBuf, reason: String },
    #[error("no text found in dossier {0}")]
    NoContent(String),
}

/// A loaded dossier.
#[derive(Debug, Clone)]
pub struct Dossier {
    /// Where the text came from (path or URL)
    pub origin: String,
    /// Page or document title, when one was found
    pub title: Option<String>,
    pub text: String,
}

/// Load a dossier from `source`, a file path or an `http(s)` URL.
pub async fn load(source: &str) -> Result<Dossier, DossierError> {
    if source.starts_with("http://") || source.starts_with("https://") {
        fetch_url(source).await
    } else {
        read_file(Path::new(source))
    }
}

/// Read a dossier from a local UTF-8 text or PDF file.
pub fn read_file(path: &Path) -> Result<Dossier, DossierError> {
    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

    let text = if is_pdf {
        pdf_extract::extract_text(path).map_err(|e| DossierError::PdfError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?
    } else {
        std::fs::read_to_string(path).map_err(|source| DossierError::ReadError {
            path: path.to_path_buf(),
            source,
        })?
    };

    let origin = path.display().to_string();
    if text.trim().is_empty() {
        return Err(DossierError::NoContent(origin));
    }
    Ok(Dossier {
        origin,
        title: None,
        text,
    })
}

/// Create a configured HTTP client for fetching
fn create_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
}

/// Fetch a webpage and extract its readable text
pub async fn fetch_url(url: &str) -> Result<Dossier, DossierError> {
    let client = create_client()?;

    let response = client.get(url).send().await?.error_for_status()?;
    let html = response.text().await?;
    let document = Html::parse_document(&html);

    let title = extract_title(&document);
    let text = extract_text(&document);

    if text.trim().is_empty() {
        return Err(DossierError::NoContent(url.to_string()));
    }

    tracing::debug!(url, chars = text.len(), "dossier fetched");
    Ok(Dossier {
        origin: url.to_string(),
        title,
        text,
    })
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let element = document.select(&selector).next()?;
    let text: String = element.text().collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Extract the page title from <title> or <h1>
fn extract_title(document: &Html) -> Option<String> {
    first_text(document, "title").or_else(|| first_text(document, "h1"))
}

/// Extract readable text, preferring the main content area of the page
fn extract_text(document: &Html) -> String {
    let main_selectors = ["article", "main", "[role='main']", ".content", "#content"];

    for selector_str in main_selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = document.select(&selector).next() {
                let text = extract_text_from_element(&Html::parse_fragment(&element.html()));
                if !text.trim().is_empty() {
                    return text;
                }
            }
        }
    }

    extract_text_from_element(document)
}

/// Collects prose, headings, definition lists and table rows. Short prose is
/// dropped as navigation noise; facts like `Founded | 1962` are kept whatever
/// their length.
fn extract_text_from_element(document: &Html) -> String {
    let (Ok(blocks), Ok(cells)) = (
        Selector::parse("p, li, blockquote, h1, h2, h3, h4, h5, h6, dt, dd, tr"),
        Selector::parse("th, td"),
    ) else {
        return String::new();
    };

    let mut lines: Vec<String> = Vec::new();
    for element in document.select(&blocks) {
        let name = element.value().name();
        let line = if name == "tr" {
            element
                .select(&cells)
                .map(|cell| collapse(cell.text()))
                .filter(|cell| !cell.is_empty())
                .collect::<Vec<_>>()
                .join(" | ")
        } else {
            collapse(element.text())
        };
        let keep = match name {
            "p" | "li" | "blockquote" => line.chars().count() > MIN_PROSE_CHARS,
            _ => !line.is_empty(),
        };
        if keep && lines.last() != Some(&line) {
            lines.push(line);
        }
    }
    lines.join("\n\n")
}

fn collapse<'a>(fragments: impl Iterator<Item = &'a str>) -> String {
    fragments
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
