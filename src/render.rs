//! Plain-text rendering of a [`FeedSnapshot`] for the terminal.
//!
//! Rendering only reads snapshots; it never touches the session. All text that
//! came from the feed goes through [`strip_control_chars`] before printing.

use crate::feed::{Document, Post};
use crate::session::{FeedSnapshot, FeedState};
use crate::util::{strip_control_chars, truncate_to_width, wrap_to_width};
use std::fmt::Write;

/// Presentation settings.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Terminal width in columns. 0 disables wrapping and truncation.
    pub width: usize,
    /// chrono format string for post dates.
    pub date_format: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 80,
            date_format: "%Y-%m-%d %H:%M".to_string(),
        }
    }
}

/// One-line description of a non-success state, or `None` for `Success`.
///
/// `NotFound` is phrased as a wrong-URL hint; every other failure gets the same
/// retry message.
pub fn status_message(snapshot: &FeedSnapshot) -> Option<String> {
    match snapshot.state {
        FeedState::Initial => Some("Enter an instance URL to load its feed.".to_string()),
        FeedState::Loading => Some(match &snapshot.instance_url {
            Some(url) => format!("Loading {}...", strip_control_chars(url)),
            None => "Loading...".to_string(),
        }),
        FeedState::NotFound => Some(format!(
            "Could not find file beluga.json at {}. Make sure you entered the main page without slash at the end",
            snapshot
                .instance_url
                .as_deref()
                .map(strip_control_chars)
                .unwrap_or_default()
        )),
        FeedState::Failed => Some("An error occurred. Please try again.".to_string()),
        FeedState::Success => None,
    }
}

/// Full text for a snapshot: the status message, or the document for `Success`.
pub fn render_snapshot(snapshot: &FeedSnapshot, options: &RenderOptions) -> String {
    match (snapshot.state, &snapshot.document) {
        (FeedState::Success, Some(document)) => render_document(document, options),
        _ => {
            let mut out = status_message(snapshot).unwrap_or_default();
            if let (FeedState::Failed, Some(error)) = (snapshot.state, &snapshot.error) {
                let _ = write!(out, "\n({})", strip_control_chars(error));
            }
            out.push('\n');
            out
        }
    }
}

pub fn render_document(document: &Document, options: &RenderOptions) -> String {
    let mut out = String::new();

    let names: Vec<_> = document
        .authors
        .iter()
        .map(|a| strip_control_chars(&a.name))
        .collect();
    if !names.is_empty() {
        let line = format!("Authors: {}", names.join(", "));
        let _ = writeln!(out, "{}", fit(&line, options.width));
    }
    if !document.home_page_url.is_empty() {
        let line = format!("Home: {}", strip_control_chars(&document.home_page_url));
        let _ = writeln!(out, "{}", fit(&line, options.width));
    }

    if document.posts.is_empty() {
        out.push_str("\nNo posts.\n");
        return out;
    }

    for post in &document.posts {
        out.push('\n');
        render_post(&mut out, document, post, options);
    }

    out
}

fn render_post(out: &mut String, document: &Document, post: &Post, options: &RenderOptions) {
    let author = document
        .author_for(post)
        .map(|a| strip_control_chars(&a.name).into_owned())
        .unwrap_or_else(|| "Unknown author".to_string());

    let mut header = format!(
        "{}  {}",
        author,
        format_date(&post.date_published, &options.date_format)
    );
    if let Some(modified) = &post.date_modified {
        let _ = write!(
            header,
            " (edited {})",
            format_date(modified, &options.date_format)
        );
    }
    let _ = writeln!(out, "{}", fit(&header, options.width));

    for line in wrap_to_width(&strip_control_chars(&post.content_text), options.width) {
        let _ = writeln!(out, "{}", line);
    }

    for attachment in &post.attachments {
        let line = format!(
            "  [{}] {}",
            strip_control_chars(&attachment.link_title),
            strip_control_chars(&attachment.link_url)
        );
        let _ = writeln!(out, "{}", fit(&line, options.width));
    }

    let _ = writeln!(out, "{}", fit(&strip_control_chars(&post.url), options.width));
}

/// Formats a feed date with `format`, falling back to the raw value when it
/// does not parse or the format string is unusable.
pub fn format_date(value: &str, format: &str) -> String {
    let Some(dt) = crate::feed::parse_date_time(value) else {
        return strip_control_chars(value).into_owned();
    };
    let mut formatted = String::new();
    match write!(formatted, "{}", dt.format(format)) {
        Ok(()) => formatted,
        Err(_) => value.to_string(),
    }
}

fn fit(line: &str, width: usize) -> String {
    if width == 0 {
        line.to_string()
    } else {
        truncate_to_width(line, width).into_owned()
    }
}
