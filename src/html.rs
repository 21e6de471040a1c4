//! Adapters over the remote service's HTML pages.
//!
//! These functions depend on the exact markup of the login and download pages.
//! When the site changes, the fixture tests below are where it shows up.

use crate::error::{MirrorError, Result};
use regex::Regex;
use select::document::Document;
use select::predicate::{Attr, Name, Predicate};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// The download page redirects through the 4th script on the page.
const REDIRECT_SCRIPT_INDEX: usize = 3;

fn redirect_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"window\.location\.href = '(.+)'\}").expect("static redirect pattern")
    })
}

/// Name/value pairs of every hidden `<input>` inside a `<form>`.
pub fn hidden_fields(html: &str) -> BTreeMap<String, String> {
    let document = Document::from(html);
    let mut fields = BTreeMap::new();

    for form in document.find(Name("form")) {
        for input in form.find(Name("input").and(Attr("type", "hidden"))) {
            if let Some(name) = input.attr("name") {
                fields.insert(name.to_string(), input.attr("value").unwrap_or("").to_string());
            }
        }
    }
    fields
}

/// Extracts the relative archive path from the download response.
///
/// Fewer than four scripts means the page is not the one we expect and is an
/// error. A 4th script without the redirect is `Ok(None)`: the service had
/// nothing to package for the requested range.
pub fn redirect_path(html: &str) -> Result<Option<String>> {
    let document = Document::from(html);
    let scripts: Vec<String> = document.find(Name("script")).map(|s| s.text()).collect();

    let Some(script) = scripts.get(REDIRECT_SCRIPT_INDEX) else {
        return Err(MirrorError::ResponseParse(format!(
            "expected at least {} scripts, found {}",
            REDIRECT_SCRIPT_INDEX + 1,
            scripts.len()
        )));
    };

    Ok(redirect_regex()
        .captures(script)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string()))
}
