use crate::error::{MirrorError, Result};
use crate::types::DownloadSpec;
use chrono::Datelike;
use log::debug;
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

pub const FIRST_YEAR: i32 = 2000;
const DEFAULT_START_TIME: &str = "00:00";
const DEFAULT_END_TIME: &str = "23:59";

pub async fn parse_config(path: &Path) -> Result<Vec<DownloadSpec>> {
    let mut file = File::open(path).await?;

    let mut contents = String::new();
    file.read_to_string(&mut contents).await?;

    let current_year = chrono::Local::now().year();
    parse_specs(&contents, current_year)
}

/// Parses `site_id [years [months [start_time end_time]]]` lines. `#` starts a comment.
pub fn parse_specs(contents: &str, current_year: i32) -> Result<Vec<DownloadSpec>> {
    let mut specs = Vec::new();

    for (index, raw) in contents.lines().enumerate() {
        let line = index + 1;
        let content = raw.split('#').next().unwrap_or("");
        let fields: Vec<&str> = content.split_whitespace().collect();
        if fields.is_empty() {
            continue;
        }
        let err = |message: String| MirrorError::Parse { line, message };

        if fields.len() > 5 {
            return Err(err(format!("expected at most 5 fields, found {}", fields.len())));
        }
        if fields.len() == 4 {
            return Err(err("start_time and end_time must be given together".to_string()));
        }

        let years = match fields.get(1) {
            Some(token) => parse_selection(token, FIRST_YEAR, current_year).map_err(err)?,
            None => (FIRST_YEAR..=current_year).collect(),
        };
        let months = match fields.get(2) {
            Some(token) => parse_selection(token, 1, 12)
                .map_err(err)?
                .into_iter()
                .map(|m| m as u32)
                .collect(),
            None => (1..=12).collect(),
        };
        let (start_time, end_time) = match (fields.get(3), fields.get(4)) {
            (Some(start), Some(end)) => {
                for time in [start, end] {
                    if !is_valid_time(time) {
                        return Err(err(format!("invalid time {time:?}, expected HH:MM")));
                    }
                }
                (start.to_string(), end.to_string())
            }
            _ => (DEFAULT_START_TIME.to_string(), DEFAULT_END_TIME.to_string()),
        };

        let spec = DownloadSpec {
            site_id: fields[0].to_string(),
            years,
            months,
            start_time,
            end_time,
        };
        debug!("Parsed spec: {:?}", spec);
        specs.push(spec);
    }

    if specs.is_empty() {
        return Err(MirrorError::Config("No sites found in config".to_string()));
    }

    Ok(specs)
}

/// `*`, a value, an inclusive `a-b` range, or a comma separated mix, all within `min..=max`.
fn parse_selection(token: &str, min: i32, max: i32) -> std::result::Result<Vec<i32>, String> {
    if token == "*" {
        if min > max {
            return Err(format!("empty range {min}-{max}"));
        }
        return Ok((min..=max).collect());
    }

    let mut values = Vec::new();
    for part in token.split(',') {
        let (lo, hi) = match part.split_once('-') {
            Some((lo, hi)) => (parse_number(lo)?, parse_number(hi)?),
            None => {
                let value = parse_number(part)?;
                (value, value)
            }
        };
        if lo > hi {
            return Err(format!("reversed range {part:?}"));
        }
        if lo < min || hi > max {
            return Err(format!("{part:?} outside {min}-{max}"));
        }
        values.extend(lo..=hi);
    }
    values.sort_unstable();
    values.dedup();
    Ok(values)
}

fn parse_number(token: &str) -> std::result::Result<i32, String> {
    token
        .trim()
        .parse()
        .map_err(|_| format!("invalid number {token:?}"))
}

fn is_valid_time(time: &str) -> bool {
    chrono::NaiveTime::parse_from_str(time, "%H:%M").is_ok() && time.len() == 5
}
