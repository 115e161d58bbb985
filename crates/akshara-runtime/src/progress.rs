//! Parsing of image pull progress lines.
//!
//! Compose prints one line per layer update, e.g.
//! `a1b2c3d4e5f6 Downloading [==>     ]  12.5MB/45.2MB`. Only lines carrying a
//! `current/total` size pair are reported.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullProgress {
    pub layer: Option<String>,
    pub status: String,
    pub current: u64,
    pub total: u64,
}

pub fn parse_progress_line(line: &str) -> Option<PullProgress> {
    let without_bar = match (line.find('['), line.rfind(']')) {
        (Some(open), Some(close)) if open < close => {
            format!("{} {}", &line[..open], &line[close + 1..])
        }
        _ => line.to_owned(),
    };

    // Spinner glyphs and other decoration carry no alphanumerics.
    let mut tokens: Vec<&str> = without_bar
        .split_whitespace()
        .filter(|t| t.chars().any(|c| c.is_ascii_alphanumeric()))
        .collect();

    let size_idx = tokens.iter().rposition(|t| parse_size_pair(t).is_some())?;
    let (current, total) = parse_size_pair(tokens[size_idx])?;
    tokens.truncate(size_idx);

    let layer = match tokens.first() {
        Some(first) if is_layer_id(first) => {
            let id = (*first).to_owned();
            tokens.remove(0);
            Some(id)
        }
        _ => None,
    };

    let status = tokens.join(" ");
    if status.is_empty() {
        return None;
    }

    Some(PullProgress {
        layer,
        status,
        current,
        total,
    })
}

fn is_layer_id(token: &str) -> bool {
    token.len() >= 12 && token.chars().all(|c| c.is_ascii_hexdigit())
}

fn parse_size_pair(token: &str) -> Option<(u64, u64)> {
    let (current, total) = token.split_once('/')?;
    Some((parse_size(current)?, parse_size(total)?))
}

/// Parse a human-readable size such as `12.5MB`, `512kB` or `1.2GiB` into bytes.
pub fn parse_size(s: &str) -> Option<u64> {
    let s = s.trim();
    let split = s.find(|c: char| c.is_ascii_alphabetic())?;
    let (number, unit) = s.split_at(split);
    let value: f64 = number.trim().parse().ok()?;
    if value < 0.0 || !value.is_finite() {
        return None;
    }
    let multiplier: f64 = match unit {
        "B" => 1.0,
        "kB" | "KB" | "k" | "K" => 1e3,
        "MB" | "M" => 1e6,
        "GB" | "G" => 1e9,
        "TB" | "T" => 1e12,
        "KiB" => 1024.0,
        "MiB" => 1024.0 * 1024.0,
        "GiB" => 1024.0 * 1024.0 * 1024.0,
        _ => return None,
    };
    Some((value * multiplier).round() as u64)
}
