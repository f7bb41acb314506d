use axum::http::{HeaderMap, header::ACCEPT};
use serde::{Deserialize, Serialize};

/// Response representations a handler can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Html,
    Json,
}

impl Format {
    pub fn media_type(&self) -> &'static str {
        match self {
            Format::Html => "text/html",
            Format::Json => "application/json",
        }
    }

    /// Specificity of the match between this format and a media range:
    /// 2 for an exact match, 1 for `type/*`, 0 for `*/*`.
    fn match_rank(&self, range: &str) -> Option<u8> {
        let (kind, subtype) = self.media_type().split_once('/')?;
        let (range_kind, range_subtype) = range.split_once('/')?;

        match (range_kind, range_subtype) {
            ("*", "*") => Some(0),
            (k, "*") if k.eq_ignore_ascii_case(kind) => Some(1),
            (k, s) if k.eq_ignore_ascii_case(kind) && s.eq_ignore_ascii_case(subtype) => Some(2),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct MediaRange<'a> {
    range: &'a str,
    quality: f32,
}

fn parse_accept(value: &str) -> Vec<MediaRange<'_>> {
    value
        .split(',')
        .filter_map(|item| {
            let mut parts = item.split(';');
            let range = parts.next()?.trim();
            if range.is_empty() {
                return None;
            }

            let quality = parts
                .filter_map(|param| param.trim().split_once('='))
                .find(|(key, _)| key.trim().eq_ignore_ascii_case("q"))
                .and_then(|(_, q)| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0)
                .clamp(0.0, 1.0);

            Some(MediaRange { range, quality })
        })
        .collect()
}

/// Choose the offered format the client prefers.
///
/// Each offered format takes the quality of the most specific `Accept`
/// range that matches it. The highest quality wins and ties go to the
/// earlier offer. Without an `Accept` header, or when nothing acceptable is
/// offered, the first offered format is used.
pub fn negotiate(headers: &HeaderMap, offered: &[Format]) -> Format {
    let fallback = offered.first().copied().unwrap_or(Format::Html);

    let Some(accept) = headers.get(ACCEPT).and_then(|v| v.to_str().ok()) else {
        return fallback;
    };
    let ranges = parse_accept(accept);
    if ranges.is_empty() {
        return fallback;
    }

    let mut best: Option<(Format, f32)> = None;
    for format in offered {
        let quality = ranges
            .iter()
            .filter_map(|r| format.match_rank(r.range).map(|rank| (rank, r.quality)))
            .max_by_key(|(rank, _)| *rank)
            .map(|(_, quality)| quality)
            .unwrap_or(0.0);

        if quality > 0.0 && best.is_none_or(|(_, q)| quality > q) {
            best = Some((*format, quality));
        }
    }

    best.map(|(format, _)| format).unwrap_or(fallback)
}
