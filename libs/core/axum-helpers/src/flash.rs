//! Single-read notices carried across one redirect.
//!
//! Notices live in a `_flash` cookie holding URL-encoded JSON. A handler
//! that redirects stores them; the next handler that renders HTML reads
//! them, shows them and clears the cookie.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const FLASH_COOKIE: &str = "_flash";

/// Notices kept per level. Clients that never render a page would
/// otherwise grow the cookie past what browsers store.
pub const MAX_PER_LEVEL: usize = 5;

/// Severity of a notice. Serialized lowercase (`"warning"`), which is also
/// the CSS class templates use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Notices grouped by level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Flash {
    messages: BTreeMap<Level, Vec<String>>,
}

impl Flash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a notice. Repeating a message moves it to the end instead of
    /// storing it twice; past [`MAX_PER_LEVEL`] the oldest ones are dropped.
    pub fn add(&mut self, level: Level, message: impl Into<String>) {
        let message = message.into();
        let messages = self.messages.entry(level).or_default();
        messages.retain(|m| *m != message);
        messages.push(message);
        if messages.len() > MAX_PER_LEVEL {
            let excess = messages.len() - MAX_PER_LEVEL;
            messages.drain(..excess);
        }
    }

    /// Messages recorded for `level`, oldest first.
    pub fn get(&self, level: Level) -> &[String] {
        self.messages.get(&level).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.values().all(Vec::is_empty)
    }

    /// Append every notice of `other` after the ones already held, with the
    /// same deduplication and cap as [`add`](Self::add).
    pub fn merge(&mut self, other: Flash) {
        for (level, messages) in other.messages {
            for message in messages {
                self.add(level, message);
            }
        }
    }

    /// Notices left by the previous response. An unreadable cookie is
    /// treated as empty.
    pub fn from_jar(jar: &CookieJar) -> Self {
        let Some(cookie) = jar.get(FLASH_COOKIE) else {
            return Self::default();
        };

        let decoded = match urlencoding::decode(cookie.value()) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::debug!("Discarding undecodable flash cookie: {}", e);
                return Self::default();
            }
        };

        match serde_json::from_str::<Flash>(&decoded) {
            Ok(stored) => {
                let mut flash = Self::default();
                flash.merge(stored);
                flash
            }
            Err(e) => {
                tracing::debug!("Discarding malformed flash cookie: {}", e);
                Self::default()
            }
        }
    }

    /// Persist these notices for the next request, or clear the cookie when
    /// there are none.
    pub fn store(&self, jar: CookieJar) -> CookieJar {
        if self.is_empty() {
            return Self::clear(jar);
        }

        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize flash notices: {}", e);
                return Self::clear(jar);
            }
        };

        let cookie = Cookie::build((FLASH_COOKIE, urlencoding::encode(&json).into_owned()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax);

        jar.add(cookie)
    }

    /// Expire the flash cookie.
    pub fn clear(jar: CookieJar) -> CookieJar {
        if jar.get(FLASH_COOKIE).is_none() {
            return jar;
        }
        jar.remove(Cookie::build(FLASH_COOKIE).path("/"))
    }
}
