//! Minimal cookie jar for the accounts login flow.
//!
//! The flow needs to read individual cookie values (the CSRF token), which
//! reqwest's transparent cookie store hides. Parsing is left to reqwest;
//! this jar only keeps the values and their expiry.

use std::collections::BTreeMap;
use std::time::SystemTime;

use chrono::{DateTime, Duration, Utc};
use reqwest::Response;

#[derive(Debug, Clone, PartialEq, Eq)]
struct StoredCookie {
    value: String,
    expires: Option<DateTime<Utc>>,
}

impl StoredCookie {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_none_or(|at| now < at)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CookieJar {
    cookies: BTreeMap<String, StoredCookie>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>, expires: Option<DateTime<Utc>>) {
        self.cookies.insert(name.into(), StoredCookie { value: value.into(), expires });
    }

    pub fn remove(&mut self, name: &str) {
        self.cookies.remove(name);
    }

    /// Value of a live cookie; expired cookies are dropped on access.
    pub fn get(&mut self, name: &str) -> Option<String> {
        let now = Utc::now();
        match self.cookies.get(name) {
            Some(cookie) if cookie.is_live(now) => Some(cookie.value.clone()),
            Some(_) => {
                self.cookies.remove(name);
                None
            }
            None => None,
        }
    }

    /// First live cookie whose name starts with `prefix`.
    pub fn find_prefixed(&self, prefix: &str) -> Option<(String, String)> {
        let now = Utc::now();
        self.cookies
            .iter()
            .find(|(name, cookie)| name.starts_with(prefix) && cookie.is_live(now))
            .map(|(name, cookie)| (name.clone(), cookie.value.clone()))
    }

    pub fn names(&self) -> Vec<String> {
        self.cookies.keys().cloned().collect()
    }

    /// `Cookie:` header value with every live cookie.
    pub fn header_value(&self) -> String {
        let now = Utc::now();
        self.cookies
            .iter()
            .filter(|(_, cookie)| cookie.is_live(now))
            .map(|(name, cookie)| format!("{name}={}", cookie.value))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Store one parsed cookie. `Max-Age` wins over `Expires`.
    pub fn store(
        &mut self,
        name: &str,
        value: &str,
        expires: Option<SystemTime>,
        max_age: Option<std::time::Duration>,
    ) {
        if name.is_empty() {
            return;
        }
        let expires = match max_age {
            Some(age) => Some(
                Duration::from_std(age)
                    .ok()
                    .and_then(|age| Utc::now().checked_add_signed(age))
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
            ),
            None => expires.map(DateTime::<Utc>::from),
        };
        self.set(name, value, expires);
    }

    /// Store every cookie `response` sets. Returns how many were stored.
    pub fn absorb(&mut self, response: &Response) -> usize {
        let mut stored = 0;
        for cookie in response.cookies() {
            self.store(cookie.name(), cookie.value(), cookie.expires(), cookie.max_age());
            stored += 1;
        }
        stored
    }
}
