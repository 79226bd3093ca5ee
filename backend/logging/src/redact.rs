//! Log Redaction
//!
//! Scrubs bearer tokens, Discord bot tokens and front API token assignments
//! from strings before they are logged.

use regex::Regex;
use std::sync::LazyLock;

static BEARER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[A-Za-z0-9\-._~+/]+=*").unwrap());
static DISCORD_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9_\-]{24,}\.[A-Za-z0-9_\-]{6}\.[A-Za-z0-9_\-]{27,}").unwrap()
});
static API_TOKEN_ASSIGN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(DOUGH_API_TOKEN\s*[=:]\s*)\S+").unwrap());

pub fn redact_secrets(input: &str) -> String {
    let redacted = BEARER_RE.replace_all(input, "Bearer [REDACTED_TOKEN]");
    let redacted = DISCORD_TOKEN_RE.replace_all(&redacted, "[REDACTED_TOKEN]");
    API_TOKEN_ASSIGN_RE
        .replace_all(&redacted, "${1}[REDACTED_TOKEN]")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrubs_bearer_header() {
        let clean = redact_secrets("Authorization: Bearer abc.DEF-123==");
        assert_eq!(clean, "Authorization: Bearer [REDACTED_TOKEN]");
    }

    #[test]
    fn scrubs_discord_token() {
        let token = format!("{}.{}.{}", "M".repeat(26), "Gh1ab_", "x".repeat(38));
        let clean = redact_secrets(&format!("login failed for {token}"));
        assert_eq!(clean, "login failed for [REDACTED_TOKEN]");
    }

    #[test]
    fn scrubs_env_assignment_and_keeps_the_rest() {
        let clean = redact_secrets("DOUGH_API_TOKEN=s3cret DOUGH_API_URL=https://doughmination.win");
        assert_eq!(clean, "DOUGH_API_TOKEN=[REDACTED_TOKEN] DOUGH_API_URL=https://doughmination.win");
    }
}
