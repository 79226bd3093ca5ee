//! Safe-to-share config snapshots for `clove config`.

use crate::schema::CloveConfig;

pub const REDACTED: &str = "__REDACTED__";

fn mask(secret: &mut Option<String>) {
    if secret.as_deref().is_some_and(|s| !s.is_empty()) {
        *secret = Some(REDACTED.to_string());
    }
}

/// Copy of `config` with every credential masked. Ids and URLs are kept.
pub fn redact(config: &CloveConfig) -> CloveConfig {
    let mut out = config.clone();
    mask(&mut out.discord.token);
    mask(&mut out.front.token);
    mask(&mut out.hytale.password);
    out
}
