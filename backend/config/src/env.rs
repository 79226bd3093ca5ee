//! `${VAR_NAME}` substitution in config string values.
//!
//! Only uppercase `[A-Z_][A-Z0-9_]*` names are matched. `$${VAR}` is an
//! escape and yields the literal `${VAR}`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;

use crate::error::ConfigError;

/// A reference, optionally preceded by the escaping `$`.
static REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Resolve references against the process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value, ConfigError> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Resolve references against `env`. An unset or empty variable is an error
/// naming the config path where it was referenced.
pub fn resolve_env_vars_with(
    value: &Value,
    env: &HashMap<String, String>,
) -> Result<Value, ConfigError> {
    substitute(value, env, "")
}

fn substitute(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value, ConfigError> {
    Ok(match value {
        Value::String(s) => Value::String(substitute_string(s, env, path)?),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .enumerate()
                .map(|(i, v)| substitute(v, env, &format!("{path}[{i}]")))
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, v) in map {
                let child = if path.is_empty() { key.clone() } else { format!("{path}.{key}") };
                out.insert(key.clone(), substitute(v, env, &child)?);
            }
            Value::Object(out)
        }
        other => other.clone(),
    })
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String, ConfigError> {
    if !s.contains("${") {
        return Ok(s.to_string());
    }

    let mut missing = None;
    let replaced = REFERENCE.replace_all(s, |caps: &Captures| {
        let name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{name}}}");
        }
        match env.get(name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(var_name) => Err(ConfigError::MissingEnvVar { var_name, config_path: path.to_string() }),
        None => Ok(replaced.into_owned()),
    }
}

/// Every variable name referenced anywhere in the tree, sorted and deduplicated.
/// Escaped references are not counted.
pub fn collect_referenced_vars(value: &Value) -> Vec<String> {
    let mut vars = Vec::new();
    collect(value, &mut vars);
    vars.sort();
    vars.dedup();
    vars
}

fn collect(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.extend(
            REFERENCE
                .captures_iter(s)
                .filter(|caps| caps[1].is_empty())
                .map(|caps| caps[2].to_string()),
        ),
        Value::Array(items) => items.iter().for_each(|v| collect(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect(v, out)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_nested_and_list_values() {
        let v = json!({"front": {"token": "${DOUGH_API_TOKEN}"}, "notify": {"user_ids": ["${ALICE}", "42"]}});
        let result = resolve_env_vars_with(&v, &env(&[("DOUGH_API_TOKEN", "t0k"), ("ALICE", "7")])).unwrap();
        assert_eq!(result["front"]["token"], "t0k");
        assert_eq!(result["notify"]["user_ids"], json!(["7", "42"]));
    }

    #[test]
    fn missing_var_names_the_path() {
        let v = json!({"discord": {"token": "${DISCORD_TOKEN}"}});
        let err = resolve_env_vars_with(&v, &env(&[("DISCORD_TOKEN", "")])).unwrap_err();
        match err {
            ConfigError::MissingEnvVar { var_name, config_path } => {
                assert_eq!(var_name, "DISCORD_TOKEN");
                assert_eq!(config_path, "discord.token");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn escaped_reference_is_literal() {
        let v = json!({"bot": {"invite_link": "https://x/$${NOT_A_VAR}?a=${A}"}});
        let result = resolve_env_vars_with(&v, &env(&[("A", "1")])).unwrap();
        assert_eq!(result["bot"]["invite_link"], "https://x/${NOT_A_VAR}?a=1");
    }

    #[test]
    fn lowercase_names_are_left_alone() {
        let v = json!({"k": "${lower}"});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result["k"], "${lower}");
    }

    #[test]
    fn collects_unescaped_names() {
        let v = json!({"a": "${FOO}", "b": ["$${SKIP}", "${BAR}", "${FOO}"]});
        assert_eq!(collect_referenced_vars(&v), vec!["BAR", "FOO"]);
    }
}
