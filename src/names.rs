//! Sheet-name sanitization (spec §6).
//!
//! Excel forbids `{ / \ [ ] * ? : }` in sheet names, rejects a leading or
//! trailing `'`, rejects the empty string, and caps names at 31 characters.
//! `sanitize_sheet_name` is pure and idempotent: sanitizing an already-clean
//! name returns it unchanged, and sanitizing twice equals sanitizing once.

use std::collections::HashMap;

const MAX_SHEET_NAME_LEN: usize = 31;
const FORBIDDEN: &[char] = &['\\', '/', '*', '[', ']', ':', '?'];
const DEFAULT_NAME: &str = "Sheet";

/// How a forbidden character is handled by the sanitizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharStrategy {
    /// Drop every forbidden character outright.
    Remove,
    /// Replace each forbidden character using `mapping`, falling back to `_`
    /// for any forbidden character the mapping doesn't cover.
    Replace(HashMap<char, char>),
}

impl Default for CharStrategy {
    fn default() -> Self {
        CharStrategy::Replace(HashMap::new())
    }
}

/// Tunable knobs for [`sanitize_sheet_name_with`]; [`sanitize_sheet_name`]
/// uses [`SanitizeConfig::default`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizeConfig {
    pub default_name: String,
    pub strategy: CharStrategy,
}

impl Default for SanitizeConfig {
    fn default() -> Self {
        SanitizeConfig {
            default_name: DEFAULT_NAME.to_string(),
            strategy: CharStrategy::default(),
        }
    }
}

/// Sanitize `raw` into a name Excel will accept as a worksheet name, using
/// the default character strategy (replace with `_`) and default name
/// (`"Sheet"`).
///
/// Forbidden characters are replaced with `_`, leading/trailing single
/// quotes are stripped, and the result is truncated to 31 characters. An
/// empty or all-whitespace input falls back to the default name.
pub fn sanitize_sheet_name(raw: &str) -> String {
    sanitize_sheet_name_with(raw, &SanitizeConfig::default())
}

/// Sanitize `raw` under an explicit [`SanitizeConfig`].
///
/// Steps, per spec: (1) strip leading/trailing single quotes; (2) apply the
/// configured character strategy against the forbidden set; (3) substitute
/// the configured default name if the result is empty; (4) truncate to 31
/// characters. Pure function.
pub fn sanitize_sheet_name_with(raw: &str, config: &SanitizeConfig) -> String {
    let trimmed = raw.trim().trim_matches('\'');

    if trimmed.is_empty() {
        return config.default_name.clone();
    }

    let cleaned: String = match &config.strategy {
        CharStrategy::Remove => trimmed.chars().filter(|c| !FORBIDDEN.contains(c)).collect(),
        CharStrategy::Replace(mapping) => trimmed
            .chars()
            .map(|c| {
                if !FORBIDDEN.contains(&c) {
                    c
                } else {
                    *mapping.get(&c).unwrap_or(&'_')
                }
            })
            .collect(),
    };

    let truncated: String = cleaned.chars().take(MAX_SHEET_NAME_LEN).collect();

    if truncated.is_empty() {
        config.default_name.clone()
    } else {
        truncated
    }
}
