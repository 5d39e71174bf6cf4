/*!
 * Language utilities for target language tags.
 *
 * Target languages are configured as short tags such as `es`, `fr` or `zh-CN`:
 * an ISO 639-1 (2-letter) or ISO 639-3 (3-letter) primary subtag, optionally
 * followed by a region or script subtag.
 */

use anyhow::{Result, anyhow};
use isolang::Language;

/// Split a tag into its primary subtag and the optional remainder
fn split_tag(code: &str) -> (String, Option<&str>) {
    let trimmed = code.trim();
    match trimmed.split_once(['-', '_']) {
        Some((primary, rest)) => (primary.to_lowercase(), Some(rest)),
        None => (trimmed.to_lowercase(), None),
    }
}

/// Resolve the primary subtag to an isolang language
fn primary_language(primary: &str) -> Option<Language> {
    match primary.len() {
        2 => Language::from_639_1(primary),
        3 => Language::from_639_3(primary),
        _ => None,
    }
}

/// Validate a target language tag
pub fn validate_language_code(code: &str) -> Result<()> {
    let (primary, rest) = split_tag(code);

    if primary_language(&primary).is_none() {
        return Err(anyhow!("Invalid language code: {}", code));
    }

    // Region (CN, BR) or script (Hant) subtags are alphanumeric and short
    if let Some(rest) = rest {
        if rest.is_empty() || rest.len() > 8 || !rest.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(anyhow!("Invalid language subtag in: {}", code));
        }
    }

    Ok(())
}

/// Normalize a tag: lowercase primary subtag, `-` separator, region kept as written
pub fn normalize_language_code(code: &str) -> Result<String> {
    validate_language_code(code)?;
    let (primary, rest) = split_tag(code);

    Ok(match rest {
        Some(rest) => format!("{}-{}", primary, rest),
        None => primary,
    })
}

/// Check if two tags name the same target language
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_language_code(code1), normalize_language_code(code2)) {
        (Ok(a), Ok(b)) => a.eq_ignore_ascii_case(&b),
        _ => false,
    }
}

/// Get the English language name for a tag's primary subtag
pub fn get_language_name(code: &str) -> Result<String> {
    let (primary, _) = split_tag(code);
    let lang = primary_language(&primary)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", code))?;

    Ok(lang.to_name().to_string())
}
