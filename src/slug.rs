use serde::{Deserialize, Serialize};
use ts_rs::TS;
use unicode_normalization::UnicodeNormalization;
use utoipa::ToSchema;

/// Locale
///
/// The two catalog languages supported by the storefront. `En` is the primary
/// locale and produces bare slugs; `Br` is the secondary locale whose slugs are
/// namespaced with a fixed `br-` prefix so both language catalogs can share a
/// single identifier space without colliding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Locale {
    #[default]
    En,
    Br,
}

impl Locale {
    /// The namespace prefix applied to derived slugs, if any.
    /// The primary locale owns the unprefixed identifier space.
    pub fn slug_prefix(&self) -> Option<&'static str> {
        match self {
            Locale::En => None,
            Locale::Br => Some("br"),
        }
    }

    /// The tag persisted alongside a product row.
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Br => "br",
        }
    }
}

// Combining diacritical marks block, dropped after NFD decomposition.
const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036f}';

/// slugify
///
/// Normalizes arbitrary human-entered text into a URL-safe identifier:
/// lowercase ASCII letters, digits, and single internal hyphens only, with no
/// leading or trailing hyphen.
///
/// Steps, in order: lowercase, NFD decomposition, strip combining marks,
/// trim whitespace, collapse every run of non-`[a-z0-9]` into one hyphen,
/// strip edge hyphens. A total function: every input maps to a defined output,
/// and an input with no alphanumeric content collapses to the empty string.
///
/// Category creation persists this value directly. Product creation goes
/// through [`derive_slug`], which adds the locale namespace on top.
pub fn slugify(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let lowered = text.to_lowercase();

    // Decompose so that accented letters split into base char + combining
    // marks, then drop the marks ("Café" -> "cafe").
    let stripped: String = lowered
        .nfd()
        .filter(|c| !COMBINING_MARKS.contains(c))
        .collect();

    let trimmed = stripped.trim();

    // Single pass: emit alphanumerics, and a lone hyphen between them wherever
    // one or more separator characters occurred. Edge hyphens never get
    // emitted because the pending separator only flushes before an
    // alphanumeric that follows earlier output.
    let mut slug = String::with_capacity(trimmed.len());
    let mut pending_hyphen = false;
    for ch in trimmed.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch);
            pending_hyphen = false;
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// derive_slug
///
/// Locale-aware variant of [`slugify`]: normalizes the text, then prepends the
/// locale's namespace prefix when one exists. An empty normalized slug is
/// returned as-is, never prefixed — callers treat an empty result as invalid
/// input rather than persisting a bare `br-`.
pub fn derive_slug(text: &str, locale: Locale) -> String {
    let slug = slugify(text);
    if slug.is_empty() {
        return slug;
    }
    match locale.slug_prefix() {
        Some(prefix) => format!("{}-{}", prefix, slug),
        None => slug,
    }
}
