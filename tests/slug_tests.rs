use storefront_admin::slug::{Locale, derive_slug, slugify};

#[test]
fn test_basic_normalization() {
    assert_eq!(slugify("Hello World"), "hello-world");
    assert_eq!(slugify("Espresso Machine 3000"), "espresso-machine-3000");
}

#[test]
fn test_diacritics_are_stripped() {
    assert_eq!(slugify("Café com Leite"), "cafe-com-leite");
    assert_eq!(slugify("Açaí na Tigela"), "acai-na-tigela");
    assert_eq!(slugify("Crème Brûlée"), "creme-brulee");
}

#[test]
fn test_punctuation_runs_collapse_to_single_hyphen() {
    assert_eq!(slugify("a  --  b"), "a-b");
    assert_eq!(slugify("one & two / three"), "one-two-three");
    assert_eq!(slugify("  spaced out  "), "spaced-out");
}

#[test]
fn test_no_edge_hyphens() {
    assert_eq!(slugify("!!!leading"), "leading");
    assert_eq!(slugify("trailing!!!"), "trailing");
    assert_eq!(slugify("--both--"), "both");
}

#[test]
fn test_empty_and_degenerate_inputs() {
    // Total function: every input maps to a defined (possibly empty) output.
    assert_eq!(slugify(""), "");
    assert_eq!(slugify("!!!"), "");
    assert_eq!(slugify("   "), "");
    // All-diacritic input: combining marks alone normalize away entirely.
    assert_eq!(slugify("\u{0301}\u{0302}"), "");
}

#[test]
fn test_output_character_set_invariant() {
    // For arbitrary messy inputs: only [a-z0-9-], no edge hyphen, no "--".
    let inputs = [
        "Fancy Product™ (2024 Edition)!",
        "你好 World",
        "ÀÉÎÕÜ çñß",
        "a_b.c,d;e",
        "  mixed   UP   Case  ",
        "1234!@#$%5678",
    ];
    for input in inputs {
        let slug = slugify(input);
        assert!(
            slug.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
            "unexpected character in slug {:?} from {:?}",
            slug,
            input
        );
        assert!(!slug.starts_with('-'), "leading hyphen in {:?}", slug);
        assert!(!slug.ends_with('-'), "trailing hyphen in {:?}", slug);
        assert!(!slug.contains("--"), "double hyphen in {:?}", slug);
    }
}

#[test]
fn test_idempotence() {
    // Slugifying a slug is a no-op.
    let inputs = ["Café com Leite", "Hello, World!", "!!!", "açaí-na-tigela"];
    for input in inputs {
        let once = slugify(input);
        assert_eq!(slugify(&once), once, "not idempotent for {:?}", input);
    }
}

#[test]
fn test_derive_slug_primary_locale_has_no_prefix() {
    assert_eq!(derive_slug("Café com Leite", Locale::En), "cafe-com-leite");
}

#[test]
fn test_derive_slug_secondary_locale_is_prefixed() {
    assert_eq!(
        derive_slug("Café com Leite", Locale::Br),
        "br-cafe-com-leite"
    );
}

#[test]
fn test_empty_slug_is_never_prefixed() {
    // No "br-" on an empty identifier, for any locale.
    assert_eq!(derive_slug("", Locale::Br), "");
    assert_eq!(derive_slug("!!!", Locale::Br), "");
    assert_eq!(derive_slug("", Locale::En), "");
}

#[test]
fn test_derive_slug_matches_slugify_for_primary() {
    // The category call site (slugify) and the product call site with the
    // primary locale must agree: one normalization routine, two entry points.
    let inputs = ["Coffee & Tea", "Café", "  Spaced  "];
    for input in inputs {
        assert_eq!(derive_slug(input, Locale::En), slugify(input));
    }
}

#[test]
fn test_locale_defaults_to_primary() {
    assert_eq!(Locale::default(), Locale::En);
    assert_eq!(Locale::default().slug_prefix(), None);
    assert_eq!(Locale::Br.slug_prefix(), Some("br"));
}
