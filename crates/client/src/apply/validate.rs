//! Section validation before anything reaches the page.
//!
//! Color values end up inside a `<style>` block, so only plain color tokens
//! are accepted: hex notation, `rgb()`/`hsl()` style functions with numeric
//! arguments, or a bare keyword such as `transparent` or `navy`. Font
//! families and product focus points land in CSS too and get the same
//! treatment.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use sitecfg_core::Error;
use sitecfg_core::model::Contact;

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#(?:[0-9a-fA-F]{3,4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})$").unwrap());

static FUNCTIONAL_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:rgb|rgba|hsl|hsla)\(\s*[-0-9.,%/\s]+\)$").unwrap());

static KEYWORD_COLOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z]{3,20}$").unwrap());

/// Color roles become CSS custom property names.
static COLOR_ROLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_-]{0,63}$").unwrap());

/// Comma-separated family names, bare or quoted.
static FONT_FAMILY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(?:"[\w .-]+"|'[\w .-]+'|[\w][\w .-]*)(?:\s*,\s*(?:"[\w .-]+"|'[\w .-]+'|[\w][\w .-]*))*$"#)
        .unwrap()
});

/// One to four `object-position` components.
static FOCUS_POINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:-?[0-9]+(?:\.[0-9]+)?(?:%|px|em|rem)?|left|right|top|bottom|center)(?:\s+(?:-?[0-9]+(?:\.[0-9]+)?(?:%|px|em|rem)?|left|right|top|bottom|center)){0,3}$")
        .unwrap()
});

pub fn validate_color(value: &str) -> Result<(), Error> {
    let value = value.trim();
    if HEX_COLOR.is_match(value) || FUNCTIONAL_COLOR.is_match(value) || KEYWORD_COLOR.is_match(value) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("unsafe color value: {value:?}")))
    }
}

/// Every role name and value must be valid; one bad entry rejects the map.
pub fn validate_colors(colors: &BTreeMap<String, String>) -> Result<(), Error> {
    for (role, value) in colors {
        if !COLOR_ROLE.is_match(role) {
            return Err(Error::InvalidInput(format!("invalid color role: {role:?}")));
        }
        validate_color(value)?;
    }
    Ok(())
}

pub fn validate_font_family(value: &str) -> Result<(), Error> {
    if FONT_FAMILY.is_match(value.trim()) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("unsafe font family: {value:?}")))
    }
}

/// Whether `value` is a plain `object-position` such as `50% 30%` or `left top`.
pub fn is_safe_focus_point(value: &str) -> bool {
    FOCUS_POINT.is_match(value.trim())
}

/// With the map shown, both coordinates must be present and in range.
pub fn validate_contact(contact: &Contact) -> Result<(), Error> {
    if contact.show_map != Some(true) {
        return Ok(());
    }

    let (latitude, longitude) = contact
        .coordinates()
        .ok_or_else(|| Error::InvalidInput("map is shown but coordinates are missing".into()))?;

    if !(-90.0..=90.0).contains(&latitude) {
        return Err(Error::InvalidInput(format!("latitude out of range: {latitude}")));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(Error::InvalidInput(format!("longitude out of range: {longitude}")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_color_tokens() {
        for value in ["#fff", "#0a84ffcc", "rgb(10, 20, 30)", "hsla(210, 50%, 40%, 0.5)", "rgb(1 2 3 / 50%)", "navy", " #123456 "] {
            assert!(validate_color(value).is_ok(), "{value}");
        }
    }

    #[test]
    fn test_rejects_injection() {
        for value in ["red; background: url(x)", "#12", "expression(alert(1))", "</style><script>", "", "url(javascript:x)"] {
            assert!(validate_color(value).is_err(), "{value}");
        }
    }

    #[test]
    fn test_rejects_bad_role() {
        let colors = BTreeMap::from([("primary color".to_string(), "#fff".to_string())]);
        assert!(validate_colors(&colors).is_err());

        let colors = BTreeMap::from([("primary".to_string(), "#fff".to_string())]);
        assert!(validate_colors(&colors).is_ok());
    }

    #[test]
    fn test_font_family() {
        for value in ["Inter", "\"Open Sans\", Arial, sans-serif", "'Roboto Slab', serif", " Noto Sans "] {
            assert!(validate_font_family(value).is_ok(), "{value}");
        }
        for value in ["Inter; } body { display: none", "</style><script>", "\"Open Sans", "url(x)", ""] {
            assert!(validate_font_family(value).is_err(), "{value}");
        }
    }

    #[test]
    fn test_focus_point() {
        for value in ["50% 30%", "center", "left top", "10px 2.5em", "-5% 0"] {
            assert!(is_safe_focus_point(value), "{value}");
        }
        for value in ["50%; background: red", "\" onerror=\"x", "calc(1px)", ""] {
            assert!(!is_safe_focus_point(value), "{value}");
        }
    }

    #[test]
    fn test_contact_coordinates_checked_only_with_map() {
        let mut contact = Contact { latitude: Some(123.0), longitude: Some(0.0), ..Default::default() };
        assert!(validate_contact(&contact).is_ok());

        contact.show_map = Some(true);
        assert!(validate_contact(&contact).is_err());

        contact.latitude = Some(-23.55);
        contact.longitude = Some(-46.63);
        assert!(validate_contact(&contact).is_ok());

        contact.longitude = None;
        assert!(validate_contact(&contact).is_err());
    }
}
