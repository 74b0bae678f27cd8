//! Locator helpers shared by the primitives and the session backends

use crate::types::Locator;

/// Quote `text` as an XPath string literal.
///
/// XPath 1.0 has no escape sequences, so text holding both quote kinds is
/// split into a `concat()` call.
pub fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        return format!("'{}'", text);
    }
    if !text.contains('"') {
        return format!("\"{}\"", text);
    }

    let parts: Vec<String> = text
        .split('\'')
        .map(|part| format!("'{}'", part))
        .collect();
    format!("concat({})", parts.join(", \"'\", "))
}

/// Locator of the `<option>` labelled `label` below a select element.
pub fn option_locator(label: &str) -> Locator {
    Locator::XPath(format!(
        ".//option[normalize-space(.) = {}]",
        xpath_literal(label.trim())
    ))
}

/// XPath equivalent of a partial link text query, for drivers lacking the
/// strategy.
pub fn partial_link_xpath(text: &str) -> String {
    format!("//a[contains(normalize-space(.), {})]", xpath_literal(text))
}
