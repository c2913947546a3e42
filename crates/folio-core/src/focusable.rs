#![forbid(unsafe_code)]

//! Keyboard-focusable element rule.
//!
//! An element takes part in modal focus trapping when it is any of:
//!
//! | Element | Condition |
//! |---------|-----------|
//! | `a` | has an `href` attribute |
//! | `button` | not `disabled` |
//! | `textarea`, `input`, `select` | always |
//! | any | explicit `tabindex` that parses to a non-negative integer |
//!
//! The conditions are a union, mirroring a CSS selector list: a `button` with
//! `tabindex="-1"` still matches through the `button` arm.

/// Candidate selector list for `querySelectorAll`.
///
/// It over-approximates (it includes negative `tabindex` values); results
/// must be filtered through [`is_focusable`].
pub const FOCUSABLE_CANDIDATES: &str = "a[href], button, textarea, input, select, [tabindex]";

/// Decide focusability from an element's tag and attribute accessor.
#[must_use]
pub fn is_focusable<'a>(tag: &str, attr: impl Fn(&str) -> Option<&'a str>) -> bool {
    let natively = match tag.to_ascii_lowercase().as_str() {
        "a" => attr("href").is_some(),
        "button" => attr("disabled").is_none(),
        "textarea" | "input" | "select" => true,
        _ => false,
    };
    natively || attr("tabindex").is_some_and(tabindex_is_reachable)
}

fn tabindex_is_reachable(raw: &str) -> bool {
    raw.trim().parse::<i32>().is_ok_and(|v| v >= 0)
}
