//! Categorical classifiers for presentation attributes
//!
//! The contest page encodes two fields visually: a strike-through on the
//! title means the event was canceled or postponed, and an icon in the
//! certificate column names the course certification.

use crate::models::{Certificate, EventStatus};

/// Icon `src` values and the certification they stand for.
/// Unlisted icons classify as no certificate.
pub const CERTIFICATE_ICONS: [(&str, Certificate); 3] = [
    ("/images/iaaf.gif", Certificate::Iaaf),
    ("/images/aims_logo.gif", Certificate::Aims),
    ("/images/course_ok.png", Certificate::CourseCalculated),
];

/// `text-decoration` values and the status they stand for.
/// Anything else is a normal event.
pub const STATUS_DECORATIONS: [(&str, EventStatus); 1] =
    [("line-through", EventStatus::CanceledOrPostponed)];

/// Classify a certificate icon by its `src` attribute
pub fn classify_certificate(src: Option<&str>) -> Option<Certificate> {
    let src = src?.trim();
    CERTIFICATE_ICONS
        .iter()
        .find(|(icon, _)| *icon == src)
        .map(|(_, certificate)| *certificate)
}

/// Classify event status from the inline `style` attribute of the title cell
pub fn classify_status(style: Option<&str>) -> EventStatus {
    let Some(decoration) = style.and_then(|s| style_property(s, "text-decoration")) else {
        return EventStatus::Normal;
    };

    decoration
        .split_whitespace()
        .find_map(|value| {
            STATUS_DECORATIONS
                .iter()
                .find(|(known, _)| known.eq_ignore_ascii_case(value))
                .map(|(_, status)| *status)
        })
        .unwrap_or(EventStatus::Normal)
}

/// Look up a property value in an inline CSS declaration list
fn style_property<'a>(style: &'a str, name: &str) -> Option<&'a str> {
    style.split(';').find_map(|declaration| {
        let (property, value) = declaration.split_once(':')?;
        property
            .trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim())
    })
}
