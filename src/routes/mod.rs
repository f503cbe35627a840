//! Backend endpoint catalog. Each operation lists its known URL shapes in priority order.

pub mod auth;
pub mod interviews;
pub mod quiz;

/// Percent-encodes a single path segment.
pub(crate) fn segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
