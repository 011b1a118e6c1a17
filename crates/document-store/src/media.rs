//! Media-range matching for content negotiation.

use mime::Mime;

/// Check whether a stored media type satisfies an HTTP `Accept` header.
///
/// The header may list several comma-separated ranges; a range matches when
/// its type and subtype each equal the declared one or are `*`. Quality
/// parameters are ignored, they only express preference between ranges that
/// would all be acceptable.
pub fn is_acceptable(declared: &str, accept: &str) -> bool {
    let declared: Mime = match declared.trim().parse() {
        Ok(mime) => mime,
        Err(_) => return false,
    };

    accept
        .split(',')
        .filter_map(|range| range.trim().parse::<Mime>().ok())
        .any(|range| matches_range(&declared, &range))
}

fn matches_range(declared: &Mime, range: &Mime) -> bool {
    (range.type_() == mime::STAR || range.type_() == declared.type_())
        && (range.subtype() == mime::STAR || range.subtype() == declared.subtype())
}
