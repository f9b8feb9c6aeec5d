//! URL-based stream format detection

use crate::models::FormatHint;

/// Substrings marking an HLS manifest, matched case-insensitively
const HLS_MARKERS: &[&str] = &[".m3u8", "type=m3u8"];

/// Classify a URL by manifest markers.
///
/// Query markers count too, so panels serving HLS from extensionless paths
/// (`/play?id=1&type=m3u8`) are still routed to the HLS stage.
pub fn detect(url: &str) -> FormatHint {
    let lower = url.to_lowercase();
    if HLS_MARKERS.iter().any(|marker| lower.contains(marker)) {
        FormatHint::Hls
    } else {
        FormatHint::Unknown
    }
}
