//! SubRip to WebVTT conversion for browser text tracks

use once_cell::sync::Lazy;
use regex::Regex;

const VTT_HEADER: &str = "WEBVTT";

static SRT_TIMESTAMP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+):(\d+):(\d+),(\d+)").expect("valid timestamp regex"));

/// Whether a subtitle needs conversion before a browser can load it
pub fn is_srt(name: &str, content: &str) -> bool {
    if name.to_lowercase().ends_with(".srt") {
        return true;
    }
    content.contains("-->") && !content.trim_start_matches('\u{feff}').starts_with(VTT_HEADER)
}

/// Convert SubRip content to WebVTT.
///
/// Only the header and the millisecond separator differ between the two
/// formats for the cues players care about.
pub fn srt_to_vtt(content: &str) -> String {
    let body = content
        .trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n");
    let body = SRT_TIMESTAMP.replace_all(&body, "$1:$2:$3.$4");
    format!("{}\n\n{}", VTT_HEADER, body)
}
