use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

/// Normalizes Unicode characters and converts text to lowercase.
///
/// The input is decomposed (NFD) and then lowercased, so "Qobuz", "QOBUZ"
/// and differently composed accented spellings compare equal. Used when the
/// user types a module or service name.
///
/// # Examples
///
/// ```
/// use albumlinks::foundation::utils::normalize_unicode;
///
/// assert_eq!(normalize_unicode("  Qobuz "), normalize_unicode("qobuz"));
/// ```
pub fn normalize_unicode(input: &str) -> String {
    input.trim().nfd().collect::<String>().to_lowercase()
}

fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\p{Alphabetic}\p{N} _-]").expect("static regex"))
}

/// Strips everything except letters, digits, spaces, hyphens and underscores.
///
/// # Examples
///
/// ```
/// use albumlinks::foundation::utils::sanitize_name;
///
/// assert_eq!(sanitize_name("  AC/DC: Live! "), "ACDC Live");
/// ```
pub fn sanitize_name(name: &str) -> String {
    unsafe_chars().replace_all(name, "").trim().to_string()
}

/// Formats a duration in seconds as `M:SS`, or `H:MM:SS` past the hour.
pub fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

/// Cuts `text` down to at most `max` grapheme clusters, marking the cut with `…`.
pub fn truncate_graphemes(text: &str, max: usize) -> String {
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    if graphemes.len() <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }

    let mut out: String = graphemes[..max - 1].concat();
    out.push('…');
    out
}

/// Number of grapheme clusters in `text`, used as its display width.
pub fn display_width(text: &str) -> usize {
    text.graphemes(true).count()
}
