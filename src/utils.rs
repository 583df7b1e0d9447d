//! Utility functions for file naming and display formatting

use crate::types::TargetFormat;
use std::collections::HashSet;
use std::path::Path;

/// Maximum number of suffix attempts when resolving name collisions
const MAX_RENAME_ATTEMPTS: u32 = 9999;

/// Split a file name at its final extension
///
/// A leading dot (".hidden") does not start an extension.
fn split_extension(name: &str) -> (&str, Option<&str>) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], Some(&name[idx + 1..])),
        _ => (name, None),
    }
}

/// Name of the converted file: the source name with its final extension replaced
///
/// # Examples
///
/// ```
/// use image_converter::utils::output_name;
/// use image_converter::TargetFormat;
///
/// assert_eq!(output_name("holiday.photo.jpg", TargetFormat::Webp), "holiday.photo.webp");
/// assert_eq!(output_name("scan", TargetFormat::Png), "scan.png");
/// ```
pub fn output_name(source_name: &str, format: TargetFormat) -> String {
    let (base, _) = split_extension(source_name);
    format!("{}.{}", base, format.extension())
}

/// Return `name`, or `name (1).ext`, `name (2).ext`, ... if it is already in `taken`
///
/// The returned name is inserted into `taken`.
pub fn unique_name(name: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.to_string()) {
        return name.to_string();
    }

    let (stem, extension) = split_extension(name);
    for i in 1..=MAX_RENAME_ATTEMPTS {
        let candidate = match extension {
            Some(ext) => format!("{} ({}).{}", stem, i, ext),
            None => format!("{} ({})", stem, i),
        };
        if taken.insert(candidate.clone()) {
            return candidate;
        }
    }

    // Practically unreachable; fall back to the original name
    name.to_string()
}

/// Declared MIME type for an accepted image extension (case-insensitive)
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" | "jfif" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Human-readable byte size ("0 Bytes", "1.5 KB", "2 MB")
///
/// Trailing zeros after the decimal point are dropped.
pub fn format_bytes(bytes: u64, decimals: usize) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];
    const K: f64 = 1024.0;

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut exponent = 0;
    while value >= K && exponent < UNITS.len() - 1 {
        value /= K;
        exponent += 1;
    }

    let mut number = format!("{:.*}", decimals, value);
    if number.contains('.') {
        number = number.trim_end_matches('0').trim_end_matches('.').to_string();
    }
    format!("{} {}", number, UNITS[exponent])
}

/// Shorten a file name for display, keeping its extension
///
/// Base names longer than `max_len` characters are cut and followed by "...".
/// Everything from the last dot on counts as the extension here, so a dotfile
/// such as `.verylongname` has an empty base and is shown whole.
pub fn truncate_filename(full_name: &str, max_len: usize) -> String {
    let (base, extension) = match full_name.rfind('.') {
        Some(idx) => (&full_name[..idx], Some(&full_name[idx + 1..])),
        None => (full_name, None),
    };
    if base.chars().count() <= max_len {
        return full_name.to_string();
    }

    let cut: String = base.chars().take(max_len).collect();
    match extension {
        Some(ext) => format!("{}....{}", cut, ext),
        None => format!("{}...", cut),
    }
}
