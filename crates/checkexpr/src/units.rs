//! Value and unit normalization.
//!
//! An unquoted comparison value shaped as `<number><unit-suffix>` (no
//! internal space) is expanded into a canonical numeric value plus a
//! normalized unit: byte suffixes expand to a raw byte count with unit
//! `B`, duration suffixes expand to seconds with unit `s`, and `%` is
//! kept as-is with unit `%`.

/// Byte unit suffixes and their multipliers. Lowercase lookup; the
/// `*ib` spellings are the 1024-based binary variants.
static BYTE_UNITS: &[(&str, f64)] = &[
    ("b", 1.0),
    ("kb", 1_000.0),
    ("mb", 1_000_000.0),
    ("gb", 1_000_000_000.0),
    ("tb", 1_000_000_000_000.0),
    ("pb", 1_000_000_000_000_000.0),
    ("kib", 1024.0),
    ("mib", 1_048_576.0),
    ("gib", 1_073_741_824.0),
    ("tib", 1_099_511_627_776.0),
    ("pib", 1_125_899_906_842_624.0),
];

/// Duration unit suffixes and their multipliers in seconds.
static DURATION_UNITS: &[(&str, f64)] = &[
    ("s", 1.0),
    ("m", 60.0),
    ("h", 3600.0),
    ("d", 86400.0),
];

/// Formats a number in canonical expression form: integral results print
/// without a fractional part (`90000000000`, not `9e10`).
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Normalizes a raw comparison value: returns the canonical value text
/// and the normalized unit, if a recognized unit suffix was present.
///
/// Values that do not look like `<number><suffix>` are returned
/// unchanged with no unit.
pub(crate) fn normalize(raw: &str) -> (String, Option<String>) {
    let Some((number, suffix)) = split_number_suffix(raw) else {
        return (raw.to_string(), None);
    };

    if suffix == "%" {
        return (format_number(number), Some("%".to_string()));
    }

    let lower = suffix.to_lowercase();
    if let Some(&(_, factor)) = BYTE_UNITS.iter().find(|(name, _)| *name == lower) {
        return (format_number(number * factor), Some("B".to_string()));
    }
    if let Some(&(_, factor)) = DURATION_UNITS.iter().find(|(name, _)| *name == lower) {
        return (format_number(number * factor), Some("s".to_string()));
    }

    // Unrecognized suffix: the whole token is a literal value.
    (raw.to_string(), None)
}

/// Splits `90GB` into `(90.0, "GB")`. Returns `None` unless the text is a
/// number immediately followed by a non-empty alphabetic or `%` suffix.
fn split_number_suffix(raw: &str) -> Option<(f64, &str)> {
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in raw.char_indices() {
        match c {
            '+' | '-' if i == 0 => end = i + 1,
            '0'..='9' => {
                seen_digit = true;
                end = i + 1;
            }
            '.' if !seen_dot => {
                seen_dot = true;
                end = i + 1;
            }
            _ => break,
        }
    }
    if !seen_digit {
        return None;
    }

    let suffix = &raw[end..];
    if suffix.is_empty() {
        return None;
    }
    if suffix != "%" && !suffix.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }

    let number: f64 = raw[..end].parse().ok()?;
    Some((number, suffix))
}
