//! ISO-8601 duration parsing for resolved song metadata.
//!
//! Catalog lookups hand back durations in the compact `PT#H#M#S` encoding.
//! Anything malformed resolves to `None`; callers fall back to a bounded
//! random duration so auto-advance timers still terminate.

/// Parse a compact ISO-8601 duration (`PT1H2M3S`) into whole seconds.
///
/// Markers are optional (`PT3M`, `PT45S`, `PT2H`), fractional seconds are
/// floored. Returns `None` for empty, malformed, or marker-less input.
pub fn parse_iso8601_duration(text: &str) -> Option<u64> {
    let rest = text.strip_prefix("PT").or_else(|| text.strip_prefix("pt"))?;
    if rest.is_empty() {
        return None;
    }

    let mut total: u64 = 0;
    let mut number = String::new();
    let mut seen_marker = false;

    for ch in rest.chars() {
        match ch {
            '0'..='9' | '.' => number.push(ch),
            'H' | 'h' | 'M' | 'm' | 'S' | 's' => {
                if number.is_empty() {
                    return None;
                }
                let value: f64 = number.parse().ok()?;
                let factor = match ch.to_ascii_uppercase() {
                    'H' => 3600,
                    'M' => 60,
                    _ => 1,
                };
                total += (value * factor as f64).floor() as u64;
                number.clear();
                seen_marker = true;
            }
            _ => return None,
        }
    }

    // Trailing digits without a marker are malformed
    if !number.is_empty() || !seen_marker {
        return None;
    }

    Some(total)
}

/// Random duration within the configured bounds, for songs whose metadata
/// could not be resolved. Never zero.
pub fn fallback_duration_seconds(min_secs: i64, max_secs: i64) -> i64 {
    use rand::Rng;
    let min = min_secs.max(1);
    let max = max_secs.max(min);
    rand::thread_rng().gen_range(min..=max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_duration() {
        assert_eq!(parse_iso8601_duration("PT1H2M3S"), Some(3723));
        assert_eq!(parse_iso8601_duration("PT3M45S"), Some(225));
        assert_eq!(parse_iso8601_duration("PT45S"), Some(45));
        assert_eq!(parse_iso8601_duration("PT2H"), Some(7200));
        assert_eq!(parse_iso8601_duration("PT3M"), Some(180));
    }

    #[test]
    fn test_parse_floors_fractional_seconds() {
        assert_eq!(parse_iso8601_duration("PT1M3.9S"), Some(63));
        assert_eq!(parse_iso8601_duration("PT0.5S"), Some(0));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(parse_iso8601_duration(""), None);
        assert_eq!(parse_iso8601_duration("PT"), None);
        assert_eq!(parse_iso8601_duration("3:45"), None);
        assert_eq!(parse_iso8601_duration("PT3M45"), None);
        assert_eq!(parse_iso8601_duration("PTM"), None);
        assert_eq!(parse_iso8601_duration("P1DT3M"), None);
        assert_eq!(parse_iso8601_duration("banana"), None);
    }

    #[test]
    fn test_fallback_stays_in_bounds() {
        for _ in 0..200 {
            let secs = fallback_duration_seconds(180, 240);
            assert!((180..=240).contains(&secs));
        }
    }

    #[test]
    fn test_fallback_never_zero_or_negative() {
        for _ in 0..50 {
            assert!(fallback_duration_seconds(-10, 0) >= 1);
        }
    }
}
