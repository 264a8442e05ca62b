//! Interval parsing for `$__timeGroup`.
//!
//! Accepts the compact duration syntax dashboards emit: a signed sequence of
//! decimal numbers each followed by a unit, such as `300ms`, `1.5h` or `2h45m`.
//! Valid units are `ns`, `us` (or `µs`/`μs`), `ms`, `s`, `m`, `h`.

/// Parses a duration string into seconds.
///
/// Returns `None` if the text is not a valid duration.
pub fn parse_seconds(input: &str) -> Option<f64> {
    let (negative, mut rest) = match input.as_bytes().first()? {
        b'-' => (true, &input[1..]),
        b'+' => (false, &input[1..]),
        _ => (false, input),
    };

    if rest == "0" {
        return Some(0.0);
    }
    if rest.is_empty() {
        return None;
    }

    let mut total = 0.0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let number = &rest[..number_len];
        if number.is_empty() || number == "." || number.matches('.').count() > 1 {
            return None;
        }
        let value: f64 = number.parse().ok()?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let scale = unit_scale(&rest[..unit_len])?;
        rest = &rest[unit_len..];

        total += value * scale;
    }

    Some(if negative { -total } else { total })
}

fn unit_scale(unit: &str) -> Option<f64> {
    match unit {
        "ns" => Some(1e-9),
        "us" | "µs" | "μs" => Some(1e-6),
        "ms" => Some(1e-3),
        "s" => Some(1.0),
        "m" => Some(60.0),
        "h" => Some(3600.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_units() {
        assert_eq!(parse_seconds("5m"), Some(300.0));
        assert_eq!(parse_seconds("10s"), Some(10.0));
        assert_eq!(parse_seconds("1h"), Some(3600.0));
        assert_eq!(parse_seconds("500ms"), Some(0.5));
    }

    #[test]
    fn test_compound_and_fractional() {
        assert_eq!(parse_seconds("1h30m"), Some(5400.0));
        assert_eq!(parse_seconds("1.5h"), Some(5400.0));
        assert_eq!(parse_seconds("-2m"), Some(-120.0));
        assert_eq!(parse_seconds("0"), Some(0.0));
    }

    #[test]
    fn test_invalid() {
        assert_eq!(parse_seconds(""), None);
        assert_eq!(parse_seconds("5"), None);
        assert_eq!(parse_seconds("1d"), None);
        assert_eq!(parse_seconds("m"), None);
        assert_eq!(parse_seconds("1..2s"), None);
        assert_eq!(parse_seconds("DD"), None);
    }
}
