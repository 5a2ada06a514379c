use std::{fmt::Display, sync::LazyLock, time::Duration};

use regex::Regex;

static UNITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^((?<h>\d+)\s?h(r|our)?s?)?\s*((?<m>\d+)\s?m(in(ute)?)?s?)?\s*((?<s>\d+)\s?s(ec(ond)?)?s?)?$")
        .expect("regex is valid")
});

pub struct PrettyDurationDisplayer(u64);

pub trait DurationDisplay {
    fn pretty_display(&self) -> PrettyDurationDisplayer;
}

impl DurationDisplay for Duration {
    fn pretty_display(&self) -> PrettyDurationDisplayer {
        PrettyDurationDisplayer(self.as_secs())
    }
}

impl Display for PrettyDurationDisplayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (m, s) = (self.0 / 60, self.0 % 60);
        let (h, m) = (m / 60, m % 60);

        if h > 0 {
            write!(f, "{h}:{m:02}:{s:02}")
        } else {
            write!(f, "{m}:{s:02}")
        }
    }
}

/// Parses a user-supplied timestamp, accepting both colon notation
/// (`2:30`, `1:02:03`) and unit notation (`2m30s`, `1h 2min 3sec`, `45s`).
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<Duration> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if value.contains(':') {
        let parts = value
            .split(':')
            .map(|part| part.parse::<u64>().ok())
            .collect::<Option<Vec<_>>>()?;
        let secs = match *parts.as_slice() {
            [m, s] if s < 60 => m * 60 + s,
            [h, m, s] if m < 60 && s < 60 => (h * 60 + m) * 60 + s,
            _ => return None,
        };
        return Some(Duration::from_secs(secs));
    }

    let captures = UNITS.captures(value)?;
    let get = |name| {
        captures
            .name(name)
            .and_then(|c| c.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };
    let (h, m, s) = (get("h"), get("m"), get("s"));
    if h == 0 && m == 0 && s == 0 {
        return None;
    }
    Some(Duration::from_secs((h * 60 + m) * 60 + s))
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::{parse_timestamp, DurationDisplay};

    #[rstest]
    #[case(Duration::ZERO, "0:00")]
    #[case(Duration::from_secs(1), "0:01")]
    #[case(Duration::from_secs(59), "0:59")]
    #[case(Duration::from_secs(60), "1:00")]
    #[case(Duration::from_secs(61), "1:01")]
    #[case(Duration::from_secs(59 * 60 + 59), "59:59")]
    #[case(Duration::from_secs(60 * 60), "1:00:00")]
    #[case(Duration::from_secs(60 * 60 + 61), "1:01:01")]
    #[case(Duration::from_secs(100 * 60 * 60), "100:00:00")]
    fn pretty_duration_display_to_string(#[case] input: Duration, #[case] expected: &str) {
        assert_eq!(input.pretty_display().to_string(), expected);
    }

    #[rstest]
    #[case("2:30", Some(Duration::from_secs(150)))]
    #[case("0:00", Some(Duration::ZERO))]
    #[case("1:02:03", Some(Duration::from_secs(3723)))]
    #[case("45s", Some(Duration::from_secs(45)))]
    #[case("2m30s", Some(Duration::from_secs(150)))]
    #[case("1h 2min 3sec", Some(Duration::from_secs(3723)))]
    #[case("90s", Some(Duration::from_secs(90)))]
    #[case("2:61", None)]
    #[case("", None)]
    #[case("soon", None)]
    fn timestamp_parsing(#[case] input: &str, #[case] expected: Option<Duration>) {
        assert_eq!(parse_timestamp(input), expected);
    }
}
