//! Date generators.
//!
//! Every subtype except `timestamp` produces text, so generated rows validate against the
//! same rules as client writes. Custom patterns use `yyyy-MM-dd HH:mm:ss` style tokens and
//! are translated to chrono's strftime syntax.

use std::fmt::Write;

use amock_types::GeneratedValue;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, Utc};
use rand::Rng;

use crate::{Arity, GenError};

/// 1900-01-01T00:00:00Z
const EARLIEST: i64 = -2_208_988_800;
const YEAR_SECS: i64 = 365 * 24 * 60 * 60;

const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September", "October", "November",
    "December",
];
const WEEKDAYS: [&str; 7] = ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"];

/// Pattern tokens, longest first within each letter so greedy matching is correct.
const TOKENS: &[(&str, &str)] = &[
    ("yyyy", "%Y"),
    ("yy", "%y"),
    ("y", "%y"),
    ("MMMM", "%B"),
    ("MMM", "%b"),
    ("MM", "%m"),
    ("M", "%-m"),
    ("ddd", "%e"),
    ("dd", "%d"),
    ("d", "%-d"),
    ("HH", "%H"),
    ("hh", "%I"),
    ("h", "%-I"),
    ("mm", "%M"),
    ("m", "%-M"),
    ("ss", "%S"),
    ("s", "%-S"),
    ("SSS", "%3f"),
    ("aa", "%p"),
    ("a", "%P"),
    ("EEEE", "%A"),
    ("E", "%a"),
    ("ZZ", "%z"),
    ("Z", "%z"),
    ("zz:zz", "%:z"),
    ("zzzz", "%z"),
    ("z", "%Z"),
];

/// Named layouts accepted instead of a pattern.
fn named_layout(name: &str) -> Option<&'static str> {
    Some(match name {
        "RFC3339" => "%Y-%m-%dT%H:%M:%S%:z",
        "RFC3339Nano" => "%Y-%m-%dT%H:%M:%S%.9f%:z",
        "RFC2822" | "RFC1123Z" => "%a, %d %b %Y %H:%M:%S %z",
        "RFC1123" => "%a, %d %b %Y %H:%M:%S %Z",
        "RFC822" => "%d %b %y %H:%M %Z",
        "RFC822Z" => "%d %b %y %H:%M %z",
        "RFC850" => "%A, %d-%b-%y %H:%M:%S %Z",
        "ANSIC" => "%a %b %e %H:%M:%S %Y",
        "UnixDate" => "%a %b %e %H:%M:%S %Z %Y",
        "RubyDate" => "%a %b %d %H:%M:%S %z %Y",
        _ => return None,
    })
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DateKind {
    Root,
    Timestamp,
    Day,
    Month,
    Year,
    Weekday,
    Future,
    Past,
}

impl DateKind {
    pub fn from_subtype(s: &str) -> Option<Self> {
        Some(match s {
            "timestamp" => DateKind::Timestamp,
            "day" => DateKind::Day,
            "month" => DateKind::Month,
            "year" => DateKind::Year,
            "weekday" => DateKind::Weekday,
            "future" => DateKind::Future,
            "past" => DateKind::Past,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DateKind::Root => "root",
            DateKind::Timestamp => "timestamp",
            DateKind::Day => "day",
            DateKind::Month => "month",
            DateKind::Year => "year",
            DateKind::Weekday => "weekday",
            DateKind::Future => "future",
            DateKind::Past => "past",
        }
    }

    pub fn arity(&self) -> Arity {
        match self {
            DateKind::Root | DateKind::Future | DateKind::Past | DateKind::Month => Arity::OneOf(&[0, 1]),
            DateKind::Timestamp | DateKind::Day | DateKind::Year | DateKind::Weekday => Arity::Exactly(0),
        }
    }
}

pub fn generate<R: Rng + ?Sized>(kind: DateKind, args: &[String], rng: &mut R) -> Result<GeneratedValue, GenError> {
    let now = Utc::now();
    let format = args.first().map(String::as_str);

    let value = match kind {
        DateKind::Root => GeneratedValue::Text(render(instant(rng, EARLIEST, now.timestamp())?, format)?),
        DateKind::Timestamp => {
            let end = now.timestamp() + YEAR_SECS;
            GeneratedValue::Int(rng.gen_range(0..=end))
        }
        DateKind::Day => GeneratedValue::Text(rng.gen_range(1..=31).to_string()),
        DateKind::Month => {
            let idx = rng.gen_range(0..MONTHS.len());
            match format.map(str::trim) {
                Some("string") => GeneratedValue::Text(MONTHS[idx].to_string()),
                _ => GeneratedValue::Text((idx + 1).to_string()),
            }
        }
        DateKind::Year => GeneratedValue::Text(rng.gen_range(1900..=now.year()).to_string()),
        DateKind::Weekday => GeneratedValue::Text(WEEKDAYS[rng.gen_range(0..WEEKDAYS.len())].to_string()),
        DateKind::Future => {
            let from = now.timestamp() + 1;
            let dt = instant(rng, from, from + YEAR_SECS)?;
            GeneratedValue::Text(render(dt, format)?)
        }
        DateKind::Past => {
            let dt = instant(rng, now.timestamp() - YEAR_SECS, now.timestamp() - 1)?;
            GeneratedValue::Text(render(dt, format)?)
        }
    };
    Ok(value)
}

fn instant<R: Rng + ?Sized>(rng: &mut R, from: i64, to: i64) -> Result<DateTime<Utc>, GenError> {
    let secs = rng.gen_range(from..=to);
    DateTime::<Utc>::from_timestamp(secs, 0).ok_or_else(|| GenError::InvalidParam {
        param: secs.to_string(),
        reason: "timestamp out of range".into(),
    })
}

/// Format `dt` with a named layout, a custom pattern, or RFC 3339 when none is given.
pub fn render(dt: DateTime<Utc>, format: Option<&str>) -> Result<String, GenError> {
    let strftime = match format.map(str::trim) {
        None | Some("") => return Ok(dt.to_rfc3339()),
        Some(name) => match named_layout(name) {
            Some(layout) => layout.to_string(),
            None => translate_pattern(name),
        },
    };

    let invalid = || GenError::InvalidParam {
        param: format.unwrap_or_default().to_string(),
        reason: "unsupported date format".into(),
    };
    let items: Vec<Item<'_>> = StrftimeItems::new(&strftime).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(invalid());
    }
    let mut out = String::new();
    write!(out, "{}", dt.format_with_items(items.into_iter())).map_err(|_| invalid())?;
    Ok(out)
}

/// Map pattern tokens to strftime specifiers. Anything else is literal.
pub fn translate_pattern(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() * 2);
    let mut rest = pattern;
    'outer: while let Some(c) = rest.chars().next() {
        for (token, spec) in TOKENS {
            if rest.starts_with(token) {
                out.push_str(spec);
                rest = &rest[token.len()..];
                continue 'outer;
            }
        }
        if c == '%' {
            out.push_str("%%");
        } else {
            out.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fixed() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 1, 14, 3, 9).unwrap()
    }

    #[test]
    fn pattern_translation() {
        assert_eq!(translate_pattern("yyyy-MM-dd"), "%Y-%m-%d");
        assert_eq!(translate_pattern("dd/MM/yy HH:mm:ss"), "%d/%m/%y %H:%M:%S");
        assert_eq!(translate_pattern("EEEE, MMMM d"), "%A, %B %-d");
        assert_eq!(translate_pattern("100%"), "100%%");
    }

    #[test]
    fn render_custom_and_named() {
        assert_eq!(render(fixed(), Some("yyyy-MM-dd")).unwrap(), "2024-04-01");
        assert_eq!(render(fixed(), Some("dd/MM/yyyy HH:mm")).unwrap(), "01/04/2024 14:03");
        assert_eq!(render(fixed(), Some("h:mm a")).unwrap(), "2:03 pm");
        assert_eq!(render(fixed(), Some("EEEE")).unwrap(), "Monday");
        assert_eq!(render(fixed(), Some("RFC3339")).unwrap(), "2024-04-01T14:03:09+00:00");
        assert_eq!(render(fixed(), Some("ANSIC")).unwrap(), "Mon Apr  1 14:03:09 2024");
        assert_eq!(render(fixed(), None).unwrap(), fixed().to_rfc3339());
    }

    #[test]
    fn future_and_past_are_on_the_right_side_of_now() {
        let mut rng = StdRng::seed_from_u64(21);
        let now = Utc::now();
        for _ in 0..20 {
            let GeneratedValue::Text(f) = generate(DateKind::Future, &[], &mut rng).unwrap() else { panic!() };
            assert!(DateTime::parse_from_rfc3339(&f).unwrap() > now);
            let GeneratedValue::Text(p) = generate(DateKind::Past, &[], &mut rng).unwrap() else { panic!() };
            assert!(DateTime::parse_from_rfc3339(&p).unwrap() < now);
        }
    }

    #[test]
    fn only_timestamp_is_numeric() {
        let mut rng = StdRng::seed_from_u64(22);
        assert!(matches!(generate(DateKind::Timestamp, &[], &mut rng).unwrap(), GeneratedValue::Int(t) if t >= 0));
        for kind in [DateKind::Root, DateKind::Day, DateKind::Month, DateKind::Year, DateKind::Weekday] {
            assert!(matches!(generate(kind, &[], &mut rng).unwrap(), GeneratedValue::Text(_)), "{kind:?}");
        }
    }

    #[test]
    fn month_by_name() {
        let mut rng = StdRng::seed_from_u64(23);
        let GeneratedValue::Text(m) = generate(DateKind::Month, &["string".to_string()], &mut rng).unwrap() else {
            panic!()
        };
        assert!(MONTHS.contains(&m.as_str()));
    }
}
