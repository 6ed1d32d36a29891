//! Interpreting leaf text as numbers and dates.
//!
//! Parsers here read a leading value and ignore trailing text, so `"42px"`
//! yields `42`. Locale-aware decimals strip grouping separators before
//! parsing. Dates use `chrono` format strings (`%Y-%m-%d`, `%d.%m.%Y %H:%M`).

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

use crate::node::Node;
use crate::patterns::{LEADING_DECIMAL, LEADING_INTEGER};

/// Decimal and grouping separators of a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    pub decimal: char,
    pub grouping: &'static [char],
}

const POINT_COMMA: NumberFormat = NumberFormat {
    decimal: '.',
    grouping: &[','],
};

const COMMA_POINT: NumberFormat = NumberFormat {
    decimal: ',',
    grouping: &['.'],
};

const COMMA_SPACE: NumberFormat = NumberFormat {
    decimal: ',',
    grouping: &[' ', '\u{a0}', '\u{202f}'],
};

const POINT_APOSTROPHE: NumberFormat = NumberFormat {
    decimal: '.',
    grouping: &['\'', '\u{2019}'],
};

/// Number format for a locale identifier such as `en_US`, `de-DE` or `fr_CH`.
///
/// Unknown identifiers and `None` fall back to `en_US`.
#[must_use]
pub fn number_format(locale: Option<&str>) -> NumberFormat {
    let Some(locale) = locale else {
        return POINT_COMMA;
    };
    let normalized = locale.trim().replace('-', "_").to_ascii_lowercase();
    let (language, region) = normalized
        .split_once('_')
        .unwrap_or((normalized.as_str(), ""));

    match (language, region) {
        ("de" | "fr" | "it", "ch") | ("rm", _) => POINT_APOSTROPHE,
        ("fr" | "ru" | "uk" | "pl" | "cs" | "sk" | "sv" | "nb" | "no" | "fi" | "hu" | "bg", _) => {
            COMMA_SPACE
        }
        (
            "de" | "es" | "it" | "nl" | "pt" | "da" | "tr" | "id" | "ro" | "hr" | "sl" | "sr"
            | "el",
            _,
        ) => COMMA_POINT,
        _ => POINT_COMMA,
    }
}

/// Leading integer of `text`, ignoring surrounding whitespace.
#[must_use]
pub fn parse_integer(text: &str) -> Option<i64> {
    LEADING_INTEGER
        .find(text.trim())
        .and_then(|m| m.as_str().parse().ok())
}

/// Leading decimal of `text`, ignoring surrounding whitespace.
#[must_use]
pub fn parse_double(text: &str) -> Option<f64> {
    LEADING_DECIMAL
        .find(text.trim())
        .and_then(|m| m.as_str().parse().ok())
}

/// Decimal written with `locale`'s separators, e.g. `"1.234,5"` for `de_DE`.
#[must_use]
pub fn parse_double_for_locale(text: &str, locale: Option<&str>) -> Option<f64> {
    let format = number_format(locale);
    let canonical: String = text
        .trim()
        .chars()
        .filter(|c| !format.grouping.contains(c))
        .map(|c| if c == format.decimal { '.' } else { c })
        .collect();
    parse_double(&canonical)
}

/// Parses `text` with `format`, reading wall-clock values in `zone`.
///
/// Formats carrying their own offset (`%z`, `%:z`) keep it. Date-only
/// formats resolve to midnight.
#[must_use]
pub fn parse_date<Tz: TimeZone>(text: &str, format: &str, zone: &Tz) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_str(text, format) {
        return Some(parsed);
    }
    let naive = NaiveDateTime::parse_from_str(text, format)
        .or_else(|_| NaiveDate::parse_from_str(text, format).map(|d| d.and_time(NaiveTime::MIN)))
        .ok()?;
    zone.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.fixed_offset())
}

impl Node<'_> {
    /// Leading integer of the direct text value.
    #[must_use]
    pub fn integer_value(&self) -> Option<i64> {
        self.string_value().as_deref().and_then(parse_integer)
    }

    /// Leading decimal of the direct text value.
    #[must_use]
    pub fn double_value(&self) -> Option<f64> {
        self.string_value().as_deref().and_then(parse_double)
    }

    /// Direct text value read as a decimal in `locale`.
    #[must_use]
    pub fn double_value_for_locale(&self, locale: Option<&str>) -> Option<f64> {
        self.string_value()
            .and_then(|text| parse_double_for_locale(&text, locale))
    }

    /// Subtree text content read as a decimal in `locale`.
    #[must_use]
    pub fn content_double_value_for_locale(&self, locale: Option<&str>) -> Option<f64> {
        parse_double_for_locale(&self.text_content(), locale)
    }

    /// Direct text value read as a date in the local time zone.
    #[must_use]
    pub fn date_value(&self, format: &str) -> Option<DateTime<FixedOffset>> {
        self.string_value()
            .and_then(|text| parse_date(&text, format, &Local))
    }

    /// Direct text value read as a date at a fixed UTC offset.
    #[must_use]
    pub fn date_value_with_offset(&self, format: &str, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
        self.string_value()
            .and_then(|text| parse_date(&text, format, &offset))
    }

    /// Subtree text content read as a date in the local time zone.
    #[must_use]
    pub fn content_date_value(&self, format: &str) -> Option<DateTime<FixedOffset>> {
        parse_date(&self.text_content(), format, &Local)
    }
}
