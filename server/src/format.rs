use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::OffsetDateTime;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Could not parse timestamp: {0}")]
    Parse(#[from] time::error::Parse),

    #[error("Could not render timestamp: {0}")]
    Format(#[from] time::error::Format),
}

/// The named display formats the rendering layer can ask for when showing a
/// show's start time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeFormat {
    Full,
    #[default]
    Medium,
}

static FULL: &[FormatItem<'static>] = format_description!(
    "[weekday] [month repr:long], [day padding:none], [year] at [hour repr:12 padding:none]:[minute][period]"
);

static MEDIUM: &[FormatItem<'static>] = format_description!(
    "[weekday repr:short] [month], [day], [year] [hour repr:12 padding:none]:[minute][period]"
);

static SHORT: &[FormatItem<'static>] = format_description!("[month]/[day]/[year], [hour]:[minute]");

/// Renders an RFC 3339 timestamp with one of the named display formats.
pub fn format_datetime(value: &str, format: TimeFormat) -> Result<String, FormatError> {
    let date = OffsetDateTime::parse(value, &Rfc3339)?;
    let pattern = match format {
        TimeFormat::Full => FULL,
        TimeFormat::Medium => MEDIUM,
    };
    Ok(date.format(pattern)?)
}

/// `MM/DD/YYYY, HH:MM`, the pattern listings and detail views use for show
/// start times.
pub fn short(date: &OffsetDateTime) -> Result<String, FormatError> {
    Ok(date.format(SHORT)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn full_format() {
        let rendered = format_datetime("2019-05-21T21:30:00.000Z", TimeFormat::Full).unwrap();
        assert_eq!(rendered, "Tuesday May, 21, 2019 at 9:30PM");
    }

    #[test]
    fn medium_format() {
        let rendered = format_datetime("2019-05-21T09:05:00Z", TimeFormat::Medium).unwrap();
        assert_eq!(rendered, "Tue 05, 21, 2019 9:05AM");
    }

    #[test]
    fn medium_is_the_default() {
        let input = "2035-01-01T00:00:00Z";
        assert_eq!(
            format_datetime(input, TimeFormat::default()).unwrap(),
            format_datetime(input, TimeFormat::Medium).unwrap()
        );
    }

    #[test]
    fn rejects_non_rfc3339_input() {
        assert!(format_datetime("05/21/2019", TimeFormat::Medium).is_err());
    }

    #[test]
    fn short_format() {
        let date = datetime!(2020-06-15 21:30 UTC);
        assert_eq!(short(&date).unwrap(), "06/15/2020, 21:30");
    }
}
