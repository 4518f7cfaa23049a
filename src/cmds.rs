use chrono::NaiveDate;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, one_of},
    combinator::{all_consuming, map_res, recognize, value},
    sequence::{pair, tuple},
    IResult,
};
use std::str::FromStr;

use crate::datekey::{shift_days, DateKey};
use crate::error::*;

/// A day as typed on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DaySpec {
    Today,
    Tomorrow,
    Yesterday,
    /// Days relative to today, e.g. `+3` or `-1`.
    Offset(i64),
    Date(DateKey),
}

impl DaySpec {
    pub fn resolve(&self, today: NaiveDate) -> Result<NaiveDate> {
        let offset = match self {
            DaySpec::Date(key) => return Ok(key.date()),
            DaySpec::Today => 0,
            DaySpec::Tomorrow => 1,
            DaySpec::Yesterday => -1,
            DaySpec::Offset(days) => *days,
        };

        shift_days(today, offset).ok_or_else(|| {
            Error::new(
                ErrorKind::DateParse,
                &format!("{} days from {} is out of range", offset, today),
            )
        })
    }
}

fn date_key(input: &str) -> IResult<&str, DaySpec> {
    map_res(
        recognize(tuple((digit1, char('-'), digit1, char('-'), digit1))),
        |s: &str| s.parse::<DateKey>().map(DaySpec::Date),
    )(input)
}

fn offset(input: &str) -> IResult<&str, DaySpec> {
    map_res(recognize(pair(one_of("+-"), digit1)), |s: &str| {
        s.parse::<i64>().map(DaySpec::Offset)
    })(input)
}

fn day_spec(input: &str) -> IResult<&str, DaySpec> {
    alt((
        value(DaySpec::Today, tag("today")),
        value(DaySpec::Tomorrow, tag("tomorrow")),
        value(DaySpec::Yesterday, tag("yesterday")),
        date_key,
        offset,
    ))(input)
}

impl FromStr for DaySpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let input = s.trim().to_lowercase();
        let (_, spec) = all_consuming(day_spec)(input.as_str()).map_err(|err| {
            Error::from(err).with_msg(&format!(
                "'{}' is not today, tomorrow, yesterday, +N, -N or YYYY-MM-DD",
                s
            ))
        })?;

        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_named_days() {
        assert_eq!("today".parse::<DaySpec>().unwrap(), DaySpec::Today);
        assert_eq!("Tomorrow".parse::<DaySpec>().unwrap(), DaySpec::Tomorrow);
        assert_eq!(" yesterday ".parse::<DaySpec>().unwrap(), DaySpec::Yesterday);
    }

    #[test]
    fn parses_offsets_and_dates() {
        assert_eq!("+3".parse::<DaySpec>().unwrap(), DaySpec::Offset(3));
        assert_eq!("-14".parse::<DaySpec>().unwrap(), DaySpec::Offset(-14));
        assert_eq!(
            "2024-03-10".parse::<DaySpec>().unwrap(),
            DaySpec::Date("2024-03-10".parse().unwrap())
        );
    }

    #[test]
    fn rejects_garbage() {
        for input in ["todayx", "3", "+", "2024-02-30", "2024-3-10", "next week", ""].iter() {
            let err = input.parse::<DaySpec>().unwrap_err();
            assert!(
                matches!(err.kind, ErrorKind::ParseError),
                "{} should not parse",
                input
            );
        }
    }

    #[test]
    fn resolves_against_today() {
        let today = date(2024, 12, 31);

        assert_eq!(DaySpec::Today.resolve(today).unwrap(), today);
        assert_eq!(DaySpec::Tomorrow.resolve(today).unwrap(), date(2025, 1, 1));
        assert_eq!(DaySpec::Offset(-31).resolve(today).unwrap(), date(2024, 11, 30));
        assert_eq!(
            DaySpec::Date("2023-06-01".parse().unwrap())
                .resolve(today)
                .unwrap(),
            date(2023, 6, 1)
        );
        assert!(DaySpec::Offset(i64::MAX).resolve(today).is_err());
    }
}
