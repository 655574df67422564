use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Years accepted for filing quarters.
pub const SUPPORTED_YEARS: std::ops::RangeInclusive<i32> = 2000..=2099;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Q1 => "Q1",
            Self::Q2 => "Q2",
            Self::Q3 => "Q3",
            Self::Q4 => "Q4",
        }
    }

    const fn first_month(self) -> u32 {
        match self {
            Self::Q1 => 1,
            Self::Q2 => 4,
            Self::Q3 => 7,
            Self::Q4 => 10,
        }
    }

    fn for_month(month: u32) -> Self {
        match month {
            1..=3 => Self::Q1,
            4..=6 => Self::Q2,
            7..=9 => Self::Q3,
            _ => Self::Q4,
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Q1" => Some(Self::Q1),
            "Q2" => Some(Self::Q2),
            "Q3" => Some(Self::Q3),
            "Q4" => Some(Self::Q4),
            _ => None,
        }
    }
}

/// A calendar quarter being filed, with its reporting window and due date.
///
/// Returns are due on the last day of the month after the quarter closes
/// (Apr 30, Jul 31, Oct 31 and Jan 31 of the following year).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FilingQuarter {
    year: i32,
    quarter: Quarter,
    start: NaiveDate,
    end: NaiveDate,
    due: NaiveDate,
}

impl FilingQuarter {
    pub fn new(quarter: Quarter, year: i32) -> Result<Self, PeriodError> {
        if !SUPPORTED_YEARS.contains(&year) {
            return Err(PeriodError::YearOutOfRange(year));
        }

        let out_of_range = || PeriodError::YearOutOfRange(year);
        let first = quarter.first_month();
        let start = first_of_month(year, first).ok_or_else(out_of_range)?;
        let end = first_of_month(year, first + 3)
            .and_then(|next| next.pred_opt())
            .ok_or_else(out_of_range)?;
        let due = first_of_month(year, first + 4)
            .and_then(|next| next.pred_opt())
            .ok_or_else(out_of_range)?;

        Ok(Self {
            year,
            quarter,
            start,
            end,
            due,
        })
    }

    pub fn containing(date: NaiveDate) -> Result<Self, PeriodError> {
        Self::new(Quarter::for_month(date.month()), date.year())
    }

    pub fn previous(&self) -> Result<Self, PeriodError> {
        match self.quarter {
            Quarter::Q1 => Self::new(Quarter::Q4, self.year - 1),
            Quarter::Q2 => Self::new(Quarter::Q1, self.year),
            Quarter::Q3 => Self::new(Quarter::Q2, self.year),
            Quarter::Q4 => Self::new(Quarter::Q3, self.year),
        }
    }

    pub fn quarter(&self) -> Quarter {
        self.quarter
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.start..=self.end).contains(&date)
    }

    /// Negative once the due date has passed.
    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.due - today).num_days()
    }
}

/// First day of `month`, where months past December roll into the next year.
fn first_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (year, month) = if month > 12 {
        (year + 1, month - 12)
    } else {
        (year, month)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}

impl fmt::Display for FilingQuarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.quarter.label(), self.year)
    }
}

impl FromStr for FilingQuarter {
    type Err = PeriodError;

    /// Accepts `Q3-2024`, `2024-Q3`, `q3 2024` and `Q3_2024`.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_uppercase().replace([' ', '_'], "-");
        let malformed = || PeriodError::Malformed(raw.to_string());

        let (left, right) = normalized.split_once('-').ok_or_else(malformed)?;
        let (quarter, year) = if left.starts_with('Q') {
            (left, right)
        } else {
            (right, left)
        };

        let quarter = Quarter::parse(quarter).ok_or_else(malformed)?;
        let year = year.parse::<i32>().map_err(|_| malformed())?;
        Self::new(quarter, year)
    }
}

impl TryFrom<String> for FilingQuarter {
    type Error = PeriodError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FilingQuarter> for String {
    fn from(value: FilingQuarter) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PeriodError {
    #[error("'{0}' is not a filing quarter such as Q3-2024")]
    Malformed(String),
    #[error("filing year {0} is outside the supported range")]
    YearOutOfRange(i32),
}
