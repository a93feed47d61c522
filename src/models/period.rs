use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

use crate::error::EeccError;

const MONTH_NAMES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

/// Calendar month a statement reports on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, EeccError> {
        if !(1..=12).contains(&month) {
            return Err(EeccError::Config(format!(
                "invalid month {} (expected 1-12)",
                month
            )));
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| EeccError::Config(format!("invalid year {}", year)))?;
        Ok(Self { year, month })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Previous calendar month; January rolls over to December of the previous year.
    pub fn prior(&self) -> Period {
        if self.month == 1 {
            Period {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Period {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        // Validated in `new`
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn last_day(&self) -> NaiveDate {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1)
            .and_then(|d| d.pred_opt())
            .unwrap_or_default()
    }

    /// First instant of the month (UTC)
    pub fn start(&self) -> DateTime<Utc> {
        Utc.from_utc_datetime(&self.first_day().and_time(chrono::NaiveTime::MIN))
    }

    /// Last millisecond of the month (UTC)
    pub fn end(&self) -> DateTime<Utc> {
        let next_start = Utc.from_utc_datetime(
            &(self.last_day() + Duration::days(1)).and_time(chrono::NaiveTime::MIN),
        );
        next_start - Duration::milliseconds(1)
    }

    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[(self.month - 1) as usize]
    }

    /// Watermark range, e.g. `1/Oct/2025 - 31/Oct/2025`
    pub fn range_label(&self) -> String {
        let abbreviation = MONTH_ABBREVIATIONS[(self.month - 1) as usize];
        format!(
            "1/{abbr}/{year} - {last}/{abbr}/{year}",
            abbr = abbreviation,
            year = self.year,
            last = self.last_day().day()
        )
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_month() {
        assert!(Period::new(2025, 0).is_err());
        assert!(Period::new(2025, 13).is_err());
        assert!(Period::new(2025, 12).is_ok());
    }

    #[test]
    fn test_prior_rolls_over_year() {
        let january = Period::new(2025, 1).unwrap();
        assert_eq!(january.prior(), Period::new(2024, 12).unwrap());

        let october = Period::new(2025, 10).unwrap();
        assert_eq!(october.prior(), Period::new(2025, 9).unwrap());
    }

    #[test]
    fn test_month_bounds() {
        let feb = Period::new(2024, 2).unwrap();
        assert_eq!(feb.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(feb.start().timestamp_millis(), 1_706_745_600_000);
        assert_eq!(
            feb.end().timestamp_millis(),
            Period::new(2024, 3).unwrap().start().timestamp_millis() - 1
        );
    }

    #[test]
    fn test_bounds_are_utc_while_dates_display_in_lima() {
        let july = Period::new(2025, 7).unwrap();
        let early_utc = Utc.with_ymd_and_hms(2025, 7, 1, 2, 0, 0).unwrap();
        assert!(early_utc >= july.start() && early_utc <= july.end());
        // Still June 30 on the Lima clock
        assert_eq!(crate::utils::format_date(early_utc), "30/06/2025");
        assert_eq!(crate::utils::format_date(july.end()), "31/07/2025");
    }

    #[test]
    fn test_labels() {
        let period = Period::new(2025, 10).unwrap();
        assert_eq!(period.month_name(), "Octubre");
        assert_eq!(period.range_label(), "1/Oct/2025 - 31/Oct/2025");
        assert_eq!(period.to_string(), "2025-10");
    }
}
