//! Export schedule metadata
//!
//! Schedules are inert: an external scheduler reads them and decides when to
//! trigger a run. This module only knows how to compute the next due instant.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How often a scheduled export is due
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleFrequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl fmt::Display for ScheduleFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
            Self::Quarterly => write!(f, "quarterly"),
            Self::Yearly => write!(f, "yearly"),
        }
    }
}

/// Schedule attached to an export configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSchedule {
    pub frequency: ScheduleFrequency,

    /// 0 = Sunday .. 6 = Saturday (weekly schedules)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_week: Option<u8>,

    /// 1..=31, clamped to the month's length (monthly, quarterly, yearly)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u8>,

    /// Time of day (UTC)
    pub time: NaiveTime,

    #[serde(default)]
    pub recipients: Vec<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_run: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl ExportSchedule {
    /// Create an active schedule with no recipients
    pub fn new(frequency: ScheduleFrequency, time: NaiveTime) -> Self {
        Self {
            frequency,
            day_of_week: None,
            day_of_month: None,
            time,
            recipients: Vec::new(),
            is_active: true,
            next_run: None,
        }
    }

    /// Compute the first due instant strictly after `now`
    ///
    /// Quarterly schedules fall in January, April, July and October; yearly
    /// schedules fall in January.
    pub fn next_run_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive();
        match self.frequency {
            ScheduleFrequency::Daily => {
                let candidate = today.and_time(self.time).and_utc();
                if candidate > now {
                    candidate
                } else {
                    candidate + Duration::days(1)
                }
            }
            ScheduleFrequency::Weekly => {
                let target = self
                    .day_of_week
                    .map(|d| u32::from(d % 7))
                    .unwrap_or_else(|| today.weekday().num_days_from_sunday());
                let current = today.weekday().num_days_from_sunday();
                let ahead = (target + 7 - current) % 7;
                let candidate = (today + Duration::days(i64::from(ahead)))
                    .and_time(self.time)
                    .and_utc();
                if candidate > now {
                    candidate
                } else {
                    candidate + Duration::days(7)
                }
            }
            ScheduleFrequency::Monthly => self.next_in_months(now, 1, |_| true),
            ScheduleFrequency::Quarterly => self.next_in_months(now, 1, |m| (m - 1) % 3 == 0),
            ScheduleFrequency::Yearly => self.next_in_months(now, 1, |m| m == 1),
        }
    }

    /// Refresh `next_run` from the current metadata
    pub fn refresh_next_run(&mut self, now: DateTime<Utc>) {
        self.next_run = if self.is_active {
            Some(self.next_run_after(now))
        } else {
            None
        };
    }

    fn next_in_months(
        &self,
        now: DateTime<Utc>,
        step: u32,
        eligible: impl Fn(u32) -> bool,
    ) -> DateTime<Utc> {
        let day = u32::from(self.day_of_month.unwrap_or(1).clamp(1, 31));
        let mut month_start = first_of_month(now.date_naive());

        // Thirteen months always covers a yearly cycle
        for _ in 0..=13 {
            if eligible(month_start.month()) {
                let date = clamp_day(month_start, day);
                let candidate = date.and_time(self.time).and_utc();
                if candidate > now {
                    return candidate;
                }
            }
            month_start = month_start
                .checked_add_months(Months::new(step))
                .unwrap_or(month_start);
        }

        now + Duration::days(1)
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn clamp_day(month_start: NaiveDate, day: u32) -> NaiveDate {
    let last = month_start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .map(|d| d.day())
        .unwrap_or(28);
    month_start.with_day(day.min(last)).unwrap_or(month_start)
}
