use crate::config::ScheduleConfig;
use crate::ConfigError;
use chrono::{NaiveDateTime, NaiveTime};

/// Parses a strict 24-hour `HH:MM` time of day
///
/// # Example
///
/// ```
/// use topic_harvest::trigger::parse_time_of_day;
///
/// let time = parse_time_of_day("09:30").unwrap();
/// assert_eq!(time.to_string(), "09:30:00");
/// assert!(parse_time_of_day("9:30").is_err());
/// ```
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, ConfigError> {
    let invalid = || ConfigError::InvalidTime(format!("'{}' is not a valid HH:MM time", value));

    // chrono also accepts single-digit and space-padded fields
    let bytes = value.as_bytes();
    let two_digit_fields = bytes.len() == 5
        && bytes[2] == b':'
        && [bytes[0], bytes[1], bytes[3], bytes[4]]
            .iter()
            .all(u8::is_ascii_digit);
    if !two_digit_fields {
        return Err(invalid());
    }

    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| invalid())
}

/// A set of local times of day at which a run should fire
///
/// The schedule remembers the last instant it was checked. A time fires when
/// its minute falls after that instant and at or before the current one, so
/// each occurrence fires exactly once regardless of polling jitter, and times
/// that had already passed when the schedule was created wait for the next day.
#[derive(Debug, Clone)]
pub struct DailySchedule {
    times: Vec<NaiveTime>,
    last_checked: NaiveDateTime,
}

impl DailySchedule {
    /// Creates a schedule that starts counting from `now`
    pub fn new(mut times: Vec<NaiveTime>, now: NaiveDateTime) -> Self {
        times.sort();
        times.dedup();
        Self {
            times,
            last_checked: now,
        }
    }

    /// Builds a schedule from configuration
    pub fn from_config(config: &ScheduleConfig, now: NaiveDateTime) -> Result<Self, ConfigError> {
        let times = config
            .times
            .iter()
            .map(|t| parse_time_of_day(t))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(times, now))
    }

    /// Configured times, sorted and without duplicates
    pub fn times(&self) -> &[NaiveTime] {
        &self.times
    }

    /// Returns every occurrence that came due since the last check
    ///
    /// Advances the schedule to `now`; a clock that moved backwards returns
    /// nothing and leaves the schedule unchanged.
    pub fn due_times(&mut self, now: NaiveDateTime) -> Vec<NaiveDateTime> {
        if now <= self.last_checked {
            return Vec::new();
        }

        let mut due = Vec::new();
        let mut date = self.last_checked.date();
        while date <= now.date() {
            for time in &self.times {
                let at = date.and_time(*time);
                if at > self.last_checked && at <= now {
                    due.push(at);
                }
            }
            match date.succ_opt() {
                Some(next) => date = next,
                None => break,
            }
        }

        self.last_checked = now;
        due
    }

    /// Next occurrence strictly after `now`
    pub fn next_after(&self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        let today = now.date();
        self.times
            .iter()
            .map(|t| today.and_time(*t))
            .find(|at| *at > now)
            .or_else(|| {
                let tomorrow = today.succ_opt()?;
                self.times.first().map(|t| tomorrow.and_time(*t))
            })
    }
}
