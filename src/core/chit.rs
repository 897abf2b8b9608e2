//! Chit plan progress.
//!
//! A chit plan is a fixed-installment savings plan. Progress is derived from
//! the start date on every read and never stored.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Installments in every chit plan.
pub const CHIT_DURATION_MONTHS: u32 = 10;

/// Length of one installment period. Calendar months are not used.
pub const DAYS_PER_PERIOD: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChitStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
}

fn default_duration_months() -> u32 {
    CHIT_DURATION_MONTHS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChitPlan {
    pub plan_id: String,
    pub monthly_amount: f64,
    #[serde(default, deserialize_with = "deserialize_start_date")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default = "default_duration_months")]
    pub duration_months: u32,
    #[serde(default)]
    pub status: ChitStatus,
}

impl ChitPlan {
    pub fn new(plan_id: &str, monthly_amount: f64, start_date: Option<DateTime<Utc>>) -> Self {
        Self {
            plan_id: plan_id.to_string(),
            monthly_amount,
            start_date,
            duration_months: CHIT_DURATION_MONTHS,
            status: ChitStatus::Active,
        }
    }

    /// Date the last period ends, counting 30 days per period. `None` without a
    /// start date or when the date would fall outside the representable range.
    pub fn maturity_date(&self) -> Option<DateTime<Utc>> {
        let days = DAYS_PER_PERIOD.checked_mul(i64::from(self.duration_months))?;
        let term = Duration::try_days(days)?;
        self.start_date?.checked_add_signed(term)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChitPlanProgress {
    pub months_completed: u32,
    pub months_pending: u32,
    pub amount_paid: f64,
    pub amount_pending: f64,
}

/// Computes how much of `plan` is covered by the time elapsed up to `as_of`.
///
/// Plans that are not active, or have no start date, report nothing paid and
/// every period pending.
pub fn compute_progress(plan: &ChitPlan, as_of: DateTime<Utc>) -> ChitPlanProgress {
    let monthly_amount = if plan.monthly_amount.is_finite() && plan.monthly_amount > 0.0 {
        plan.monthly_amount
    } else {
        0.0
    };
    let duration = plan.duration_months;

    let months_completed = match (plan.status, plan.start_date) {
        (ChitStatus::Active, Some(start)) => {
            let elapsed_days = (as_of - start).num_days();
            let periods = elapsed_days.div_euclid(DAYS_PER_PERIOD);
            periods.clamp(0, i64::from(duration)) as u32
        }
        _ => 0,
    };
    let months_pending = duration - months_completed;

    ChitPlanProgress {
        months_completed,
        months_pending,
        amount_paid: f64::from(months_completed) * monthly_amount,
        amount_pending: f64::from(months_pending) * monthly_amount,
    }
}

fn deserialize_start_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.map(|s| parse_start_date(&s).map_err(serde::de::Error::custom))
        .transpose()
}

/// Accepts RFC 3339 timestamps or plain `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_start_date(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|e| format!("Invalid start date '{s}': {e}"))
}
