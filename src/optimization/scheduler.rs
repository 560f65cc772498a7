use crate::config::EngineConfig;
use crate::optimization::settlement::Settlement;
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A settlement with an assigned due date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledPayment {
    #[serde(flatten)]
    pub settlement: Settlement,
    pub due_date: NaiveDate,
    /// Offset of `due_date` from the schedule's start date.
    pub day_index: u32,
    /// Equal to the settlement amount.
    pub priority: Decimal,
    /// Set when every day was already taken and the payment shares day 0.
    pub overflow: bool,
}

impl fmt::Display for ScheduledPayment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {} → {}: {}",
            self.due_date, self.settlement.from, self.settlement.to, self.settlement.amount
        )?;
        if self.overflow {
            write!(f, "  (overloaded day)")?;
        }
        Ok(())
    }
}

/// Assigns due dates to settlements within a window of days.
pub struct PaymentScheduler;

impl PaymentScheduler {
    /// Schedule over the configured default window.
    pub fn schedule_default(
        settlements: &[Settlement],
        start_date: NaiveDate,
        config: &EngineConfig,
    ) -> Vec<ScheduledPayment> {
        Self::schedule(settlements, start_date, config.default_schedule_days)
    }

    /// Give every settlement a due date in `[start_date, start_date + max_days - 1]`.
    ///
    /// # Algorithm
    ///
    /// A job-sequencing variant. Payments are taken in descending amount
    /// order (stable on ties) and each claims the latest day still free,
    /// so larger payments are pushed as late as the window allows. With
    /// more payments than days, the leftovers all land on day 0 and are
    /// flagged as overflow. The result is sorted by due date; payments on
    /// the same day stay in priority order.
    ///
    /// A zero-day window yields an empty schedule. A window running past the
    /// last date chrono can represent is shortened to end on that date, so
    /// `due_date` always equals `start_date + day_index`.
    pub fn schedule(
        settlements: &[Settlement],
        start_date: NaiveDate,
        max_days: u32,
    ) -> Vec<ScheduledPayment> {
        if max_days == 0 || settlements.is_empty() {
            return Vec::new();
        }

        let window = Self::representable_window(start_date, max_days);
        let mut by_priority: Vec<&Settlement> = settlements.iter().collect();
        by_priority.sort_by(|a, b| b.amount.cmp(&a.amount));

        // Only the last `settlements.len()` days can ever be claimed.
        let slots = window.min(u32::try_from(by_priority.len()).unwrap_or(u32::MAX));
        let first_slot_day = window - slots;
        let mut taken = vec![false; slots as usize];

        let mut scheduled: Vec<ScheduledPayment> = by_priority
            .into_iter()
            .map(|settlement| {
                let (day_index, overflow) = match taken.iter().rposition(|used| !used) {
                    Some(slot) => {
                        taken[slot] = true;
                        (first_slot_day + slot as u32, false)
                    }
                    None => {
                        log::warn!(
                            "no free day left for {} → {} ({}); assigning day 0",
                            settlement.from,
                            settlement.to,
                            settlement.amount
                        );
                        (0, true)
                    }
                };
                ScheduledPayment {
                    settlement: settlement.clone(),
                    due_date: offset_date(start_date, day_index),
                    day_index,
                    priority: settlement.amount,
                    overflow,
                }
            })
            .collect();

        scheduled.sort_by_key(|p| p.day_index);
        log::debug!(
            "scheduled {} payments over {} days",
            scheduled.len(),
            window
        );
        scheduled
    }

    /// Number of days of the window that map to a representable date.
    fn representable_window(start_date: NaiveDate, max_days: u32) -> u32 {
        let days_left = NaiveDate::MAX.signed_duration_since(start_date).num_days();
        let limit = u32::try_from(days_left.saturating_add(1)).unwrap_or(u32::MAX);
        if max_days > limit {
            log::warn!(
                "window of {} days from {} runs past {}; shortened to {} days",
                max_days,
                start_date,
                NaiveDate::MAX,
                limit
            );
            limit
        } else {
            max_days
        }
    }
}

/// `start_date + day_index`; callers keep `day_index` inside the
/// representable window.
fn offset_date(start_date: NaiveDate, day_index: u32) -> NaiveDate {
    start_date
        .checked_add_days(Days::new(u64::from(day_index)))
        .unwrap_or(NaiveDate::MAX)
}

/// Free-function form of [`PaymentScheduler::schedule`].
pub fn schedule_payments(
    settlements: &[Settlement],
    start_date: NaiveDate,
    max_days: u32,
) -> Vec<ScheduledPayment> {
    PaymentScheduler::schedule(settlements, start_date, max_days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::participant::ParticipantId;
    use rust_decimal_macros::dec;

    fn settlement(from: &str, to: &str, amount: Decimal) -> Settlement {
        Settlement {
            from: from.to_string(),
            to: to.to_string(),
            from_id: ParticipantId::new(from),
            to_id: ParticipantId::new(to),
            amount,
        }
    }

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_largest_payment_gets_latest_day() {
        let settlements = vec![settlement("B", "A", dec!(10)), settlement("C", "A", dec!(100))];
        let schedule = schedule_payments(&settlements, start(), 3);

        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule[0].settlement.amount, dec!(10));
        assert_eq!(schedule[0].day_index, 1);
        assert_eq!(schedule[1].settlement.amount, dec!(100));
        assert_eq!(schedule[1].day_index, 2);
        assert_eq!(schedule[1].due_date, NaiveDate::from_ymd_opt(2024, 3, 3).unwrap());
        assert!(schedule.iter().all(|p| !p.overflow));
    }

    #[test]
    fn test_priority_equals_amount() {
        let settlements = vec![settlement("B", "A", dec!(42.50))];
        let schedule = schedule_payments(&settlements, start(), 7);
        assert_eq!(schedule[0].priority, dec!(42.50));
        assert_eq!(schedule[0].day_index, 6);
    }

    #[test]
    fn test_overflow_lands_on_day_zero() {
        let settlements = vec![
            settlement("A", "D", dec!(30)),
            settlement("B", "D", dec!(20)),
            settlement("C", "D", dec!(10)),
        ];
        let schedule = schedule_payments(&settlements, start(), 2);

        assert_eq!(schedule.len(), 3);
        let days: Vec<u32> = schedule.iter().map(|p| p.day_index).collect();
        assert_eq!(days, vec![0, 0, 1]);
        assert_eq!(schedule[0].settlement.amount, dec!(20));
        assert!(!schedule[0].overflow);
        assert_eq!(schedule[1].settlement.amount, dec!(10));
        assert!(schedule[1].overflow);
        assert_eq!(schedule[2].settlement.amount, dec!(30));
    }

    #[test]
    fn test_zero_day_window_is_empty() {
        let settlements = vec![settlement("B", "A", dec!(10))];
        assert!(schedule_payments(&settlements, start(), 0).is_empty());
    }

    #[test]
    fn test_no_settlements() {
        assert!(schedule_payments(&[], start(), 14).is_empty());
    }

    #[test]
    fn test_equal_amounts_keep_input_order() {
        let settlements = vec![
            settlement("A", "D", dec!(25)),
            settlement("B", "D", dec!(25)),
        ];
        let schedule = schedule_payments(&settlements, start(), 5);
        assert_eq!(schedule[0].settlement.from, "B");
        assert_eq!(schedule[0].day_index, 3);
        assert_eq!(schedule[1].settlement.from, "A");
        assert_eq!(schedule[1].day_index, 4);
    }

    #[test]
    fn test_huge_window_uses_its_last_days() {
        let settlements = vec![settlement("B", "A", dec!(10)), settlement("C", "A", dec!(20))];
        let schedule = schedule_payments(&settlements, start(), 1_000_000);

        assert_eq!(schedule[0].day_index, 999_998);
        assert_eq!(schedule[1].day_index, 999_999);
        for payment in &schedule {
            assert_eq!(
                Some(payment.due_date),
                start().checked_add_days(Days::new(u64::from(payment.day_index)))
            );
        }
    }

    #[test]
    fn test_window_past_last_date_is_shortened() {
        let first = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let settlements = vec![settlement("B", "A", dec!(10)), settlement("C", "A", dec!(20))];
        let schedule = schedule_payments(&settlements, first, u32::MAX);

        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule[1].due_date, NaiveDate::MAX);
        assert_eq!(schedule[0].due_date, NaiveDate::MAX.pred_opt().unwrap());
        for payment in &schedule {
            assert!(!payment.overflow);
            assert_eq!(
                Some(payment.due_date),
                first.checked_add_days(Days::new(u64::from(payment.day_index)))
            );
        }
    }

    #[test]
    fn test_flattened_json() {
        let settlements = vec![settlement("B", "A", dec!(10))];
        let schedule = schedule_payments(&settlements, start(), 1);
        let json = serde_json::to_value(&schedule[0]).unwrap();
        assert_eq!(json["from"], "B");
        assert_eq!(json["due_date"], "2024-03-01");
        assert_eq!(json["overflow"], false);
    }
}
