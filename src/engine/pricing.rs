use crate::model::*;

pub trait PricingStrategy: Send + Sync {
    /// Fee for a stay from `entry` to `exit`. Pure; no side effects.
    fn calculate(&self, entry: Ms, exit: Ms) -> Amount;
}

/// Flat rate per started hour, at least one hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourlyPricing {
    pub rate_per_hour: Amount,
}

impl HourlyPricing {
    pub fn new(rate_per_hour: Amount) -> Self {
        Self { rate_per_hour }
    }

    /// Whole hours rounded up, minimum one. Non-positive stays bill one hour.
    pub fn billable_hours(entry: Ms, exit: Ms) -> u64 {
        let duration = exit.saturating_sub(entry);
        if duration <= 0 {
            return 1;
        }
        (duration as u64).div_ceil(HOUR_MS as u64).max(1)
    }
}

impl PricingStrategy for HourlyPricing {
    fn calculate(&self, entry: Ms, exit: Ms) -> Amount {
        Self::billable_hours(entry, exit).saturating_mul(self.rate_per_hour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const M: Ms = 60_000;

    fn fee(minutes: Ms) -> Amount {
        HourlyPricing::new(50).calculate(0, minutes * M)
    }

    #[test]
    fn hour_boundaries_round_up() {
        assert_eq!(fee(60), 50);
        assert_eq!(fee(61), 100);
        assert_eq!(fee(120), 100);
        assert_eq!(fee(121), 150);
    }

    #[test]
    fn two_hours_ten_minutes_bills_three() {
        assert_eq!(fee(130), 150);
    }

    #[test]
    fn short_stay_bills_one_hour() {
        assert_eq!(fee(0), 50);
        assert_eq!(HourlyPricing::new(50).calculate(0, 1), 50);
        assert_eq!(fee(59), 50);
    }

    #[test]
    fn clock_going_backwards_bills_one_hour() {
        assert_eq!(HourlyPricing::new(50).calculate(10 * M, 0), 50);
    }

    #[test]
    fn one_ms_past_the_hour() {
        assert_eq!(HourlyPricing::billable_hours(0, HOUR_MS), 1);
        assert_eq!(HourlyPricing::billable_hours(0, HOUR_MS + 1), 2);
    }

    #[test]
    fn huge_rate_saturates() {
        let pricing = HourlyPricing::new(Amount::MAX);
        assert_eq!(pricing.calculate(0, 3 * HOUR_MS), Amount::MAX);
    }
}
