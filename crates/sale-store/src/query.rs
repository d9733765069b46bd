use chrono::{DateTime, Utc};
use domain::SaleError;

/// Inclusive range of sale dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateRange {
    /// Creates a range; `start` must not be after `end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, SaleError> {
        if start > end {
            return Err(SaleError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Returns true if `date` lies within the range, bounds included.
    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        self.start <= date && date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn range_bounds_are_inclusive() {
        let start = Utc::now();
        let end = start + Duration::days(1);
        let range = DateRange::new(start, end).unwrap();

        assert!(range.contains(start));
        assert!(range.contains(end));
        assert!(!range.contains(end + Duration::seconds(1)));
        assert!(!range.contains(start - Duration::seconds(1)));
    }

    #[test]
    fn single_instant_range_is_valid() {
        let now = Utc::now();
        assert!(DateRange::new(now, now).is_ok());
    }

    #[test]
    fn inverted_range_rejected() {
        let start = Utc::now();
        let end = start - Duration::hours(1);
        assert!(matches!(
            DateRange::new(start, end),
            Err(SaleError::InvalidDateRange { .. })
        ));
    }
}
