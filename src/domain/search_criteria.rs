//! src/domain/search_criteria.rs
use crate::domain::{AirportCode, SubscriberEmail};

/// Price ceiling in whole US dollars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxPrice(i64);

impl MaxPrice {
    pub fn parse(dollars: i64) -> Result<Self, String> {
        if dollars > 0 {
            Ok(Self(dollars))
        } else {
            Err(format!("{} is not a valid maximum price.", dollars))
        }
    }

    pub fn dollars(&self) -> i64 {
        self.0
    }
}

/// An inclusive range of acceptable round-trip lengths, in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TripLengthRange {
    min_days: i64,
    max_days: i64,
}

impl TripLengthRange {
    pub fn parse(min_days: i64, max_days: i64) -> Result<Self, String> {
        if min_days <= 0 {
            return Err(format!("{} is not a valid minimum trip length.", min_days));
        }
        if min_days > max_days {
            return Err(format!(
                "minimum trip length ({} days) exceeds maximum ({} days).",
                min_days, max_days
            ));
        }
        Ok(Self { min_days, max_days })
    }

    pub fn min_days(&self) -> i64 {
        self.min_days
    }

    pub fn max_days(&self) -> i64 {
        self.max_days
    }
}

/// The saved search criteria of one subscriber.
#[derive(Debug, Clone)]
pub struct SearchCriteria {
    pub max_price: MaxPrice,
    pub trip_length: TripLengthRange,
    pub origin: AirportCode,
}

pub struct NewSubscription {
    pub email: SubscriberEmail,
    pub criteria: SearchCriteria,
}
