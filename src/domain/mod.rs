//! src/domain/mod.rs
mod airport_code;
mod search_criteria;
mod subscriber_email;

pub use airport_code::AirportCode;
pub use search_criteria::{MaxPrice, NewSubscription, SearchCriteria, TripLengthRange};
pub use subscriber_email::SubscriberEmail;
