pub mod funding_rate;
pub mod price;
pub mod timestamp;

pub use funding_rate::{FundingRate, FundingRecord, NormalizedFundingRecord};
pub use price::PricePoint;
