pub mod discount;
pub mod penalty;

pub use discount::{DiscountCalculator, PdcDiscount};
pub use penalty::{PenaltyAssessment, PenaltyEngine, PenaltyPolicy};
