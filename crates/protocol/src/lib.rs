pub mod constraint;
pub mod era;
pub mod style;
pub mod timescale;

pub use constraint::{EraConstraintMode, EraConstraints, TimeRange, constrain_era};
pub use era::Era;
pub use style::StyleClasses;
pub use timescale::TimeScale;
