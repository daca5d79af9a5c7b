pub mod chart;

pub use chart::{plot_combined, RenderOutcome, SkipReason};
