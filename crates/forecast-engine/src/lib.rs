pub mod engine;
pub mod models;
pub mod monte_carlo;
#[cfg(feature = "smoothing")]
pub mod smoothing;
pub mod trend;

#[cfg(test)]
mod tests;

pub use engine::{ForecastEngine, DEFAULT_TRAINING_YEARS};
pub use models::*;
pub use monte_carlo::run_monte_carlo;
#[cfg(feature = "smoothing")]
pub use smoothing::{DampedFit, DampedTrendModel, SimpleSmoothingModel};
pub use trend::{trend_forecast, FlatModel, TrendForecaster};
