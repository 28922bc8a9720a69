//! Domain types for SignalLab

pub mod bar;
pub mod direction;
pub mod series;

pub use bar::Bar;
pub use direction::Direction;
pub use series::PriceSeries;
