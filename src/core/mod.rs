pub mod luminaire;
pub mod matrix;
pub mod metrics;
pub mod scenario;
pub mod sensitivity;
pub mod units;
