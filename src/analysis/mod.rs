pub mod config;
pub mod imbalance;
pub mod mode;
pub mod scoring;
pub mod sustained;

pub use config::AnalysisConfig;
pub use imbalance::{ImbalanceAlert, ImbalanceDetector};
pub use mode::{classify, Mode};
pub use scoring::intensity_score;
pub use sustained::SustainedAggressionTrigger;
