pub mod aggregator;
pub mod classifier;
pub mod external;
pub mod extractor;
pub mod unarchiver;
