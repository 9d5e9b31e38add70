pub mod interaction_record;

pub use interaction_record::InteractionRecord;
