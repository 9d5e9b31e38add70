pub mod interaction_records;
