pub mod aggregation;
pub mod charts;
pub mod data_access;
pub mod normalizer;
pub mod presentation;
pub mod summary;
