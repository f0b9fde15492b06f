pub mod attribute_table;
pub mod training;

pub use attribute_table::AttributeTable;
pub use training::TrainingTable;
