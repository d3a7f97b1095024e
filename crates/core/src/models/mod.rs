pub mod category;
pub mod date_format;
pub mod finance_data;
pub mod goal;
pub mod money;
pub mod settings;
pub mod stats;
pub mod transaction;
