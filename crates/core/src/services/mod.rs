pub mod category_service;
pub mod goal_service;
pub mod ledger_service;
pub mod stats_service;
