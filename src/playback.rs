pub mod alert_log;
pub mod core;
pub mod run;
pub mod session;
pub mod view;
