pub mod billing;
pub mod dashboard;
pub mod members;
pub mod root;
pub mod settings;
