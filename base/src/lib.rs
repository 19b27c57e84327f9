pub mod database;
pub mod logging;
pub mod setting;

pub const CLI_NAME: &str = "encore";
pub const ENCORE_ENV: &str = "ENCORE_ENV";
pub const ENCORE_LOGLEVEL: &str = "ENCORE_LOGLEVEL";
