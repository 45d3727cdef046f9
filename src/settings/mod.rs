//! The application-wide display preferences.

mod db;
mod domain;
mod get;
mod update;

pub use db::{
    create_settings_table, get_or_create_settings, insert_default_settings, update_settings,
};
pub use domain::{ChartType, Currency, DataView, Settings, SettingsPatch};
pub use get::get_settings_endpoint;
pub use update::update_settings_endpoint;
