//! Configuration module

mod env;
mod site;

pub use env::{normalize_base_path, BuildMode, ConfigError, Environment};
pub use env::{BASE_PATH_VAR, BASE_URL_VAR, MODE_VAR};
pub use site::AnalyticsConfig;
pub use site::HighlightThemes;
pub use site::PersonConfig;
pub use site::SiteConfig;
pub use site::ThemeColorConfig;
