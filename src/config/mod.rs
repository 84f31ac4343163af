mod settings;

pub use settings::{LogConfig, LogFormat, RelayConfig, Settings, SlackConfig, load_settings};
