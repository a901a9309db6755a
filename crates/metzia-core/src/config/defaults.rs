//! Default value functions used by serde for config deserialization.

pub fn default_data_dir() -> String {
    "~/.metzia".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_country() -> String {
    "IL".to_string()
}

pub fn default_currency() -> String {
    "ILS".to_string()
}

pub fn default_language() -> String {
    "HE".to_string()
}
