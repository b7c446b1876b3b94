use serde::Deserialize;

pub mod accounts_config;
pub mod profile;

pub fn try_deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: Deserialize<'de> + Default,
    D: serde::Deserializer<'de>,
{
    Ok(T::deserialize(serde_json::Value::deserialize(deserializer)?).unwrap_or_default())
}

fn skip_if_none<T>(value: &Option<T>) -> bool {
    value.is_none()
}

fn skip_if_true(value: &bool) -> bool {
    *value
}

fn default_true() -> bool {
    true
}
