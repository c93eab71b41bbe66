// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Rejects empty names and attempt budgets below one at load time.

use serde::Deserialize;

pub fn deserialize_non_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(serde::de::Error::custom("value cannot be empty"));
    }
    Ok(trimmed.to_string())
}

pub fn deserialize_max_attempts<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = u32::deserialize(deserializer)?;
    if value == 0 {
        return Err(serde::de::Error::custom("max_attempts must be at least 1"));
    }
    Ok(value)
}
