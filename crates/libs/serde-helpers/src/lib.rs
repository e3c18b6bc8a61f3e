use serde::de::Deserializer;
use serde::Deserialize;
use std::time::Duration;

/// Reads a number of seconds into a `Duration`.
pub fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let secs: u64 = Deserialize::deserialize(deserializer)?;
    Ok(Duration::from_secs(secs))
}

pub fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(duration.as_secs())
}

/// Accepts either a list of strings or a single comma separated string, so that
/// `ELASTICSEARCH__URLS=http://a:9200,http://b:9200` works as well as a TOML array.
pub fn deserialize_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    let values = match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(value) => value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        OneOrMany::Many(values) => values,
    };

    Ok(values)
}

pub fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

pub fn default_timeout_extended() -> Duration {
    Duration::from_secs(120)
}

pub fn default_health_check_timeout() -> Duration {
    Duration::from_secs(5)
}
