use serde::Deserialize;

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_shutdown_timeout() -> u64 {
    30u64
}

fn default_music_directory() -> String {
    "public/music".to_string()
}

fn default_track_base_path() -> String {
    "/music".to_string()
}

fn default_public_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_time_update_interval_ms() -> u64 {
    250u64
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Config {
    #[serde(default = "default_bind_address")]
    pub(crate) bind_address: String,
    #[serde(default = "default_shutdown_timeout")]
    pub(crate) shutdown_timeout: u64,
    #[serde(default = "default_music_directory")]
    pub(crate) music_directory: String,
    #[serde(default = "default_track_base_path")]
    pub(crate) track_base_path: String,
    #[serde(default = "default_public_url")]
    pub(crate) public_url: String,
    #[serde(default = "default_time_update_interval_ms")]
    pub(crate) time_update_interval_ms: u64,
}

impl Config {
    pub(crate) fn from_env() -> Self {
        match envy::from_env::<Self>() {
            Ok(config) => config,
            Err(error) => panic!("Invalid environment configuration: {:#?}", error),
        }
    }

    pub(crate) fn listing_url(&self) -> String {
        format!("{}/api/music", self.public_url.trim_end_matches('/'))
    }

    pub(crate) fn track_route(&self) -> String {
        format!("{}/{{name}}", self.track_base_path.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::Config;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        envy::from_iter(
            vars.iter()
                .map(|(key, value)| (key.to_string(), value.to_string())),
        )
        .unwrap()
    }

    #[test]
    fn should_fall_back_to_defaults() {
        let config = config_from(&[]);

        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.shutdown_timeout, 30);
        assert_eq!(config.music_directory, "public/music");
        assert_eq!(config.track_base_path, "/music");
        assert_eq!(config.time_update_interval_ms, 250);
        assert_eq!(config.listing_url(), "http://127.0.0.1:8080/api/music");
        assert_eq!(config.track_route(), "/music/{name}");
    }

    #[test]
    fn should_read_overrides() {
        let config = config_from(&[
            ("MUSIC_DIRECTORY", "/srv/music"),
            ("TRACK_BASE_PATH", "/audio/"),
            ("PUBLIC_URL", "http://card.local/"),
            ("SHUTDOWN_TIMEOUT", "5"),
        ]);

        assert_eq!(config.music_directory, "/srv/music");
        assert_eq!(config.shutdown_timeout, 5);
        assert_eq!(config.listing_url(), "http://card.local/api/music");
        assert_eq!(config.track_route(), "/audio/{name}");
    }
}
