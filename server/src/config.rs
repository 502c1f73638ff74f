use aimtrainer_shared::protocol::MAX_ENTRIES_PER_MODE;

/// Where leaderboard entries live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-process sorted sets; lost on restart
    Memory,
    /// Leaderboard endpoints answer 503
    Disabled,
}

impl StoreBackend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Some(Self::Memory),
            "disabled" | "none" | "off" => Some(Self::Disabled),
            _ => None,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub backend: StoreBackend,
    /// Highest-scoring entries kept per mode
    pub max_entries_per_mode: usize,
    /// CORS origins; empty allows any
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:9002".to_string(),
            backend: StoreBackend::Memory,
            max_entries_per_mode: MAX_ENTRIES_PER_MODE,
            allowed_origins: vec![],
        }
    }
}

/// Parse an env var, falling back to `default` when unset or malformed.
pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl ServerConfig {
    /// Defaults overridden by `AIMTRAINER_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let listen_addr = std::env::var("AIMTRAINER_LISTEN_ADDR").unwrap_or(defaults.listen_addr);
        let backend = match std::env::var("AIMTRAINER_LEADERBOARD_BACKEND") {
            Ok(v) => StoreBackend::parse(&v).unwrap_or_else(|| {
                tracing::warn!("unknown leaderboard backend {:?}, leaderboard disabled", v);
                StoreBackend::Disabled
            }),
            Err(_) => defaults.backend,
        };
        let allowed_origins = std::env::var("AIMTRAINER_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            listen_addr,
            backend,
            max_entries_per_mode: env_parse(
                "AIMTRAINER_MAX_ENTRIES",
                defaults.max_entries_per_mode,
            ),
            allowed_origins,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!("listen_addr {:?} is not host:port", self.listen_addr));
        }
        if self.max_entries_per_mode == 0 {
            return Err("max_entries_per_mode must be > 0".to_string());
        }
        if let Some(bad) = self
            .allowed_origins
            .iter()
            .find(|o| !(o.starts_with("http://") || o.starts_with("https://")))
        {
            return Err(format!("allowed origin {:?} must start with http(s)://", bad));
        }
        Ok(())
    }
}
