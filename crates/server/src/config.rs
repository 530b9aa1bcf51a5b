use goalkeeper_sim::MatchConfig;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub max_clients_per_match: usize,
    pub tick_rate: u32,
    pub match_config: MatchConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let match_config = MatchConfig::default();
        Self {
            bind: "0.0.0.0".to_string(),
            port: 7070,
            max_clients_per_match: match_config.max_clients,
            tick_rate: match_config.tick_rate,
            match_config,
        }
    }
}
