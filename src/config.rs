use serde::Deserialize;

use crate::services::SelfPairPolicy;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to the product catalog CSV
    #[serde(default = "default_products_csv")]
    pub products_csv: String,

    /// Path to the order-line history CSV
    #[serde(default = "default_orders_csv")]
    pub orders_csv: String,

    /// Count a product repeated within one order as co-purchased with itself
    #[serde(default)]
    pub count_self_pairs: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_products_csv() -> String {
    "data/products.csv".to_string()
}

fn default_orders_csv() -> String {
    "data/orders.csv".to_string()
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn self_pair_policy(&self) -> SelfPairPolicy {
        if self.count_self_pairs {
            SelfPairPolicy::Include
        } else {
            SelfPairPolicy::Exclude
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_environment() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.products_csv, "data/products.csv");
        assert_eq!(config.orders_csv, "data/orders.csv");
        assert_eq!(config.self_pair_policy(), SelfPairPolicy::Exclude);
    }

    #[test]
    fn test_overrides() {
        let vars = vec![
            ("PORT".to_string(), "8080".to_string()),
            ("ORDERS_CSV".to_string(), "/srv/orders.csv".to_string()),
            ("COUNT_SELF_PAIRS".to_string(), "true".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.orders_csv, "/srv/orders.csv");
        assert_eq!(config.self_pair_policy(), SelfPairPolicy::Include);
    }
}
