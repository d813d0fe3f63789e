//! Facilitator configuration.

use std::time::Duration;

use x402f_settlement::SettlementThresholds;

/// Top-level facilitator configuration, assembled from environment
/// variables with the spec's documented defaults.
#[derive(Debug, Clone)]
pub struct FacilitatorConfig {
    pub listen_addr: String,
    pub listen_port: u16,
    pub thresholds: SettlementThresholds,
    pub auto_settlement: bool,
    pub settlement_check_interval: Duration,
    pub metrics_snapshot_interval: Duration,
    pub solana_rpc_url: Option<String>,
    pub usdc_mint: Option<String>,
    pub log_level: String,
}

impl Default for FacilitatorConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            listen_port: 8402,
            thresholds: SettlementThresholds::default(),
            auto_settlement: true,
            settlement_check_interval: Duration::from_millis(60_000),
            metrics_snapshot_interval: Duration::from_secs(300),
            solana_rpc_url: None,
            usdc_mint: None,
            log_level: "info".to_string(),
        }
    }
}

impl FacilitatorConfig {
    /// Load configuration from environment variables, falling back to
    /// spec defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("FACILITATOR_LISTEN_ADDR") {
            config.listen_addr = addr;
        }
        if let Ok(port) = std::env::var("FACILITATOR_LISTEN_PORT") {
            if let Ok(port) = port.parse() {
                config.listen_port = port;
            }
        }
        config.thresholds = SettlementThresholds::from_env();
        if let Ok(v) = std::env::var("AUTO_SETTLEMENT") {
            if let Ok(enabled) = v.parse() {
                config.auto_settlement = enabled;
            }
        }
        if let Ok(v) = std::env::var("SETTLEMENT_CHECK_INTERVAL") {
            if let Ok(ms) = v.parse() {
                config.settlement_check_interval = Duration::from_millis(ms);
            }
        }
        if let Ok(url) = std::env::var("SOLANA_RPC_URL") {
            config.solana_rpc_url = Some(url);
        }
        if let Ok(mint) = std::env::var("USDC_MINT") {
            config.usdc_mint = Some(mint);
        }
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = level;
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_port == 0 {
            return Err("listen port cannot be 0".to_string());
        }
        if self.settlement_check_interval.is_zero() {
            return Err("settlement check interval cannot be 0".to_string());
        }
        if !self.thresholds.amount.is_positive() && !self.thresholds.amount.is_zero() {
            return Err("settlement amount threshold cannot be negative".to_string());
        }
        Ok(())
    }
}
