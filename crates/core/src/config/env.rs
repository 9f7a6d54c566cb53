//! Environment overrides for [`MonitorConfig`].
//!
//! Overrides are applied through a lookup function rather than reading the
//! process environment directly, so tests can supply their own variables.

use anyhow::{anyhow, Context, Result};
use pairscout_chain::MovePackage;

use super::monitor::{MonitorConfig, FACTORY_LABEL};
use crate::pair::Network;

/// Expand a whole-string `${VAR}` reference; anything else is returned as is.
pub fn expand_env(value: &str, lookup: &impl Fn(&str) -> Option<String>) -> String {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        lookup(var_name).unwrap_or_else(|| value.to_string())
    } else {
        value.to_string()
    }
}

/// Parse `<package>::<event>` entries into packages, grouping by package id
/// and keeping first-seen order.
fn parse_event_types(list: &str) -> Result<Vec<MovePackage>> {
    let mut packages: Vec<MovePackage> = Vec::new();

    for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (package_id, event) = entry
            .split_once("::")
            .ok_or_else(|| anyhow!("SUI_EVENT_TYPES entry `{entry}` is not <package>::<event>"))?;

        match packages.iter_mut().find(|p| p.package_id == package_id) {
            Some(package) => package.events.push(event.to_string()),
            None => packages.push(MovePackage::new(package_id, "custom", &[event])),
        }
    }

    Ok(packages)
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid {key}: {value}"))
}

impl MonitorConfig {
    /// Apply environment overrides and `${VAR}` expansion.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = lookup("BNB_RPC_URL") {
            self.bnb.rpc_url = url;
        }
        if let Some(url) = lookup("SUI_RPC_URL") {
            self.sui.rpc_url = url;
        }
        self.bnb.rpc_url = expand_env(&self.bnb.rpc_url, &lookup);
        self.sui.rpc_url = expand_env(&self.sui.rpc_url, &lookup);

        if let Some(v) = lookup("MIN_MARKET_CAP") {
            self.admission.min_market_cap = parse_number("MIN_MARKET_CAP", &v)?;
        }
        if let Some(v) = lookup("MIN_VOLUME_24H") {
            self.admission.min_volume_24h = parse_number("MIN_VOLUME_24H", &v)?;
        }
        if let Some(v) = lookup("RPC_TIMEOUT_MS") {
            self.rpc_timeout_ms = parse_number("RPC_TIMEOUT_MS", &v)?;
        }

        if let Some(v) = lookup("MONITOR_NETWORKS") {
            self.networks = v
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.parse::<Network>().map_err(|e| anyhow!(e)))
                .collect::<Result<Vec<_>>>()
                .context("Invalid MONITOR_NETWORKS")?;
        }

        if let Some(v) = lookup("SUI_EVENT_TYPES") {
            self.sui.packages = parse_event_types(&v)?;
        }

        if let Some(factory) = lookup("SUI_FACTORY_ADDRESS").filter(|s| !s.trim().is_empty()) {
            self.sui.packages.retain(|p| p.label != FACTORY_LABEL);
            self.sui
                .packages
                .push(MovePackage::new(factory.trim(), FACTORY_LABEL, &["PairCreated"]));
        }

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_expand_env() {
        let lookup = env(&[("BSC_RPC", "https://node.example")]);
        assert_eq!(expand_env("${BSC_RPC}", &lookup), "https://node.example");
        assert_eq!(expand_env("${MISSING}", &lookup), "${MISSING}");
        assert_eq!(expand_env("https://plain", &lookup), "https://plain");
    }

    #[test]
    fn test_overrides() {
        let config = MonitorConfig::default()
            .with_env_overrides(env(&[
                ("BNB_RPC_URL", "${PRIVATE_BSC}"),
                ("PRIVATE_BSC", "https://private.bsc"),
                ("MIN_MARKET_CAP", "500"),
                ("MONITOR_NETWORKS", "bnb"),
                ("RPC_TIMEOUT_MS", "2500"),
            ]))
            .unwrap();

        assert_eq!(config.bnb.rpc_url, "https://private.bsc");
        assert_eq!(config.admission.min_market_cap, 500.0);
        assert_eq!(config.networks, vec![Network::Bnb]);
        assert_eq!(config.rpc_timeout_ms, 2_500);
    }

    #[test]
    fn test_invalid_number_rejected() {
        let result = MonitorConfig::default().with_env_overrides(env(&[("MIN_VOLUME_24H", "lots")]));
        assert!(result.is_err());

        let result = MonitorConfig::default().with_env_overrides(env(&[("MONITOR_NETWORKS", "bnb,eth")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_sui_event_types() {
        let config = MonitorConfig::default()
            .with_env_overrides(env(&[(
                "SUI_EVENT_TYPES",
                "0xaa::pool::PoolCreated, 0xbb::Created,0xaa::pool::Swap",
            )]))
            .unwrap();

        let packages = &config.sui.packages;
        assert_eq!(packages.len(), 2);
        assert_eq!(packages[0].package_id, "0xaa");
        assert_eq!(packages[0].events, vec!["pool::PoolCreated", "pool::Swap"]);
        assert_eq!(packages[1].events, vec!["Created"]);

        let bad = MonitorConfig::default().with_env_overrides(env(&[("SUI_EVENT_TYPES", "nodelimiter")]));
        assert!(bad.is_err());
    }

    #[test]
    fn test_sui_factory_replaces_default() {
        let config = MonitorConfig::default()
            .with_env_overrides(env(&[("SUI_FACTORY_ADDRESS", "0xfeed")]))
            .unwrap();

        let factories: Vec<&MovePackage> = config
            .sui
            .packages
            .iter()
            .filter(|p| p.label == FACTORY_LABEL)
            .collect();
        assert_eq!(factories.len(), 1);
        assert_eq!(factories[0].package_id, "0xfeed");
        assert_eq!(config.sui.packages.len(), 3);
    }
}
