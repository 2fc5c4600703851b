//! Network scanning.

use crate::parse;
use crate::platform::{Platform, QueryKind};
use crate::runner::CommandRunner;
use crate::types::NetworkRecord;
use std::sync::Arc;
use tracing::warn;

/// Lists currently visible networks. Purely informational: scan results
/// feed user-facing enumeration, never the enforcement decisions.
pub struct NetworkScanner<R> {
    runner: Arc<R>,
    platform: Platform,
}

impl<R: CommandRunner> NetworkScanner<R> {
    pub fn new(runner: Arc<R>, platform: Platform) -> Self {
        Self { runner, platform }
    }

    /// Visible networks in the order the platform reported them. Empty when
    /// the scan failed or nothing is in range, callers treat both as
    /// "nothing available yet", not as a fault.
    pub async fn scan(&self) -> Vec<NetworkRecord> {
        match self.runner.query(QueryKind::VisibleNetworks).await {
            Ok(raw) => parse::visible_networks(self.platform, &raw),
            Err(e) => {
                warn!("network scan failed: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::testing::ScriptedRunner;

    #[tokio::test]
    async fn test_scan_failure_yields_empty_list() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.fail_scan_queries();
        let scanner = NetworkScanner::new(Arc::clone(&runner), Platform::Linux);
        assert!(scanner.scan().await.is_empty());
    }

    #[tokio::test]
    async fn test_scan_preserves_platform_order() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.script_scan(&["CafeGuest:11\\:22\\:33\\:44\\:55\\:66\nHomeNet:A0\\:B1\\:C2\\:D3\\:E4\\:F5"]);
        let scanner = NetworkScanner::new(Arc::clone(&runner), Platform::Linux);
        let records = scanner.scan().await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].ssid, "CafeGuest");
        assert_eq!(records[1].ssid, "HomeNet");
    }
}
