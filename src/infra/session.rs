//! Transaction session manager
//!
//! Orchestrates the payment session lifecycle. Admission verifies the
//! installation, the request checksum, and the authorisation deadline, then
//! parks the request in the expiring cache under a freshly allocated handle.
//! Resolution takes the entry back out (re-checking the deadline) so the
//! caller can dispatch the merchant callback without any cache lock held.
//!
//! Per-handle states: absent -> pending -> expired | consumed. Expired and
//! consumed are terminal; any later resolve observes a plain miss.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::crypto::validate_signature;
use crate::domain::{PaymentParams, SessionEntry, INST_ID_KEY};
use crate::infra::cache::{is_expired, now_ms, CacheStats, ExpiringCache};
use crate::infra::{GatewayError, InstallationRegistry, Result};

/// Admits and resolves payment sessions.
pub struct SessionManager {
    registry: Arc<InstallationRegistry>,
    cache: ExpiringCache<SessionEntry>,
    /// Next handle to issue. Handles are never reused within a process
    /// lifetime; a u64 outlives any realistic run.
    next_handle: AtomicU64,
}

impl SessionManager {
    pub fn new(registry: Arc<InstallationRegistry>) -> Self {
        Self {
            registry,
            cache: ExpiringCache::new(),
            next_handle: AtomicU64::new(1),
        }
    }

    /// Admit a signed payment request.
    ///
    /// On success the request is stored under a new session handle for as
    /// long as its authorisation deadline allows, and the handle is returned
    /// for the caller to keep until the user decides.
    pub async fn admit(&self, params: PaymentParams) -> Result<u64> {
        let installation_id = params.get(INST_ID_KEY).unwrap_or_default().to_string();
        let installation = self
            .registry
            .get(&installation_id)
            .ok_or_else(|| GatewayError::UnknownInstallation(installation_id.clone()))?;

        if !validate_signature(&params, &installation.md5_key) {
            return Err(GatewayError::InvalidSignature(installation_id));
        }

        let deadline_ms = params.auth_valid_to_ms();
        let now = now_ms();
        if is_expired(deadline_ms, now) {
            return Err(GatewayError::SessionExpired);
        }

        // Only retain the session for as long as the authorisation is valid.
        // Truncation toward zero can make this 0 for sub-second windows,
        // which the cache stores as an immediately-expiring entry.
        let ttl_seconds = (deadline_ms - now) / 1000;

        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed);
        self.cache
            .put(
                handle,
                SessionEntry {
                    params,
                    installation_id: installation_id.clone(),
                },
                ttl_seconds,
            )
            .await;

        info!(handle, %installation_id, ttl_seconds, "payment session admitted");
        Ok(handle)
    }

    /// Resolve a session handle, consuming the stored entry.
    ///
    /// The deadline is re-checked here even though admission already checked
    /// it: the user can sit on the decision page past the window. The entry
    /// is removed before being returned, so the follow-up callback runs with
    /// no cache lock held and a second resolve observes a miss.
    pub async fn resolve(&self, handle: u64) -> Result<SessionEntry> {
        let entry = self
            .cache
            .take(handle)
            .await
            .ok_or(GatewayError::SessionNotFound)?;

        if is_expired(entry.params.auth_valid_to_ms(), now_ms()) {
            debug!(handle, "session taken past its authorisation deadline");
            return Err(GatewayError::SessionExpired);
        }

        Ok(entry)
    }

    /// Evict expired sessions; returns how many were removed.
    pub async fn prune(&self) -> usize {
        self.cache.prune().await
    }

    /// Sessions physically stored right now, expired ones included.
    pub async fn stored_sessions(&self) -> usize {
        self.cache.len().await
    }

    pub fn cache_stats(&self) -> &CacheStats {
        self.cache.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::signed_digest;
    use crate::domain::Installation;

    const FAR_FUTURE_MS: i64 = 4_102_444_800_000; // 2100-01-01

    fn test_registry() -> Arc<InstallationRegistry> {
        Arc::new(InstallationRegistry::from_installations(vec![
            Installation {
                id: "211616".to_string(),
                md5_key: "KEY1".to_string(),
                callback_url: "http://localhost:4567/dump-params".to_string(),
                callback_password: "PASSWORD1".to_string(),
            },
        ]))
    }

    fn signed_request(deadline_ms: i64) -> PaymentParams {
        let unsigned = PaymentParams::from_pairs([
            ("instId", "211616".to_string()),
            ("amount", "10.00".to_string()),
            ("currency", "GBP".to_string()),
            ("authValidTo", deadline_ms.to_string()),
            ("M_order", "42".to_string()),
        ]);
        let fields = "instId:amount:currency:authValidTo";
        let signature = signed_digest(&unsigned, "KEY1", fields);

        let mut pairs: Vec<(String, String)> =
            unsigned.iter().map(|(k, v)| (k.into(), v.into())).collect();
        pairs.push(("signatureFields".to_string(), fields.to_string()));
        pairs.push(("signature".to_string(), signature));
        PaymentParams::from_pairs(pairs)
    }

    #[tokio::test]
    async fn admit_then_resolve_succeeds() {
        let manager = SessionManager::new(test_registry());

        let handle = manager.admit(signed_request(FAR_FUTURE_MS)).await.unwrap();
        let entry = manager.resolve(handle).await.unwrap();

        assert_eq!(entry.installation_id, "211616");
        assert_eq!(entry.params.get("M_order"), Some("42"));
    }

    #[tokio::test]
    async fn admit_unknown_installation() {
        let manager = SessionManager::new(test_registry());
        let params = PaymentParams::from_pairs([("instId", "999999")]);

        let err = manager.admit(params).await.unwrap_err();
        assert!(matches!(err, GatewayError::UnknownInstallation(id) if id == "999999"));
    }

    #[tokio::test]
    async fn admit_missing_inst_id_is_unknown_installation() {
        let manager = SessionManager::new(test_registry());

        let err = manager.admit(PaymentParams::default()).await.unwrap_err();
        assert!(matches!(err, GatewayError::UnknownInstallation(_)));
    }

    #[tokio::test]
    async fn admit_rejects_tampered_signature() {
        let manager = SessionManager::new(test_registry());

        let mut pairs: Vec<(String, String)> = signed_request(FAR_FUTURE_MS)
            .iter()
            .map(|(k, v)| {
                if k == "amount" {
                    (k.into(), "99999.00".to_string())
                } else {
                    (k.into(), v.into())
                }
            })
            .collect();
        let err = manager
            .admit(PaymentParams::from_pairs(pairs))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::InvalidSignature(_)));
    }

    #[tokio::test]
    async fn admit_rejects_past_deadline() {
        let manager = SessionManager::new(test_registry());

        let err = manager.admit(signed_request(1)).await.unwrap_err();
        assert!(matches!(err, GatewayError::SessionExpired));
    }

    #[tokio::test]
    async fn resolve_unknown_handle_is_not_found() {
        let manager = SessionManager::new(test_registry());

        let err = manager.resolve(12345).await.unwrap_err();
        assert!(matches!(err, GatewayError::SessionNotFound));
    }

    #[tokio::test]
    async fn resolve_is_single_use() {
        let manager = SessionManager::new(test_registry());

        let handle = manager.admit(signed_request(FAR_FUTURE_MS)).await.unwrap();
        manager.resolve(handle).await.unwrap();

        let err = manager.resolve(handle).await.unwrap_err();
        assert!(matches!(err, GatewayError::SessionNotFound));
    }

    #[tokio::test]
    async fn resolve_rechecks_deadline_on_stored_entry() {
        let manager = SessionManager::new(test_registry());

        // Plant an entry whose deadline has passed but whose cache slot is
        // still generously alive: the deadline re-check must reject it even
        // though the entry is physically present.
        let entry = SessionEntry {
            params: PaymentParams::from_pairs([("authValidTo", "1000")]),
            installation_id: "211616".to_string(),
        };
        manager.cache.put(7, entry, 3600).await;
        assert!(manager.cache.contains_raw(7).await);

        let err = manager.resolve(7).await.unwrap_err();
        assert!(matches!(err, GatewayError::SessionExpired));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_admissions_get_distinct_handles() {
        let manager = Arc::new(SessionManager::new(test_registry()));

        let mut joins = Vec::new();
        for _ in 0..100 {
            let manager = manager.clone();
            joins.push(tokio::spawn(async move {
                manager.admit(signed_request(FAR_FUTURE_MS)).await.unwrap()
            }));
        }

        let mut handles = std::collections::HashSet::new();
        for join in joins {
            assert!(handles.insert(join.await.unwrap()));
        }

        assert_eq!(handles.len(), 100);
        assert_eq!(manager.stored_sessions().await, 100);

        // Every admitted session is individually resolvable.
        for handle in handles {
            manager.resolve(handle).await.unwrap();
        }
        assert_eq!(manager.stored_sessions().await, 0);
    }
}
