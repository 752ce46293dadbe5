use crate::manifest::PrecacheManifest;

/// Route prefix the offline export service worker's `fetch` handler is
/// scoped to (spec §6.4 "strictly scoped to its path").
pub const OFFLINE_EXPORT_PREFIX: &str = "/offline-export/";

/// Abstracts the browser Cache Storage API so this crate's fetch-resolution
/// policy stays a pure, testable Rust library (mirrors the injected
/// `WorkerHandoff`/`CredentialBroker` style in `secure-confirm-flow`'s
/// `brokers` module rather than linking a `web-sys` Cache binding directly).
pub trait CacheStore {
    fn get(&self, cache_name: &str, url: &str) -> Option<Vec<u8>>;
}

/// Outcome of resolving a request against the precache + fallback policy.
/// `Hit`/`Fallback` both mean "serve 200 with these bytes"; callers only
/// need the distinction for logging/metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Hit(Vec<u8>),
    Fallback(Vec<u8>),
    Miss,
}

/// Cache-only fetch policy (spec §4.I/§6.4): serve precached bytes for any
/// manifest URL; for a scope-local chunk missing from the cache, fall back
/// to the shared `/sdk/<basename>` cache entry; otherwise miss (caller
/// turns a `Miss` into a 504 `"Offline asset not pre-cached"`, spec §8).
pub fn resolve_fetch<C: CacheStore>(
    manifest: &PrecacheManifest,
    cache: &C,
    requested_path: &str,
) -> FetchOutcome {
    let cache_name = manifest.cache_name();

    if manifest.contains(requested_path) {
        if let Some(bytes) = cache.get(&cache_name, requested_path) {
            return FetchOutcome::Hit(bytes);
        }
    }

    if let Some(basename) = requested_path.strip_prefix(OFFLINE_EXPORT_PREFIX) {
        let fallback_path = format!("/sdk/{basename}");
        if let Some(bytes) = cache.get(&cache_name, &fallback_path) {
            return FetchOutcome::Fallback(bytes);
        }
    }

    FetchOutcome::Miss
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ManifestEntry;
    use std::collections::HashMap;

    struct StubCache(HashMap<(String, String), Vec<u8>>);
    impl CacheStore for StubCache {
        fn get(&self, cache_name: &str, url: &str) -> Option<Vec<u8>> {
            self.0.get(&(cache_name.to_string(), url.to_string())).cloned()
        }
    }

    fn manifest() -> PrecacheManifest {
        PrecacheManifest {
            version: "v1".into(),
            entries: vec![
                ManifestEntry { url: "/offline-export/index.html".into(), revision: "a".into() },
                ManifestEntry { url: "/offline-export/app.js".into(), revision: "b".into() },
            ],
        }
    }

    #[test]
    fn precached_url_is_a_hit() {
        let m = manifest();
        let mut entries = HashMap::new();
        entries.insert((m.cache_name(), "/offline-export/index.html".to_string()), b"<html/>".to_vec());
        let cache = StubCache(entries);

        assert_eq!(
            resolve_fetch(&m, &cache, "/offline-export/index.html"),
            FetchOutcome::Hit(b"<html/>".to_vec())
        );
    }

    #[test]
    fn missing_scope_local_chunk_falls_back_to_sdk_basename() {
        let m = manifest();
        let mut entries = HashMap::new();
        entries.insert((m.cache_name(), "/sdk/wasm_signer_worker_bg.wasm".to_string()), b"wasm-bytes".to_vec());
        let cache = StubCache(entries);

        assert_eq!(
            resolve_fetch(&m, &cache, "/offline-export/wasm_signer_worker_bg.wasm"),
            FetchOutcome::Fallback(b"wasm-bytes".to_vec())
        );
    }

    #[test]
    fn unlisted_and_uncached_url_is_a_miss() {
        let m = manifest();
        let cache = StubCache(HashMap::new());
        assert_eq!(resolve_fetch(&m, &cache, "/offline-export/unknown.js"), FetchOutcome::Miss);
    }
}
