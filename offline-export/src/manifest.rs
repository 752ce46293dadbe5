use serde::{Deserialize, Serialize};

/// One entry of `precache.manifest.json` (spec §6.4): a URL scoped under
/// `/offline-export/` plus a content revision used to invalidate the
/// versioned cache when the asset changes without the URL changing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub url: String,
    pub revision: String,
}

/// The precache manifest served alongside the offline export HTML/SW
/// bundle. `version` names the cache (`OFFLINE_EXPORT::<version>`, spec
/// §6.4); bumping it forces a full cache replacement rather than an
/// incremental diff against a stale cache generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrecacheManifest {
    pub version: String,
    pub entries: Vec<ManifestEntry>,
}

impl PrecacheManifest {
    pub fn cache_name(&self) -> String {
        format!("OFFLINE_EXPORT::{}", self.version)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.iter().any(|e| e.url == url)
    }

    pub fn revision_of(&self, url: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.url == url)
            .map(|e| e.revision.as_str())
    }
}

/// What the SW install step needs to know to warm a cache from a previous
/// generation instead of refetching everything: URLs new to this manifest,
/// URLs whose revision changed, and URLs no longer listed (evict these from
/// the old cache so they don't serve stale content at the same path).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManifestDiff {
    pub added: Vec<String>,
    pub changed: Vec<String>,
    pub removed: Vec<String>,
}

pub fn diff_manifests(previous: &PrecacheManifest, next: &PrecacheManifest) -> ManifestDiff {
    let mut diff = ManifestDiff::default();

    for entry in &next.entries {
        match previous.revision_of(&entry.url) {
            None => diff.added.push(entry.url.clone()),
            Some(prev_revision) if prev_revision != entry.revision => {
                diff.changed.push(entry.url.clone())
            }
            Some(_) => {}
        }
    }

    for entry in &previous.entries {
        if !next.contains(&entry.url) {
            diff.removed.push(entry.url.clone());
        }
    }

    diff
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(version: &str, entries: &[(&str, &str)]) -> PrecacheManifest {
        PrecacheManifest {
            version: version.into(),
            entries: entries
                .iter()
                .map(|(url, revision)| ManifestEntry {
                    url: url.to_string(),
                    revision: revision.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn cache_name_embeds_version() {
        let m = manifest("v3", &[]);
        assert_eq!(m.cache_name(), "OFFLINE_EXPORT::v3");
    }

    #[test]
    fn diff_detects_added_changed_and_removed() {
        let previous = manifest(
            "v1",
            &[("/offline-export/index.html", "a"), ("/offline-export/app.js", "b")],
        );
        let next = manifest(
            "v2",
            &[
                ("/offline-export/index.html", "a"),
                ("/offline-export/app.js", "c"),
                ("/offline-export/new-chunk.js", "d"),
            ],
        );

        let diff = diff_manifests(&previous, &next);
        assert_eq!(diff.added, vec!["/offline-export/new-chunk.js"]);
        assert_eq!(diff.changed, vec!["/offline-export/app.js"]);
        assert!(diff.removed.is_empty());
    }

    #[test]
    fn diff_detects_removed_entries() {
        let previous = manifest("v1", &[("/offline-export/old.js", "a")]);
        let next = manifest("v2", &[]);
        let diff = diff_manifests(&previous, &next);
        assert_eq!(diff.removed, vec!["/offline-export/old.js"]);
    }
}
