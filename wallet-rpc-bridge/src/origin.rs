/// Exact-match origin allowlist shared by both directions of the bridge
/// (spec §4.J "parent validates the wallet origin before accepting
/// messages; wallet validates the embedder via allowlist"). Kept as plain
/// string equality, not a wildcard/suffix match: origin comparison that
/// tolerates substring or prefix matches is a classic postMessage-origin
/// bug (e.g. `evil-example.com` satisfying a `.endsWith("example.com")`
/// check).
#[derive(Debug, Clone)]
pub struct OriginAllowlist {
    allowed: Vec<String>,
}

impl OriginAllowlist {
    pub fn new(allowed: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { allowed: allowed.into_iter().map(Into::into).collect() }
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        self.allowed.iter().any(|a| a == origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_is_allowed() {
        let allowlist = OriginAllowlist::new(["https://wallet.example.com"]);
        assert!(allowlist.is_allowed("https://wallet.example.com"));
    }

    #[test]
    fn suffix_match_is_rejected() {
        let allowlist = OriginAllowlist::new(["https://example.com"]);
        assert!(!allowlist.is_allowed("https://evil-example.com"));
    }

    #[test]
    fn prefix_match_is_rejected() {
        let allowlist = OriginAllowlist::new(["https://example.com"]);
        assert!(!allowlist.is_allowed("https://example.com.evil.net"));
    }
}
