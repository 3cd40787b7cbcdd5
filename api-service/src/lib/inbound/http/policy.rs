/// Access level a path requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone may call, no token needed
    Open,
    /// Caller must present a valid bearer token
    RequiresAuth,
}

/// Static table mapping path prefixes to access levels.
///
/// Built once at startup and never mutated. Lookup is longest-prefix on path
/// segment boundaries; paths matching no rule require authentication, so an
/// unlisted route can only ever be over-protected, not exposed.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    // Sorted by prefix length, longest first
    rules: Vec<(String, Access)>,
}

impl RoutePolicy {
    pub fn new<P, I>(rules: I) -> Self
    where
        P: Into<String>,
        I: IntoIterator<Item = (P, Access)>,
    {
        let mut rules: Vec<(String, Access)> = rules
            .into_iter()
            .map(|(prefix, access)| (prefix.into(), access))
            .collect();
        rules.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Self { rules }
    }

    /// Access level for a request path. Unmatched paths require auth.
    pub fn access(&self, path: &str) -> Access {
        self.rules
            .iter()
            .find(|(prefix, _)| Self::prefix_matches(prefix, path))
            .map(|(_, access)| *access)
            .unwrap_or(Access::RequiresAuth)
    }

    fn prefix_matches(prefix: &str, path: &str) -> bool {
        if prefix == "/" {
            return true;
        }
        match path.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

impl Default for RoutePolicy {
    /// The production table: the two credential entry points are open,
    /// everything else is guarded.
    fn default() -> Self {
        Self::new([("/auth", Access::Open)])
    }
}
