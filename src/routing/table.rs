//! Static path-prefix routing table.

use crate::config::ServiceConfig;

/// One inbound prefix mapped to a logical service.
#[derive(Debug, Clone)]
pub struct RouteRule {
    /// Inbound path prefix (e.g. "/api/orders").
    pub prefix: String,

    /// Logical service the prefix routes to.
    pub service: String,

    /// Prefix substituted on the upstream path. The gateway forwards paths
    /// unchanged, so this equals `prefix` unless configured otherwise.
    pub upstream_prefix: String,
}

impl RouteRule {
    /// Matches at segment boundaries: "/api/users" matches "/api/users"
    /// and "/api/users/42", never "/api/users42".
    fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Rewrite an inbound path for the upstream call.
    pub fn rewrite(&self, path: &str) -> String {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => format!("{}{}", self.upstream_prefix, rest),
            None => path.to_string(),
        }
    }
}

/// Immutable prefix → service mapping, decided at startup.
#[derive(Debug, Default)]
pub struct RouteTable {
    /// Sorted longest-prefix-first so the most specific rule wins.
    rules: Vec<RouteRule>,
}

impl RouteTable {
    pub fn from_services(services: &[ServiceConfig]) -> Self {
        let mut rules: Vec<RouteRule> = services
            .iter()
            .map(|service| RouteRule {
                prefix: service.route_prefix.clone(),
                service: service.name.clone(),
                upstream_prefix: service.route_prefix.clone(),
            })
            .collect();
        rules.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));

        Self { rules }
    }

    /// Resolve a request path to its route rule, if any prefix matches.
    pub fn resolve(&self, path: &str) -> Option<&RouteRule> {
        self.rules.iter().find(|rule| rule.matches(path))
    }

    /// The configured inbound prefix for a service, if routed.
    pub fn prefix_for(&self, service: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.service == service)
            .map(|rule| rule.prefix.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        RouteTable::from_services(&[
            ServiceConfig {
                name: "user".to_string(),
                url: "http://localhost:8001".to_string(),
                route_prefix: "/api/users".to_string(),
            },
            ServiceConfig {
                name: "order".to_string(),
                url: "http://localhost:8003".to_string(),
                route_prefix: "/api/orders".to_string(),
            },
        ])
    }

    #[test]
    fn resolves_prefix_matches() {
        let table = table();

        assert_eq!(table.resolve("/api/users").unwrap().service, "user");
        assert_eq!(table.resolve("/api/users/42").unwrap().service, "user");
        assert_eq!(table.resolve("/api/orders/7/items").unwrap().service, "order");
    }

    #[test]
    fn rejects_non_segment_boundaries_and_misses() {
        let table = table();

        assert!(table.resolve("/api/users42").is_none());
        assert!(table.resolve("/api/products").is_none());
        assert!(table.resolve("/").is_none());
    }

    #[test]
    fn longest_prefix_wins() {
        let table = RouteTable::from_services(&[
            ServiceConfig {
                name: "user".to_string(),
                url: "http://localhost:8001".to_string(),
                route_prefix: "/api".to_string(),
            },
            ServiceConfig {
                name: "order".to_string(),
                url: "http://localhost:8003".to_string(),
                route_prefix: "/api/orders".to_string(),
            },
        ]);

        assert_eq!(table.resolve("/api/orders/1").unwrap().service, "order");
        assert_eq!(table.resolve("/api/other").unwrap().service, "user");
    }

    #[test]
    fn rewrite_is_identity_by_default() {
        let table = table();
        let rule = table.resolve("/api/users/42").unwrap();
        assert_eq!(rule.rewrite("/api/users/42"), "/api/users/42");
    }

    #[test]
    fn rewrite_substitutes_a_custom_upstream_prefix() {
        let rule = RouteRule {
            prefix: "/api/orders".to_string(),
            service: "order".to_string(),
            upstream_prefix: "/v2/orders".to_string(),
        };
        assert_eq!(rule.rewrite("/api/orders/7/items"), "/v2/orders/7/items");
    }
}
