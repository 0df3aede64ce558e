//! Role-scoped route configuration

use crate::session::Role;
use serde::{Deserialize, Serialize};

/// A protected section and the roles allowed to view it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    /// Path prefix of the section (e.g. `/admin`)
    pub prefix: String,

    /// Roles allowed to view the section
    pub roles: Vec<Role>,
}

impl RouteRule {
    /// Create a rule for `prefix` allowing `roles`
    pub fn new(prefix: impl Into<String>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            prefix: prefix.into(),
            roles: roles.into_iter().collect(),
        }
    }

    /// Whether `path` falls under this rule's prefix on a segment boundary
    fn matches(&self, path: &str) -> bool {
        let prefix = self.prefix.trim_end_matches('/');
        if prefix.is_empty() {
            return true;
        }
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }
}

/// Lookup table from locations to the roles that may view them
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    /// Build a table from configured rules
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    /// Allowed roles for `location`, or `None` when the location is public.
    ///
    /// Query strings and fragments are ignored; the longest matching prefix wins.
    pub fn allowed_roles(&self, location: &str) -> Option<&[Role]> {
        let path = location
            .split(['?', '#'])
            .next()
            .unwrap_or_default();

        self.rules
            .iter()
            .filter(|rule| rule.matches(path))
            .max_by_key(|rule| rule.prefix.trim_end_matches('/').len())
            .map(|rule| rule.roles.as_slice())
    }

    /// Configured rules
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }
}
