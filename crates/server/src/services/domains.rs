//! Registry of the sectors accounts can be locked to.

use nexus_core::DomainName;

/// The configured sectors, in display order.
#[derive(Debug, Clone)]
pub struct DomainRegistry {
    domains: Vec<DomainName>,
}

impl DomainRegistry {
    #[must_use]
    pub const fn new(domains: Vec<DomainName>) -> Self {
        Self { domains }
    }

    /// Resolve form input to the registered sector, ignoring case.
    #[must_use]
    pub fn resolve(&self, raw: &str) -> Option<&DomainName> {
        self.domains.iter().find(|domain| domain.matches(raw))
    }

    /// Display names, for select boxes.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.domains.iter().map(ToString::to_string).collect()
    }
}
