//! Generation naming derived from the build version.

/// Build version stamp. Changing it re-derives both generation names,
/// abandoning every generation written by an earlier build.
pub const CACHE_VERSION: &str = "2026-01-15.1";

/// Name prefix shared by every generation this agent owns. Generations
/// under other prefixes belong to other tenants of the same store and
/// are never touched.
pub const CACHE_PREFIX: &str = "haven";

/// The two generation names a build serves from, plus the staleness
/// test used at activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationNames {
    prefix: String,
    static_name: String,
    runtime_name: String,
}

impl GenerationNames {
    pub fn new(prefix: &str, version: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            static_name: format!("{prefix}-static-{version}"),
            runtime_name: format!("{prefix}-runtime-{version}"),
        }
    }

    /// Names for the compiled-in version tag.
    pub fn current() -> Self {
        Self::new(CACHE_PREFIX, CACHE_VERSION)
    }

    /// Immutable precache generation, filled at install.
    pub fn static_name(&self) -> &str {
        &self.static_name
    }

    /// Runtime generation, learned from traffic.
    pub fn runtime_name(&self) -> &str {
        &self.runtime_name
    }

    /// True for a generation this agent owns but no longer serves from:
    /// it carries our prefix yet is neither current name.
    pub fn is_stale(&self, name: &str) -> bool {
        name.starts_with(&format!("{}-", self.prefix)) && name != self.static_name && name != self.runtime_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_derived_from_version() {
        let names = GenerationNames::new("planner", "2026-01-15");
        assert_eq!(names.static_name(), "planner-static-2026-01-15");
        assert_eq!(names.runtime_name(), "planner-runtime-2026-01-15");
    }

    #[test]
    fn test_current_uses_build_constants() {
        let names = GenerationNames::current();
        assert!(names.static_name().starts_with(CACHE_PREFIX));
        assert!(names.static_name().ends_with(CACHE_VERSION));
    }

    #[test]
    fn test_stale_detection() {
        let names = GenerationNames::new("planner", "v2");
        assert!(names.is_stale("planner-static-v1"));
        assert!(names.is_stale("planner-runtime-v1"));
        assert!(!names.is_stale("planner-static-v2"));
        assert!(!names.is_stale("planner-runtime-v2"));
    }

    #[test]
    fn test_foreign_prefix_never_stale() {
        let names = GenerationNames::new("planner", "v2");
        assert!(!names.is_stale("other-app-static-v1"));
        assert!(!names.is_stale("plannerish-static-v1"));
    }
}
