//! Service registry.
//!
//! The registry is built once per invocation from the ordered service
//! declaration and handed explicitly to every operation. Declaration order is
//! execution order.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{FleetError, Result};

/// Branch used when a source does not select one.
pub const DEFAULT_BRANCH: &str = "main";

/// Separator between a source location and its branch.
const BRANCH_SEPARATOR: char = '#';

/// A single service of the fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDescriptor {
    /// Unique name, also used as directory and process name.
    pub name: String,
    /// Repository location.
    pub source_location: String,
    /// Branch to clone.
    pub branch: String,
}

impl ServiceDescriptor {
    /// Parses a `location[#branch]` source string for the named service.
    ///
    /// An empty branch after the separator falls back to [`DEFAULT_BRANCH`].
    pub fn parse(name: &str, source: &str) -> Result<Self> {
        let name = name.trim();
        validate_name(name)?;

        let source = source.trim();
        let (location, branch) = match source.split_once(BRANCH_SEPARATOR) {
            Some((location, branch)) => (location.trim(), branch.trim()),
            None => (source, ""),
        };

        if location.is_empty() {
            return Err(FleetError::invalid_descriptor(
                name,
                format!("source location is empty in '{}'", source),
            ));
        }
        if branch.contains(BRANCH_SEPARATOR) {
            return Err(FleetError::invalid_descriptor(
                name,
                format!("more than one branch selector in '{}'", source),
            ));
        }

        let branch = if branch.is_empty() {
            DEFAULT_BRANCH
        } else {
            branch
        };

        Ok(Self {
            name: name.to_string(),
            source_location: location.to_string(),
            branch: branch.to_string(),
        })
    }
}

/// Names become directory names, so they must be a single path component.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(FleetError::invalid_descriptor(name, "service name is empty"));
    }
    if name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(FleetError::invalid_descriptor(
            name,
            "service name must be a plain directory name",
        ));
    }
    Ok(())
}

/// Ordered mapping from service name to descriptor.
#[derive(Debug, Clone, Default)]
pub struct ServiceRegistry {
    services: IndexMap<String, ServiceDescriptor>,
}

impl ServiceRegistry {
    /// Parses an ordered `name -> source` declaration.
    pub fn load<'a, I>(declaration: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a String, &'a String)>,
    {
        let mut services = IndexMap::new();
        for (name, source) in declaration {
            let descriptor = ServiceDescriptor::parse(name, source)?;
            if services.contains_key(&descriptor.name) {
                return Err(FleetError::invalid_descriptor(
                    &descriptor.name,
                    "service is declared more than once",
                ));
            }
            services.insert(descriptor.name.clone(), descriptor);
        }
        Ok(Self { services })
    }

    /// Returns descriptors in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = &ServiceDescriptor> {
        self.services.values()
    }

    /// Returns service names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// Returns the number of services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns true when no service is declared.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declaration(pairs: &[(&str, &str)]) -> IndexMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_without_branch() {
        let d = ServiceDescriptor::parse("db", "git://x/db").unwrap();
        assert_eq!(d.name, "db");
        assert_eq!(d.source_location, "git://x/db");
        assert_eq!(d.branch, "main");
    }

    #[test]
    fn test_parse_with_branch() {
        let d = ServiceDescriptor::parse("web", "git://x/web#release").unwrap();
        assert_eq!(d.source_location, "git://x/web");
        assert_eq!(d.branch, "release");
    }

    #[test]
    fn test_parse_empty_branch_falls_back() {
        let d = ServiceDescriptor::parse("web", "git://x/web#").unwrap();
        assert_eq!(d.source_location, "git://x/web");
        assert_eq!(d.branch, DEFAULT_BRANCH);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let d = ServiceDescriptor::parse(" web ", "  git://x/web # dev ").unwrap();
        assert_eq!(d.name, "web");
        assert_eq!(d.source_location, "git://x/web");
        assert_eq!(d.branch, "dev");
    }

    #[test]
    fn test_parse_empty_location() {
        let err = ServiceDescriptor::parse("web", "#main").unwrap_err();
        assert!(matches!(err, FleetError::InvalidDescriptor { ref service, .. } if service == "web"));
    }

    #[test]
    fn test_parse_double_separator() {
        let err = ServiceDescriptor::parse("web", "git://x/web#a#b").unwrap_err();
        assert!(matches!(err, FleetError::InvalidDescriptor { .. }));
    }

    #[test]
    fn test_parse_rejects_path_names() {
        assert!(ServiceDescriptor::parse("../web", "git://x/web").is_err());
        assert!(ServiceDescriptor::parse("a/b", "git://x/web").is_err());
        assert!(ServiceDescriptor::parse("..", "git://x/web").is_err());
        assert!(ServiceDescriptor::parse("", "git://x/web").is_err());
    }

    #[test]
    fn test_registry_preserves_order() {
        let decl = declaration(&[
            ("web", "git://x/web"),
            ("api", "git://x/api"),
            ("db", "git://x/db"),
        ]);
        let registry = ServiceRegistry::load(&decl).unwrap();

        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["web", "api", "db"]);
        assert_eq!(registry.len(), 3);

        // Restartable
        let first: Vec<_> = registry.entries().map(|d| d.name.clone()).collect();
        let second: Vec<_> = registry.entries().map(|d| d.name.clone()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_registry_empty() {
        let registry = ServiceRegistry::load(&IndexMap::new()).unwrap();
        assert!(registry.is_empty());
        assert_eq!(registry.entries().count(), 0);
    }

    #[test]
    fn test_registry_duplicate_after_trim() {
        let decl = declaration(&[("web", "git://x/web"), (" web", "git://x/web2")]);
        let err = ServiceRegistry::load(&decl).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_registry_branches() {
        let decl = declaration(&[("db", "git://x/db"), ("web", "git://x/web#release")]);
        let registry = ServiceRegistry::load(&decl).unwrap();

        let branches: Vec<(&str, &str)> = registry
            .entries()
            .map(|d| (d.name.as_str(), d.branch.as_str()))
            .collect();
        assert_eq!(branches, vec![("db", "main"), ("web", "release")]);
    }
}
