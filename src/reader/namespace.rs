//! Namespace Resolution
//!
//! Stack-based prefix resolver. Bindings are tagged with the element depth
//! that declared them and are dropped when that element closes.

/// Well-known namespace URIs
pub mod ns {
    pub const XML: &str = "http://www.w3.org/XML/1998/namespace";
    pub const XMLNS: &str = "http://www.w3.org/2000/xmlns/";
}

#[derive(Debug, Clone)]
struct NsBinding {
    prefix: String,
    uri: String,
    depth: usize,
}

/// Stack-based namespace resolver
#[derive(Debug)]
pub struct NamespaceResolver {
    bindings: Vec<NsBinding>,
    depth: usize,
}

impl Default for NamespaceResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceResolver {
    /// Resolver with the `xml` and `xmlns` prefixes pre-bound
    pub fn new() -> Self {
        let mut bindings = Vec::with_capacity(16);
        bindings.push(NsBinding {
            prefix: "xml".to_string(),
            uri: ns::XML.to_string(),
            depth: 0,
        });
        bindings.push(NsBinding {
            prefix: "xmlns".to_string(),
            uri: ns::XMLNS.to_string(),
            depth: 0,
        });
        NamespaceResolver { bindings, depth: 0 }
    }

    /// Enter a new element scope
    pub fn push_scope(&mut self) {
        self.depth += 1;
    }

    /// Leave an element scope, removing any bindings declared in it
    pub fn pop_scope(&mut self) {
        while self.bindings.last().map_or(false, |b| b.depth >= self.depth && b.depth > 0) {
            self.bindings.pop();
        }
        self.depth = self.depth.saturating_sub(1);
    }

    /// Declare a binding in the current scope; `""` is the default namespace.
    /// Attempts to rebind `xml` or `xmlns` are ignored.
    pub fn declare(&mut self, prefix: &str, uri: &str) {
        if prefix == "xml" || prefix == "xmlns" {
            return;
        }
        self.bindings.push(NsBinding {
            prefix: prefix.to_string(),
            uri: uri.to_string(),
            depth: self.depth,
        });
    }

    /// Resolve a prefix to its innermost URI; binding a prefix to `""`
    /// undeclares it
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .find(|b| b.prefix == prefix)
            .map(|b| b.uri.as_str())
            .filter(|uri| !uri.is_empty())
    }

    /// Resolve the default namespace; `xmlns=""` undeclares it
    pub fn resolve_default(&self) -> Option<&str> {
        self.resolve("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predeclared_prefixes() {
        let resolver = NamespaceResolver::new();
        assert_eq!(resolver.resolve("xml"), Some(ns::XML));
        assert_eq!(resolver.resolve("xmlns"), Some(ns::XMLNS));
        assert_eq!(resolver.resolve_default(), None);
    }

    #[test]
    fn test_scope_pop() {
        let mut resolver = NamespaceResolver::new();
        resolver.push_scope();
        resolver.declare("foo", "http://example.com/foo");
        assert_eq!(resolver.resolve("foo"), Some("http://example.com/foo"));

        resolver.pop_scope();
        assert_eq!(resolver.resolve("foo"), None);
        assert_eq!(resolver.resolve("xml"), Some(ns::XML));
    }

    #[test]
    fn test_shadow_binding() {
        let mut resolver = NamespaceResolver::new();
        resolver.push_scope();
        resolver.declare("ns", "urn:one");
        resolver.push_scope();
        resolver.declare("ns", "urn:two");
        assert_eq!(resolver.resolve("ns"), Some("urn:two"));

        resolver.pop_scope();
        assert_eq!(resolver.resolve("ns"), Some("urn:one"));
    }

    #[test]
    fn test_default_undeclared() {
        let mut resolver = NamespaceResolver::new();
        resolver.push_scope();
        resolver.declare("", "urn:d");
        resolver.push_scope();
        resolver.declare("", "");
        assert_eq!(resolver.resolve_default(), None);
        resolver.pop_scope();
        assert_eq!(resolver.resolve_default(), Some("urn:d"));
    }

    #[test]
    fn test_prefix_undeclared() {
        let mut resolver = NamespaceResolver::new();
        resolver.push_scope();
        resolver.declare("p", "urn:p");
        resolver.push_scope();
        resolver.declare("p", "");
        assert_eq!(resolver.resolve("p"), None);
        resolver.pop_scope();
        assert_eq!(resolver.resolve("p"), Some("urn:p"));
    }

    #[test]
    fn test_reserved_prefixes_not_rebound() {
        let mut resolver = NamespaceResolver::new();
        resolver.push_scope();
        resolver.declare("xml", "urn:bogus");
        assert_eq!(resolver.resolve("xml"), Some(ns::XML));
    }
}
