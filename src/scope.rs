//! Lexical scope chains and namespace reconstruction.
//!
//! A scope chain lists the scopes enclosing an owner declaration, innermost
//! first. Only namespace scopes contribute to the generated namespace; type
//! scopes (enclosing classes) are recorded so the walk can skip past them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "camelCase")]
pub enum Scope {
    /// A namespace declaration. The name may itself be dotted (`App.UI`).
    Namespace(String),
    /// An enclosing type declaration.
    Type(String),
}

impl Scope {
    pub fn namespace_name(&self) -> Option<&str> {
        match self {
            Scope::Namespace(name) => Some(name),
            Scope::Type(_) => None,
        }
    }
}

/// Scopes enclosing a declaration, innermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeChain(pub Vec<Scope>);

impl ScopeChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a chain from outermost to innermost, the order scopes are
    /// written in source.
    pub fn from_outermost(mut scopes: Vec<Scope>) -> Self {
        scopes.reverse();
        Self(scopes)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scope> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Reconstruct the fully qualified namespace of a declaration.
///
/// Walks outward to the nearest namespace scope, then keeps walking through
/// directly enclosing namespace scopes, prefixing each outer name. Returns an
/// empty string when the declaration lives in the global namespace.
pub fn resolve_namespace(chain: &ScopeChain) -> String {
    let mut scopes = chain.iter().skip_while(|scope| scope.namespace_name().is_none());

    let mut namespace = match scopes.next().and_then(Scope::namespace_name) {
        Some(nearest) => nearest.to_string(),
        None => return String::new(),
    };

    for scope in scopes {
        match scope.namespace_name() {
            Some(outer) => namespace = format!("{}.{}", outer, namespace),
            None => break,
        }
    }

    namespace
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ns(name: &str) -> Scope {
        Scope::Namespace(name.to_string())
    }

    fn ty(name: &str) -> Scope {
        Scope::Type(name.to_string())
    }

    #[test]
    fn test_nested_namespaces() {
        let chain = ScopeChain::from_outermost(vec![ns("App"), ns("UI")]);
        assert_eq!(resolve_namespace(&chain), "App.UI");
    }

    #[test]
    fn test_global_namespace() {
        assert_eq!(resolve_namespace(&ScopeChain::new()), "");
        let chain = ScopeChain::from_outermost(vec![ty("Outer")]);
        assert_eq!(resolve_namespace(&chain), "");
    }

    #[test]
    fn test_dotted_namespace_names() {
        let chain = ScopeChain::from_outermost(vec![ns("Company.Product"), ns("Views")]);
        assert_eq!(resolve_namespace(&chain), "Company.Product.Views");
    }

    #[test]
    fn test_enclosing_types_are_skipped() {
        let chain = ScopeChain::from_outermost(vec![ns("App"), ns("UI"), ty("Screens"), ty("Inner")]);
        assert_eq!(resolve_namespace(&chain), "App.UI");
    }

    #[test]
    fn test_walk_stops_at_non_namespace_scope() {
        // A namespace above a type is not contiguous with the nearest namespace.
        let chain = ScopeChain(vec![ns("Inner"), ty("Host"), ns("Outer")]);
        assert_eq!(resolve_namespace(&chain), "Inner");
    }

    #[test]
    fn test_three_levels() {
        let chain = ScopeChain::from_outermost(vec![ns("A"), ns("B"), ns("C")]);
        assert_eq!(resolve_namespace(&chain), "A.B.C");
    }
}
