//! @ai:module:intent Compute or take over the identifier of a binding
//! @ai:module:layer domain
//! @ai:module:public_api IdentityRule, QualifiedPath, identify
//! @ai:module:depends_on block, resolver
//! @ai:module:stateless true

use crate::block::MetaBlock;
use crate::resolver::ResolvedTarget;

/// @ai:intent Rule for deriving identifiers of blocks without an explicit `#id`
///
/// Implementations must be pure: the same file and nesting path always give the same id.
pub trait IdentityRule: Send + Sync {
    /// @ai:intent Derive an identifier from file identity and symbol nesting path
    fn derive(&self, source_file: &str, path: &[String], symbol: &str) -> String;
}

/// @ai:intent Default rule: `<file><sep><enclosing scopes...><sep><symbol>`
/// @ai:example ("state.py", [], "db") -> "state.py.db"
/// @ai:example ("models.py", ["User"], "save") -> "models.py.User.save"
#[derive(Debug, Clone)]
pub struct QualifiedPath {
    separator: String,
}

impl QualifiedPath {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }
}

impl Default for QualifiedPath {
    fn default() -> Self {
        Self::new(".")
    }
}

impl IdentityRule for QualifiedPath {
    fn derive(&self, source_file: &str, path: &[String], symbol: &str) -> String {
        std::iter::once(source_file)
            .chain(path.iter().map(String::as_str))
            .chain(std::iter::once(symbol))
            .collect::<Vec<_>>()
            .join(&self.separator)
    }
}

/// @ai:intent Final identifier of a binding; an explicit id always wins
/// @ai:effects pure
pub fn identify(block: &MetaBlock, resolved: &ResolvedTarget, rule: &dyn IdentityRule) -> String {
    match &block.id {
        Some(explicit) => explicit.clone(),
        None => rule.derive(&block.source_file, &resolved.path, resolved.target.name()),
    }
}
