//! Global string interner.
//!
//! Shader define names and values are interned once and compared as integer
//! [`Symbol`]s afterwards.

use std::sync::LazyLock;

use lasso::{Spur, ThreadedRodeo};

static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::new);

/// Compact integer identifier of an interned string.
pub type Symbol = Spur;

/// Interns `s`, returning the existing symbol when already present.
#[inline]
pub fn intern(s: &str) -> Symbol {
    INTERNER.get_or_intern(s)
}

/// Looks up `s` without interning it.
#[inline]
pub fn get(s: &str) -> Option<Symbol> {
    INTERNER.get(s)
}

#[inline]
pub fn resolve(sym: Symbol) -> &'static str {
    INTERNER.resolve(&sym)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_is_stable() {
        let a = intern("USE_POINTS");
        let b = intern("USE_POINTS");
        assert_eq!(a, b);
        assert_eq!(resolve(a), "USE_POINTS");
        assert!(get("NEVER_INTERNED_DEFINE").is_none());
    }
}
