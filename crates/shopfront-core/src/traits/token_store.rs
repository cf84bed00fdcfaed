//! Token persistence trait.

use crate::{Result, TokenPair};

/// Durable storage for the session's token pair.
///
/// Implementations must never expose half a pair: `save` replaces both
/// tokens at once and `load` returns either a full pair or `None`.
pub trait TokenStore: Send + Sync {
    /// Replace any stored tokens with `tokens`.
    fn save(&self, tokens: &TokenPair) -> Result<()>;

    /// Read the stored tokens without side effects.
    fn load(&self) -> Result<Option<TokenPair>>;

    /// Remove both tokens. Clearing an empty store is a no-op.
    fn clear(&self) -> Result<()>;
}

impl<T: TokenStore + ?Sized> TokenStore for std::sync::Arc<T> {
    fn save(&self, tokens: &TokenPair) -> Result<()> {
        (**self).save(tokens)
    }

    fn load(&self) -> Result<Option<TokenPair>> {
        (**self).load()
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}
