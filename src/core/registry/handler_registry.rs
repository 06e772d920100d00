// Name-indexed registry for command and event handlers.
//
// Handlers are never discovered by scanning the filesystem. Each feature
// exposes a static catalog of factories; the registry instantiates them at
// startup and can drop or rebuild a single handler later by its source key.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Anything the registry can index.
pub trait Handler: Send + Sync {
    /// Lookup key. Must not be empty.
    fn name(&self) -> &str;

    /// Registration source. Unique per factory.
    fn source(&self) -> &str;

    fn aliases(&self) -> Vec<String> {
        Vec::new()
    }
}

/// How to build one handler. `source` identifies it for unload/reload.
pub struct HandlerFactory<H: ?Sized> {
    pub source: &'static str,
    pub build: fn() -> Arc<H>,
}

impl<H: ?Sized> HandlerFactory<H> {
    pub const fn new(source: &'static str, build: fn() -> Arc<H>) -> Self {
        Self { source, build }
    }
}

impl<H: ?Sized> Clone for HandlerFactory<H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H: ?Sized> Copy for HandlerFactory<H> {}

pub struct Registry<H: ?Sized + Handler> {
    /// Active handlers by canonical name.
    handlers: HashMap<String, Arc<H>>,
    /// alias -> canonical name
    aliases: HashMap<String, String>,
    /// Every factory ever loaded, active or not, by source.
    factories: HashMap<&'static str, HandlerFactory<H>>,
    /// Name each source produced when it was last built, ordered by source.
    names: BTreeMap<&'static str, String>,
}

impl<H: ?Sized + Handler> Registry<H> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            aliases: HashMap::new(),
            factories: HashMap::new(),
            names: BTreeMap::new(),
        }
    }

    /// Load every factory in `catalog`. Returns how many produced a handler.
    pub fn load_all(&mut self, catalog: impl IntoIterator<Item = HandlerFactory<H>>) -> usize {
        catalog
            .into_iter()
            .filter_map(|factory| self.load(factory))
            .count()
    }

    /// Instantiate and index a handler. A handler with the same name replaces
    /// the earlier one. Returns `None` if the handler has no name.
    pub fn load(&mut self, factory: HandlerFactory<H>) -> Option<Arc<H>> {
        self.factories.insert(factory.source, factory);

        let handler = (factory.build)();
        let name = handler.name().to_string();
        if name.is_empty() {
            tracing::warn!(source = factory.source, "Handler has no name, skipping");
            return None;
        }
        self.names.insert(factory.source, name.clone());

        if let Some(previous) = self.handlers.remove(&name) {
            self.drop_aliases_of(&name);
            tracing::debug!(
                name = %name,
                old_source = previous.source(),
                new_source = factory.source,
                "Replacing handler"
            );
        }

        for alias in handler.aliases() {
            self.aliases.insert(alias, name.clone());
        }
        self.handlers.insert(name, Arc::clone(&handler));

        Some(handler)
    }

    /// Load a previously known factory again, by source.
    pub fn load_source(&mut self, source: &str) -> Option<Arc<H>> {
        let factory = *self.factories.get(source)?;
        self.load(factory)
    }

    /// Load an inactive, previously known handler by its name.
    ///
    /// Names are the ones recorded when each source was last built. If more
    /// than one inactive source used `name`, the lowest source wins.
    pub fn load_by_name(&mut self, name: &str) -> Option<Arc<H>> {
        let source = self
            .names
            .iter()
            .filter(|(source, known)| known.as_str() == name && !self.is_source_active(source))
            .map(|(source, _)| *source)
            .next()?;
        self.load_source(source)
    }

    /// Remove the handler registered from `source`, aliases included.
    /// Returns false when nothing from that source is active.
    pub fn unload(&mut self, source: &str) -> bool {
        let Some(name) = self
            .handlers
            .iter()
            .find(|(_, handler)| handler.source() == source)
            .map(|(name, _)| name.clone())
        else {
            return false;
        };

        self.handlers.remove(&name);
        self.drop_aliases_of(&name);
        true
    }

    /// Drop the active handler from `source` and build a fresh one.
    pub fn reload(&mut self, source: &str) -> bool {
        if !self.factories.contains_key(source) {
            return false;
        }
        self.unload(source);
        self.load_source(source).is_some()
    }

    /// Find a handler by name or alias.
    pub fn get(&self, name: &str) -> Option<Arc<H>> {
        let canonical = self.aliases.get(name).map(String::as_str).unwrap_or(name);
        self.handlers.get(canonical).cloned()
    }

    /// Active handlers, sorted by name.
    pub fn handlers(&self) -> Vec<Arc<H>> {
        let mut handlers: Vec<_> = self.handlers.values().cloned().collect();
        handlers.sort_by(|a, b| a.name().cmp(b.name()));
        handlers
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    fn is_source_active(&self, source: &str) -> bool {
        self.handlers.values().any(|h| h.source() == source)
    }

    fn drop_aliases_of(&mut self, name: &str) {
        self.aliases.retain(|_, target| target != name);
    }
}

impl<H: ?Sized + Handler> Default for Registry<H> {
    fn default() -> Self {
        Self::new()
    }
}
