//! Handler registry keyed by directive kind and name.

use std::collections::HashMap;
use std::fmt;

use partials_ast::{Directive, DirectiveKind};

use crate::handler::FnHandler;
use crate::{DirectiveContext, DirectiveError, DirectiveHandler, DirectiveOutput, IncludeDirective};

/// Table of directive handlers.
///
/// Built once before resolution starts and then only read: a
/// [`Resolver`](crate::Resolver) borrows the registry immutably, so handlers
/// cannot be added while documents are being resolved. A registry can be
/// shared across threads.
///
/// Registering a second handler for the same `(kind, name)` replaces the
/// first and logs a warning.
///
/// # Example
///
/// ```
/// use partials_ast::DirectiveKind;
/// use partials_directives::{DirectiveOutput, Registry};
///
/// let mut registry = Registry::builtin();
/// registry.register_fn(DirectiveKind::Leaf, "year", |_, _| {
///     Ok(DirectiveOutput::markdown("2024"))
/// });
///
/// assert!(registry.contains(DirectiveKind::Leaf, "include"));
/// assert!(registry.contains(DirectiveKind::Leaf, "year"));
/// assert!(registry.lookup(DirectiveKind::Container, "year").is_none());
/// ```
#[derive(Default)]
pub struct Registry {
    handlers: HashMap<DirectiveKind, HashMap<String, Box<dyn DirectiveHandler>>>,
}

impl Registry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in handlers (`::include`).
    #[must_use]
    pub fn builtin() -> Self {
        Self::new().with(IncludeDirective)
    }

    /// Register a handler, builder style.
    #[must_use]
    pub fn with<H: DirectiveHandler + 'static>(mut self, handler: H) -> Self {
        self.register(handler);
        self
    }

    /// Register a handler, replacing any handler with the same kind and name.
    pub fn register<H: DirectiveHandler + 'static>(&mut self, handler: H) {
        let kind = handler.kind();
        let name = handler.name().to_owned();

        let by_name = self.handlers.entry(kind).or_default();
        if by_name.contains_key(&name) {
            tracing::warn!(kind = %kind, name = %name, "Replacing directive handler");
        }
        by_name.insert(name, Box::new(handler));
    }

    /// Register a closure as the handler for `(kind, name)`.
    pub fn register_fn<F>(&mut self, kind: DirectiveKind, name: impl Into<String>, process: F)
    where
        F: Fn(&Directive, &DirectiveContext<'_>) -> Result<DirectiveOutput, DirectiveError>
            + Send
            + Sync
            + 'static,
    {
        self.register(FnHandler::new(kind, name, process));
    }

    /// Find the handler for `(kind, name)`.
    #[must_use]
    pub fn lookup(&self, kind: DirectiveKind, name: &str) -> Option<&dyn DirectiveHandler> {
        self.handlers
            .get(&kind)
            .and_then(|by_name| by_name.get(name))
            .map(AsRef::as_ref)
    }

    /// Check whether a handler is registered for `(kind, name)`.
    #[must_use]
    pub fn contains(&self, kind: DirectiveKind, name: &str) -> bool {
        self.lookup(kind, name).is_some()
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.values().map(HashMap::len).sum()
    }

    /// Check if no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered `(kind, name)` pairs, sorted.
    #[must_use]
    pub fn entries(&self) -> Vec<(DirectiveKind, &str)> {
        let mut entries: Vec<_> = self
            .handlers
            .iter()
            .flat_map(|(kind, by_name)| by_name.keys().map(move |name| (*kind, name.as_str())))
            .collect();
        entries.sort_unstable();
        entries
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("handlers", &self.entries())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use partials_ast::MarkdownParser;

    use super::*;

    struct Fixed(&'static str, &'static str);

    impl DirectiveHandler for Fixed {
        fn kind(&self) -> DirectiveKind {
            DirectiveKind::Leaf
        }

        fn name(&self) -> &str {
            self.0
        }

        fn process(
            &self,
            _directive: &Directive,
            _ctx: &DirectiveContext<'_>,
        ) -> Result<DirectiveOutput, DirectiveError> {
            Ok(DirectiveOutput::markdown(self.1))
        }
    }

    fn run(handler: &dyn DirectiveHandler) -> DirectiveOutput {
        let parser = MarkdownParser::new();
        let ctx = DirectiveContext {
            index: 0,
            parent_type: "root",
            depth: 0,
            children: &[],
            parser: &parser,
            content_root: Path::new("."),
            source_path: None,
            read_file: &|_| Ok(String::new()),
        };
        handler
            .process(&Directive::new(handler.name()), &ctx)
            .unwrap()
    }

    /// Log sink shared between a test and its subscriber.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    static_assertions::assert_impl_all!(Registry: Send, Sync);

    #[test]
    fn test_replacing_handler_logs_warning() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut registry = Registry::new();
            registry.register(Fixed("greeting", "first"));
            registry.register(Fixed("other", "unrelated"));
            registry.register(Fixed("greeting", "second"));
        });

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output.matches("Replacing directive handler").count(), 1);
        assert!(output.contains("WARN"));
        assert!(output.contains("name=greeting"));
    }

    #[test]
    fn test_empty_registry() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        assert!(registry.lookup(DirectiveKind::Leaf, "include").is_none());
    }

    #[test]
    fn test_builtin_has_include() {
        let registry = Registry::builtin();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.entries(), vec![(DirectiveKind::Leaf, "include")]);
    }

    #[test]
    fn test_lookup_is_keyed_by_kind_and_name() {
        let registry = Registry::new().with(Fixed("a", "x"));

        assert!(registry.contains(DirectiveKind::Leaf, "a"));
        assert!(!registry.contains(DirectiveKind::Container, "a"));
        assert!(!registry.contains(DirectiveKind::Leaf, "b"));
    }

    #[test]
    fn test_last_registration_wins() {
        let registry = Registry::new().with(Fixed("a", "first")).with(Fixed("a", "second"));

        assert_eq!(registry.len(), 1);
        let handler = registry.lookup(DirectiveKind::Leaf, "a").unwrap();
        assert_eq!(run(handler), DirectiveOutput::markdown("second"));
    }

    #[test]
    fn test_register_fn() {
        let mut registry = Registry::new();
        registry.register_fn(DirectiveKind::Container, "note", |_, _| Ok(DirectiveOutput::Remove));

        assert!(registry.contains(DirectiveKind::Container, "note"));
        assert_eq!(
            registry.entries(),
            vec![(DirectiveKind::Container, "note")]
        );
    }

    #[test]
    fn test_entries_sorted() {
        let registry = Registry::new()
            .with(Fixed("b", ""))
            .with(Fixed("a", ""))
            .with(IncludeDirective);

        assert_eq!(
            registry.entries(),
            vec![
                (DirectiveKind::Leaf, "a"),
                (DirectiveKind::Leaf, "b"),
                (DirectiveKind::Leaf, "include"),
            ]
        );
    }

    #[test]
    fn test_debug_lists_handlers() {
        let debug = format!("{:?}", Registry::builtin());
        assert!(debug.contains("include"));
    }
}
