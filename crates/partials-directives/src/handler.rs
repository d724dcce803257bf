//! Directive handler trait.

use partials_ast::{Directive, DirectiveKind};

use crate::{DirectiveContext, DirectiveError, DirectiveOutput};

/// Handler bound to a `(directive kind, directive name)` pair.
///
/// Handlers are shared by every document resolved with a
/// [`Registry`](crate::Registry), possibly from several threads at once, so
/// they take `&self` and must be `Send + Sync`.
///
/// Returning an error removes the directive and records a
/// [`Diagnostic`](crate::Diagnostic); it never aborts the document.
///
/// # Example
///
/// ```
/// use partials_ast::{Directive, DirectiveKind};
/// use partials_directives::{DirectiveContext, DirectiveError, DirectiveHandler, DirectiveOutput};
///
/// struct Version;
///
/// impl DirectiveHandler for Version {
///     fn kind(&self) -> DirectiveKind { DirectiveKind::Leaf }
///     fn name(&self) -> &str { "version" }
///
///     fn process(
///         &self,
///         _directive: &Directive,
///         _ctx: &DirectiveContext<'_>,
///     ) -> Result<DirectiveOutput, DirectiveError> {
///         Ok(DirectiveOutput::markdown("`v12.0.0`"))
///     }
/// }
/// ```
pub trait DirectiveHandler: Send + Sync {
    /// Directive flavor this handler is bound to.
    fn kind(&self) -> DirectiveKind;

    /// Directive name (e.g. "include").
    fn name(&self) -> &str;

    /// Process one directive occurrence.
    fn process(
        &self,
        directive: &Directive,
        ctx: &DirectiveContext<'_>,
    ) -> Result<DirectiveOutput, DirectiveError>;
}

/// Handler backed by a closure, for registering small directives inline.
pub struct FnHandler<F> {
    kind: DirectiveKind,
    name: String,
    process: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&Directive, &DirectiveContext<'_>) -> Result<DirectiveOutput, DirectiveError>
        + Send
        + Sync,
{
    /// Create a closure handler.
    pub fn new(kind: DirectiveKind, name: impl Into<String>, process: F) -> Self {
        Self {
            kind,
            name: name.into(),
            process,
        }
    }
}

impl<F> DirectiveHandler for FnHandler<F>
where
    F: Fn(&Directive, &DirectiveContext<'_>) -> Result<DirectiveOutput, DirectiveError>
        + Send
        + Sync,
{
    fn kind(&self) -> DirectiveKind {
        self.kind
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn process(
        &self,
        directive: &Directive,
        ctx: &DirectiveContext<'_>,
    ) -> Result<DirectiveOutput, DirectiveError> {
        (self.process)(directive, ctx)
    }
}
