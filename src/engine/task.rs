//! Units of work submitted to the engine

use futures::FutureExt;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;

/// Type alias for the pinned, sendable future a task body produces.
type TaskFuture<T> = BoxFuture<'static, anyhow::Result<T>>;

/// Type alias for a deferred task body.
type TaskBody<T> = Box<dyn FnOnce() -> TaskFuture<T> + Send>;

/// One unit of asynchronous work plus the arguments it is invoked with.
///
/// The body is not called until the engine starts the task, so the future
/// it builds is always created inside the scheduler that will drive it.
/// A handle is consumed by the runner executing it and never shared.
pub struct TaskHandle<T> {
    body: TaskBody<T>,
    label: Option<String>,
}

impl<T> TaskHandle<T>
where
    T: Send + 'static,
{
    /// Wrap a zero-argument body.
    pub fn new<F, Fut>(body: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        Self {
            body: Box::new(move || body().boxed()),
            label: None,
        }
    }

    /// Wrap a body together with the arguments it will be called with.
    pub fn with_args<A, F, Fut>(body: F, args: A) -> Self
    where
        A: Send + 'static,
        F: FnOnce(A) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        Self::new(move || body(args))
    }

    /// Bind the same arguments to every body, one handle per body.
    ///
    /// Each body receives its own clone of `args`; use an `Arc` for state
    /// that must be shared rather than copied.
    pub fn bind<A, F, Fut, I>(bodies: I, args: A) -> Vec<Self>
    where
        I: IntoIterator<Item = F>,
        A: Clone + Send + 'static,
        F: FnOnce(A) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        bodies
            .into_iter()
            .map(|body| Self::with_args(body, args.clone()))
            .collect()
    }

    /// Attach a label used in diagnostics and log lines.
    #[must_use]
    pub fn named(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Call the body, producing the future to drive.
    pub(crate) fn start(self) -> TaskFuture<T> {
        (self.body)()
    }
}

impl<T> TaskHandle<T> {
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl<T> fmt::Debug for TaskHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskHandle")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
