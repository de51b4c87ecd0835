use crate::logger::StatusLogger;
use crate::message::Arg;
use anyhow::{anyhow, bail, Result};
use futures::future::{self, BoxFuture, FutureExt};
use indexmap::IndexMap;
use serde_json::Value;
use std::future::Future;
use std::io::{Stdout, Write};
use std::sync::Arc;

pub type Handler = Arc<dyn Fn(&[Arg]) -> Result<Value> + Send + Sync>;
pub type AsyncHandler = Arc<dyn Fn(Vec<Arg>) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

/// A named method, answered either right away or by a future.
#[derive(Clone)]
pub enum Method {
    Sync(Handler),
    Async(AsyncHandler),
}

impl Method {
    fn from_async<F, Fut>(handler: F) -> Self
    where
        F: Fn(Vec<Arg>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        Method::Async(Arc::new(move |args| handler(args).boxed()))
    }

    fn invoke(&self, name: &str, args: &[Arg]) -> Result<Value> {
        match self {
            Method::Sync(handler) => handler(args),
            Method::Async(_) => bail!("`{name}` completes asynchronously, use `call_async`"),
        }
    }

    fn invoke_async(&self, args: Vec<Arg>) -> BoxFuture<'static, Result<Value>> {
        match self {
            Method::Sync(handler) => future::ready(handler(&args)).boxed(),
            Method::Async(handler) => handler(args),
        }
    }
}

/// An object whose methods a [`Console`] can call with the status display paused.
pub trait Collaborator: Send + Sync {
    fn responds_to(&self, method: &str) -> bool;

    fn invoke(&self, method: &str, args: &[Arg]) -> Result<Value>;

    /// Used by [`Console::call_async`]. Runs [`Collaborator::invoke`] unless
    /// overridden.
    fn invoke_async(&self, method: &str, args: Vec<Arg>) -> BoxFuture<'static, Result<Value>> {
        future::ready(self.invoke(method, &args)).boxed()
    }
}

/// A collaborator assembled from named closures.
#[derive(Default, Clone)]
pub struct MethodTable {
    methods: IndexMap<String, Method>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&[Arg]) -> Result<Value> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Method::Sync(Arc::new(handler)));
        self
    }

    /// Adds a method that can only be reached through [`Console::call_async`].
    pub fn method_async<F, Fut>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Vec<Arg>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        self.methods.insert(name.into(), Method::from_async(handler));
        self
    }

    fn lookup(&self, method: &str) -> Result<&Method> {
        self.methods
            .get(method)
            .ok_or_else(|| anyhow!("method `{method}` is not defined"))
    }
}

impl Collaborator for MethodTable {
    fn responds_to(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }

    fn invoke(&self, method: &str, args: &[Arg]) -> Result<Value> {
        self.lookup(method)?.invoke(method, args)
    }

    fn invoke_async(&self, method: &str, args: Vec<Arg>) -> BoxFuture<'static, Result<Value>> {
        match self.lookup(method) {
            Ok(handler) => handler.invoke_async(args),
            Err(err) => future::ready(Err(err)).boxed(),
        }
    }
}

/// Operations that [`Console::call`] routes to the logger itself.
pub const CORE_METHODS: [&str; 4] = ["status", "status_end", "status_end_all", "set_color"];

/// Routes method calls by name either to the status logger or, with the display
/// paused, to custom methods and collaborators.
pub struct Console<W: Write + Send + 'static = Stdout> {
    logger: StatusLogger<W>,
    custom: IndexMap<String, Method>,
    collaborators: Vec<Arc<dyn Collaborator>>,
}

impl<W: Write + Send + 'static> Console<W> {
    pub fn new(logger: StatusLogger<W>) -> Self {
        Self {
            logger,
            custom: IndexMap::new(),
            collaborators: Vec::new(),
        }
    }

    pub fn logger(&self) -> &StatusLogger<W> {
        &self.logger
    }

    /// Appends a collaborator. Earlier collaborators win when several respond to
    /// the same method.
    pub fn add(mut self, collaborator: impl Collaborator + 'static) -> Self {
        self.collaborators.push(Arc::new(collaborator));
        self
    }

    /// Registers `name` as a method of the console itself. It takes precedence
    /// over collaborators.
    pub fn custom<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&[Arg]) -> Result<Value> + Send + Sync + 'static,
    {
        self.custom.insert(name.into(), Method::Sync(Arc::new(handler)));
        self
    }

    /// Like [`Console::custom`], for a method that completes later. Only
    /// [`Console::call_async`] can reach it.
    pub fn custom_async<F, Fut>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Vec<Arg>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        self.custom.insert(name.into(), Method::from_async(handler));
        self
    }

    pub fn responds_to(&self, method: &str) -> bool {
        CORE_METHODS.contains(&method)
            || self.custom.contains_key(method)
            || self.collaborators.iter().any(|c| c.responds_to(method))
    }

    fn collaborator(&self, method: &str) -> Option<&Arc<dyn Collaborator>> {
        self.collaborators.iter().find(|c| c.responds_to(method))
    }

    pub fn call<I, A>(&self, method: &str, args: I) -> Result<Value>
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        let args: Vec<Arg> = args.into_iter().map(Into::into).collect();
        if let Some(outcome) = self.call_core(method, &args) {
            return outcome;
        }
        if let Some(handler) = self.custom.get(method) {
            return self.logger.wait_until(|| handler.invoke(method, &args));
        }
        if let Some(collaborator) = self.collaborator(method) {
            return self.logger.wait_until(|| collaborator.invoke(method, &args));
        }
        bail!("nothing responds to `{method}`")
    }

    /// Like [`Console::call`], keeping the display paused until the method's
    /// future settles. Reaches both plain and asynchronous methods.
    pub async fn call_async<I, A>(&self, method: &str, args: I) -> Result<Value>
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        let args: Vec<Arg> = args.into_iter().map(Into::into).collect();
        if let Some(outcome) = self.call_core(method, &args) {
            return outcome;
        }
        if let Some(handler) = self.custom.get(method) {
            return self
                .logger
                .wait_until_async(|| handler.invoke_async(args))
                .await;
        }
        if let Some(collaborator) = self.collaborator(method) {
            return self
                .logger
                .wait_until_async(|| collaborator.invoke_async(method, args))
                .await;
        }
        bail!("nothing responds to `{method}`")
    }

    fn call_core(&self, method: &str, args: &[Arg]) -> Option<Result<Value>> {
        let outcome = match method {
            "status" => leading_text(method, "a status name", args)
                .and_then(|(name, rest)| self.logger.status(name, rest.iter().cloned())),
            "status_end" => leading_text(method, "a status name", args)
                .and_then(|(name, _)| self.logger.status_end(name)),
            "status_end_all" => self.logger.status_end_all(),
            "set_color" => leading_text(method, "a color", args)
                .map(|(color, _)| self.logger.set_color(color)),
            _ => return None,
        };
        Some(outcome.map(|()| Value::Null))
    }
}

fn leading_text<'a>(method: &str, what: &str, args: &'a [Arg]) -> Result<(&'a str, &'a [Arg])> {
    match args.split_first() {
        Some((Arg::Text(text), rest)) => Ok((text, rest)),
        _ => bail!("`{method}` needs {what} as its first argument"),
    }
}
