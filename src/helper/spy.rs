// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Call-recording spies and stubs

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

/// Whether a recorder wraps real behavior or replaces it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpyKind {
    Spy,
    Stub,
}

/// Type-erased view of a spy or stub
pub trait CallRecorder: Send + Sync {
    fn name(&self) -> &str;
    fn kind(&self) -> SpyKind;
    fn call_count(&self) -> usize;
    fn reset(&self);
    fn as_any(&self) -> &dyn Any;
}

struct Recorder<A> {
    name: String,
    kind: SpyKind,
    calls: Arc<Mutex<Vec<A>>>,
}

impl<A: Send + 'static> CallRecorder for Recorder<A> {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SpyKind {
        self.kind
    }

    fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn reset(&self) {
        self.calls.lock().clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Wraps a function, recording each argument before delegating
pub struct Spy<A, R> {
    name: String,
    calls: Arc<Mutex<Vec<A>>>,
    inner: Arc<dyn Fn(A) -> R + Send + Sync>,
}

impl<A: Clone, R> Spy<A, R> {
    pub(crate) fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            calls: Arc::new(Mutex::new(Vec::new())),
            inner: Arc::new(f),
        }
    }

    /// Record `arg` and call through
    pub fn call(&self, arg: A) -> R {
        self.calls.lock().push(arg.clone());
        (self.inner)(arg)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn called(&self) -> bool {
        self.call_count() > 0
    }

    /// Recorded arguments in call order
    pub fn calls(&self) -> Vec<A> {
        self.calls.lock().clone()
    }

    pub fn last_call(&self) -> Option<A> {
        self.calls.lock().last().cloned()
    }

    pub fn called_with(&self, arg: &A) -> bool
    where
        A: PartialEq,
    {
        self.calls.lock().iter().any(|a| a == arg)
    }

    pub fn reset(&self) {
        self.calls.lock().clear();
    }
}

impl<A, R> Clone for Spy<A, R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            calls: self.calls.clone(),
            inner: self.inner.clone(),
        }
    }
}

impl<A, R> fmt::Debug for Spy<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Spy")
            .field("name", &self.name)
            .field("calls", &self.calls.lock().len())
            .finish()
    }
}

enum StubBehavior<A, R> {
    Default,
    Returns(R),
    Fake(Arc<dyn Fn(A) -> R + Send + Sync>),
}

/// Replaces behavior entirely; unconfigured stubs return `R::default()`
pub struct Stub<A, R> {
    name: String,
    calls: Arc<Mutex<Vec<A>>>,
    behavior: Arc<Mutex<StubBehavior<A, R>>>,
}

impl<A: Clone, R: Clone + Default> Stub<A, R> {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            calls: Arc::new(Mutex::new(Vec::new())),
            behavior: Arc::new(Mutex::new(StubBehavior::Default)),
        }
    }

    /// Always return `value`
    pub fn returns(self, value: R) -> Self {
        *self.behavior.lock() = StubBehavior::Returns(value);
        self
    }

    /// Answer with `f` instead
    pub fn calls_fake<F>(self, f: F) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        *self.behavior.lock() = StubBehavior::Fake(Arc::new(f));
        self
    }

    pub fn call(&self, arg: A) -> R {
        self.calls.lock().push(arg.clone());
        let fake = match &*self.behavior.lock() {
            StubBehavior::Default => return R::default(),
            StubBehavior::Returns(value) => return value.clone(),
            StubBehavior::Fake(f) => f.clone(),
        };
        fake(arg)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn called(&self) -> bool {
        self.call_count() > 0
    }

    pub fn calls(&self) -> Vec<A> {
        self.calls.lock().clone()
    }

    pub fn reset(&self) {
        self.calls.lock().clear();
    }
}

impl<A, R> Clone for Stub<A, R> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            calls: self.calls.clone(),
            behavior: self.behavior.clone(),
        }
    }
}

impl<A, R> fmt::Debug for Stub<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stub")
            .field("name", &self.name)
            .field("calls", &self.calls.lock().len())
            .finish()
    }
}

/// Lookup handle for a registered spy or stub
#[derive(Clone)]
pub struct SpyHandle {
    recorder: Arc<dyn CallRecorder>,
}

impl SpyHandle {
    pub fn name(&self) -> &str {
        self.recorder.name()
    }

    pub fn kind(&self) -> SpyKind {
        self.recorder.kind()
    }

    pub fn call_count(&self) -> usize {
        self.recorder.call_count()
    }

    pub fn called(&self) -> bool {
        self.call_count() > 0
    }

    /// Recorded arguments, or `None` if `A` is not the recorded argument type
    pub fn calls<A: Clone + 'static>(&self) -> Option<Vec<A>> {
        self.recorder
            .as_any()
            .downcast_ref::<Recorder<A>>()
            .map(|r| r.calls.lock().clone())
    }

    /// Whether any call received `arg`; false on an argument type mismatch
    pub fn called_with<A: PartialEq + 'static>(&self, arg: &A) -> bool {
        self.recorder
            .as_any()
            .downcast_ref::<Recorder<A>>()
            .map_or(false, |r| r.calls.lock().iter().any(|a| a == arg))
    }

    pub fn reset(&self) {
        self.recorder.reset();
    }
}

impl fmt::Debug for SpyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpyHandle")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .field("calls", &self.call_count())
            .finish()
    }
}

/// Spies and stubs of one test context, by name
#[derive(Default)]
pub struct SpyRegistry {
    recorders: DashMap<String, Arc<dyn CallRecorder>>,
}

impl SpyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register_spy<A, R>(&self, spy: &Spy<A, R>)
    where
        A: Send + 'static,
    {
        self.insert(Recorder {
            name: spy.name.clone(),
            kind: SpyKind::Spy,
            calls: spy.calls.clone(),
        });
    }

    pub(crate) fn register_stub<A, R>(&self, stub: &Stub<A, R>)
    where
        A: Send + 'static,
    {
        self.insert(Recorder {
            name: stub.name.clone(),
            kind: SpyKind::Stub,
            calls: stub.calls.clone(),
        });
    }

    fn insert<A: Send + 'static>(&self, recorder: Recorder<A>) {
        debug!(name = %recorder.name, kind = ?recorder.kind, "registered call recorder");
        // Same name replaces the earlier recorder
        self.recorders
            .insert(recorder.name.clone(), Arc::new(recorder));
    }

    pub fn get(&self, name: &str) -> Option<SpyHandle> {
        self.recorders.get(name).map(|r| SpyHandle {
            recorder: r.value().clone(),
        })
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.recorders.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.recorders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recorders.is_empty()
    }

    /// Reset every recorder and forget them all
    pub fn clear(&self) {
        for entry in self.recorders.iter() {
            entry.value().reset();
        }
        self.recorders.clear();
    }
}

impl fmt::Debug for SpyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpyRegistry")
            .field("names", &self.names())
            .finish()
    }
}
