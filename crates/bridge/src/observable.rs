use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use slab::Slab;

use crate::executor::UiExecutor;

type Listener = Arc<dyn Fn() + Send + Sync>;

/// Invalidation listeners whose notifications are always delivered on the UI executor.
#[derive(Clone)]
pub struct Observers {
    inner: Arc<ObserversInner>,
}

struct ObserversInner {
    listeners: Mutex<Slab<Listener>>,
    executor: UiExecutor,
}

impl ObserversInner {
    fn notify(&self) {
        let listeners: Vec<Listener> =
            self.listeners.lock().iter().map(|(_, listener)| listener.clone()).collect();
        for listener in listeners {
            listener();
        }
    }
}

impl Observers {
    pub fn new(executor: UiExecutor) -> Self {
        Self {
            inner: Arc::new(ObserversInner {
                listeners: Mutex::new(Slab::new()),
                executor,
            }),
        }
    }

    pub fn executor(&self) -> &UiExecutor {
        &self.inner.executor
    }

    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        let key = self.inner.listeners.lock().insert(Arc::new(listener));
        Subscription {
            observers: Arc::downgrade(&self.inner),
            key,
        }
    }

    /// Schedules every current listener on the UI executor. Safe to call from any thread.
    pub fn invalidate(&self) {
        let inner = Arc::downgrade(&self.inner);
        self.inner.executor.execute(move || {
            if let Some(inner) = inner.upgrade() {
                inner.notify();
            }
        });
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }
}

/// Keeps a listener registered. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes the listener immediately"]
pub struct Subscription {
    observers: Weak<ObserversInner>,
    key: usize,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(observers) = self.observers.upgrade() {
            observers.listeners.lock().try_remove(self.key);
        }
    }
}

/// An observable value. Setting a different value invalidates its observers.
pub struct Property<T> {
    inner: Arc<PropertyInner<T>>,
}

struct PropertyInner<T> {
    value: RwLock<T>,
    observers: Observers,
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Property<T> {
    pub fn new(value: T, executor: UiExecutor) -> Self {
        Self {
            inner: Arc::new(PropertyInner {
                value: RwLock::new(value),
                observers: Observers::new(executor),
            }),
        }
    }

    pub fn get(&self) -> T {
        self.inner.value.read().clone()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.read())
    }

    /// Returns true if the value changed.
    pub fn set(&self, value: T) -> bool {
        {
            let mut current = self.inner.value.write();
            if *current == value {
                return false;
            }
            *current = value;
        }
        self.inner.observers.invalidate();
        true
    }

    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        self.inner.observers.subscribe(listener)
    }

    pub fn observers(&self) -> &Observers {
        &self.inner.observers
    }

    pub fn executor(&self) -> &UiExecutor {
        self.inner.observers.executor()
    }

    /// Derives a read-only value that is recomputed whenever this property changes.
    pub fn map<U>(&self, f: impl Fn(&T) -> U + Send + Sync + 'static) -> Binding<U>
    where
        U: Clone + PartialEq + Send + Sync + 'static,
    {
        let derived = Property::new(self.with(&f), self.executor().clone());

        let source = Arc::downgrade(&self.inner);
        let target = Arc::downgrade(&derived.inner);
        let subscription = self.subscribe(move || {
            let (Some(source), Some(target)) = (source.upgrade(), target.upgrade()) else {
                return;
            };
            let value = f(&source.value.read());
            Property { inner: target }.set(value);
        });

        Binding {
            property: derived,
            _subscriptions: vec![subscription],
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Property").field(&*self.inner.value.read()).finish()
    }
}

/// Read-only observable derived from other observables. Dropping it stops the recomputation.
pub struct Binding<T> {
    property: Property<T>,
    _subscriptions: Vec<Subscription>,
}

impl<T: Clone + PartialEq + Send + Sync + 'static> Binding<T> {
    pub fn constant(value: T, executor: UiExecutor) -> Self {
        Self {
            property: Property::new(value, executor),
            _subscriptions: Vec::new(),
        }
    }

    pub fn get(&self) -> T {
        self.property.get()
    }

    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        self.property.subscribe(listener)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn executor() -> UiExecutor {
        UiExecutor::spawn("ui-test").unwrap()
    }

    #[test]
    fn invalidate_runs_listeners_on_ui_thread() {
        let executor = executor();
        let observers = Observers::new(executor.clone());
        let hits = Arc::new(AtomicUsize::new(0));

        let _subscription = observers.subscribe({
            let hits = hits.clone();
            let executor = executor.clone();
            move || {
                assert!(executor.is_ui_thread());
                hits.fetch_add(1, Ordering::SeqCst);
            }
        });

        observers.invalidate();
        observers.invalidate();
        executor.run_blocking(|| ()).unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let executor = executor();
        let observers = Observers::new(executor.clone());
        let hits = Arc::new(AtomicUsize::new(0));

        let subscription = observers.subscribe({
            let hits = hits.clone();
            move || {
                hits.fetch_add(1, Ordering::SeqCst);
            }
        });
        assert_eq!(observers.listener_count(), 1);
        drop(subscription);
        assert_eq!(observers.listener_count(), 0);

        observers.invalidate();
        executor.run_blocking(|| ()).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn setting_equal_value_does_not_notify() {
        let executor = executor();
        let property = Property::new(1, executor.clone());
        let hits = Arc::new(AtomicUsize::new(0));
        let _subscription = property.subscribe({
            let hits = hits.clone();
            move || {
                hits.fetch_add(1, Ordering::SeqCst);
            }
        });

        assert!(!property.set(1));
        assert!(property.set(2));
        executor.run_blocking(|| ()).unwrap();

        assert_eq!(property.get(), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn binding_follows_source() {
        let executor = executor();
        let source = Property::new(Option::<u32>::None, executor.clone());
        let binding = source.map(|value| value.is_some_and(|v| v > 10));
        assert!(!binding.get());

        source.set(Some(42));
        executor.run_blocking(|| ()).unwrap();
        assert!(binding.get());

        drop(binding);
        assert_eq!(source.observers().listener_count(), 0);
    }
}
