//! Event registry
//!
//! Maps event names to ordered handler lists and dispatches synchronously.
//!
//! Every operation takes `&self`: state lives behind a `RefCell` and no borrow
//! is held while a handler runs, so handlers may register, deregister or
//! trigger on the same registry.

use crate::args::Args;
use crate::config::{MissingEventPolicy, RegistryConfig, RemovalMode};
use crate::error::{ObservableError, Result};
use crate::handler::{Handler, HandlerResult};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::cell::RefCell;
use std::fmt;

new_key_type! {
    /// One registration; registering a handler twice yields two entries
    struct EntryId;
}

struct Entry {
    handler: Handler,
    once: bool,
}

#[derive(Default)]
struct RegistryState {
    entries: SlotMap<EntryId, Entry>,
    /// Event name -> entries in registration order. Lists are never empty.
    events: FxHashMap<String, Vec<EntryId>>,
}

impl RegistryState {
    fn insert(&mut self, event: String, handler: Handler, once: bool) {
        let id = self.entries.insert(Entry { handler, once });
        self.events.entry(event).or_default().push(id);
    }

    fn snapshot(&self, event: &str) -> SmallVec<[(EntryId, Handler, bool); 4]> {
        self.events
            .get(event)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| {
                        self.entries
                            .get(*id)
                            .map(|e| (*id, e.handler.clone(), e.once))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Remove a single entry; false if it was already gone
    fn detach(&mut self, event: &str, id: EntryId) -> bool {
        let Some(ids) = self.events.get_mut(event) else {
            return false;
        };
        let Some(pos) = ids.iter().position(|e| *e == id) else {
            return false;
        };
        ids.remove(pos);
        if ids.is_empty() {
            self.events.remove(event);
        }
        self.entries.remove(id).is_some()
    }

    fn contains(&self, event: &str, handler: &Handler) -> bool {
        self.events.get(event).is_some_and(|ids| {
            ids.iter()
                .any(|id| self.entries.get(*id).is_some_and(|e| e.handler.same_as(handler)))
        })
    }

    /// Remove every entry of `handler` under `event`, returning how many went
    fn remove_handler(&mut self, event: &str, handler: &Handler) -> usize {
        let Some(ids) = self.events.get_mut(event) else {
            return 0;
        };
        let entries = &mut self.entries;
        let before = ids.len();
        ids.retain(|id| {
            let matched = entries
                .get(*id)
                .is_some_and(|e| e.handler.same_as(handler));
            if matched {
                entries.remove(*id);
            }
            !matched
        });
        let removed = before - ids.len();
        if ids.is_empty() {
            self.events.remove(event);
        }
        removed
    }

    fn remove_event(&mut self, event: &str) -> Option<usize> {
        let ids = self.events.remove(event)?;
        for id in &ids {
            self.entries.remove(*id);
        }
        Some(ids.len())
    }

    fn handlers(&self, ids: &[EntryId]) -> Vec<Handler> {
        ids.iter()
            .filter_map(|id| self.entries.get(*id).map(|e| e.handler.clone()))
            .collect()
    }
}

/// Named event registry with synchronous, ordered dispatch
///
/// ```rust
/// use observable_core::{args, EventRegistry};
///
/// let registry = EventRegistry::new();
/// registry.on("greet", |args| {
///     let name: &&str = args.get(0)?;
///     println!("hi {name}");
///     Ok(())
/// });
///
/// registry.trigger("greet", args!["Ann"]).unwrap();
/// assert!(registry.trigger("farewell", args![]).is_err());
/// ```
#[derive(Default)]
pub struct EventRegistry {
    state: RefCell<RegistryState>,
    config: RegistryConfig,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with explicit behaviour settings
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            state: RefCell::default(),
            config,
        }
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    fn register(&self, event: impl Into<String>, handler: Handler, once: bool) -> Handler {
        let event = event.into();
        tracing::trace!(event = %event, handler = %handler, once, "register handler");
        self.state
            .borrow_mut()
            .insert(event, handler.clone(), once);
        handler
    }

    /// Register `f` for `event`, returning the handler for later removal
    pub fn on<F>(&self, event: impl Into<String>, f: F) -> Handler
    where
        F: Fn(&Args) -> HandlerResult + 'static,
    {
        self.register(event, Handler::new(f), false)
    }

    /// Register an existing handler for `event`
    pub fn on_handler(&self, event: impl Into<String>, handler: &Handler) -> Handler {
        self.register(event, handler.clone(), false)
    }

    /// Register `f` to run on the next trigger of `event` only
    pub fn once<F>(&self, event: impl Into<String>, f: F) -> Handler
    where
        F: Fn(&Args) -> HandlerResult + 'static,
    {
        self.register(event, Handler::new(f), true)
    }

    /// Register an existing handler as one-shot
    pub fn once_handler(&self, event: impl Into<String>, handler: &Handler) -> Handler {
        self.register(event, handler.clone(), true)
    }

    /// Register several existing handlers for `event`, in slice order
    pub fn on_handlers(&self, event: impl Into<String>, handlers: &[Handler]) -> Vec<Handler> {
        self.register_all(event.into(), handlers, false)
    }

    /// Register several existing handlers as one-shot, in slice order
    pub fn once_handlers(&self, event: impl Into<String>, handlers: &[Handler]) -> Vec<Handler> {
        self.register_all(event.into(), handlers, true)
    }

    fn register_all(&self, event: String, handlers: &[Handler], once: bool) -> Vec<Handler> {
        handlers
            .iter()
            .map(|h| self.register(event.as_str(), h.clone(), once))
            .collect()
    }

    /// Curried registration: fix the event now, supply handlers later
    pub fn bind(&self, event: impl Into<String>) -> Binding<'_> {
        Binding {
            registry: self,
            event: event.into(),
        }
    }

    /// Invoke every handler of `event` with `args`
    ///
    /// Handlers run in registration order against a snapshot taken when the
    /// trigger starts. One-shot entries are detached right before they run and
    /// skipped if something already detached them. The first handler error
    /// stops dispatch and is returned unchanged.
    pub fn trigger(&self, event: &str, args: Args) -> Result<()> {
        self.trigger_with(event, &args)
    }

    /// [`trigger`](Self::trigger) with borrowed arguments
    pub fn trigger_with(&self, event: &str, args: &Args) -> Result<()> {
        let snapshot = self.state.borrow().snapshot(event);
        if snapshot.is_empty() {
            return Err(ObservableError::NoHandlerFound {
                event: event.to_string(),
            });
        }

        tracing::debug!(event, handlers = snapshot.len(), "trigger");

        for (id, handler, once) in snapshot {
            if once && !self.state.borrow_mut().detach(event, id) {
                continue;
            }
            if let Err(err) = handler.call(args) {
                tracing::warn!(event, handler = %handler, error = %err, "handler failed");
                return Err(ObservableError::Handler(err));
            }
        }
        Ok(())
    }

    /// Remove every event and handler
    pub fn clear(&self) {
        let mut state = self.state.borrow_mut();
        tracing::trace!(events = state.events.len(), "clear registry");
        state.events.clear();
        state.entries.clear();
    }

    /// Remove `event` and all of its handlers
    ///
    /// An unknown event fails with `NoHandlerFound` unless the registry is
    /// configured with [`MissingEventPolicy::Ignore`].
    pub fn off(&self, event: &str) -> Result<()> {
        let removed = self.state.borrow_mut().remove_event(event);
        match (removed, self.config.missing_event) {
            (Some(count), _) => {
                tracing::trace!(event, handlers = count, "remove event");
                Ok(())
            }
            (None, MissingEventPolicy::Ignore) => Ok(()),
            (None, MissingEventPolicy::Error) => Err(ObservableError::NoHandlerFound {
                event: event.to_string(),
            }),
        }
    }

    /// Remove every registration of `handler` from `event`
    pub fn off_handler(&self, event: &str, handler: &Handler) -> Result<()> {
        let removed = self.state.borrow_mut().remove_handler(event, handler);
        if removed == 0 {
            return Err(ObservableError::HandlerNotFound {
                event: event.to_string(),
                handler: handler.to_string(),
            });
        }
        tracing::trace!(event, handler = %handler, removed, "remove handler");
        Ok(())
    }

    /// Remove several handlers from `event`, in order
    ///
    /// With [`RemovalMode::FirstErrorStops`] removal is best-effort: handlers
    /// listed before the first unregistered one stay removed. With
    /// [`RemovalMode::Transactional`] nothing is removed unless all are present.
    pub fn off_handlers(&self, event: &str, handlers: &[Handler]) -> Result<()> {
        if self.config.removal == RemovalMode::Transactional {
            let state = self.state.borrow();
            if let Some(missing) = handlers.iter().find(|h| !state.contains(event, h)) {
                return Err(ObservableError::HandlerNotFound {
                    event: event.to_string(),
                    handler: missing.to_string(),
                });
            }
        }
        for handler in handlers {
            match self.off_handler(event, handler) {
                // Duplicates in the list were already removed by an earlier pass.
                Err(_) if self.config.removal == RemovalMode::Transactional => {}
                other => other?,
            }
        }
        Ok(())
    }

    /// Copy of every event with at least one handler
    pub fn get_all_handlers(&self) -> FxHashMap<String, Vec<Handler>> {
        let state = self.state.borrow();
        state
            .events
            .iter()
            .map(|(event, ids)| (event.clone(), state.handlers(ids)))
            .collect()
    }

    /// Handlers of `event` in registration order; empty if unknown
    pub fn get_handlers(&self, event: &str) -> Vec<Handler> {
        let state = self.state.borrow();
        state
            .events
            .get(event)
            .map(|ids| state.handlers(ids))
            .unwrap_or_default()
    }

    /// True if `event` has at least one handler
    pub fn is_registered(&self, event: &str) -> bool {
        self.state.borrow().events.contains_key(event)
    }

    /// True if `handler` is registered for `event`
    pub fn is_handler_registered(&self, event: &str, handler: &Handler) -> bool {
        self.state.borrow().contains(event, handler)
    }

    /// Number of registrations under `event`
    pub fn handler_count(&self, event: &str) -> usize {
        self.state.borrow().events.get(event).map_or(0, Vec::len)
    }

    /// Names of all events with handlers, sorted
    pub fn events(&self) -> Vec<String> {
        let mut events: Vec<String> = self.state.borrow().events.keys().cloned().collect();
        events.sort_unstable();
        events
    }
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        let mut map = f.debug_map();
        for (event, ids) in &state.events {
            map.entry(event, &ids.len());
        }
        map.finish()
    }
}

/// An event name bound to a registry, returned by [`EventRegistry::bind`]
///
/// ```rust
/// use observable_core::EventRegistry;
///
/// let registry = EventRegistry::new();
/// let saved = registry.bind("saved");
/// let audit = saved.on(|_| Ok(()));
/// saved.once(|_| Ok(()));
///
/// assert_eq!(registry.handler_count("saved"), 2);
/// assert!(registry.is_handler_registered("saved", &audit));
/// ```
#[derive(Clone)]
pub struct Binding<'r> {
    registry: &'r EventRegistry,
    event: String,
}

impl<'r> Binding<'r> {
    pub fn event(&self) -> &str {
        &self.event
    }

    pub fn on<F>(&self, f: F) -> Handler
    where
        F: Fn(&Args) -> HandlerResult + 'static,
    {
        self.registry.on(self.event.clone(), f)
    }

    pub fn on_handler(&self, handler: &Handler) -> Handler {
        self.registry.on_handler(self.event.clone(), handler)
    }

    pub fn once<F>(&self, f: F) -> Handler
    where
        F: Fn(&Args) -> HandlerResult + 'static,
    {
        self.registry.once(self.event.clone(), f)
    }

    pub fn once_handler(&self, handler: &Handler) -> Handler {
        self.registry.once_handler(self.event.clone(), handler)
    }

    pub fn on_handlers(&self, handlers: &[Handler]) -> Vec<Handler> {
        self.registry.on_handlers(self.event.clone(), handlers)
    }

    pub fn once_handlers(&self, handlers: &[Handler]) -> Vec<Handler> {
        self.registry.once_handlers(self.event.clone(), handlers)
    }
}
