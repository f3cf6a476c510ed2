//! Observable attributes
//!
//! An [`ObservableAttribute`] wraps the getter, setter and deleter of one
//! attribute of `O` and triggers paired events around each access:
//!
//! | access | before                    | after                        |
//! |--------|---------------------------|------------------------------|
//! | get    | `before_get_<name>()`     | `after_get_<name>(value)`    |
//! | set    | `before_set_<name>(value)`| `after_set_<name>(value)`    |
//! | delete | `before_del_<name>()`     | `after_del_<name>()`         |
//!
//! Events nobody listens to are skipped silently; a failing handler aborts
//! the access. Access without the matching accessor fails with
//! [`PropertyError::Unsupported`] and triggers nothing.

use crate::error::{PropertyError, Result};
use crate::registry_ref::{RegistryHost, RegistryRef};
use observable_core::{Args, EventRegistry};
use std::any::type_name;
use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

type Getter<O, T> = Rc<dyn Fn(&O) -> T>;
type Setter<O, T> = Rc<dyn Fn(&mut O, T)>;
type Deleter<O> = Rc<dyn Fn(&mut O)>;

/// Kind of attribute access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    Get,
    Set,
    Delete,
}

impl Access {
    /// Token used in event names
    pub fn as_str(self) -> &'static str {
        match self {
            Access::Get => "get",
            Access::Set => "set",
            Access::Delete => "del",
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an event fires before or after the underlying accessor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Before,
    After,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Phase::Before => "before",
            Phase::After => "after",
        }
    }
}

/// Build the event name for one phase of one access
pub fn event_name(phase: Phase, access: Access, name: &str) -> String {
    format!("{}_{}_{}", phase.as_str(), access.as_str(), name)
}

/// The six event names of an attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventNames {
    pub before_get: String,
    pub after_get: String,
    pub before_set: String,
    pub after_set: String,
    pub before_del: String,
    pub after_del: String,
}

impl EventNames {
    pub fn new(name: &str) -> Self {
        Self {
            before_get: event_name(Phase::Before, Access::Get, name),
            after_get: event_name(Phase::After, Access::Get, name),
            before_set: event_name(Phase::Before, Access::Set, name),
            after_set: event_name(Phase::After, Access::Set, name),
            before_del: event_name(Phase::Before, Access::Delete, name),
            after_del: event_name(Phase::After, Access::Delete, name),
        }
    }

    pub fn get(&self, phase: Phase, access: Access) -> &str {
        match (phase, access) {
            (Phase::Before, Access::Get) => &self.before_get,
            (Phase::After, Access::Get) => &self.after_get,
            (Phase::Before, Access::Set) => &self.before_set,
            (Phase::After, Access::Set) => &self.after_set,
            (Phase::Before, Access::Delete) => &self.before_del,
            (Phase::After, Access::Delete) => &self.after_del,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        [
            &self.before_get,
            &self.after_get,
            &self.before_set,
            &self.after_set,
            &self.before_del,
            &self.after_del,
        ]
        .into_iter()
        .map(String::as_str)
    }
}

/// Name of a fn item, taken from the last segment of its type path.
/// Closures and fn pointers have no usable name.
pub(crate) fn item_name<F>() -> Option<&'static str> {
    let full = type_name::<F>();
    if full.contains("{{closure}}") || full.contains("fn(") {
        return None;
    }
    let segment = last_path_segment(full);
    segment
        .split('<')
        .next()
        .filter(|s| !s.is_empty() && s.chars().all(|c| c.is_alphanumeric() || c == '_'))
}

/// Segment after the last `::` that is not nested inside generic arguments,
/// so `a::Wrapper<b::C>::value` yields `value`
fn last_path_segment(path: &str) -> &str {
    let mut depth = 0usize;
    let mut start = 0;
    let mut prev = None;
    for (i, c) in path.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            ':' if depth == 0 && prev == Some(':') => start = i + 1,
            _ => {}
        }
        prev = Some(c);
    }
    &path[start..]
}

/// A get/set/delete descriptor that triggers events on a registry
pub struct ObservableAttribute<O, T> {
    name: Cow<'static, str>,
    events: EventNames,
    registry: RegistryRef,
    getter: Option<Getter<O, T>>,
    setter: Option<Setter<O, T>>,
    deleter: Option<Deleter<O>>,
}

impl<O, T> Clone for ObservableAttribute<O, T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            events: self.events.clone(),
            registry: self.registry.clone(),
            getter: self.getter.clone(),
            setter: self.setter.clone(),
            deleter: self.deleter.clone(),
        }
    }
}

impl<O, T> fmt::Debug for ObservableAttribute<O, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableAttribute")
            .field("name", &self.name)
            .field("registry", &self.registry)
            .field("get", &self.getter.is_some())
            .field("set", &self.setter.is_some())
            .field("delete", &self.deleter.is_some())
            .finish()
    }
}

impl<O, T> ObservableAttribute<O, T>
where
    O: RegistryHost,
    T: Clone + 'static,
{
    pub fn builder() -> AttributeBuilder<O, T> {
        AttributeBuilder::new()
    }

    /// Event name stem
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn events(&self) -> &EventNames {
        &self.events
    }

    pub fn registry_ref(&self) -> &RegistryRef {
        &self.registry
    }

    pub fn supports(&self, access: Access) -> bool {
        match access {
            Access::Get => self.getter.is_some(),
            Access::Set => self.setter.is_some(),
            Access::Delete => self.deleter.is_some(),
        }
    }

    /// Read the attribute, triggering `before_get_<name>` and `after_get_<name>`
    pub fn get(&self, obj: &O) -> Result<T> {
        let getter = self.getter.as_ref().ok_or_else(|| self.unsupported(Access::Get))?;
        self.fire(obj, Phase::Before, Access::Get, Args::new())?;
        let value = getter(obj);
        self.fire(obj, Phase::After, Access::Get, Args::one(value.clone()))?;
        Ok(value)
    }

    /// Write the attribute, triggering `before_set_<name>` and `after_set_<name>`
    pub fn set(&self, obj: &mut O, value: T) -> Result<()> {
        let setter = self.setter.as_ref().ok_or_else(|| self.unsupported(Access::Set))?;
        self.fire(obj, Phase::Before, Access::Set, Args::one(value.clone()))?;
        setter(&mut *obj, value.clone());
        self.fire(obj, Phase::After, Access::Set, Args::one(value))
    }

    /// Delete the attribute, triggering `before_del_<name>` and `after_del_<name>`
    pub fn delete(&self, obj: &mut O) -> Result<()> {
        let deleter = self
            .deleter
            .as_ref()
            .ok_or_else(|| self.unsupported(Access::Delete))?;
        self.fire(obj, Phase::Before, Access::Delete, Args::new())?;
        deleter(&mut *obj);
        self.fire(obj, Phase::After, Access::Delete, Args::new())
    }

    /// Same attribute with a different getter
    #[must_use]
    pub fn with_getter<F>(&self, getter: F) -> Self
    where
        F: Fn(&O) -> T + 'static,
    {
        Self {
            getter: Some(Rc::new(getter)),
            ..self.clone()
        }
    }

    /// Same attribute with a different setter
    #[must_use]
    pub fn with_setter<F>(&self, setter: F) -> Self
    where
        F: Fn(&mut O, T) + 'static,
    {
        Self {
            setter: Some(Rc::new(setter)),
            ..self.clone()
        }
    }

    /// Same attribute with a different deleter
    #[must_use]
    pub fn with_deleter<F>(&self, deleter: F) -> Self
    where
        F: Fn(&mut O) + 'static,
    {
        Self {
            deleter: Some(Rc::new(deleter)),
            ..self.clone()
        }
    }

    fn unsupported(&self, access: Access) -> PropertyError {
        PropertyError::Unsupported {
            attribute: self.name.to_string(),
            access,
        }
    }

    fn resolve<'a>(&'a self, obj: &'a O) -> Result<&'a EventRegistry> {
        self.registry
            .resolve(obj)
            .ok_or_else(|| PropertyError::RegistryUnresolved {
                attribute: self.name.to_string(),
                registry: self.registry.to_string(),
            })
    }

    fn fire(&self, obj: &O, phase: Phase, access: Access, args: Args) -> Result<()> {
        let registry = self.resolve(obj)?;
        let event = self.events.get(phase, access);
        match registry.trigger(event, args) {
            Err(err) if err.is_no_handler_found() => {
                tracing::trace!(event, "no listeners");
                Ok(())
            }
            other => Ok(other?),
        }
    }
}

/// Builder for [`ObservableAttribute`]
pub struct AttributeBuilder<O, T> {
    name: Option<Cow<'static, str>>,
    registry: Option<RegistryRef>,
    getter: Option<(Getter<O, T>, Option<&'static str>)>,
    setter: Option<(Setter<O, T>, Option<&'static str>)>,
    deleter: Option<(Deleter<O>, Option<&'static str>)>,
}

impl<O, T> Default for AttributeBuilder<O, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O, T> AttributeBuilder<O, T> {
    pub fn new() -> Self {
        Self {
            name: None,
            registry: None,
            getter: None,
            setter: None,
            deleter: None,
        }
    }

    /// Event name stem; overrides any name taken from the accessors
    #[must_use]
    pub fn name(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Registry shared with the attribute, or the name of one on the object
    #[must_use]
    pub fn registry(mut self, registry: impl Into<RegistryRef>) -> Self {
        self.registry = Some(registry.into());
        self
    }

    #[must_use]
    pub fn getter<F>(mut self, getter: F) -> Self
    where
        F: Fn(&O) -> T + 'static,
    {
        let f: Getter<O, T> = Rc::new(getter);
        self.getter = Some((f, item_name::<F>()));
        self
    }

    #[must_use]
    pub fn setter<F>(mut self, setter: F) -> Self
    where
        F: Fn(&mut O, T) + 'static,
    {
        let f: Setter<O, T> = Rc::new(setter);
        self.setter = Some((f, item_name::<F>()));
        self
    }

    #[must_use]
    pub fn deleter<F>(mut self, deleter: F) -> Self
    where
        F: Fn(&mut O) + 'static,
    {
        let f: Deleter<O> = Rc::new(deleter);
        self.deleter = Some((f, item_name::<F>()));
        self
    }

    fn resolve_name(&self) -> Result<Cow<'static, str>> {
        if let Some(name) = &self.name {
            return Ok(name.clone());
        }
        let names = [
            self.getter.as_ref().and_then(|(_, n)| *n),
            self.setter.as_ref().and_then(|(_, n)| *n),
            self.deleter.as_ref().and_then(|(_, n)| *n),
        ];
        let mut found: Option<&'static str> = None;
        for name in names.into_iter().flatten() {
            match found {
                Some(first) if first != name => {
                    return Err(PropertyError::NameMismatch {
                        first: first.to_string(),
                        second: name.to_string(),
                    })
                }
                _ => found = Some(name),
            }
        }
        found.map(Cow::Borrowed).ok_or(PropertyError::MissingName)
    }

    pub fn build(self) -> Result<ObservableAttribute<O, T>> {
        let name = self.resolve_name()?;
        let registry = self.registry.ok_or_else(|| PropertyError::MissingRegistry {
            attribute: name.to_string(),
        })?;
        tracing::trace!(attribute = %name, registry = %registry, "build observable attribute");
        Ok(ObservableAttribute {
            events: EventNames::new(&name),
            name,
            registry,
            getter: self.getter.map(|(f, _)| f),
            setter: self.setter.map(|(f, _)| f),
            deleter: self.deleter.map(|(f, _)| f),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use observable_core::ObservableError;
    use std::cell::RefCell;

    struct Counter {
        value: i32,
        events: EventRegistry,
    }

    impl RegistryHost for Counter {
        fn registry(&self, name: &str) -> Option<&EventRegistry> {
            (name == "events").then_some(&self.events)
        }
    }

    fn count(c: &Counter) -> i32 {
        c.value
    }

    fn set_count(c: &mut Counter, v: i32) {
        c.value = v;
    }

    fn reset(c: &mut Counter) {
        c.value = 0;
    }

    fn counter(value: i32) -> Counter {
        Counter {
            value,
            events: EventRegistry::new(),
        }
    }

    fn full_attribute() -> ObservableAttribute<Counter, i32> {
        ObservableAttribute::builder()
            .name("count")
            .registry("events")
            .getter(count)
            .setter(set_count)
            .deleter(reset)
            .build()
            .unwrap()
    }

    #[test]
    fn test_event_names() {
        let names = EventNames::new("prop");
        assert_eq!(names.before_get, "before_get_prop");
        assert_eq!(names.after_del, "after_del_prop");
        assert_eq!(names.get(Phase::After, Access::Set), "after_set_prop");
        assert_eq!(names.iter().count(), 6);
    }

    #[test]
    fn test_item_name() {
        assert_eq!(item_name::<fn(&Counter) -> i32>(), None);
        let closure = |c: &Counter| c.value;
        fn name_of<F: Fn(&Counter) -> i32>(_: &F) -> Option<&'static str> {
            item_name::<F>()
        }
        assert_eq!(name_of(&closure), None);
        assert_eq!(name_of(&count), Some("count"));
    }

    struct Wrapper<T> {
        inner: T,
        events: EventRegistry,
    }

    impl<T: Copy> Wrapper<T> {
        fn value(&self) -> T {
            self.inner
        }
    }

    impl<T> RegistryHost for Wrapper<T> {
        fn registry(&self, name: &str) -> Option<&EventRegistry> {
            (name == "events").then_some(&self.events)
        }
    }

    fn first<T: Copy>(items: &[T]) -> T {
        items[0]
    }

    #[test]
    fn test_item_name_generic_paths() {
        fn item_of<F>(_: &F) -> Option<&'static str> {
            item_name::<F>()
        }
        assert_eq!(item_of(&Wrapper::<i32>::value), Some("value"));
        assert_eq!(item_of(&Wrapper::<Vec<Counter>>::inner_len), Some("inner_len"));
        assert_eq!(item_of(&first::<u8>), Some("first"));
        assert_eq!(last_path_segment("a::Wrapper<b::C>::value"), "value");
        assert_eq!(last_path_segment("<a::W as a::T>::value"), "value");
    }

    impl Wrapper<Vec<Counter>> {
        fn inner_len(&self) -> usize {
            self.inner.len()
        }
    }

    #[test]
    fn test_name_from_method_on_generic_type() {
        let attr = ObservableAttribute::<Wrapper<i32>, i32>::builder()
            .registry("events")
            .getter(Wrapper::<i32>::value)
            .build()
            .unwrap();
        assert_eq!(attr.name(), "value");

        let wrapper = Wrapper {
            inner: 7,
            events: EventRegistry::new(),
        };
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        wrapper.events.on("after_get_value", move |args| {
            sink.borrow_mut().push(*args.get::<i32>(0)?);
            Ok(())
        });
        assert_eq!(attr.get(&wrapper).unwrap(), 7);
        assert_eq!(*seen.borrow(), vec![7]);
    }

    #[test]
    fn test_name_from_fn_items() {
        let attr = ObservableAttribute::<Counter, i32>::builder()
            .registry("events")
            .getter(count)
            .build()
            .unwrap();
        assert_eq!(attr.name(), "count");
        assert_eq!(attr.events().before_get, "before_get_count");
    }

    #[test]
    fn test_name_mismatch() {
        let err = ObservableAttribute::<Counter, i32>::builder()
            .registry("events")
            .getter(count)
            .setter(set_count)
            .build()
            .unwrap_err();
        assert!(matches!(err, PropertyError::NameMismatch { .. }));
    }

    #[test]
    fn test_closure_needs_name() {
        let err = ObservableAttribute::<Counter, i32>::builder()
            .registry("events")
            .getter(|c: &Counter| c.value)
            .build()
            .unwrap_err();
        assert!(matches!(err, PropertyError::MissingName));
    }

    #[test]
    fn test_missing_registry() {
        let err = ObservableAttribute::<Counter, i32>::builder()
            .name("count")
            .build()
            .unwrap_err();
        assert!(matches!(err, PropertyError::MissingRegistry { .. }));
    }

    #[test]
    fn test_access_without_listeners() {
        let attr = full_attribute();
        let mut c = counter(3);

        assert_eq!(attr.get(&c).unwrap(), 3);
        attr.set(&mut c, 9).unwrap();
        assert_eq!(c.value, 9);
        attr.delete(&mut c).unwrap();
        assert_eq!(c.value, 0);
    }

    #[test]
    fn test_set_event_order() {
        let attr = full_attribute();
        let mut c = counter(1);
        let log = Rc::new(RefCell::new(Vec::new()));

        let before = log.clone();
        c.events.on("before_set_count", move |args| {
            before.borrow_mut().push(("before", *args.get::<i32>(0)?));
            Ok(())
        });
        let after = log.clone();
        c.events.on("after_set_count", move |args| {
            after.borrow_mut().push(("after", *args.get::<i32>(0)?));
            Ok(())
        });

        attr.set(&mut c, 5).unwrap();
        assert_eq!(*log.borrow(), vec![("before", 5), ("after", 5)]);
    }

    #[test]
    fn test_unsupported_access_fires_nothing() {
        let attr = ObservableAttribute::<Counter, i32>::builder()
            .name("prop")
            .registry("events")
            .build()
            .unwrap();
        let mut c = counter(1);
        let fired = Rc::new(RefCell::new(0));
        for event in attr.events().iter() {
            let fired = fired.clone();
            c.events.on(event, move |_| {
                *fired.borrow_mut() += 1;
                Ok(())
            });
        }

        assert!(matches!(
            attr.get(&c),
            Err(PropertyError::Unsupported {
                access: Access::Get,
                ..
            })
        ));
        assert!(attr.set(&mut c, 42).is_err());
        assert!(attr.delete(&mut c).is_err());
        assert_eq!(*fired.borrow(), 0);
        assert!(!attr.supports(Access::Get));
    }

    #[test]
    fn test_handler_failure_aborts_access() {
        let attr = full_attribute();
        let mut c = counter(1);
        c.events
            .on("before_set_count", |_| anyhow::bail!("read-only"));

        let err = attr.set(&mut c, 7).unwrap_err();
        assert!(matches!(err, PropertyError::Registry(ObservableError::Handler(_))));
        assert_eq!(c.value, 1);
    }

    #[test]
    fn test_unresolved_registry() {
        let attr = ObservableAttribute::<Counter, i32>::builder()
            .name("count")
            .registry("audit")
            .getter(count)
            .build()
            .unwrap();
        let err = attr.get(&counter(1)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "attribute 'count' cannot resolve registry 'audit'"
        );
    }

    #[test]
    fn test_with_accessors_keep_binding() {
        let attr = ObservableAttribute::<Counter, i32>::builder()
            .name("count")
            .registry("events")
            .build()
            .unwrap()
            .with_getter(|c| c.value * 10)
            .with_setter(|c, v| c.value = v + 1)
            .with_deleter(|c| c.value = -1);

        let mut c = counter(2);
        assert_eq!(attr.name(), "count");
        assert_eq!(attr.get(&c).unwrap(), 20);
        attr.set(&mut c, 4).unwrap();
        assert_eq!(c.value, 5);
        attr.delete(&mut c).unwrap();
        assert_eq!(c.value, -1);
    }
}
