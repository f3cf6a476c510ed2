//! Attribute templates
//!
//! A template pre-binds an event name and/or registry reference so many
//! attributes can be stamped out without repeating them.

use crate::attribute::AttributeBuilder;
use crate::registry_ref::RegistryRef;
use std::borrow::Cow;

/// Pre-bound settings for [`AttributeBuilder`]s
///
/// ```rust
/// use observable_core::EventRegistry;
/// use observable_property::{AttributeTemplate, RegistryHost};
///
/// struct Player {
///     hp: u32,
///     events: EventRegistry,
/// }
///
/// impl RegistryHost for Player {
///     fn registry(&self, name: &str) -> Option<&EventRegistry> {
///         (name == "events").then_some(&self.events)
///     }
/// }
///
/// fn hp(p: &Player) -> u32 {
///     p.hp
/// }
///
/// let on_events = AttributeTemplate::new().registry("events");
/// let attr = on_events.getter(hp).build().unwrap();
/// assert_eq!(attr.name(), "hp");
/// ```
#[derive(Clone, Debug, Default)]
pub struct AttributeTemplate {
    name: Option<Cow<'static, str>>,
    registry: Option<RegistryRef>,
}

impl AttributeTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Event name stem used instead of the accessor's name
    #[must_use]
    pub fn event(mut self, name: impl Into<Cow<'static, str>>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn registry(mut self, registry: impl Into<RegistryRef>) -> Self {
        self.registry = Some(registry.into());
        self
    }

    pub fn event_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn registry_ref(&self) -> Option<&RegistryRef> {
        self.registry.as_ref()
    }

    /// A builder carrying this template's settings
    pub fn builder<O, T>(&self) -> AttributeBuilder<O, T> {
        let mut builder = AttributeBuilder::new();
        if let Some(name) = &self.name {
            builder = builder.name(name.clone());
        }
        if let Some(registry) = &self.registry {
            builder = builder.registry(registry.clone());
        }
        builder
    }

    /// Shorthand for `builder().getter(getter)`
    pub fn getter<O, T, F>(&self, getter: F) -> AttributeBuilder<O, T>
    where
        F: Fn(&O) -> T + 'static,
    {
        self.builder().getter(getter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::ObservableAttribute;
    use crate::registry_ref::RegistryHost;
    use observable_core::EventRegistry;
    use std::rc::Rc;

    struct Obj;
    impl RegistryHost for Obj {}

    #[test]
    fn test_create_with() {
        let template = AttributeTemplate::new().event("evt").registry("obs");
        assert_eq!(template.event_name(), Some("evt"));
        assert!(matches!(
            template.registry_ref(),
            Some(RegistryRef::Attribute(name)) if name == "obs"
        ));

        let attr: ObservableAttribute<Obj, ()> = template.builder().build().unwrap();
        assert_eq!(attr.name(), "evt");
    }

    #[test]
    fn test_template_is_reusable() {
        let shared = Rc::new(EventRegistry::new());
        let template = AttributeTemplate::new().registry(shared.clone());

        let a: ObservableAttribute<Obj, i32> =
            template.builder().name("a").getter(|_: &Obj| 1).build().unwrap();
        let b: ObservableAttribute<Obj, i32> =
            template.builder().name("b").getter(|_: &Obj| 2).build().unwrap();

        shared.on("after_get_a", |_| Ok(()));
        assert_eq!(a.get(&Obj).unwrap(), 1);
        assert_eq!(b.get(&Obj).unwrap(), 2);
    }

    #[test]
    fn test_empty_template_needs_registry() {
        let result = AttributeTemplate::new()
            .event("x")
            .builder::<Obj, i32>()
            .build();
        assert!(result.is_err());
    }
}
