//! Registry references
//!
//! An attribute either holds its registry directly or names a registry
//! attribute on the object being accessed. Named references are resolved on
//! every access, so the registry may be created with the object, long after
//! the attribute itself was built.

use observable_core::EventRegistry;
use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

/// Objects that expose registries by name
///
/// ```rust
/// use observable_core::EventRegistry;
/// use observable_property::RegistryHost;
///
/// struct Document {
///     events: EventRegistry,
/// }
///
/// impl RegistryHost for Document {
///     fn registry(&self, name: &str) -> Option<&EventRegistry> {
///         (name == "events").then_some(&self.events)
///     }
/// }
/// ```
pub trait RegistryHost {
    /// Look up the registry stored under `name`
    fn registry(&self, _name: &str) -> Option<&EventRegistry> {
        None
    }
}

/// Where an attribute finds its registry
#[derive(Clone)]
pub enum RegistryRef {
    /// A registry shared with the attribute
    Direct(Rc<EventRegistry>),
    /// The name of a registry on the accessed object
    Attribute(Cow<'static, str>),
}

impl RegistryRef {
    pub fn attribute(name: impl Into<Cow<'static, str>>) -> Self {
        RegistryRef::Attribute(name.into())
    }

    /// Resolve against `host`; `None` if a named registry is missing
    pub fn resolve<'a, O: RegistryHost>(&'a self, host: &'a O) -> Option<&'a EventRegistry> {
        match self {
            RegistryRef::Direct(registry) => Some(registry.as_ref()),
            RegistryRef::Attribute(name) => host.registry(name),
        }
    }
}

impl From<Rc<EventRegistry>> for RegistryRef {
    fn from(registry: Rc<EventRegistry>) -> Self {
        RegistryRef::Direct(registry)
    }
}

impl From<&'static str> for RegistryRef {
    fn from(name: &'static str) -> Self {
        RegistryRef::Attribute(Cow::Borrowed(name))
    }
}

impl From<String> for RegistryRef {
    fn from(name: String) -> Self {
        RegistryRef::Attribute(Cow::Owned(name))
    }
}

impl fmt::Display for RegistryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryRef::Direct(registry) => write!(f, "<registry@{:p}>", Rc::as_ptr(registry)),
            RegistryRef::Attribute(name) => f.write_str(name),
        }
    }
}

impl fmt::Debug for RegistryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryRef::Direct(registry) => f.debug_tuple("Direct").field(registry).finish(),
            RegistryRef::Attribute(name) => f.debug_tuple("Attribute").field(name).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Host {
        events: EventRegistry,
    }

    impl RegistryHost for Host {
        fn registry(&self, name: &str) -> Option<&EventRegistry> {
            match name {
                "events" => Some(&self.events),
                _ => None,
            }
        }
    }

    struct Bare;
    impl RegistryHost for Bare {}

    #[test]
    fn test_resolve_by_name() {
        let host = Host {
            events: EventRegistry::new(),
        };
        host.events.on("x", |_| Ok(()));

        let reference = RegistryRef::from("events");
        let resolved = reference.resolve(&host).unwrap();
        assert!(resolved.is_registered("x"));
        assert!(RegistryRef::attribute("missing").resolve(&host).is_none());
    }

    #[test]
    fn test_resolve_direct_ignores_host() {
        let shared = Rc::new(EventRegistry::new());
        let reference = RegistryRef::from(shared.clone());
        let resolved = reference.resolve(&Bare).unwrap();
        assert!(std::ptr::eq(resolved, shared.as_ref()));
    }

    #[test]
    fn test_display() {
        assert_eq!(RegistryRef::from("events".to_string()).to_string(), "events");
        let direct = RegistryRef::from(Rc::new(EventRegistry::new()));
        assert!(direct.to_string().starts_with("<registry@"));
    }
}
