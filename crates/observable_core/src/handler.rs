//! Handler references
//!
//! A [`Handler`] is a shared reference to a callable. Registering the same
//! `Handler` twice registers the same callable twice; removing it by identity
//! removes every registration of that reference.

use crate::args::Args;
use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

/// What a handler returns; any error type converts through `?`
pub type HandlerResult = anyhow::Result<()>;

type HandlerFn = dyn Fn(&Args) -> HandlerResult;

/// Shared, identity-comparable event handler
#[derive(Clone)]
pub struct Handler {
    func: Rc<HandlerFn>,
    label: Option<Cow<'static, str>>,
}

impl Handler {
    /// Wrap a callable
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Args) -> HandlerResult + 'static,
    {
        Self {
            func: Rc::new(f),
            label: None,
        }
    }

    /// Wrap a callable with a label used in diagnostics
    pub fn named<F>(label: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(&Args) -> HandlerResult + 'static,
    {
        Self {
            func: Rc::new(f),
            label: Some(label.into()),
        }
    }

    /// Diagnostic label, if one was given
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Invoke the handler
    pub fn call(&self, args: &Args) -> HandlerResult {
        (self.func)(args)
    }

    /// Identity comparison; clones of one handler are the same handler
    pub fn same_as(&self, other: &Handler) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }

    fn addr(&self) -> *const () {
        Rc::as_ptr(&self.func) as *const ()
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other)
    }
}

impl Eq for Handler {}

impl fmt::Display for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "'{label}'"),
            None => write!(f, "<handler@{:p}>", self.addr()),
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("label", &self.label)
            .field("addr", &self.addr())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let a = Handler::new(|_| Ok(()));
        let b = Handler::new(|_| Ok(()));
        let a2 = a.clone();

        assert_eq!(a, a2);
        assert_ne!(a, b);
    }

    #[test]
    fn test_display_uses_label() {
        let named = Handler::named("audit", |_| Ok(()));
        assert_eq!(named.to_string(), "'audit'");
        assert_eq!(named.label(), Some("audit"));

        let anon = Handler::new(|_| Ok(()));
        assert!(anon.to_string().starts_with("<handler@"));
    }

    #[test]
    fn test_call_forwards_args() {
        let h = Handler::new(|args| {
            anyhow::ensure!(*args.get::<i32>(0)? == 7, "wrong value");
            Ok(())
        });
        assert!(h.call(&Args::one(7i32)).is_ok());
        assert!(h.call(&Args::one(8i32)).is_err());
        assert!(h.call(&Args::new()).is_err());
    }
}
