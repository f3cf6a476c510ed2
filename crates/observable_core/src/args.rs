//! Trigger arguments
//!
//! Handlers accept any number of positional and keyword arguments. Values are
//! type-erased when the trigger is built and recovered by the handler with the
//! typed accessors below; asking for an argument the caller did not supply, or
//! for the wrong type, yields an [`ArgError`].

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::any::{type_name, Any};
use std::fmt;
use thiserror::Error;

/// Errors raised when a handler reads its arguments
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgError {
    #[error("missing positional argument {index}")]
    Missing { index: usize },

    #[error("missing keyword argument '{name}'")]
    MissingKeyword { name: String },

    #[error("argument {position} is not a {expected}")]
    TypeMismatch {
        position: String,
        expected: &'static str,
    },

    #[error("expected {expected} positional arguments, got {found}")]
    Arity { expected: usize, found: usize },
}

struct Value {
    inner: Box<dyn Any>,
    type_name: &'static str,
}

impl Value {
    fn new<T: 'static>(value: T) -> Self {
        Self {
            inner: Box::new(value),
            type_name: type_name::<T>(),
        }
    }
}

/// Positional and keyword arguments passed to every handler of a trigger
#[derive(Default)]
pub struct Args {
    positional: SmallVec<[Value; 2]>,
    keywords: FxHashMap<String, Value>,
}

impl Args {
    /// Empty argument list
    pub fn new() -> Self {
        Self::default()
    }

    /// Single positional argument
    pub fn one<T: 'static>(value: T) -> Self {
        Self::new().arg(value)
    }

    /// Append a positional argument
    #[must_use]
    pub fn arg<T: 'static>(mut self, value: T) -> Self {
        self.push(value);
        self
    }

    /// Add (or replace) a keyword argument
    #[must_use]
    pub fn kwarg<T: 'static>(mut self, name: impl Into<String>, value: T) -> Self {
        self.keywords.insert(name.into(), Value::new(value));
        self
    }

    /// Append a positional argument in place
    pub fn push<T: 'static>(&mut self, value: T) {
        self.positional.push(Value::new(value));
    }

    /// Number of positional arguments
    pub fn len(&self) -> usize {
        self.positional.len()
    }

    /// True if there are neither positional nor keyword arguments
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty()
    }

    /// Check if a keyword argument was supplied
    pub fn has_kw(&self, name: &str) -> bool {
        self.keywords.contains_key(name)
    }

    /// Keyword names, in no particular order
    pub fn kw_names(&self) -> impl Iterator<Item = &str> {
        self.keywords.keys().map(String::as_str)
    }

    /// Fail unless exactly `expected` positional arguments were supplied
    pub fn expect_arity(&self, expected: usize) -> Result<(), ArgError> {
        if self.positional.len() == expected {
            Ok(())
        } else {
            Err(ArgError::Arity {
                expected,
                found: self.positional.len(),
            })
        }
    }

    /// Borrow positional argument `index` as `T`
    pub fn get<T: 'static>(&self, index: usize) -> Result<&T, ArgError> {
        let value = self
            .positional
            .get(index)
            .ok_or(ArgError::Missing { index })?;
        value
            .inner
            .downcast_ref::<T>()
            .ok_or_else(|| ArgError::TypeMismatch {
                position: index.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Borrow keyword argument `name` as `T`
    pub fn kw<T: 'static>(&self, name: &str) -> Result<&T, ArgError> {
        self.kw_opt(name)?.ok_or_else(|| ArgError::MissingKeyword {
            name: name.to_string(),
        })
    }

    /// Borrow keyword argument `name` as `T` if it was supplied
    pub fn kw_opt<T: 'static>(&self, name: &str) -> Result<Option<&T>, ArgError> {
        let Some(value) = self.keywords.get(name) else {
            return Ok(None);
        };
        value
            .inner
            .downcast_ref::<T>()
            .map(Some)
            .ok_or_else(|| ArgError::TypeMismatch {
                position: format!("'{name}'"),
                expected: type_name::<T>(),
            })
    }

    /// Copy keyword argument `name`, falling back to `default` when absent
    pub fn kw_or<T: Clone + 'static>(&self, name: &str, default: T) -> Result<T, ArgError> {
        Ok(self.kw_opt::<T>(name)?.cloned().unwrap_or(default))
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let positional: Vec<&str> = self.positional.iter().map(|v| v.type_name).collect();
        let keywords: Vec<(&str, &str)> = self
            .keywords
            .iter()
            .map(|(k, v)| (k.as_str(), v.type_name))
            .collect();
        f.debug_struct("Args")
            .field("positional", &positional)
            .field("keywords", &keywords)
            .finish()
    }
}

/// Build an [`Args`] from positional values
///
/// ```rust
/// use observable_core::args;
///
/// let args = args!["Ann", 3u32];
/// assert_eq!(args.len(), 2);
/// assert_eq!(*args.get::<u32>(1).unwrap(), 3);
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::Args::new()
    };
    ($($value:expr),+ $(,)?) => {{
        let mut args = $crate::Args::new();
        $( args.push($value); )+
        args
    }};
}
