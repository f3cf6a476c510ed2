//! Observable Core
//!
//! In-process publish/subscribe primitives:
//!
//! - **Event Registry**: named events mapped to ordered handler lists
//! - **Synchronous Dispatch**: handlers run in registration order on the caller's stack
//! - **One-shot Handlers**: entries that detach themselves at their first run
//!
//! # Example
//!
//! ```rust
//! use observable_core::{args, EventRegistry};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let registry = EventRegistry::new();
//! let greetings = Rc::new(RefCell::new(Vec::new()));
//!
//! let sink = greetings.clone();
//! let greet = registry.on("greet", move |args| {
//!     let name: &&str = args.get(0)?;
//!     sink.borrow_mut().push(format!("hi {name}"));
//!     Ok(())
//! });
//!
//! registry.trigger("greet", args!["Ann"]).unwrap();
//! assert_eq!(*greetings.borrow(), vec!["hi Ann".to_string()]);
//!
//! registry.off_handler("greet", &greet).unwrap();
//! assert!(registry.trigger("greet", args!["Ann"]).is_err());
//! ```

pub mod args;
pub mod config;
pub mod error;
pub mod handler;
pub mod registry;

pub use args::{ArgError, Args};
pub use config::{ConfigError, MissingEventPolicy, RegistryConfig, RemovalMode};
pub use error::{ObservableError, Result};
pub use handler::{Handler, HandlerResult};
pub use registry::{Binding, EventRegistry};
