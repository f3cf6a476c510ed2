//! Observable Properties
//!
//! Attributes that announce their own access on an
//! [`EventRegistry`](observable_core::EventRegistry):
//!
//! - **Observable Attributes**: before/after events around get, set and delete
//! - **Deferred Registries**: registries looked up by name on the accessed object
//! - **Templates**: pre-bound event names and registries for reuse
//!
//! # Example
//!
//! ```rust
//! use observable_core::EventRegistry;
//! use observable_property::{ObservableAttribute, RegistryHost};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! struct Account {
//!     balance: i64,
//!     events: EventRegistry,
//! }
//!
//! impl RegistryHost for Account {
//!     fn registry(&self, name: &str) -> Option<&EventRegistry> {
//!         (name == "events").then_some(&self.events)
//!     }
//! }
//!
//! fn balance(a: &Account) -> i64 {
//!     a.balance
//! }
//!
//! fn set_balance(a: &mut Account, v: i64) {
//!     a.balance = v;
//! }
//!
//! let attr = ObservableAttribute::builder()
//!     .registry("events")
//!     .getter(balance)
//!     .build()
//!     .unwrap()
//!     .with_setter(set_balance);
//!
//! let mut account = Account { balance: 10, events: EventRegistry::new() };
//! let last = Rc::new(Cell::new(0));
//! let sink = last.clone();
//! account.events.on("after_set_balance", move |args| {
//!     sink.set(*args.get::<i64>(0)?);
//!     Ok(())
//! });
//!
//! attr.set(&mut account, 25).unwrap();
//! assert_eq!(last.get(), 25);
//! assert_eq!(attr.get(&account).unwrap(), 25);
//! ```

pub mod attribute;
pub mod error;
pub mod registry_ref;
pub mod template;

pub use attribute::{event_name, Access, AttributeBuilder, EventNames, ObservableAttribute, Phase};
pub use error::{PropertyError, Result};
pub use registry_ref::{RegistryHost, RegistryRef};
pub use template::AttributeTemplate;
