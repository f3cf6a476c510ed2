//! Audit Log Demo
//!
//! This example wires observable attributes to an audit trail:
//! - A per-object registry resolved by name
//! - Validation in a `before_set` handler that can veto a write
//! - A one-shot welcome handler on the first read
//!
//! Run with: RUST_LOG=debug cargo run -p observable_property --example audit_log

use observable_core::{EventRegistry, RegistryConfig};
use observable_property::{AttributeTemplate, ObservableAttribute, PropertyError, RegistryHost};
use std::cell::RefCell;
use std::rc::Rc;
use tracing_subscriber::EnvFilter;

struct Thermostat {
    target: f32,
    events: EventRegistry,
}

impl RegistryHost for Thermostat {
    fn registry(&self, name: &str) -> Option<&EventRegistry> {
        (name == "events").then_some(&self.events)
    }
}

fn target(t: &Thermostat) -> f32 {
    t.target
}

fn main() -> Result<(), PropertyError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = RegistryConfig::from_toml_str(
        r#"
        [registry]
        missing_event = "ignore"
        "#,
    )
    .unwrap_or_default();

    let attr: ObservableAttribute<Thermostat, f32> = AttributeTemplate::new()
        .registry("events")
        .getter(target)
        .build()?
        .with_setter(|t, v| t.target = v);

    let mut thermostat = Thermostat {
        target: 20.0,
        events: EventRegistry::with_config(config),
    };

    let trail = Rc::new(RefCell::new(Vec::new()));

    let sink = trail.clone();
    thermostat.events.on("after_set_target", move |args| {
        sink.borrow_mut()
            .push(format!("target set to {}", args.get::<f32>(0)?));
        Ok(())
    });
    thermostat.events.on("before_set_target", |args| {
        let value = *args.get::<f32>(0)?;
        anyhow::ensure!((5.0..=30.0).contains(&value), "{value} is out of range");
        Ok(())
    });
    thermostat.events.once("after_get_target", |_| {
        tracing::info!("first read of target");
        Ok(())
    });

    attr.set(&mut thermostat, 22.5)?;
    if let Err(err) = attr.set(&mut thermostat, 90.0) {
        tracing::warn!("rejected write: {}", err);
    }
    tracing::info!("target is {}", attr.get(&thermostat)?);
    tracing::info!("target is {}", attr.get(&thermostat)?);

    for line in trail.borrow().iter() {
        println!("{line}");
    }
    Ok(())
}
