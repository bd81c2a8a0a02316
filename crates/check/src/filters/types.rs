//! Host-type filters: `object`, `values`, `entity`, `condition`

use std::sync::Arc;

use tracing::debug;

use crate::check::Outcome;
use crate::condition::ConditionNormalizer;
use crate::entity::{Entity, EntityRef, EntityStore};
use crate::error::FilterError;
use crate::value::Value;
use crate::values::Values;

pub(crate) fn object(value: Value, class: Option<&str>) -> Outcome {
    let accepted = match (&value, class) {
        (Value::Object(_) | Value::Entity(_) | Value::Values(_), None) => true,
        (Value::Object(object), Some(class)) => object.is_instance_of(class),
        _ => false,
    };
    if accepted {
        return Outcome::ok(value);
    }
    let error = FilterError::new("object", "Must be an object of class \"%s\"")
        .with_arg(class.unwrap_or_default());
    Outcome::fail(Value::Null, error)
}

pub(crate) fn values(value: Value) -> Outcome {
    match value {
        Value::Values(_) => Outcome::ok(value),
        other => Outcome::fail(
            Value::Values(Values::new(other)),
            FilterError::new("values", "Must be a values container"),
        ),
    }
}

fn resolve(value: &Value, store: Option<&dyn EntityStore>) -> Option<Arc<dyn Entity>> {
    if let Value::Entity(entity) = value {
        return Some(Arc::clone(entity));
    }
    let reference = EntityRef::from_value(value)?;
    let Some(store) = store else {
        debug!(reference = %reference, "no entity store configured");
        return None;
    };
    let entity = store.resolve(&reference);
    debug!(reference = %reference, found = entity.is_some(), "entity reference resolved");
    entity
}

pub(crate) fn entity(
    value: Value,
    condition: Option<&Value>,
    store: Option<&dyn EntityStore>,
) -> Outcome {
    let Some(entity) = resolve(&value, store) else {
        return Outcome::fail(Value::Null, FilterError::new("entity", "Not an entity"));
    };
    if let Some(condition) = condition
        && condition.is_truthy()
        && !entity.matches_condition(condition)
    {
        let error = FilterError::new("entity", "Entity does not match the condition");
        return Outcome::fail(Value::Null, error);
    }
    if !entity.is_readable() {
        return Outcome::fail(Value::Null, FilterError::new("entity", "Entity is not readable"));
    }
    Outcome::ok(Value::Entity(entity))
}

pub(crate) fn condition(value: Value, normalizer: Option<&dyn ConditionNormalizer>) -> Outcome {
    match normalizer.and_then(|n| n.normalize(&value)) {
        Some(normalized) => Outcome::ok(normalized),
        None => Outcome::fail(Value::Null, FilterError::new("condition", "Not a search condition")),
    }
}
