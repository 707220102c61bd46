//! Update-document application
//!
//! Supported entries:
//!
//! | Entry | Effect |
//! |---|---|
//! | `field: value` | assign (same as `$set`) |
//! | `$set: {..}` | assign each field |
//! | `$unset: {..}` | remove each field |
//! | `$inc: {..}` | add a number (absent counts as 0) |
//! | `$mul: {..}` | multiply by a number (absent counts as 0) |
//! | `$currentDate: {..}` | assign the write's timestamp |
//! | `$setOnInsert: {..}` | assign, only when the update inserts |
//!
//! Anything else is rejected before storage is touched.

use modstamp_core::{Error, FieldMap, Result, Timestamp, UpdateDoc, Value};

/// Apply `update` to `doc` in place
///
/// `now` feeds `$currentDate`; `inserting` enables `$setOnInsert`.
///
/// # Errors
///
/// Returns [`Error::InvalidOperation`] for unknown operators, non-object
/// operator arguments, or arithmetic on non-numbers.
pub fn apply(doc: &mut FieldMap, update: &UpdateDoc, now: Timestamp, inserting: bool) -> Result<()> {
    for (key, value) in update.fields() {
        if !UpdateDoc::is_operator(key) {
            doc.insert(key.clone(), value.clone());
            continue;
        }
        let args = value.as_object().ok_or_else(|| {
            Error::InvalidOperation(format!("Operator '{}' expects an object argument", key))
        })?;
        match key.as_str() {
            "$set" => {
                for (field, v) in args {
                    doc.insert(field.clone(), v.clone());
                }
            }
            "$setOnInsert" => {
                if inserting {
                    for (field, v) in args {
                        doc.insert(field.clone(), v.clone());
                    }
                }
            }
            "$unset" => {
                for field in args.keys() {
                    doc.remove(field);
                }
            }
            "$inc" => {
                for (field, delta) in args {
                    let next = arithmetic(field, doc.get(field), delta, i64::checked_add, |a, b| a + b)?;
                    doc.insert(field.clone(), next);
                }
            }
            "$mul" => {
                for (field, factor) in args {
                    let next = arithmetic(field, doc.get(field), factor, i64::checked_mul, |a, b| a * b)?;
                    doc.insert(field.clone(), next);
                }
            }
            "$currentDate" => {
                for field in args.keys() {
                    doc.insert(field.clone(), Value::Date(now));
                }
            }
            other => {
                return Err(Error::InvalidOperation(format!(
                    "Unsupported update operator '{}'",
                    other
                )))
            }
        }
    }
    Ok(())
}

/// Int op Int stays Int (wrapping to Float on overflow); anything with a
/// Float becomes Float
fn arithmetic(
    field: &str,
    current: Option<&Value>,
    operand: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value> {
    let not_numeric = |what: &Value| {
        Error::InvalidOperation(format!(
            "Cannot apply arithmetic to field '{}' with {} value",
            field,
            what.type_name()
        ))
    };
    let current = current.cloned().unwrap_or(Value::Int(0));
    match (&current, operand) {
        // Integers stay exact; only an overflow widens to Float
        (Value::Int(a), Value::Int(b)) => Ok(int_op(*a, *b)
            .map(Value::Int)
            .unwrap_or_else(|| Value::Float(float_op(*a as f64, *b as f64)))),
        _ => {
            let a = current.as_number().ok_or_else(|| not_numeric(&current))?;
            let b = operand.as_number().ok_or_else(|| not_numeric(operand))?;
            Ok(Value::Float(float_op(a, b)))
        }
    }
}
