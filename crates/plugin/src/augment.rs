//! Schema augmentation: declare one `Date` field per derived name

use crate::config::Configuration;
use crate::error::ConfigurationError;
use modstamp_core::{Error, FieldOptions, FieldType, SchemaHost};
use tracing::debug;

/// Declare every derived field on `schema`
///
/// All names are checked before any is declared, so a collision leaves the
/// schema unchanged.
///
/// # Errors
///
/// Returns [`ConfigurationError::FieldCollision`] if the schema already has
/// a field with a derived name.
pub fn augment(schema: &mut dyn SchemaHost, config: &Configuration) -> Result<(), ConfigurationError> {
    let derived = config.derived_fields();
    if let Some(field) = derived.iter().find(|f| schema.has_field(f)) {
        return Err(ConfigurationError::FieldCollision {
            field: field.clone(),
            source: Error::FieldExists(field.clone()),
        });
    }

    let options = FieldOptions::selectable(config.select());
    for field in derived {
        schema
            .declare_field(&field, FieldType::Date, options.clone())
            .map_err(|source| ConfigurationError::FieldCollision {
                field: field.clone(),
                source,
            })?;
        debug!(field = %field, select = config.select(), "Declared derived field");
    }
    Ok(())
}
