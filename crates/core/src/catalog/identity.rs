use serde_json::Value;
use tracing::debug;

use crate::domain::product::{
    ExternalProductId, ExternalProductRecord, LocalProductId, Product, UnifiedId,
    EXTERNAL_ID_OFFSET,
};
use crate::errors::CatalogError;

/// Maps native ids of both sources into the unified id space and back.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityMapper;

impl IdentityMapper {
    pub fn local(&self, id: LocalProductId) -> UnifiedId {
        UnifiedId::Local(id)
    }

    pub fn external(&self, id: ExternalProductId) -> UnifiedId {
        UnifiedId::External(id)
    }

    /// Decodes a wire id into an external native id.
    ///
    /// Range validation happens here, before any remote lookup, so an id such
    /// as `1101` is a deterministic `NotFound` rather than an upstream 404.
    pub fn decode_external(&self, raw: &str) -> Result<ExternalProductId, CatalogError> {
        let not_found = || CatalogError::NotFound(raw.to_string());

        // Only the canonical rendering decodes: no sign, no leading zeros.
        if raw.is_empty() || raw.starts_with('0') || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(not_found());
        }
        let unified = raw.parse::<i64>().map_err(|_| not_found())?;
        if unified < i64::from(EXTERNAL_ID_OFFSET) {
            return Err(not_found());
        }
        ExternalProductId::new(unified - i64::from(EXTERNAL_ID_OFFSET)).ok_or_else(not_found)
    }

    /// Reads the native id carried by an upstream record. Records whose id is
    /// not an integer inside the known range yield `None`.
    pub fn record_id(&self, record: &ExternalProductRecord) -> Option<ExternalProductId> {
        match &record.id {
            Value::Number(number) => number.as_i64().and_then(ExternalProductId::new),
            _ => None,
        }
    }

    /// Projects upstream records, dropping those with unusable ids.
    pub fn project_external(&self, records: Vec<ExternalProductRecord>) -> Vec<Product> {
        records
            .into_iter()
            .filter_map(|record| match self.record_id(&record) {
                Some(id) => Some(Product::from_external(id, record)),
                None => {
                    debug!(
                        event_name = "catalog.external.record_dropped",
                        native_id = %record.id,
                        "dropping external product with unusable id"
                    );
                    None
                }
            })
            .collect()
    }
}
