use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

use super::ChartMetadata;

pub const CHART_METADATA_JSON_SCHEMA_V1: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartMetadataJsonContractV1 {
    pub schema_version: u32,
    pub metadata: ChartMetadata,
}

impl ChartMetadata {
    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| {
            ChartError::Serialization(format!("failed to serialize chart metadata: {e}"))
        })
    }

    pub fn to_json_contract_v1_pretty(&self) -> ChartResult<String> {
        let payload = ChartMetadataJsonContractV1 {
            schema_version: CHART_METADATA_JSON_SCHEMA_V1,
            metadata: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            ChartError::Serialization(format!("failed to serialize metadata contract v1: {e}"))
        })
    }

    /// Accepts either a bare metadata object or a versioned contract payload.
    pub fn from_json_compat_str(input: &str) -> ChartResult<Self> {
        if let Ok(metadata) = serde_json::from_str::<ChartMetadata>(input) {
            return Ok(metadata);
        }
        let payload: ChartMetadataJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            ChartError::Serialization(format!("failed to parse metadata json payload: {e}"))
        })?;
        if payload.schema_version != CHART_METADATA_JSON_SCHEMA_V1 {
            return Err(ChartError::Serialization(format!(
                "unsupported metadata schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.metadata)
    }
}
