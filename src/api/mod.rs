//! Host-facing surface: shared context, configuration, metadata reporting,
//! axis rendering and the per-chart runtime.

mod axis;
mod axis_ticks;
mod config;
mod context;
mod json_contract;
mod metadata;
mod runtime;
mod status;
mod tooltip;

pub use axis::{AxisConfig, AxisOrientation, BandAxis, LinearAxis, TimeAxis};
pub use config::{ChartConfig, ChartFormatters, TooltipConfig};
pub use context::{CategoryMetadata, ChartContext, ContextProps};
pub use json_contract::{CHART_METADATA_JSON_SCHEMA_V1, ChartMetadataJsonContractV1};
pub use metadata::{
    AxisDomain, ChangeGate, ChartMetadata, ChartType, ColorMappingCallback, HighlightCallback,
    LegendCallback, LegendItem, MetadataCallback, MetadataEmitter,
};
pub use runtime::{ChartCallbacks, ChartRuntime, RenderOutcome};
pub use status::{
    ChartStatus, NoDataRule, StatusSlots, default_loading_component, default_no_data_component,
    resolve_status,
};
