//! Modelos neutrales (StepId, RowMeta, RowSnapshot, PipelineMeta).

pub mod pipeline;
pub mod row_meta;
pub mod snapshot;
pub mod step_id;

pub use pipeline::PipelineMeta;
pub use row_meta::{FieldKind, FieldMeta, RowMeta};
pub use snapshot::RowSnapshot;
pub use step_id::StepId;
