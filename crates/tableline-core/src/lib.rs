//! Tableline Core - restaurant dataset merge pipeline
//!
//! Decodes the structural (JSON) and content (CSV) restaurant datasets,
//! validates their enumerated fields, joins them by `objectID` and hands the
//! merged records to a [`SearchIndex`].

pub mod content;
pub mod enums;
pub mod error;
pub mod logging;
pub mod merge;
pub mod pipeline;
pub mod progress;
pub mod publish;
pub mod record;
pub mod sink;
pub mod structural;

// Re-exports for convenience
pub use content::{HeaderMode, decode_content};
pub use enums::{PaymentOption, PriceRange};
pub use error::PipelineError;
pub use logging::{ProgressLogger, Verbosity, init_logging};
pub use merge::{MergeOptions, MergeSummary, MissingContent, merge};
pub use pipeline::{PipelineConfig, PublishSummary, load_and_merge, publish};
pub use progress::{ProgressContext, fmt_num};
pub use publish::{DEFAULT_FACETS, FacetUpdate, SearchIndex, ensure_facets};
pub use record::{Content, ContentRow, Geolocation, Restaurant};
pub use sink::{JsonSink, write_json};
pub use structural::decode_structural;
