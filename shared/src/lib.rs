pub mod config;
pub mod geo;
pub mod projection;
pub mod quiz;
pub mod registry;
pub mod study;
pub mod style;
mod topojson;
pub mod zoom;

pub use config::{MapLayout, Mode, RegionConfig};
pub use geo::{BindingReport, Dataset, Feature, Geometry, resolve_unit_identifier, validate_bindings};
pub use projection::{Projection, RenderedFeature, render_dataset};
pub use quiz::{QuizEntry, QuizState, QuizStatus, SelectionOutcome};
pub use registry::UnitRegistry;
pub use study::StudyState;
pub use zoom::{Extent, GestureOutcome, PanZoom, Transform, ZoomConfig};
