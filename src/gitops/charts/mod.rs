//! Helm chart resolution and rendering for HelmReleases found in the tree.

pub mod helm;
pub mod loader;
pub mod renderer;
pub mod resolver;
pub mod values;

pub use helm::{HelmTemplateEngine, split_rendered_output};
pub use loader::{ChartMetadata, LoadedChart, load_chart};
pub use renderer::{ChartRenderer, RenderContext, RenderedTemplates, TemplateEngine};
pub use resolver::{ChartResolution, resolve_charts};
pub use values::{coalesce_values, restore_deletions};
