//! Annotation query editor.

use serde_json::Value;

use common::errors::AppResult;
use common::models::{is_falsy, AnnotationQuery};

use crate::query_ctrl::DEFAULT_QUERY;
use crate::registry::{BoxedComponent, ComponentInfo, PluginComponent};

/// Fills `rawQuery` with [`DEFAULT_QUERY`] when it is unset. Never replaces
/// text the user wrote.
pub fn apply_defaults(annotation: &mut AnnotationQuery) {
    if is_falsy(annotation.raw_query()) {
        tracing::debug!("Seeding default annotation query");
        annotation.set_raw_query(DEFAULT_QUERY);
    }
}

/// Editor bound to an annotation source.
#[derive(Debug, Clone)]
pub struct OracleAnnotationsQueryCtrl {
    annotation: AnnotationQuery,
}

impl OracleAnnotationsQueryCtrl {
    /// Canonical implementation name.
    pub const NAME: &'static str = "OracleAnnotationsQueryCtrl";

    /// View template.
    pub const TEMPLATE_URL: &'static str = "partials/annotations.editor.html";

    /// Binds the editor to `annotation`, seeding defaults.
    pub fn new(mut annotation: AnnotationQuery) -> Self {
        apply_defaults(&mut annotation);
        Self { annotation }
    }

    /// The bound annotation.
    pub fn annotation(&self) -> &AnnotationQuery {
        &self.annotation
    }

    /// Releases the bound annotation back to the host.
    pub fn into_annotation(self) -> AnnotationQuery {
        self.annotation
    }

    /// Registry entry for this editor.
    pub fn info() -> ComponentInfo {
        ComponentInfo {
            implementation: Self::NAME,
            template_url: Some(Self::TEMPLATE_URL),
            factory: create,
        }
    }
}

fn create(bound: Value) -> AppResult<BoxedComponent> {
    let annotation = AnnotationQuery::from_host_value(bound)?;
    Ok(Box::new(OracleAnnotationsQueryCtrl::new(annotation)))
}

impl PluginComponent for OracleAnnotationsQueryCtrl {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn template_url(&self) -> Option<&'static str> {
        Some(Self::TEMPLATE_URL)
    }

    fn bound_state(&self) -> AppResult<Value> {
        Ok(self.annotation.to_host_value())
    }
}
