//! Metric query editor.

use serde_json::Value;

use common::errors::AppResult;
use common::models::MetricQuery;

use crate::registry::{BoxedComponent, ComponentInfo, PluginComponent};

/// Starting query for new annotation sources.
pub const DEFAULT_QUERY: &str = "SELECT
  extract(epoch from time_column) AS time,
  text_column as text,
  tags_column as tags
FROM
  metric_table
WHERE
  $__timeFilter(time_column)
";

/// Editor bound to a panel query target. Seeds nothing.
#[derive(Debug, Clone)]
pub struct OracleQueryCtrl {
    target: MetricQuery,
}

impl OracleQueryCtrl {
    /// Canonical implementation name.
    pub const NAME: &'static str = "OracleQueryCtrl";

    /// View template.
    pub const TEMPLATE_URL: &'static str = "partials/query.editor.html";

    /// Binds the editor to `target`.
    pub fn new(target: MetricQuery) -> Self {
        Self { target }
    }

    /// The bound query target.
    pub fn target(&self) -> &MetricQuery {
        &self.target
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
    Ok(Box::new(OracleQueryCtrl::new(MetricQuery::from_host_value(bound)?)))
}

impl PluginComponent for OracleQueryCtrl {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn template_url(&self) -> Option<&'static str> {
        Some(Self::TEMPLATE_URL)
    }

    fn bound_state(&self) -> AppResult<Value> {
        self.target.to_host_value()
    }
}
