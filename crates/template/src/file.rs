use std::collections::BTreeMap;
use std::path::Path;

use hunt_rules::RuleLoader;
use serde::Serialize;

use crate::error::QueryFileError;
use crate::renderer::render;

/// Load a query file and render its `kql` template in one step.
///
/// Only the loader's minimal contract applies (a mapping with a string
/// `kql`); full schema validation is the caller's choice.
pub fn render_query_file<V: Serialize>(
    path: &Path,
    variables: &BTreeMap<String, V>,
) -> Result<String, QueryFileError> {
    let query = RuleLoader::load_query(path)?;
    Ok(render(&query.kql, variables)?)
}
