use crate::error::PortalError;
use crate::models::{CatalogEntry, ResultPage, SearchQuery};
use crate::util::data_array;
use super::client::PortalClient;

/// Run one catalog search. An empty `text` still goes out as `text=` and
/// matches the whole catalog.
pub async fn search_service_catalog(client: &PortalClient, query: &SearchQuery) -> Result<ResultPage, PortalError> {
    let payload = client
        .call("GET", "/search/service_catalog", None, Some(query.to_params()))
        .await?;

    if payload.get("data").is_none() && !payload.is_array() {
        return Err(PortalError::Decode("search response has no data".into()));
    }
    let items: Vec<CatalogEntry> = data_array(&payload)
        .iter()
        .filter_map(CatalogEntry::from_value)
        .collect();
    let total_count = payload
        .get("count")
        .and_then(|c| c.as_u64())
        .unwrap_or(items.len() as u64);

    tracing::debug!(text = %query.text, offset = query.offset, returned = items.len(), total_count, "catalog search");
    Ok(ResultPage { items, total_count })
}
