//! Fetching the relation documents.
//!
//! Both documents are requested concurrently with caching disabled and the
//! load fails as a whole if either request fails.

use futures::future::try_join;
use log::{debug, info};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestCache, RequestInit, Response};

use crate::config::DataSources;
use crate::error::{LoadError, LoadResult};
use crate::lineage::RawRecord;

/// The two raw documents of one load.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Datasets {
	/// Table-level document.
	pub tables: Vec<RawRecord>,
	/// Field-level document.
	pub fields: Vec<RawRecord>,
}

fn js_message(value: &JsValue) -> String {
	value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// Decodes one relation document (a JSON array of records).
pub fn parse_records(url: &str, text: &str) -> LoadResult<Vec<RawRecord>> {
	serde_json::from_str(text).map_err(|source| LoadError::Parse {
		url: url.to_string(),
		source,
	})
}

/// GETs `url` with caching disabled and decodes the body.
pub async fn fetch_records(url: &str) -> LoadResult<Vec<RawRecord>> {
	let fetch_error = |message: String| LoadError::Fetch {
		url: url.to_string(),
		message,
	};
	let body_error = |value: JsValue| LoadError::Body {
		url: url.to_string(),
		message: js_message(&value),
	};

	let init = RequestInit::new();
	init.set_method("GET");
	init.set_cache(RequestCache::NoStore);
	let request = Request::new_with_str_and_init(url, &init).map_err(|e| fetch_error(js_message(&e)))?;

	let window = web_sys::window().ok_or_else(|| fetch_error("no window available".to_string()))?;
	let response = JsFuture::from(window.fetch_with_request(&request))
		.await
		.map_err(|e| fetch_error(js_message(&e)))?;
	let response: Response = response
		.dyn_into()
		.map_err(|e| fetch_error(js_message(&e)))?;

	if !response.ok() {
		return Err(LoadError::Http {
			status: response.status(),
			url: url.to_string(),
		});
	}

	let text = JsFuture::from(response.text().map_err(body_error)?)
		.await
		.map_err(body_error)?;
	let text = text.as_string().ok_or_else(|| LoadError::Body {
		url: url.to_string(),
		message: "response body is not text".to_string(),
	})?;
	debug!("lineage-graph: fetched {} bytes from {}", text.len(), url);
	parse_records(url, &text)
}

/// Fetches the table-level and field-level documents concurrently.
pub async fn fetch_datasets(sources: &DataSources) -> LoadResult<Datasets> {
	let (tables, fields) = try_join(
		fetch_records(&sources.tables_url),
		fetch_records(&sources.fields_url),
	)
	.await?;
	info!(
		"lineage-graph: loaded {} table records, {} field records",
		tables.len(),
		fields.len()
	);
	Ok(Datasets { tables, fields })
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_loose_records() {
		let text = r#"[
			{ "id": 1, "tabla_origen": "s_bani.a", "tabla_destino": "resultados.b",
			  "campo_origen": 7, "campo_destino": "id", "consulta": null },
			{ "tabla_destino": "proceso.c" }
		]"#;
		let records = parse_records("t.json", text).unwrap();
		assert_eq!(records.len(), 2);
		assert_eq!(records[0].campo_origen, Some(serde_json::json!(7)));
		assert_eq!(records[1].tabla_origen, None);
	}

	#[test]
	fn rejects_non_arrays() {
		let err = parse_records("t.json", r#"{ "records": [] }"#).unwrap_err();
		assert!(matches!(err, LoadError::Parse { ref url, .. } if url == "t.json"));
	}
}
