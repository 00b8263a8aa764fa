//! Load errors. Everything past the load boundary is total.

/// Failure while fetching or decoding one of the relation documents.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
	/// The request could not be built or sent.
	#[error("request for {url} failed: {message}")]
	Fetch {
		/// Requested document.
		url: String,
		/// Browser-provided reason.
		message: String,
	},

	/// The server answered with a non-success status.
	#[error("HTTP {status} while loading {url}")]
	Http {
		/// Response status code.
		status: u16,
		/// Requested document.
		url: String,
	},

	/// The response body could not be read as text.
	#[error("could not read the body of {url}: {message}")]
	Body {
		/// Requested document.
		url: String,
		/// Browser-provided reason.
		message: String,
	},

	/// The body is not a JSON array of records.
	#[error("{url} is not a valid relation list: {source}")]
	Parse {
		/// Requested document.
		url: String,
		/// Decoder error.
		#[source]
		source: serde_json::Error,
	},
}

/// Result alias for the load path.
pub type LoadResult<T> = Result<T, LoadError>;
