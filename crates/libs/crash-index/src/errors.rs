use elasticsearch::http::response::Exception;
use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexError>;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Invalid configuration: {details}")]
    InvalidConfiguration { details: String },

    #[error("Invalid Elasticsearch URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },

    #[error("Invalid index name template '{template}'")]
    InvalidTemplate { template: String },

    #[error("Invalid index name pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Index name '{name}' produced by the template does not match pattern '{pattern}'")]
    TemplatePatternMismatch { name: String, pattern: String },

    #[error("Elasticsearch error: {0}")]
    ElasticSearchError(#[from] elasticsearch::Error),

    #[error("Elasticsearch client builder error: {0}")]
    ElasticClientBuilderError(#[from] elasticsearch::http::transport::BuildError),

    #[error("Elasticsearch exception: status: {status:?}, error: {error:?}")]
    ElasticSearchHttpError {
        error: elasticsearch::http::response::Error,
        status: Option<u16>,
    },

    #[error("No response from elastic search despite the lack of exception")]
    ElasticsearchFailureWithoutException,

    #[error("serde_json error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Invalid json format: {msg} {json}")]
    InvalidJson { msg: String, json: Value },

    #[error("Failed to create elasticsearch index '{0}'")]
    IndexCreationFailed(String),

    #[error("Failed to delete elasticsearch index '{0}'")]
    IndexDeletionFailed(String),

    #[error("Could not read a date from index '{name}' with template '{template}'")]
    IndexNameParse { name: String, template: String },

    #[error("Elasticsearch health status unknown '{0}'")]
    UnknownClusterHealth(String),

    #[error("Elasticsearch cluster unhealthy: status '{status}', timed out: {timed_out}")]
    ClusterUnhealthy { status: String, timed_out: bool },

    #[error("No mapping available for doctype '{doctype}': {source}")]
    MappingUnavailable {
        doctype: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<Exception> for IndexError {
    fn from(exception: Exception) -> Self {
        Self::ElasticSearchHttpError {
            error: exception.error().clone(),
            status: exception.status(),
        }
    }
}

impl IndexError {
    /// Create requests racing for the same name are resolved by Elasticsearch,
    /// the losers get a 400 carrying one of these error types.
    pub fn is_index_already_exists(&self) -> bool {
        match self {
            IndexError::ElasticSearchHttpError { error, status } => {
                *status == Some(400)
                    && matches!(
                        error.ty(),
                        Some("resource_already_exists_exception")
                            | Some("index_already_exists_exception")
                    )
            }
            _ => false,
        }
    }
}
