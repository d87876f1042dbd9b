use std::sync::Arc;

use finboard_api::{ApiClient, ApiError, StaticToken, UnauthorizedHandler};
use finboard_query::{FinanceQueries, QueryCache};

use crate::config::Config;

/// Logs rejected credentials so the user knows to refresh the token.
struct ExpiredTokenWarning;

impl UnauthorizedHandler for ExpiredTokenWarning {
    fn on_unauthorized(&self, error: &ApiError) {
        tracing::warn!(
            "API rejected the request ({}). Check FINBOARD_API_TOKEN.",
            error.message()
        );
    }
}

pub fn build_queries(config: &Config) -> anyhow::Result<FinanceQueries> {
    let mut client = ApiClient::new(config.api_config())?
        .with_unauthorized_handler(Arc::new(ExpiredTokenWarning));
    if let Some(token) = &config.api_token {
        client = client.with_credentials(Arc::new(StaticToken::new(token.clone())));
    }
    tracing::debug!("Using API at {}", config.api_url);

    let cache = QueryCache::new(config.cache_config());
    Ok(FinanceQueries::new(client, cache))
}
