//! Shared application state and collaborator assembly.

use std::sync::Arc;

use docent_actions::{JsonlSubmissionLog, RestDeliveryClient, RestNotifyClient};
use docent_actions::traits::{DocumentDelivery, Notifier, SubmissionLog};
use docent_domain::config::Config;
use docent_domain::error::Result;
use docent_engine::{
    AnalyticsSink, Executor, Generator, Pipeline, RestAnalyticsSink, Telemetry,
};
use docent_providers::OpenAiCompatProvider;
use docent_retrieval::{RestSearchClient, Retriever};

use crate::session_lock::SessionLockMap;

/// Shared application state passed to all API handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: Arc<Pipeline>,
    pub session_locks: Arc<SessionLockMap>,
}

/// Assemble the pipeline from configuration: REST collaborators where
/// configured, `None` where optional backends were left out.
pub fn build_pipeline(config: Arc<Config>) -> Result<Pipeline> {
    let backend = Arc::new(RestSearchClient::new(&config.retrieval)?);
    let retriever = Retriever::new(backend, &config.retrieval);

    let provider = Arc::new(OpenAiCompatProvider::new(&config.llm)?);
    let generator = Generator::new(provider, &config.llm, &config.conversation);

    let delivery: Option<Arc<dyn DocumentDelivery>> = match &config.actions.delivery {
        Some(cfg) => Some(Arc::new(RestDeliveryClient::new(
            cfg,
            config.actions.dispatch_timeout_ms,
        )?)),
        None => None,
    };
    let notifier: Option<Arc<dyn Notifier>> = match &config.actions.notify {
        Some(cfg) => Some(Arc::new(RestNotifyClient::new(
            cfg,
            config.actions.dispatch_timeout_ms,
        )?)),
        None => None,
    };
    let submissions: Option<Arc<dyn SubmissionLog>> = match &config.actions.submissions {
        Some(cfg) => Some(Arc::new(JsonlSubmissionLog::new(&cfg.path)?)),
        None => None,
    };
    let executor = Executor::new(&config.actions, delivery, notifier, submissions);

    let sink: Option<Arc<dyn AnalyticsSink>> = match &config.analytics.base_url {
        Some(url) => Some(Arc::new(RestAnalyticsSink::new(url, &config.analytics)?)),
        None => None,
    };
    let telemetry = Telemetry::new(sink);

    Ok(Pipeline::new(config, retriever, generator, executor, telemetry))
}
