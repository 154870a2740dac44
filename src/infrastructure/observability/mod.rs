//! Observability infrastructure - Prometheus metrics

mod metrics;

pub use metrics::{
    create_metrics_router, init_metrics, record_generation_attempts, record_graph_transition,
    record_http_request, record_llm_request, record_rag_request, record_rate_limit_wait,
    LlmRequestMetricParams, PrometheusMetrics,
};
