//! Graph executor: drives one question from ROUTE to END

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::config::GraphConfig;
use crate::domain::evidence::join_contents;
use crate::domain::generation::generate_answer;
use crate::domain::grading::retry_with_backoff;
use crate::domain::{
    AnswerGenerator, AnswerGraph, AskRequest, ChatTurn, EvidenceGrader, ExecutionState,
    ExecutionTrace, GraphError, GraphNode, GraphOutcome, QuestionRouter, RetryConfig,
    RouteDecision,
};
use crate::infrastructure::observability::{
    record_generation_attempts, record_graph_transition, record_rag_request,
};
use crate::infrastructure::retrieval::RetrievalStage;
use crate::infrastructure::web_search::WebSearchStage;

/// Configuration for the graph executor
#[derive(Debug, Clone)]
pub struct RagGraphConfig {
    /// Generations allowed per request before the answer is returned as low confidence
    pub max_generation_attempts: u32,

    /// Maximum number of node visits (prevents runaway loops)
    pub max_steps: u32,

    /// Retry policy for grader calls
    pub grading_retry: RetryConfig,

    pub greeting_reply: String,
}

impl Default for RagGraphConfig {
    fn default() -> Self {
        Self::from(&GraphConfig::default())
    }
}

impl From<&GraphConfig> for RagGraphConfig {
    fn from(config: &GraphConfig) -> Self {
        Self {
            max_generation_attempts: config.max_generation_attempts.max(1),
            max_steps: config.max_steps,
            grading_retry: config.grading_retry(),
            greeting_reply: config.greeting_reply.clone(),
        }
    }
}

/// Mutable data for one execution
#[derive(Debug)]
struct Run {
    state: ExecutionState,
    trace: ExecutionTrace,
    low_confidence: bool,
}

/// Fixed-topology answer graph
#[derive(Debug)]
pub struct RagGraph {
    router: QuestionRouter,
    retrieval: RetrievalStage,
    grader: Arc<dyn EvidenceGrader>,
    generator: Arc<dyn AnswerGenerator>,
    web_search: WebSearchStage,
    config: RagGraphConfig,
}

impl RagGraph {
    pub fn new(
        router: QuestionRouter,
        retrieval: RetrievalStage,
        grader: Arc<dyn EvidenceGrader>,
        generator: Arc<dyn AnswerGenerator>,
        web_search: WebSearchStage,
    ) -> Self {
        Self {
            router,
            retrieval,
            grader,
            generator,
            web_search,
            config: RagGraphConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RagGraphConfig) -> Self {
        self.config = config;
        self
    }

    async fn execute(&self, run: &mut Run) -> Result<(), GraphError> {
        let mut node = GraphNode::Route;
        let mut steps = 0u32;

        while !node.is_terminal() {
            steps += 1;
            if steps > self.config.max_steps {
                return Err(GraphError::step_limit(self.config.max_steps));
            }

            let next = match node {
                GraphNode::Route => self.route(run).await,
                GraphNode::Retrieve => self.retrieve(run).await?,
                GraphNode::GradeDocuments => self.grade_documents(run).await?,
                GraphNode::Generate => self.generate(run).await?,
                GraphNode::WebSearch => self.search_web(run).await?,
                GraphNode::Greeting => self.greet(run),
                GraphNode::End => GraphNode::End,
            };

            debug!(from = %node, to = %next, step = steps, "Graph transition");
            record_graph_transition(node.as_str(), next.as_str());
            node = next;
        }

        Ok(())
    }

    async fn route(&self, run: &mut Run) -> GraphNode {
        let decision = self.router.route(&run.state.question).await;
        run.state.route = Some(decision);
        run.trace.record(GraphNode::Route, format!("decision: {}", decision));

        match decision {
            RouteDecision::Greeting => GraphNode::Greeting,
            RouteDecision::Retrieve => GraphNode::Retrieve,
            RouteDecision::WebSearch => GraphNode::WebSearch,
        }
    }

    async fn retrieve(&self, run: &mut Run) -> Result<GraphNode, GraphError> {
        let state = &mut run.state;
        let output = self
            .retrieval
            .retrieve(&state.question, state.user_id.as_deref(), &state.chat_history)
            .await
            .map_err(|e| GraphError::stage(GraphNode::Retrieve, e))?;

        let filtered = output.filtered_out();
        info!(
            documents = output.evidence.len(),
            filtered,
            "Retrieved documents"
        );

        state.enhanced_query = output.enhanced_query;
        if state.enhanced_query.is_some() {
            run.trace.record(
                GraphNode::Retrieve,
                format!("enhanced query: {}", state.retrieval_query()),
            );
        }
        run.trace.record(
            GraphNode::Retrieve,
            format!(
                "{} documents retrieved, {} removed by enrollment filter",
                output.retrieved, filtered
            ),
        );

        state.evidence = output.evidence;
        Ok(GraphNode::GradeDocuments)
    }

    /// Keeps relevant documents; any irrelevant one sends the run to web search.
    /// An empty evidence list counts as all relevant.
    async fn grade_documents(&self, run: &mut Run) -> Result<GraphNode, GraphError> {
        let question = run.state.question.as_str();
        let documents = std::mem::take(&mut run.state.evidence);
        let total = documents.len();
        let mut relevant = Vec::with_capacity(total);

        for document in documents {
            let content = document.content.as_str();
            let grader = self.grader.as_ref();
            let is_relevant =
                retry_with_backoff(&self.config.grading_retry, "grade_relevance", move || {
                    grader.grade_relevance(question, content)
                })
                .await
                .map_err(|e| GraphError::stage(GraphNode::GradeDocuments, e))?;

            if is_relevant {
                relevant.push(document);
            }
        }

        let use_web_search = relevant.len() < total;
        run.trace.record(
            GraphNode::GradeDocuments,
            format!("{} of {} documents relevant", relevant.len(), total),
        );
        info!(
            documents = total,
            relevant = relevant.len(),
            web_search = use_web_search,
            "Graded documents"
        );

        run.state.evidence = relevant;
        run.state.use_web_search = use_web_search;

        Ok(if use_web_search {
            GraphNode::WebSearch
        } else {
            GraphNode::Generate
        })
    }

    async fn generate(&self, run: &mut Run) -> Result<GraphNode, GraphError> {
        let state = &mut run.state;
        state.generation_attempts += 1;
        let attempt = state.generation_attempts;

        let output = generate_answer(self.generator.as_ref(), &state.question, &state.evidence)
            .await
            .map_err(|e| GraphError::stage(GraphNode::Generate, e))?;
        run.trace.record(
            GraphNode::Generate,
            format!(
                "attempt {}: {} chars from {} documents",
                attempt,
                output.answer.len(),
                state.evidence.len()
            ),
        );

        let evidence_text = join_contents(&state.evidence);
        let evidence = evidence_text.as_str();
        let question = state.question.as_str();
        let generation = output.answer.as_str();
        let grader = self.grader.as_ref();
        let retry = &self.config.grading_retry;

        let grounded = retry_with_backoff(retry, "grade_hallucination", move || {
            grader.grade_hallucination(evidence, generation)
        })
        .await
        .map_err(|e| GraphError::stage(GraphNode::Generate, e))?;

        let answers_question = if grounded {
            retry_with_backoff(retry, "grade_answer", move || {
                grader.grade_answer(question, generation)
            })
            .await
            .map_err(|e| GraphError::stage(GraphNode::Generate, e))?
        } else {
            false
        };

        state.generation = Some(output.answer);
        state.sources = Some(output.sources);

        let next = match (grounded, answers_question) {
            (true, true) => {
                run.trace
                    .record(GraphNode::Generate, "grounded and answers the question");
                return Ok(GraphNode::End);
            }
            (false, _) => {
                run.trace.record(GraphNode::Generate, "not grounded in evidence");
                GraphNode::Generate
            }
            (true, false) => {
                run.trace
                    .record(GraphNode::Generate, "grounded but does not answer the question");
                GraphNode::WebSearch
            }
        };

        if attempt >= self.config.max_generation_attempts {
            warn!(
                attempt,
                grounded,
                answers_question,
                "Generation attempts exhausted, returning low-confidence answer"
            );
            run.trace.record(
                GraphNode::Generate,
                format!("attempt limit {} reached, low confidence", attempt),
            );
            run.low_confidence = true;
            return Ok(GraphNode::End);
        }

        info!(attempt, next = %next, "Generation rejected by graders");
        Ok(next)
    }

    async fn search_web(&self, run: &mut Run) -> Result<GraphNode, GraphError> {
        let state = &mut run.state;
        let evidence = std::mem::take(&mut state.evidence);
        state.evidence = self
            .web_search
            .search(&state.question, evidence)
            .await
            .map_err(|e| GraphError::stage(GraphNode::WebSearch, e))?;

        run.trace.record(
            GraphNode::WebSearch,
            format!("appended web results, {} evidence items", state.evidence.len()),
        );
        Ok(GraphNode::Generate)
    }

    fn greet(&self, run: &mut Run) -> GraphNode {
        run.state.generation = Some(self.config.greeting_reply.clone());
        run.state.sources = Some(Vec::new());
        run.trace.record(GraphNode::Greeting, "canned greeting reply");
        GraphNode::End
    }
}

#[async_trait]
impl AnswerGraph for RagGraph {
    async fn ask(&self, request: AskRequest) -> Result<GraphOutcome, GraphError> {
        let request = request.normalized()?;
        info!(
            question_chars = request.question.len(),
            history = request.chat_history.len(),
            authenticated = request.user_id.is_some(),
            "Answering question"
        );

        let mut run = Run {
            state: ExecutionState::from_request(request),
            trace: ExecutionTrace::new(),
            low_confidence: false,
        };

        let result = self.execute(&mut run).await;
        let route = run.state.route.unwrap_or(RouteDecision::Retrieve);
        record_rag_request(route.as_str(), result.is_ok());

        if let Err(e) = result {
            error!(error = %e, node = ?e.node(), "Graph execution failed");
            return Err(e);
        }
        record_generation_attempts(run.state.generation_attempts);

        let Run {
            state,
            trace,
            low_confidence,
        } = run;
        let answer = state.generation.unwrap_or_default();
        let mut chat_history = state.chat_history;
        chat_history.push(ChatTurn::new(state.question, answer.clone()));

        Ok(GraphOutcome {
            answer,
            sources: state.sources.unwrap_or_default(),
            chat_history,
            trace,
            route,
            generation_attempts: state.generation_attempts,
            low_confidence,
        })
    }
}
