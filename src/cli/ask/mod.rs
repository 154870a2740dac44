//! Ask command - console session over the answer graph

use std::io::Write;

use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::AppConfig;
use crate::domain::{AnswerGraph, AskRequest, ChatTurn, GraphOutcome, Source};
use crate::infrastructure::logging::init_logging;

#[derive(Args, Debug, Clone)]
pub struct AskArgs {
    /// Print the execution trace after each answer
    #[arg(long)]
    pub trace: bool,

    /// Member id used for enrollment filtering
    #[arg(long)]
    pub user_id: Option<String>,

    /// Answer a single question and exit
    #[arg(long, short)]
    pub question: Option<String>,

    /// Keep the configured log level instead of warnings only
    #[arg(long, short)]
    pub verbose: bool,
}

pub async fn run(args: AskArgs) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let mut logging = config.logging.clone();
    if !args.verbose {
        logging.level = "warn".to_string();
    }
    init_logging(&logging);

    let state = crate::create_app_state_with_config(&config).await?;
    let graph = state.graph;

    if let Some(question) = args.question.clone() {
        let outcome = graph.ask(request(&args, question, Vec::new())).await?;
        print_outcome(&outcome, args.trace);
        return Ok(());
    }

    repl(graph.as_ref(), &args).await
}

async fn repl(graph: &dyn AnswerGraph, args: &AskArgs) -> anyhow::Result<()> {
    println!("Ask a question. Type /reset to clear history, /quit to exit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut history: Vec<ChatTurn> = Vec::new();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/reset" => {
                history.clear();
                println!("History cleared.");
                continue;
            }
            question => match graph.ask(request(args, question.to_string(), history.clone())).await {
                Ok(outcome) => {
                    print_outcome(&outcome, args.trace);
                    history = outcome.chat_history;
                }
                Err(e) => eprintln!("Error processing question: {}", e),
            },
        }
    }

    Ok(())
}

fn request(args: &AskArgs, question: String, history: Vec<ChatTurn>) -> AskRequest {
    let mut request = AskRequest::new(question).with_chat_history(history);
    request.user_id = args.user_id.clone();
    request
}

fn print_outcome(outcome: &GraphOutcome, show_trace: bool) {
    println!("\n{}\n", outcome.answer);

    if outcome.low_confidence {
        println!("(low confidence: the answer did not pass grading)\n");
    }

    if !outcome.sources.is_empty() {
        println!("Sources:");
        for source in &outcome.sources {
            println!("  {}", describe_source(source));
        }
        println!();
    }

    if show_trace {
        println!("{}\n", outcome.trace.render());
    }
}

fn describe_source(source: &Source) -> String {
    let title = ["course_title", "chapter_title", "lesson_title"]
        .iter()
        .filter_map(|key| source.get(key).and_then(|v| v.as_str()))
        .collect::<Vec<_>>()
        .join(" / ");

    match (title.is_empty(), source.doc_type()) {
        (true, Some(doc_type)) => format!("[{}] {}", source.rank, doc_type),
        (true, None) => format!("[{}] untitled", source.rank),
        (false, _) => format!("[{}] {}", source.rank, title),
    }
}
