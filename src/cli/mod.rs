//! CLI module for the Course RAG Gateway
//!
//! - `serve`: HTTP API server (default deployment mode)
//! - `ask`: interactive console session against the same pipeline

pub mod ask;
pub mod serve;

use clap::{Parser, Subcommand};

/// Course RAG Gateway - graded question answering over course content
#[derive(Parser)]
#[command(name = "course-rag-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Ask questions from the console, keeping chat history between turns
    Ask(ask::AskArgs),
}
