use crate::web::{self, AppState, UiSettings};
use application::rag_service::LiveRagService;
use clap::{Parser, Subcommand};
use colored::Colorize;
use domain::models::RagAnswer;
use infrastructure::config::Config;
use shared::prompt::ask_text;
use shared::types::Result;
use shared::utils::is_blank;
use std::sync::Arc;

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a question or prompt.";

#[derive(Parser, Debug)]
#[command(name = "pdf_rag")]
#[command(about = "PDF RAG Summarizer: answers questions from an indexed PDF collection")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the web UI
    Serve {
        /// Address to listen on (defaults to RAG_BIND_ADDR)
        #[arg(long)]
        addr: Option<String>,
    },

    /// Answer a single question in the terminal
    Ask {
        /// Number of context chunks to retrieve (defaults to RAG_DEFAULT_TOP_K)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Print the retrieved contexts after the answer
        #[arg(long)]
        show_context: bool,

        /// The question or summary request (asked interactively when omitted)
        #[arg(trailing_var_arg = true)]
        args: Vec<String>,
    },
}

pub struct CliApp {
    config: Config,
}

impl CliApp {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn run(&self, cli: Cli) -> Result<()> {
        let service = LiveRagService::from_config(&self.config)?;
        match cli.command {
            Command::Serve { addr } => {
                let addr = addr.unwrap_or_else(|| self.config.bind_addr.clone());
                let settings = UiSettings::from_config(&self.config);
                let state = Arc::new(AppState::new(service, settings));
                web::serve(state, &addr).await
            }
            Command::Ask {
                top_k,
                show_context,
                args,
            } => self.handle_ask(&service, &args, top_k, show_context).await,
        }
    }

    async fn handle_ask(
        &self,
        service: &LiveRagService,
        args: &[String],
        top_k: Option<usize>,
        show_context: bool,
    ) -> Result<()> {
        let question = if args.is_empty() {
            ask_text("Enter your question or summary request")?
        } else {
            args.join(" ")
        };
        if is_blank(&question) {
            anyhow::bail!(EMPTY_QUERY_MESSAGE);
        }

        let top_k = top_k.unwrap_or(self.config.default_top_k);
        eprintln!("{}", "Retrieving context and generating summary...".dimmed());
        let answer = service.answer(&question, top_k).await?;
        print!("{}", render_answer(&answer, show_context));
        Ok(())
    }
}

/// Terminal rendering of a successful answer, optionally followed by its contexts.
pub fn render_answer(answer: &RagAnswer, show_context: bool) -> String {
    let mut out = format!("{}\n{}\n", "Results".bold().underline(), answer.answer.trim_end());
    if show_context {
        out.push_str(&format!("\n{}\n", "Retrieved Contexts".bold().underline()));
        for (i, ctx) in answer.contexts.iter().enumerate() {
            out.push_str(&format!("{}\n{}\n\n", format!("Context {}:", i + 1).cyan(), ctx));
        }
    }
    out
}
