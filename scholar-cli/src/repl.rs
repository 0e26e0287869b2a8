//! Line-oriented query prompt.

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use scholar_rag::RagPipeline;
use tracing::debug;

use crate::render::render_results;

/// What a line typed at the prompt asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptInput {
    /// `quit`, `exit` or `q`, in any case.
    Quit,
    /// Nothing but whitespace.
    Empty,
    /// A question, trimmed.
    Query(String),
}

impl PromptInput {
    /// Classify a raw input line.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        if ["quit", "exit", "q"].iter().any(|sentinel| line.eq_ignore_ascii_case(sentinel)) {
            return Self::Quit;
        }
        Self::Query(line.to_string())
    }
}

/// Read questions until the user quits, printing ranked results for each.
///
/// Ctrl-C and Ctrl-D end the loop like `quit`. A failing query ends it with
/// the error.
pub async fn run(pipeline: &RagPipeline) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    loop {
        println!("\n=== Query Interface ===");
        println!("Enter your research question (or 'quit' to exit)");

        let line = match rl.readline("\nQuery: ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };

        match PromptInput::parse(&line) {
            PromptInput::Quit => break,
            PromptInput::Empty => println!("Please enter a valid query."),
            PromptInput::Query(query) => {
                let _ = rl.add_history_entry(query.as_str());
                println!("\nSearching for relevant information...");
                let results = pipeline.query_default(&query).await?;
                print!("{}", render_results(&results));
            }
        }
    }

    debug!("prompt loop finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_quit_in_any_case() {
        for line in ["quit", "EXIT", " q ", "Quit\n"] {
            assert_eq!(PromptInput::parse(line), PromptInput::Quit, "{line:?}");
        }
    }

    #[test]
    fn blank_lines_are_empty() {
        assert_eq!(PromptInput::parse(""), PromptInput::Empty);
        assert_eq!(PromptInput::parse(" \t "), PromptInput::Empty);
    }

    #[test]
    fn anything_else_is_a_trimmed_query() {
        assert_eq!(
            PromptInput::parse("  capital of France "),
            PromptInput::Query("capital of France".into())
        );
        assert_eq!(PromptInput::parse("quitting time"), PromptInput::Query("quitting time".into()));
    }
}
