//! Text shown to the user at the prompt.

use std::fmt::Write;

use scholar_rag::QueryResult;

/// Shown when a query matches nothing.
pub const NO_RESULTS: &str = "No relevant information found for your query.";

/// Shown instead of the error when a run fails; details go to the log.
pub const GENERIC_FAILURE: &str = "An error occurred. Please check the logs for details.";

/// Format ranked results, nearest first, with a similarity of `1 - distance`.
pub fn render_results(results: &[QueryResult]) -> String {
    if results.is_empty() {
        return format!("\n{NO_RESULTS}\n");
    }

    let mut out = String::from("\nFound relevant information:\n----------------------------\n");
    for (idx, result) in results.iter().enumerate() {
        // Writing to a String cannot fail.
        let _ = write!(
            out,
            "\nResult {} (Similarity: {:.2}):\n---\n{}\n---\n",
            idx + 1,
            result.similarity(),
            result.text
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholar_rag::Metadata;

    fn result(text: &str, distance: f32) -> QueryResult {
        QueryResult { id: "0".into(), text: text.into(), metadata: Metadata::new(), distance }
    }

    #[test]
    fn empty_results_print_the_no_results_message() {
        assert_eq!(render_results(&[]), format!("\n{NO_RESULTS}\n"));
    }

    #[test]
    fn results_are_numbered_with_two_decimal_similarity() {
        let out = render_results(&[result("Paris is the capital of France.", 0.1234), result("Tokyo.", 0.5)]);

        assert!(out.contains("\nResult 1 (Similarity: 0.88):\n---\nParis is the capital of France.\n---\n"));
        assert!(out.contains("\nResult 2 (Similarity: 0.50):\n---\nTokyo.\n---\n"));
        assert!(out.find("Result 1").unwrap() < out.find("Result 2").unwrap());
    }
}
