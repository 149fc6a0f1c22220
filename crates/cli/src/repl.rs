//! The interactive chat loop.

use anyhow::Result;
use askpti::ConversationTurn;
use std::io::{BufRead, Write};
use tracing::warn;

const PROMPT: &str = "you> ";

/// Reads one query per line until EOF, `exit` or `quit`.
///
/// `answer` receives the query and the turns before it. Failed turns are
/// reported and left out of the history.
pub fn run_chat_loop<R, W, F>(input: R, mut output: W, mut answer: F) -> Result<Vec<ConversationTurn>>
where
    R: BufRead,
    W: Write,
    F: FnMut(&str, &[ConversationTurn]) -> Result<String>,
{
    let mut history: Vec<ConversationTurn> = Vec::new();
    writeln!(output, "Ask a question, or type 'exit' to leave.")?;
    write!(output, "{PROMPT}")?;
    output.flush()?;

    for line in input.lines() {
        let line = line?;
        let query = line.trim();
        if query.eq_ignore_ascii_case("exit") || query.eq_ignore_ascii_case("quit") {
            break;
        }
        if !query.is_empty() {
            match answer(query, &history) {
                Ok(text) => {
                    writeln!(output, "assistant> {text}")?;
                    history.push(ConversationTurn::user(query));
                    history.push(ConversationTurn::assistant(text));
                }
                Err(e) => {
                    warn!("Chat turn failed: {e:#}");
                    writeln!(output, "error> {e:#}")?;
                }
            }
        }
        write!(output, "{PROMPT}")?;
        output.flush()?;
    }

    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_loop_passes_prior_turns_and_stops_on_exit() {
        let input = Cursor::new("Where is PTI?\n\nAnd the fees?\nexit\nignored\n");
        let mut output = Vec::new();
        let mut seen_history_lengths = Vec::new();

        let history = run_chat_loop(input, &mut output, |query, history| {
            seen_history_lengths.push(history.len());
            Ok(format!("answer to {query}"))
        })
        .unwrap();

        assert_eq!(seen_history_lengths, vec![0, 2]);
        assert_eq!(history.len(), 4);
        assert_eq!(history[3], ConversationTurn::assistant("answer to And the fees?"));
        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("assistant> answer to Where is PTI?"));
        assert!(!printed.contains("ignored"));
    }

    #[test]
    fn test_failed_turn_is_reported_and_not_recorded() {
        let input = Cursor::new("boom\nquit\n");
        let mut output = Vec::new();

        let history = run_chat_loop(input, &mut output, |_, _| {
            Err(anyhow::anyhow!("model unavailable"))
        })
        .unwrap();

        assert!(history.is_empty());
        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("error> model unavailable"));
    }
}
