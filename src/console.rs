//! Console display of the reasoning trace.
//!
//! A pure observer of the engine's event stream: renders the query banner,
//! thinking lines, gate checks, tool round-trips, the simulated token stream
//! and the final answer. Has no influence on control flow.

use std::io::Write;

use cotools_core::{AgentEvent, EngineObserver, InvocationOutcome, ToolParams};

/// Tools whose results are fenced off as blocks when displayed
const BLOCK_RESULT_TOOLS: &[&str] = &["WebSearch", "NewsSearch"];

/// Maximum lines of fetched web content shown before truncation
const MAX_CONTENT_LINES: usize = 10;

/// Observer printing the reasoning trace to stdout
#[derive(Debug, Default)]
pub struct ConsoleObserver;

impl ConsoleObserver {
    pub fn new() -> Self {
        Self
    }

    fn format_params(params: &ToolParams) -> String {
        params
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn print_result(tool_name: &str, result: &str) {
        println!("\nResult from {tool_name}:\n");
        if BLOCK_RESULT_TOOLS.contains(&tool_name) {
            println!("{}", "-".repeat(70));
            println!("{result}");
            println!("{}", "-".repeat(70));
        } else if tool_name == "WebContentFetcher" {
            println!("{}", "-".repeat(70));
            let lines: Vec<&str> = result.lines().collect();
            if lines.len() > MAX_CONTENT_LINES {
                println!("{}", lines[..MAX_CONTENT_LINES].join("\n"));
                println!("...");
                println!("[Content truncated, total length: {} characters]", result.len());
            } else {
                println!("{result}");
            }
            println!("{}", "-".repeat(70));
        } else {
            println!("{result}");
        }
    }
}

impl EngineObserver for ConsoleObserver {
    fn on_event(&self, event: &AgentEvent) {
        match event {
            AgentEvent::QueryReceived { query, .. } => {
                println!("\n{}", "=".repeat(80));
                println!("User Query: {query}");
                println!("{}", "=".repeat(80));
            }
            AgentEvent::StepThinking { message, .. } => {
                println!("Thinking... {message}");
            }
            AgentEvent::GateScored { score, .. } => {
                println!("Tool Check: Score = {score:.2}");
            }
            AgentEvent::ToolSelected {
                tool_name,
                description,
                similarity,
                ..
            } => {
                println!("\n{}", "-".repeat(40));
                println!("Selected Tool: {tool_name} (Score: {similarity:.2})");
                println!("Description: {description}");
                println!("{}", "-".repeat(40));
            }
            AgentEvent::ToolCalled {
                tool_name,
                parameters,
                ..
            } => {
                println!("Calling: {tool_name}({})", Self::format_params(parameters));
            }
            AgentEvent::ToolResult {
                tool_name, outcome, ..
            } => match outcome {
                InvocationOutcome::Success(result) => Self::print_result(tool_name, result),
                InvocationOutcome::Failure(reason) => {
                    println!("\nResult from {tool_name}: FAILED ({reason})");
                }
            },
            AgentEvent::TokenEmitted { token, .. } => {
                print!("{token} ");
                let _ = std::io::stdout().flush();
            }
            AgentEvent::FinalResult { answer, .. } => {
                println!("\n{}", "=".repeat(80));
                println!("Final Answer:");
                println!("{answer}");
                println!("{}", "=".repeat(80));
            }
        }
    }
}
