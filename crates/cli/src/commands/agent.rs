//! `memoh agent` — Interactive or single-message chat mode.

use futures::StreamExt;
use memoh_agent::{AgentSession, AgentStreamEvent};
use memoh_core::Role;
use std::io::Write;
use tokio::io::{self, AsyncBufReadExt, BufReader};

pub async fn run(message: Option<String>, stream: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let agent = super::session_builder(&config)?.build();

    if let Some(msg) = message {
        return reply(&agent, msg, stream).await;
    }

    println!();
    println!("  Memoh Agent — Interactive Mode");
    println!();
    println!("  Model:     {} ({})", config.model.model, config.model.client_type);
    println!("  Skills:    {} available", config.agent.skills.len());
    println!("  Servers:   {} configured", config.mcp.servers.len());
    println!("  Memory:    {}", config.memory_path().display());
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(io::stdin()).lines();
    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "exit" | "quit" | "/exit" | "/quit") {
            break;
        }

        if let Err(e) = reply(&agent, line.to_string(), stream).await {
            eprintln!("  Error: {e}");
        }
        println!();
    }

    println!("  Goodbye!");
    Ok(())
}

async fn reply(agent: &AgentSession, text: String, stream: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !stream {
        let result = agent.ask(text).await?;
        let answer = result
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::Assistant && !m.content.is_empty());
        if let Some(answer) = answer {
            for line in answer.content.lines() {
                println!("  {line}");
            }
        }
        return Ok(());
    }

    let mut events = agent.ask_stream(text);
    while let Some(event) = events.next().await {
        match event {
            AgentStreamEvent::Chunk { content } => {
                print!("{content}");
                std::io::stdout().flush()?;
            }
            AgentStreamEvent::ToolCall { name, .. } => eprintln!("  [tool] {name}"),
            AgentStreamEvent::ToolResult { name, success: false, output, .. } => {
                eprintln!("  [tool] {name} failed: {output}");
            }
            AgentStreamEvent::Done { truncated: true, steps, .. } => {
                eprintln!("\n  [stopped after {steps} steps]");
            }
            _ => {}
        }
    }
    println!();
    events.finish().await?;
    Ok(())
}
