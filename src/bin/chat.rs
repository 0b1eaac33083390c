//! Unknot terminal client
//!
//! Walks through the questionnaire, then chats with the server.
//! `/quit` or end of input ends the session.

use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use unknot::collector::{Collector, StepDescriptor, StepKind};
use unknot::config::ClientConfig;
use unknot::session::{ConversationView, HttpAdviceClient, SessionSeed};
use unknot::transcript::{Role, Turn};

type Input = Lines<BufReader<Stdin>>;

const QUIT: &str = "/quit";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env()?;
    let client = HttpAdviceClient::new(&config.backend_url)?;
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    println!("Unknot: let's untangle this together.\n");

    let mut collector = Collector::new(config.questionnaire);
    let Some(seed) = run_questionnaire(&mut collector, &mut input).await? else {
        return Ok(());
    };

    println!("\nThinking...");
    let mut view = ConversationView::start(client, seed).await;
    for turn in view.transcript().turns() {
        print_turn(turn);
    }

    loop {
        let Some(line) = prompt(&mut input, "you").await? else {
            break;
        };
        if line.trim() == QUIT {
            break;
        }
        match view.send(&line).await {
            Ok(reply) => print_turn(reply),
            Err(e) => println!("({e})"),
        }
    }

    println!("Take care.");
    Ok(())
}

/// Returns `None` if input ends before the questionnaire is submitted
async fn run_questionnaire(
    collector: &mut Collector,
    input: &mut Input,
) -> std::io::Result<Option<SessionSeed>> {
    while let Some(step) = collector.current_step().cloned() {
        let position = collector.step_index().unwrap_or_default() + 1;
        println!("[{position}/{}] {}", collector.step_count(), step.label);

        match &step.kind {
            StepKind::Choice { options } => {
                for (i, option) in options.iter().enumerate() {
                    println!("  {}. {option}", i + 1);
                }
                let Some(line) = prompt(input, "choose").await? else {
                    return Ok(None);
                };
                let choice = resolve_option(options, &line);
                if let Err(e) = collector.choose(&choice) {
                    println!("({e})");
                }
            }
            StepKind::Text { .. } => {
                let Some(line) = prompt(input, &hint(&step)).await? else {
                    return Ok(None);
                };
                let result = collector.input(line.trim()).and_then(|()| collector.next());
                if let Err(e) = result {
                    println!("({e})");
                }
            }
            StepKind::LongText => {
                println!("  (finish with an empty line)");
                let Some(message) = read_paragraph(input, &hint(&step)).await? else {
                    return Ok(None);
                };
                let result = collector.input(&message).and_then(|()| collector.submit());
                match result {
                    Ok(summary) => return Ok(Some(SessionSeed::from_summary(&summary))),
                    Err(e) => println!("({e})"),
                }
            }
        }
    }
    Ok(None)
}

/// Accept either the option's number or its text
fn resolve_option(options: &[String], line: &str) -> String {
    let line = line.trim();
    line.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| options.get(i))
        .cloned()
        .or_else(|| {
            options
                .iter()
                .find(|o| o.eq_ignore_ascii_case(line))
                .cloned()
        })
        .unwrap_or_else(|| line.to_string())
}

fn hint(step: &StepDescriptor) -> String {
    step.placeholder.clone().unwrap_or_else(|| ">".to_string())
}

async fn prompt(input: &mut Input, label: &str) -> std::io::Result<Option<String>> {
    print!("{label}> ");
    std::io::stdout().flush()?;
    input.next_line().await
}

async fn read_paragraph(input: &mut Input, label: &str) -> std::io::Result<Option<String>> {
    let mut lines = Vec::new();
    loop {
        match prompt(input, label).await? {
            Some(line) if line.trim().is_empty() => break,
            Some(line) => lines.push(line),
            None if lines.is_empty() => return Ok(None),
            None => break,
        }
    }
    Ok(Some(lines.join("\n")))
}

fn print_turn(turn: &Turn) {
    let who = match turn.role {
        Role::User => "you",
        Role::Assistant => "unknot",
    };
    println!("\n{who}: {}\n", turn.content);
}
