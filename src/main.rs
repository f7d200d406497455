use std::io::{self, BufRead, Write};

use ghosthand::agent::engine::AgentLoop;
use ghosthand::agent::state::LoopConfig;
use ghosthand::config::{self, CredentialStore};
use ghosthand::errors::{GhosthandError, GhosthandResult};
use ghosthand::executor::device::EnigoDevice;
use ghosthand::executor::input::InputActuator;
use ghosthand::frontend::Frontend;
use ghosthand::llm::client::GeminiClient;
use ghosthand::perception::screenshot::XcapScreen;

/// Console rendering of the display collaborator: instructions come from
/// stdin, status and logs go to stdout, errors to stderr.
struct ConsoleFrontend;

impl Frontend for ConsoleFrontend {
    fn show_status(&mut self, text: &str) {
        println!("[status] {text}");
    }

    fn show_log_window(&mut self, lines: &[String]) {
        for line in lines {
            println!("  {line}");
        }
    }

    fn show_error(&mut self, text: &str) {
        eprintln!("[error] {text}");
    }

    fn next_instruction(&mut self) -> Option<String> {
        let stdin = io::stdin();
        loop {
            print!("> ");
            io::stdout().flush().ok();
            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => return None,
                Ok(_) => {
                    let trimmed = line.trim();
                    if trimmed == ":quit" {
                        return None;
                    }
                    if !trimmed.is_empty() {
                        return Some(trimmed.to_string());
                    }
                }
            }
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load .env file if present (ignore error if not found)
    let _ = dotenvy::dotenv();

    let mut frontend = ConsoleFrontend;
    if let Err(e) = run(&mut frontend) {
        frontend.show_error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(frontend: &mut ConsoleFrontend) -> GhosthandResult<()> {
    let store = CredentialStore::open()?;
    let api_key = resolve_credential(&store, frontend)?;

    let device = EnigoDevice::new()?;
    let mut agent = AgentLoop::new(
        XcapScreen,
        GeminiClient::new(api_key),
        InputActuator::new(device),
        LoopConfig::default(),
    );

    frontend.show_status("Ghosthand ready. Enter an instruction (:quit to exit).");
    while let Some(instruction) = frontend.next_instruction() {
        if let Err(e) = agent.run_instruction(&instruction, frontend) {
            // Capability failure: the step aborts, the session continues.
            tracing::error!(error = %e, "step aborted");
            frontend.show_error(&e.to_string());
        }
    }
    Ok(())
}

/// Credential bootstrap: environment variable, then the stored file, then an
/// interactive prompt. A key is persisted only after it passes validation.
fn resolve_credential(
    store: &CredentialStore,
    frontend: &mut ConsoleFrontend,
) -> GhosthandResult<String> {
    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
        config::validate_key(&key)?;
        store.save(&key)?;
        return Ok(key);
    }

    if let Some(key) = store.load()? {
        config::validate_key(&key)?;
        return Ok(key);
    }

    frontend.show_status("Enter your Gemini API key:");
    match frontend.next_instruction() {
        Some(key) => {
            config::validate_key(&key)?;
            store.save(&key)?;
            Ok(key)
        }
        None => Err(GhosthandError::Config("no API key provided".into())),
    }
}
