use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::env;
use uuid::Uuid;

use crate::auth::{IdentityProvider, Principal, StaticIdentity};
use crate::core::AppConfig;
use crate::session::{ChatSession, FREE_MESSAGE_LIMIT, HttpBackend, SendOutcome, SessionPhase};

pub async fn run() -> Result<()> {
    let mut rl = DefaultEditor::new().expect("Editor failed");

    let config = AppConfig::default();
    let backend = HttpBackend::new(&config.chat_api_url);
    let mut session = ChatSession::new(backend);

    // There is no browser popup to run a real sign-in flow in, so the
    // principal comes from the environment
    let user_id = env::var("KORA_USER_ID").unwrap_or_else(|_| Uuid::new_v4().to_string());
    let identity = StaticIdentity::new(Principal::new(&user_id));
    let mut principal_events = identity.subscribe();

    println!("Hi, I'm Kora. How can I help you today?");

    loop {
        // Pick up any principal change before the next prompt
        if principal_events.has_changed().unwrap_or(false) {
            session.apply_identity(principal_events.borrow_and_update().clone());
        }

        let prompt = if session.is_authenticated() {
            ">>> ".to_string()
        } else {
            format!("[{}/{}] >>> ", session.free_messages_used(), FREE_MESSAGE_LIMIT)
        };

        let readline = rl.readline(&prompt);
        match readline {
            Ok(line) => match line.trim() {
                "/signin" => {
                    let principal = identity.sign_in().await?;
                    println!("Signed in as {}", principal.id);
                }
                "/signout" => {
                    identity.sign_out().await?;
                    println!("Signed out");
                }
                "/quit" => break,
                _ => {
                    let outcome = session.send_message(&line).await;
                    match outcome {
                        SendOutcome::Sent => {
                            println!("{}", session.messages().last().unwrap().content);
                        }
                        SendOutcome::Gated => {
                            println!(
                                "You've reached the free message limit. Sign in to continue (/signin)."
                            );
                            // Dismiss so the next attempt re-prompts
                            // instead of sticking in the gated state
                            if session.phase() == SessionPhase::Gated {
                                session.dismiss_gate();
                            }
                        }
                        SendOutcome::Ignored => {}
                    }
                }
            },
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
