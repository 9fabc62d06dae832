//! `shopchat send` -- one exchange, then exit.

use shopchat_types::error::ExchangeError;

use super::ChatArgs;
use super::chat::loop_runner::exchange_with_spinner;
use super::chat::renderer;
use crate::state::AppState;

pub async fn send_once(
    state: &AppState,
    message: &str,
    args: &ChatArgs,
    json: bool,
) -> anyhow::Result<()> {
    let session_id = args.session_id();
    let instance = state.build_instance(&session_id, !args.member);

    let result = if json {
        instance.send(message, args.conversation).await
    } else {
        exchange_with_spinner(&instance, message, args.conversation).await
    };

    // Member replies and the history snapshot update in the background.
    instance.flush().await;

    match result {
        Ok(outcome) if json => {
            println!("{}", serde_json::to_string_pretty(&renderer::outcome_json(&outcome))?);
        }
        Ok(outcome) => {
            println!();
            renderer::print_outcome(&outcome);
            println!();
        }
        Err(ExchangeError::MissingCredential) => {
            anyhow::bail!(
                "no completion API token configured (set SHOPCHAT_AI_TOKEN or [ai].token)"
            );
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
