use log::info;

use crate::core_channel::{ChannelError, SessionChannel};

/// Handles the PASS FTP command.
///
/// Requires USER to be the immediately preceding command, then consumes the
/// single-use password verifier stored on the session. The verifier is
/// spent whatever the outcome.
pub async fn handle_pass_command(
    sc: &mut SessionChannel,
    password: &str,
) -> Result<(), ChannelError> {
    if sc.channel.previous_command.as_deref() != Some("USER") {
        return sc.channel.respond("503 Bad sequence of commands.").await;
    }
    match sc.session.take_password_check() {
        None => sc.channel.respond("530 Not logged in.").await,
        Some(check) => {
            if check(password.to_string()).await {
                sc.session.authorize();
                info!("Login succeeded for {}", sc.session.username);
                sc.channel.respond("230 User logged in, proceed.").await
            } else {
                info!("Login failed for {}", sc.session.username);
                sc.channel.respond("530 Not logged in.").await
            }
        }
    }
}
