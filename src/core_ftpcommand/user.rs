use std::sync::Arc;

use log::info;

use crate::core_channel::{ChannelError, ControlChannel, SessionChannel};
use crate::core_registry::EndpointHandlers;
use crate::server::ServerContext;
use crate::session::Session;

/// Handles the USER FTP command.
///
/// Starts a fresh login attempt: the current channel is wrapped in a new
/// session (any previous session state is discarded) and the Username-Check
/// handler is consulted. When it yields a password verifier, that verifier
/// is stored on the session for the PASS exchange; when it yields nothing
/// the client stays unauthenticated.
///
/// On a TLS-only server a non-secure channel is refused before the handler
/// is ever invoked.
pub async fn handle_user_command(
    mut channel: ControlChannel,
    context: &Arc<ServerContext>,
    registry: &Arc<dyn EndpointHandlers>,
    username: &str,
) -> Result<ControlChannel, ChannelError> {
    if context.is_tls_only && !channel.is_secure() {
        channel
            .respond(
                "530 This server does not permit login over \
                 a non-secure connection; \
                 connect using FTP-SSL with explicit AUTH TLS",
            )
            .await?;
        return Ok(channel);
    }

    info!("Received USER command with username: {}", username);
    let mut sc = SessionChannel {
        channel: channel.into_channel(),
        session: Session::login_as(username),
    };
    match registry.check_username(username).await {
        Some(check) => {
            sc.session.store_password_check(check);
            sc.channel.respond("331 User name okay, need password.").await?;
        }
        None => {
            info!("Username refused by backend: {}", username);
            sc.channel.respond("530 Not logged in.").await?;
        }
    }
    Ok(ControlChannel::Session(sc))
}
