use crate::core_channel::{ChannelError, ControlChannel};

/// Handles the TYPE FTP command (RFC 959). Image and ASCII are accepted;
/// everything else gets a polite refusal.
pub async fn handle_type_command(
    channel: &mut ControlChannel,
    type_code: &str,
) -> Result<(), ChannelError> {
    match type_code {
        "I" | "A" => channel.respond("200 OK").await,
        _ => channel.respond("202 Not supported").await,
    }
}
