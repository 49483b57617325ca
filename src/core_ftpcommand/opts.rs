use crate::core_channel::{ChannelError, ControlChannel};

/// Handles OPTS; required alongside FEAT. Only `UTF8 ON` is understood.
pub async fn handle_opts_command(
    channel: &mut ControlChannel,
    behavior: &str,
) -> Result<(), ChannelError> {
    if behavior.eq_ignore_ascii_case("UTF8 ON") {
        channel.respond("200 OK").await
    } else {
        channel.respond("451 Not supported").await
    }
}
