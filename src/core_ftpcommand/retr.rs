use log::debug;

use crate::core_channel::{ChannelError, SessionChannel};

/// RETR is accepted but produces no transfer of its own; pushing file bytes
/// is backend territory.
pub async fn handle_retr_command(
    sc: &mut SessionChannel,
    pathname: &str,
) -> Result<(), ChannelError> {
    debug!(
        "RETR {} left to the backend for {}",
        pathname, sc.session.username
    );
    Ok(())
}
