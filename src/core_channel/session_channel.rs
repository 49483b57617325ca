use crate::core_channel::channel::Channel;
use crate::core_channel::error::ChannelError;
use crate::session::Session;

/// A transport channel decorated with per-connection session state.
///
/// Composition, not inheritance: the session delegates all transport
/// concerns to the wrapped channel and is discarded whenever the channel is
/// replaced (TLS upgrade happens pre-login).
pub struct SessionChannel {
    pub channel: Channel,
    pub session: Session,
}

/// The dispatcher's single mutable "current channel" reference.
///
/// USER swaps `Bare` for `Session`, AUTH swaps either variant for a fresh
/// `Bare` secure channel. All later lines on the connection go through the
/// replacement exclusively.
pub enum ControlChannel {
    Bare(Channel),
    Session(SessionChannel),
}

impl ControlChannel {
    pub fn channel(&self) -> &Channel {
        match self {
            ControlChannel::Bare(c) => c,
            ControlChannel::Session(sc) => &sc.channel,
        }
    }

    pub fn channel_mut(&mut self) -> &mut Channel {
        match self {
            ControlChannel::Bare(c) => c,
            ControlChannel::Session(sc) => &mut sc.channel,
        }
    }

    /// Unwraps the transport channel, dropping any session state.
    pub fn into_channel(self) -> Channel {
        match self {
            ControlChannel::Bare(c) => c,
            ControlChannel::Session(sc) => sc.channel,
        }
    }

    pub fn session_channel_mut(&mut self) -> Option<&mut SessionChannel> {
        match self {
            ControlChannel::Bare(_) => None,
            ControlChannel::Session(sc) => Some(sc),
        }
    }

    pub fn is_open(&self) -> bool {
        self.channel().is_open()
    }

    pub fn is_secure(&self) -> bool {
        self.channel().is_secure()
    }

    pub async fn respond(&mut self, msg: &str) -> Result<(), ChannelError> {
        self.channel_mut().respond(msg).await
    }

    pub async fn read_line(&mut self) -> Result<Option<String>, ChannelError> {
        self.channel_mut().read_line().await
    }

    pub async fn close(&mut self) {
        self.channel_mut().close().await;
    }

    pub fn set_previous_command(&mut self, verb: &str) {
        self.channel_mut().previous_command = Some(verb.to_string());
    }
}
