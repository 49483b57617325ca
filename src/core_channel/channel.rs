use log::{debug, trace};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_rustls::TlsAcceptor;

use crate::core_channel::error::ChannelError;

enum ControlStream {
    Plain(TcpStream),
    Secure(Box<tokio_rustls::server::TlsStream<TcpStream>>),
}

impl ControlStream {
    async fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            ControlStream::Plain(s) => s.read(buf).await,
            ControlStream::Secure(s) => s.read(buf).await,
        }
    }

    async fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        match self {
            ControlStream::Plain(s) => s.write_all(buf).await,
            ControlStream::Secure(s) => s.write_all(buf).await,
        }
    }

    async fn flush(&mut self) -> std::io::Result<()> {
        match self {
            ControlStream::Plain(s) => s.flush().await,
            ControlStream::Secure(s) => s.flush().await,
        }
    }

    async fn shutdown(&mut self) -> std::io::Result<()> {
        match self {
            ControlStream::Plain(s) => s.shutdown().await,
            ControlStream::Secure(s) => s.shutdown().await,
        }
    }
}

/// One control connection, plain or TLS-secured.
///
/// The `secure` flag is fixed at construction: a plain channel never becomes
/// secure in place, it is superseded by the new channel returned from
/// [`Channel::upgrade_to_secure`]. Inbound bytes are buffered here rather
/// than in a reader wrapper so that an upgrade cannot drop or replay them.
pub struct Channel {
    stream: ControlStream,
    read_buf: Vec<u8>,
    open: bool,
    secure: bool,
    conn_id: u64,
    /// Verb of the last dispatched command, used for sequence checks (PASS).
    pub previous_command: Option<String>,
    /// Protection Buffer Size received (RFC 2228).
    pub pbsz_received: bool,
}

impl Channel {
    pub fn new(socket: TcpStream, conn_id: u64) -> Self {
        Self {
            stream: ControlStream::Plain(socket),
            read_buf: Vec::new(),
            open: true,
            secure: false,
            conn_id,
            previous_command: None,
            pbsz_received: false,
        }
    }

    pub fn conn_id(&self) -> u64 {
        self.conn_id
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// Writes raw text to the peer and waits for the flush.
    pub async fn write_text(&mut self, text: &str) -> Result<(), ChannelError> {
        if !self.open {
            return Err(ChannelError::NotOpen);
        }
        if let Err(e) = self.write_flush(text.as_bytes()).await {
            self.open = false;
            return Err(ChannelError::Io(e));
        }
        Ok(())
    }

    async fn write_flush(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.stream.write_all(bytes).await?;
        self.stream.flush().await
    }

    /// Sends one CRLF-terminated reply line (or prepared multi-line block).
    pub async fn respond(&mut self, msg: &str) -> Result<(), ChannelError> {
        trace!(">> {}", msg);
        self.write_text(&format!("{}\r\n", msg)).await
    }

    /// Reads the next inbound line, without the trailing CRLF.
    ///
    /// `Ok(None)` means the peer closed the connection.
    pub async fn read_line(&mut self) -> Result<Option<String>, ChannelError> {
        loop {
            if !self.open {
                return Ok(None);
            }
            if let Some(pos) = self.read_buf.iter().position(|b| *b == b'\n') {
                let mut line: Vec<u8> = self.read_buf.drain(..=pos).collect();
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
            }
            let mut chunk = [0u8; 1024];
            match self.stream.read(&mut chunk).await {
                Ok(0) => {
                    self.open = false;
                    return Ok(None);
                }
                Ok(n) => self.read_buf.extend_from_slice(&chunk[..n]),
                Err(e) => {
                    self.open = false;
                    return Err(ChannelError::Io(e));
                }
            }
        }
    }

    /// Resolves once the peer closes the control connection.
    ///
    /// Used alongside a passive-pool wait so that a client that walks away
    /// mid-PASV does not park a slot forever. Bytes that arrive while
    /// waiting are retained in the line buffer, so pipelined commands are
    /// not lost.
    pub async fn wait_for_shutdown(&mut self) {
        loop {
            if !self.open {
                return;
            }
            let mut chunk = [0u8; 512];
            match self.stream.read(&mut chunk).await {
                Ok(0) | Err(_) => {
                    self.open = false;
                    return;
                }
                Ok(n) => self.read_buf.extend_from_slice(&chunk[..n]),
            }
        }
    }

    /// Idempotent close: marks the channel not-open and shuts the socket
    /// down. Safe to call repeatedly or after an I/O error.
    pub async fn close(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        if let Err(e) = self.stream.shutdown().await {
            debug!("error while closing control channel: {}", e);
        }
    }

    /// Performs the in-place TLS upgrade (server role) and returns the
    /// channel that supersedes this one.
    ///
    /// The returned channel starts with a clean command history and no PBSZ
    /// state, but keeps any bytes already buffered from the wire. Fails with
    /// [`ChannelError::AlreadySecure`] on a secure channel and
    /// [`ChannelError::Handshake`] when negotiation does not complete; in
    /// the latter case the connection is unusable and must be dropped.
    pub async fn upgrade_to_secure(self, acceptor: &TlsAcceptor) -> Result<Channel, ChannelError> {
        let socket = match self.stream {
            ControlStream::Plain(s) => s,
            ControlStream::Secure(_) => return Err(ChannelError::AlreadySecure),
        };
        let tls_stream = acceptor
            .accept(socket)
            .await
            .map_err(ChannelError::Handshake)?;
        Ok(Channel {
            stream: ControlStream::Secure(Box::new(tls_stream)),
            read_buf: self.read_buf,
            open: true,
            secure: true,
            conn_id: self.conn_id,
            previous_command: None,
            pbsz_received: false,
        })
    }
}
