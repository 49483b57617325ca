use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use futures::future::FutureExt;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

use passerelleftpd::core_registry::{EndpointHandlers, FileEntry, LookupError, PasswordCheck};
use passerelleftpd::{Config, FtpServer, ServerConfig};

struct TestBackend {
    username_checks: AtomicUsize,
}

impl TestBackend {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            username_checks: AtomicUsize::new(0),
        })
    }
}

fn entry(filename: &str, length: u64) -> FileEntry {
    let stamp = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 0).unwrap();
    FileEntry {
        is_directory: false,
        filename: filename.to_string(),
        parent_path: String::from("/"),
        length,
        created_at: stamp,
        updated_at: stamp,
    }
}

#[async_trait]
impl EndpointHandlers for TestBackend {
    async fn check_username(&self, username: &str) -> Option<PasswordCheck> {
        self.username_checks.fetch_add(1, Ordering::SeqCst);
        if username == "alice" {
            Some(Box::new(|password: String| {
                async move { password == "opensesame" }.boxed()
            }))
        } else {
            None
        }
    }

    async fn list_directory(&self, _current_dir: &str) -> BoxStream<'static, FileEntry> {
        stream::iter(vec![entry("report.txt", 1024), entry("notes.txt", 52)]).boxed()
    }

    async fn describe_file(&self, pathname: &str) -> Result<FileEntry, LookupError> {
        if pathname.ends_with("report.txt") {
            Ok(entry("report.txt", 1024))
        } else {
            Err(LookupError::NotFound(pathname.to_string()))
        }
    }
}

fn test_config(passive_ports: Vec<u16>) -> Config {
    Config {
        server: ServerConfig {
            listen_port: 0,
            pasv_address: String::from("127.0.0.1"),
            passive_ports,
            tls_only: false,
        },
        tls: None,
        auth: None,
    }
}

async fn spawn_server(config: Config, backend: Arc<TestBackend>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = FtpServer::new(&config, backend).unwrap();
    tokio::spawn(async move {
        let _ = server.serve(listener).await;
    });
    addr
}

async fn pick_free_ports(n: usize) -> Vec<u16> {
    let mut held = Vec::new();
    for _ in 0..n {
        held.push(TcpListener::bind("127.0.0.1:0").await.unwrap());
    }
    held.iter()
        .map(|l| l.local_addr().unwrap().port())
        .collect()
}

async fn read_reply<S: AsyncRead + Unpin>(stream: &mut S) -> String {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        let n = stream.read(&mut byte).await.unwrap();
        assert!(n > 0, "connection closed while waiting for a reply");
        if byte[0] == b'\n' {
            break;
        }
        line.push(byte[0]);
    }
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    String::from_utf8(line).unwrap()
}

async fn send_line<S: AsyncWrite + Unpin>(stream: &mut S, line: &str) {
    stream
        .write_all(format!("{}\r\n", line).as_bytes())
        .await
        .unwrap();
}

async fn cmd<S: AsyncRead + AsyncWrite + Unpin>(stream: &mut S, line: &str) -> String {
    send_line(stream, line).await;
    read_reply(stream).await
}

async fn connect(addr: SocketAddr) -> TcpStream {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    assert_eq!(
        read_reply(&mut stream).await,
        "220 FTP interface for S3(-compatibles) ready"
    );
    stream
}

async fn login(stream: &mut TcpStream) {
    assert_eq!(
        cmd(stream, "USER alice").await,
        "331 User name okay, need password."
    );
    assert_eq!(
        cmd(stream, "PASS opensesame").await,
        "230 User logged in, proceed."
    );
}

fn parse_pasv_port(reply: &str) -> u16 {
    let inner = reply
        .split('(')
        .nth(1)
        .expect("no host/port group in PASV reply")
        .trim_end_matches(')');
    let fields: Vec<u16> = inner.split(',').map(|f| f.parse().unwrap()).collect();
    assert_eq!(&fields[..4], &[127, 0, 0, 1]);
    fields[4] * 256 + fields[5]
}

#[tokio::test]
async fn lifecycle_commands_work_without_login() {
    let addr = spawn_server(test_config(Vec::new()), TestBackend::new()).await;
    let mut c = connect(addr).await;

    assert_eq!(cmd(&mut c, "NOOP").await, "200 OK");
    assert_eq!(cmd(&mut c, "SYST").await, "215 UNIX Type: I");
    assert_eq!(cmd(&mut c, "TYPE I").await, "200 OK");
    assert_eq!(cmd(&mut c, "TYPE X").await, "202 Not supported");
    assert_eq!(cmd(&mut c, "OPTS UTF8 ON").await, "200 OK");
    assert_eq!(cmd(&mut c, "OPTS MLST").await, "451 Not supported");
    assert_eq!(cmd(&mut c, "FROB").await, "502 FROB not implemented.");

    assert_eq!(cmd(&mut c, "QUIT").await, "221 Goodbye");
    let mut buf = [0u8; 1];
    assert_eq!(c.read(&mut buf).await.unwrap(), 0);
}

#[tokio::test]
async fn feat_without_tls_omits_the_tls_block() {
    let addr = spawn_server(test_config(Vec::new()), TestBackend::new()).await;
    let mut c = connect(addr).await;

    send_line(&mut c, "FEAT").await;
    let mut lines = Vec::new();
    loop {
        let line = read_reply(&mut c).await;
        let done = line == "211 end";
        lines.push(line);
        if done {
            break;
        }
    }
    assert_eq!(lines, ["211-Features", " SIZE", " UTF8", " MDTM", "211 end"]);
}

#[tokio::test]
async fn oversized_command_line_is_rejected() {
    let addr = spawn_server(test_config(Vec::new()), TestBackend::new()).await;
    let mut c = connect(addr).await;

    let long = format!("NOOP {}", "x".repeat(600));
    assert_eq!(cmd(&mut c, &long).await, "500 Command too long");
    // The connection survives.
    assert_eq!(cmd(&mut c, "NOOP").await, "200 OK");
}

#[tokio::test]
async fn login_then_session_bookkeeping() {
    let addr = spawn_server(test_config(Vec::new()), TestBackend::new()).await;
    let mut c = connect(addr).await;
    login(&mut c).await;

    assert_eq!(cmd(&mut c, "PWD").await, "257 \"/\" is current directory");
    assert_eq!(
        cmd(&mut c, "PWD extra").await,
        "501 Syntax error in parameters or arguments."
    );
    assert_eq!(
        cmd(&mut c, "CWD /books").await,
        "250 CWD successful. \"/books\" is current directory"
    );
    assert_eq!(cmd(&mut c, "PWD").await, "257 \"/books\" is current directory");
    assert_eq!(
        cmd(&mut c, "CDUP").await,
        "250 Directory changed to \"/\""
    );
    assert_eq!(
        cmd(&mut c, "MKD drafts").await,
        "550 \"/drafts\" directory NOT created"
    );
    assert_eq!(cmd(&mut c, "STAT").await, "502 Not Supported");
    assert_eq!(cmd(&mut c, "EPSV").await, "202 Not supported");
}

#[tokio::test]
async fn refused_username_and_wrong_password() {
    let backend = TestBackend::new();
    let addr = spawn_server(test_config(Vec::new()), backend.clone()).await;
    let mut c = connect(addr).await;

    assert_eq!(cmd(&mut c, "USER bob").await, "530 Not logged in.");
    // Refused login leaves the session unauthorized.
    assert_eq!(cmd(&mut c, "PWD").await, "530 Not logged in.");

    assert_eq!(
        cmd(&mut c, "USER alice").await,
        "331 User name okay, need password."
    );
    assert_eq!(cmd(&mut c, "PASS wrong").await, "530 Not logged in.");
    assert_eq!(cmd(&mut c, "PWD").await, "530 Not logged in.");
    assert_eq!(backend.username_checks.load(Ordering::SeqCst), 2);

    // A fresh USER starts over and succeeds.
    login(&mut c).await;
    assert_eq!(cmd(&mut c, "PWD").await, "257 \"/\" is current directory");
}

#[tokio::test]
async fn pass_sequencing_rules() {
    let addr = spawn_server(test_config(Vec::new()), TestBackend::new()).await;
    let mut c = connect(addr).await;

    // No session at all.
    assert_eq!(cmd(&mut c, "PASS opensesame").await, "530 Not logged in.");

    // Session exists but USER was not the immediately preceding command.
    assert_eq!(
        cmd(&mut c, "USER alice").await,
        "331 User name okay, need password."
    );
    assert_eq!(cmd(&mut c, "NOOP").await, "200 OK");
    assert_eq!(
        cmd(&mut c, "PASS opensesame").await,
        "503 Bad sequence of commands."
    );

    // The verifier was not consumed by the refused attempt.
    assert_eq!(
        cmd(&mut c, "USER alice").await,
        "331 User name okay, need password."
    );
    assert_eq!(
        cmd(&mut c, "PASS opensesame").await,
        "230 User logged in, proceed."
    );
}

#[tokio::test]
async fn user_replaces_the_previous_session() {
    let addr = spawn_server(test_config(Vec::new()), TestBackend::new()).await;
    let mut c = connect(addr).await;
    login(&mut c).await;
    assert_eq!(
        cmd(&mut c, "CWD /books").await,
        "250 CWD successful. \"/books\" is current directory"
    );

    // A second USER discards authorization and the working directory.
    assert_eq!(
        cmd(&mut c, "USER alice").await,
        "331 User name okay, need password."
    );
    assert_eq!(cmd(&mut c, "PWD").await, "530 Not logged in.");
    // The probing PWD broke the USER-PASS sequence; start over.
    assert_eq!(
        cmd(&mut c, "PASS opensesame").await,
        "503 Bad sequence of commands."
    );
    assert_eq!(
        cmd(&mut c, "USER alice").await,
        "331 User name okay, need password."
    );
    assert_eq!(
        cmd(&mut c, "PASS opensesame").await,
        "230 User logged in, proceed."
    );
    assert_eq!(cmd(&mut c, "PWD").await, "257 \"/\" is current directory");
}

#[tokio::test]
async fn tls_only_refuses_plain_channels_before_the_backend() {
    let backend = TestBackend::new();
    let mut config = test_config(Vec::new());
    config.server.tls_only = true;
    let addr = spawn_server(config, backend.clone()).await;
    let mut c = connect(addr).await;

    // Lifecycle commands stay available.
    assert_eq!(cmd(&mut c, "NOOP").await, "200 OK");
    assert_eq!(
        cmd(&mut c, "USER alice").await,
        "530 This server does not permit login over a non-secure connection; \
         connect using FTP-SSL with explicit AUTH TLS"
    );
    assert_eq!(backend.username_checks.load(Ordering::SeqCst), 0);
    assert_eq!(
        cmd(&mut c, "PWD").await,
        "522 Protection level not sufficient; send AUTH TLS"
    );
}

#[tokio::test]
async fn tls_commands_without_a_configured_acceptor() {
    let addr = spawn_server(test_config(Vec::new()), TestBackend::new()).await;
    let mut c = connect(addr).await;

    assert_eq!(cmd(&mut c, "AUTH TLS").await, "502 Command not implemented");
    assert_eq!(cmd(&mut c, "PBSZ 0").await, "202 Not supported");
    assert_eq!(cmd(&mut c, "PROT P").await, "202 Not supported");
    // The channel is still usable.
    assert_eq!(cmd(&mut c, "NOOP").await, "200 OK");
}

#[tokio::test]
async fn mdtm_reports_the_backend_timestamp() {
    let addr = spawn_server(test_config(Vec::new()), TestBackend::new()).await;
    let mut c = connect(addr).await;
    login(&mut c).await;

    assert_eq!(cmd(&mut c, "MDTM report.txt").await, "213 20240307090500");
    assert_eq!(cmd(&mut c, "MDTM missing.txt").await, "550 File unavailable");
}

#[tokio::test]
async fn passive_listing_over_a_data_connection() {
    let ports = pick_free_ports(1).await;
    let addr = spawn_server(test_config(ports), TestBackend::new()).await;
    let mut c = connect(addr).await;
    login(&mut c).await;

    // Data-tier commands are gated until a passive slot is reserved.
    assert_eq!(
        cmd(&mut c, "LIST").await,
        "425 Data connection not configured; send PASV or PORT"
    );

    let reply = cmd(&mut c, "PASV").await;
    assert!(reply.starts_with("227 Entering Passive Mode ("), "{}", reply);
    let port = parse_pasv_port(&reply);

    let mut data = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    assert_eq!(
        cmd(&mut c, "LIST").await,
        "150 Here comes the directory listing"
    );
    let mut listing = String::new();
    data.read_to_string(&mut listing).await.unwrap();
    assert_eq!(
        listing,
        "-rw-rw-rw- 1 s3username groupname         1024 Mar 07 09:05 report.txt\r\n\
         -rw-rw-rw- 1 s3username groupname           52 Mar 07 09:05 notes.txt\r\n"
    );
    assert_eq!(read_reply(&mut c).await, "226 Transfer OK");

    // The reservation was consumed by the transfer.
    assert_eq!(
        cmd(&mut c, "LIST").await,
        "425 Data connection not configured; send PASV or PORT"
    );
}

#[tokio::test]
async fn stor_drains_the_upload_and_closes() {
    let ports = pick_free_ports(1).await;
    let addr = spawn_server(test_config(ports), TestBackend::new()).await;
    let mut c = connect(addr).await;
    login(&mut c).await;

    let reply = cmd(&mut c, "PASV").await;
    let port = parse_pasv_port(&reply);
    let mut data = TcpStream::connect(("127.0.0.1", port)).await.unwrap();

    assert_eq!(cmd(&mut c, "STOR upload.bin").await, "150 Ok to send data");
    data.write_all(&[0x41u8; 4096]).await.unwrap();
    data.shutdown().await.unwrap();
    assert_eq!(read_reply(&mut c).await, "226 Closing data connection");
}

#[tokio::test]
async fn stor_replies_150_before_the_data_connection_arrives() {
    let ports = pick_free_ports(1).await;
    let addr = spawn_server(test_config(ports), TestBackend::new()).await;
    let mut c = connect(addr).await;
    login(&mut c).await;
    let port = parse_pasv_port(&cmd(&mut c, "PASV").await);

    // A client that only opens the data connection after seeing the 150
    // must not deadlock with the server.
    send_line(&mut c, "STOR upload.bin").await;
    let reply = timeout(Duration::from_secs(2), read_reply(&mut c))
        .await
        .expect("no 150 before the data connection was made");
    assert_eq!(reply, "150 Ok to send data");

    let mut data = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    data.write_all(b"payload").await.unwrap();
    data.shutdown().await.unwrap();
    assert_eq!(read_reply(&mut c).await, "226 Closing data connection");
}

#[tokio::test]
async fn retr_is_accepted_without_a_reply() {
    let ports = pick_free_ports(1).await;
    let addr = spawn_server(test_config(ports), TestBackend::new()).await;
    let mut c = connect(addr).await;
    login(&mut c).await;

    let reply = cmd(&mut c, "PASV").await;
    let _port = parse_pasv_port(&reply);
    send_line(&mut c, "RETR report.txt").await;
    // No reply is produced; the next command is answered as usual.
    assert_eq!(cmd(&mut c, "NOOP").await, "200 OK");
    assert_eq!(cmd(&mut c, "APPE report.txt").await, "502 APPE not implemented.");
    assert_eq!(cmd(&mut c, "NLST").await, "502 Not Supported");
}

#[tokio::test]
async fn exhausted_pool_queues_fifo_until_a_transfer_ends() {
    let ports = pick_free_ports(2).await;
    let addr = spawn_server(test_config(ports), TestBackend::new()).await;

    let mut c1 = connect(addr).await;
    let mut c2 = connect(addr).await;
    let mut c3 = connect(addr).await;
    login(&mut c1).await;
    login(&mut c2).await;
    login(&mut c3).await;

    let port1 = parse_pasv_port(&cmd(&mut c1, "PASV").await);
    let port2 = parse_pasv_port(&cmd(&mut c2, "PASV").await);
    assert_ne!(port1, port2);

    // Both slots are occupied; the third reservation has to wait.
    send_line(&mut c3, "PASV").await;
    assert!(timeout(Duration::from_millis(200), read_reply(&mut c3))
        .await
        .is_err());

    // Completing the first transfer recycles its port to the waiter.
    let mut data = TcpStream::connect(("127.0.0.1", port1)).await.unwrap();
    assert_eq!(
        cmd(&mut c1, "LIST").await,
        "150 Here comes the directory listing"
    );
    let mut listing = String::new();
    data.read_to_string(&mut listing).await.unwrap();
    assert_eq!(read_reply(&mut c1).await, "226 Transfer OK");

    let reply = timeout(Duration::from_secs(2), read_reply(&mut c3))
        .await
        .expect("queued PASV was never granted");
    assert_eq!(parse_pasv_port(&reply), port1);
}

#[tokio::test]
async fn disconnect_releases_held_slots() {
    let ports = pick_free_ports(2).await;
    let addr = spawn_server(test_config(ports.clone()), TestBackend::new()).await;

    let mut c1 = connect(addr).await;
    login(&mut c1).await;
    let first = parse_pasv_port(&cmd(&mut c1, "PASV").await);
    // The second reservation supersedes the first on this session.
    let second = parse_pasv_port(&cmd(&mut c1, "PASV").await);
    assert_ne!(first, second);
    drop(c1);

    // Once the control connection is gone both ports become grantable again.
    let mut c2 = connect(addr).await;
    login(&mut c2).await;
    let a = parse_pasv_port(&timeout(Duration::from_secs(2), cmd(&mut c2, "PASV"))
        .await
        .expect("slot was not released on disconnect"));
    let b = parse_pasv_port(&timeout(Duration::from_secs(2), cmd(&mut c2, "PASV"))
        .await
        .expect("slot was not released on disconnect"));
    assert_ne!(a, b);
    assert!(ports.contains(&a) && ports.contains(&b));
}

#[tokio::test]
async fn stray_data_connection_is_closed_and_slot_kept() {
    let ports = pick_free_ports(1).await;
    let addr = spawn_server(test_config(ports), TestBackend::new()).await;
    let mut c = connect(addr).await;
    login(&mut c).await;

    let port = parse_pasv_port(&cmd(&mut c, "PASV").await);

    // First arrival claims the slot; a second connection on the same port
    // finds no occupant expecting it and is closed straight away.
    let mut data = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;
    let mut stray = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
    let mut buf = [0u8; 1];
    assert_eq!(
        timeout(Duration::from_secs(2), stray.read(&mut buf))
            .await
            .unwrap()
            .unwrap(),
        0
    );

    // The claimed socket still carries the listing.
    assert_eq!(
        cmd(&mut c, "LIST").await,
        "150 Here comes the directory listing"
    );
    let mut listing = String::new();
    data.read_to_string(&mut listing).await.unwrap();
    assert!(listing.contains("report.txt"));
    assert_eq!(read_reply(&mut c).await, "226 Transfer OK");
}
