use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, error, trace, warn};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio_rustls::TlsAcceptor;

#[derive(Debug, Error)]
pub enum PasvError {
    /// The control channel went away while the reservation or the data
    /// connection was still pending.
    #[error("control channel closed while waiting on the passive pool")]
    ChannelClosed,

    /// The slot's listening port could not be bound; the port is taken out
    /// of the rotation.
    #[error("cannot open passive port {0}")]
    PortUnavailable(u16),
}

/// A granted passive slot: the port to advertise in the PASV reply and the
/// delivery channel for the single inbound data connection.
pub struct PasvReservation {
    port: u16,
    socket_rx: oneshot::Receiver<DataConn>,
}

impl PasvReservation {
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Suspends until the occupant's data connection lands on the slot.
    pub async fn wait_socket(self) -> Result<DataConn, PasvError> {
        self.socket_rx.await.map_err(|_| PasvError::ChannelClosed)
    }
}

enum DataStream {
    Plain(TcpStream),
    Secure(Box<tokio_rustls::server::TlsStream<TcpStream>>),
}

/// The data connection handed to a session, already TLS-upgraded when the
/// control channel is secure. Dropping it releases the slot back to the
/// pool.
pub struct DataConn {
    stream: DataStream,
    _guard: SlotGuard,
}

impl DataConn {
    pub async fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        match &mut self.stream {
            DataStream::Plain(s) => s.write_all(buf).await,
            DataStream::Secure(s) => s.write_all(buf).await,
        }
    }

    pub async fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.stream {
            DataStream::Plain(s) => s.read(buf).await,
            DataStream::Secure(s) => s.read(buf).await,
        }
    }

    /// Half-closes the write side; for a secure stream this also pushes the
    /// TLS close_notify out.
    pub async fn shutdown(&mut self) -> std::io::Result<()> {
        match &mut self.stream {
            DataStream::Plain(s) => s.shutdown().await,
            DataStream::Secure(s) => s.shutdown().await,
        }
    }
}

/// Releases the occupation when the delivered socket is dropped. The
/// generation check keeps a stale guard from releasing a slot that has
/// since been handed to another session.
struct SlotGuard {
    shared: Arc<PoolShared>,
    slot: usize,
    generation: u64,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        PoolShared::release_if_current(&self.shared, self.slot, self.generation);
    }
}

struct Occupant {
    conn_id: u64,
    generation: u64,
    secure: bool,
    resolver: Option<oneshot::Sender<DataConn>>,
}

struct Slot {
    port: u16,
    listener_spawned: bool,
    occupant: Option<Occupant>,
}

struct Waiter {
    conn_id: u64,
    secure: bool,
    grant: oneshot::Sender<PasvReservation>,
}

struct PoolState {
    slots: Vec<Slot>,
    free: VecDeque<usize>,
    waiters: VecDeque<Waiter>,
    next_generation: u64,
}

struct PoolShared {
    state: Mutex<PoolState>,
    tls: Option<TlsAcceptor>,
}

impl PoolShared {
    fn state(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().expect("passive pool state poisoned")
    }

    /// Hands the freed slot to the head of the wait queue, skipping waiters
    /// whose channel is gone, or returns it to the free set.
    fn grant_or_free(shared: &Arc<PoolShared>, state: &mut PoolState, slot_idx: usize) {
        while let Some(waiter) = state.waiters.pop_front() {
            // A slot only gets released after an occupation, so its
            // listener is already bound on this path.
            let (reservation, _already_bound) =
                PoolShared::occupy(shared, state, slot_idx, waiter.conn_id, waiter.secure);
            match waiter.grant.send(reservation) {
                Ok(()) => return,
                Err(_) => {
                    // Waiter abandoned the request; undo and try the next.
                    state.slots[slot_idx].occupant = None;
                }
            }
        }
        state.free.push_back(slot_idx);
    }

    /// Marks the slot occupied. On the slot's first occupation the accept
    /// loop is spawned and a receiver for its bind outcome is returned; the
    /// caller must not advertise the port until that bind has succeeded.
    fn occupy(
        shared: &Arc<PoolShared>,
        state: &mut PoolState,
        slot_idx: usize,
        conn_id: u64,
        secure: bool,
    ) -> (
        PasvReservation,
        Option<oneshot::Receiver<std::io::Result<()>>>,
    ) {
        let (resolver, socket_rx) = oneshot::channel();
        state.next_generation += 1;
        let generation = state.next_generation;
        let slot = &mut state.slots[slot_idx];
        slot.occupant = Some(Occupant {
            conn_id,
            generation,
            secure,
            resolver: Some(resolver),
        });
        let bind_rx = if slot.listener_spawned {
            None
        } else {
            slot.listener_spawned = true;
            let (bound, bind_rx) = oneshot::channel();
            let shared = Arc::clone(shared);
            let port = slot.port;
            tokio::spawn(run_slot_listener(shared, slot_idx, port, bound));
            Some(bind_rx)
        };
        (
            PasvReservation {
                port: slot.port,
                socket_rx,
            },
            bind_rx,
        )
    }

    fn release_if_current(shared: &Arc<PoolShared>, slot_idx: usize, generation: u64) {
        let mut state = shared.state();
        let current = state.slots[slot_idx]
            .occupant
            .as_ref()
            .map(|o| o.generation);
        if current != Some(generation) {
            return;
        }
        state.slots[slot_idx].occupant = None;
        PoolShared::grant_or_free(shared, &mut state, slot_idx);
    }
}

/// Process-wide pool of passive-mode listening ports.
///
/// Each configured port is one slot. A slot's TCP listener is bound on
/// first occupation and then kept for the process lifetime; a port that
/// cannot be bound fails its reservation and leaves the rotation. Only the
/// current occupant may claim an inbound connection, anything else is
/// closed on arrival. Excess demand queues FIFO.
#[derive(Clone)]
pub struct PassivePool {
    shared: Arc<PoolShared>,
}

impl PassivePool {
    pub fn new(ports: &[u16], tls: Option<TlsAcceptor>) -> Self {
        let slots = ports
            .iter()
            .map(|port| Slot {
                port: *port,
                listener_spawned: false,
                occupant: None,
            })
            .collect::<Vec<_>>();
        let free = (0..slots.len()).collect();
        Self {
            shared: Arc::new(PoolShared {
                state: Mutex::new(PoolState {
                    slots,
                    free,
                    waiters: VecDeque::new(),
                    next_generation: 0,
                }),
                tls,
            }),
        }
    }

    /// Reserves a slot for the given control connection, waiting FIFO when
    /// all ports are occupied. The reservation is only handed out once the
    /// slot's listener is confirmed bound, so the advertised port accepts
    /// connections the moment the client sees it.
    pub async fn reserve(&self, conn_id: u64, secure: bool) -> Result<PasvReservation, PasvError> {
        let outcome = {
            let mut state = self.shared.state();
            match state.free.pop_front() {
                Some(slot_idx) => {
                    let (reservation, bind_rx) =
                        PoolShared::occupy(&self.shared, &mut state, slot_idx, conn_id, secure);
                    Ok((slot_idx, reservation, bind_rx))
                }
                None => {
                    let (grant, grant_rx) = oneshot::channel();
                    state.waiters.push_back(Waiter {
                        conn_id,
                        secure,
                        grant,
                    });
                    trace!("passive pool exhausted, connection {} queued", conn_id);
                    Err(grant_rx)
                }
            }
        };
        let (slot_idx, reservation, bind_rx) = match outcome {
            Ok(direct) => direct,
            Err(grant_rx) => return grant_rx.await.map_err(|_| PasvError::ChannelClosed),
        };
        if let Some(bind_rx) = bind_rx {
            if !matches!(bind_rx.await, Ok(Ok(()))) {
                // The port cannot be bound: clear the occupation and keep
                // the slot out of the free rotation for good.
                let mut state = self.shared.state();
                state.slots[slot_idx].occupant = None;
                return Err(PasvError::PortUnavailable(reservation.port));
            }
        }
        Ok(reservation)
    }

    /// Drops every pool interest held by a departed control connection:
    /// queued waiters are failed, an occupied slot is recycled.
    pub fn disconnect(&self, conn_id: u64) {
        let mut state = self.shared.state();
        state.waiters.retain(|w| w.conn_id != conn_id);
        for slot_idx in 0..state.slots.len() {
            let held = state.slots[slot_idx]
                .occupant
                .as_ref()
                .is_some_and(|o| o.conn_id == conn_id);
            if held {
                state.slots[slot_idx].occupant = None;
                PoolShared::grant_or_free(&self.shared, &mut state, slot_idx);
            }
        }
    }
}

/// One accept loop per slot, started on first occupation and bound once.
/// The bind outcome is reported back so the reservation can wait for it.
async fn run_slot_listener(
    shared: Arc<PoolShared>,
    slot_idx: usize,
    port: u16,
    bound: oneshot::Sender<std::io::Result<()>>,
) {
    let listener = match TcpListener::bind(("0.0.0.0", port)).await {
        Ok(listener) => {
            let _ = bound.send(Ok(()));
            listener
        }
        Err(e) => {
            error!("Failed to bind passive port {}: {}", port, e);
            let _ = bound.send(Err(e));
            return;
        }
    };
    debug!("Passive data listener bound on port {}", port);
    loop {
        let socket = match listener.accept().await {
            Ok((socket, peer)) => {
                trace!("Passive data connection from {:?} on port {}", peer, port);
                socket
            }
            Err(e) => {
                warn!("Accept failed on passive port {}: {}", port, e);
                continue;
            }
        };
        let claim = {
            let mut state = shared.state();
            match state.slots[slot_idx].occupant.as_mut() {
                Some(occupant) if occupant.resolver.is_some() => {
                    let resolver = occupant.resolver.take();
                    Some((resolver, occupant.secure, occupant.generation))
                }
                _ => None,
            }
        };
        let Some((Some(resolver), secure, generation)) = claim else {
            // No current occupant for this port: reject outright.
            debug!("Rejecting unclaimed data connection on port {}", port);
            drop(socket);
            continue;
        };
        let shared = Arc::clone(&shared);
        tokio::spawn(async move {
            let guard = SlotGuard {
                shared: Arc::clone(&shared),
                slot: slot_idx,
                generation,
            };
            let stream = if secure {
                let Some(acceptor) = shared.tls.clone() else {
                    warn!("Secure session but no TLS acceptor for the data channel");
                    return;
                };
                match acceptor.accept(socket).await {
                    Ok(tls_stream) => DataStream::Secure(Box::new(tls_stream)),
                    Err(e) => {
                        debug!("Data channel TLS handshake failed on port {}: {}", port, e);
                        return;
                    }
                }
            } else {
                DataStream::Plain(socket)
            };
            let conn = DataConn {
                stream,
                _guard: guard,
            };
            // The occupant may be gone already (superseded PASV); the
            // dropped connection releases the slot through its guard.
            let _ = resolver.send(conn);
        });
    }
}
