//! End-to-end probe scenarios over real localhost sockets.
//!
//! Every test shrinks the grace window and uses one-second schedule delays
//! so a full measurement runs in about a second; the protocol logic is
//! otherwise exactly what ships.

use std::thread;
use std::time::Duration;

use udpnat::config::SessionConfig;
use udpnat::dispatcher::Dispatcher;
use udpnat::master::{MasterReport, MasterSession};
use udpnat::net::ProbeSocket;
use udpnat::slave::SlaveSession;
use udpnat::{DelaySchedule, Packet, ProbeError};

const FAST_GRACE: Duration = Duration::from_millis(300);

fn fast_session(delays: &[i32]) -> SessionConfig {
    SessionConfig {
        grace: FAST_GRACE,
        strict: false,
        schedule: DelaySchedule::new(delays.iter().copied()),
    }
}

/// Bind a dispatcher on an ephemeral port, run it on a background thread,
/// and return the address clients should handshake with.
fn spawn_dispatcher(config: SessionConfig) -> std::net::SocketAddr {
    let dispatcher = Dispatcher::bind(0, config).unwrap();
    let addr = dispatcher.local_addr().unwrap();
    thread::spawn(move || {
        // Runs until the process exits; rendezvous socket errors only.
        let _ = dispatcher.run();
    });
    // The kernel queues datagrams on the bound socket, so clients may
    // handshake immediately.
    addr
}

#[test]
fn one_round_measurement_succeeds_end_to_end() {
    let master_socket = ProbeSocket::bind("127.0.0.1:0").unwrap();
    let slave_socket = ProbeSocket::bind("127.0.0.1:0").unwrap();
    let master_addr = master_socket.local_addr().unwrap();
    let slave_addr = slave_socket.local_addr().unwrap();

    // The slave outlives the measurement and ends on timeout once the
    // master goes quiet.
    let slave_thread = thread::spawn(move || {
        SlaveSession::new(&slave_socket, master_addr, fast_session(&[])).run()
    });

    let report = MasterSession::new(&master_socket, slave_addr, fast_session(&[1]))
        .run()
        .unwrap();
    assert_eq!(report, MasterReport { rounds: 1 });

    let slave_end = slave_thread.join().unwrap();
    assert!(
        matches!(slave_end, Err(ProbeError::Timeout { .. })),
        "slave should end on timeout, got {:?}",
        slave_end
    );
}

#[test]
fn silent_peer_fails_the_measurement_with_timeout() {
    let master_socket = ProbeSocket::bind("127.0.0.1:0").unwrap();
    let silent = ProbeSocket::bind("127.0.0.1:0").unwrap();
    let peer = silent.local_addr().unwrap();

    let result = MasterSession::new(&master_socket, peer, fast_session(&[30])).run();
    assert_eq!(result, Err(ProbeError::Timeout { after: FAST_GRACE }));
}

#[test]
fn slave_wait_window_tracks_each_announced_delay() {
    let slave_socket = ProbeSocket::bind("127.0.0.1:0").unwrap();
    let master_socket = ProbeSocket::bind("127.0.0.1:0").unwrap();
    let slave_addr = slave_socket.local_addr().unwrap();
    let master_addr = master_socket.local_addr().unwrap();

    let session = SlaveSession::new(&slave_socket, master_addr, fast_session(&[]));

    let mut wait = FAST_GRACE; // first receive: no delay announced yet
    for announced in [2, 3, 1] {
        master_socket
            .send(&Packet::Ping { delay_secs: announced }, slave_addr)
            .unwrap();
        wait = session.serve_one(wait).unwrap();
        assert_eq!(wait, Duration::from_secs(announced as u64) + FAST_GRACE);

        let (reply, _) = master_socket
            .recv_timeout(Duration::from_secs(1), Some(slave_addr))
            .unwrap();
        assert_eq!(reply, Packet::Reply);
    }
}

#[test]
fn slave_handshake_gets_a_master_session_back() {
    let server = spawn_dispatcher(fast_session(&[1]));
    let client = ProbeSocket::bind("127.0.0.1:0").unwrap();

    client.send(&Packet::Slave, server).unwrap();

    // The dispatcher's master drives its schedule at us.
    let (packet, from) = client
        .recv_timeout(Duration::from_secs(2), Some(server))
        .unwrap();
    assert_eq!(packet, Packet::Ping { delay_secs: 1 });
    assert_eq!(from, server);

    client.send(&Packet::Reply, server).unwrap();
}

#[test]
fn master_handshake_gets_a_slave_session_back() {
    let server = spawn_dispatcher(fast_session(&[1]));
    let client = ProbeSocket::bind("127.0.0.1:0").unwrap();

    client.send(&Packet::Master, server).unwrap();
    client.send(&Packet::Ping { delay_secs: 1 }, server).unwrap();

    let (packet, _) = client
        .recv_timeout(Duration::from_secs(2), Some(server))
        .unwrap();
    assert_eq!(packet, Packet::Reply);
}

#[test]
fn non_handshake_packets_leave_the_dispatcher_listening() {
    let server = spawn_dispatcher(fast_session(&[1]));
    let client = ProbeSocket::bind("127.0.0.1:0").unwrap();

    // Neither of these may start a session.
    client.send(&Packet::Reply, server).unwrap();
    client.send(&Packet::Ping { delay_secs: 5 }, server).unwrap();

    // A real handshake afterwards is still served.
    client.send(&Packet::Slave, server).unwrap();
    let (packet, _) = client
        .recv_timeout(Duration::from_secs(2), Some(server))
        .unwrap();
    assert_eq!(packet, Packet::Ping { delay_secs: 1 });
    client.send(&Packet::Reply, server).unwrap();
}

#[test]
fn dispatcher_serves_sessions_sequentially() {
    let server = spawn_dispatcher(fast_session(&[1]));

    // First peer announces slave and completes a full one-round measurement.
    let first = ProbeSocket::bind("127.0.0.1:0").unwrap();
    first.send(&Packet::Slave, server).unwrap();
    let (packet, _) = first
        .recv_timeout(Duration::from_secs(2), Some(server))
        .unwrap();
    assert_eq!(packet, Packet::Ping { delay_secs: 1 });
    first.send(&Packet::Reply, server).unwrap();

    // The master session sleeps out the remainder of its 1s delay, then the
    // dispatcher returns to listening. Give it time before the next peer.
    thread::sleep(Duration::from_millis(1500));

    let second = ProbeSocket::bind("127.0.0.1:0").unwrap();
    second.send(&Packet::Slave, server).unwrap();
    let (packet, _) = second
        .recv_timeout(Duration::from_secs(2), Some(server))
        .unwrap();
    assert_eq!(packet, Packet::Ping { delay_secs: 1 });
    second.send(&Packet::Reply, server).unwrap();
}
