//! Dispatcher behavior over the loopback channel: reply discipline, context
//! lifecycle, access control, and the hash clone handshake.

mod common;

use common::{CountingEngine, hash_header, mac_header, no_params, params};
use vaultgate_engine::{CryptoEngine, SoftwareEngine, alg};
use vaultgate_proto::{CallerId, ChannelId, HashOp, MacOp, PARAM_COUNT, ServiceKind, Status};
use vaultgate_service::{CompletedMessage, Dispatcher, MemoryChannel, ServiceConfig};

const CALLER: CallerId = CallerId(1);

fn software_dispatcher() -> Dispatcher<MemoryChannel, SoftwareEngine> {
    Dispatcher::new(MemoryChannel::new(), SoftwareEngine::new(), ServiceConfig::default())
}

fn run_all<E: CryptoEngine>(
    dispatcher: &mut Dispatcher<MemoryChannel, E>,
) -> Vec<CompletedMessage> {
    dispatcher.run();
    dispatcher.channel_mut().drain_completed()
}

/// Bring the crypto subsystem up through its own service connection.
fn bring_up<E: CryptoEngine>(dispatcher: &mut Dispatcher<MemoryChannel, E>) {
    let conn = ChannelId(1000);
    let channel = dispatcher.channel_mut();
    channel.push_connect(ServiceKind::CryptoInit, conn, CALLER);
    channel.push_call(ServiceKind::CryptoInit, conn, CALLER, no_params(), [0; PARAM_COUNT]);
    channel.push_disconnect(ServiceKind::CryptoInit, conn, CALLER);
    for completed in run_all(dispatcher) {
        assert_eq!(completed.status, Status::Success);
    }
}

#[test]
fn every_message_gets_exactly_one_reply() {
    let mut dispatcher = software_dispatcher();
    let conn = ChannelId(1);

    let channel = dispatcher.channel_mut();
    channel.push_connect(ServiceKind::Hash, conn, CALLER);
    channel.push_call(
        ServiceKind::Hash,
        conn,
        CALLER,
        params(hash_header(HashOp::Setup, alg::SHA_256), Vec::new()),
        [0; PARAM_COUNT],
    );
    channel.push_call(
        ServiceKind::Hash,
        conn,
        CALLER,
        params(hash_header(HashOp::Update, 0), b"abc".to_vec()),
        [0; PARAM_COUNT],
    );
    channel.push_call(
        ServiceKind::Hash,
        conn,
        CALLER,
        params(hash_header(HashOp::Finish, 0), Vec::new()),
        [64, 8, 0, 0],
    );
    channel.push_disconnect(ServiceKind::Hash, conn, CALLER);

    let completed = run_all(&mut dispatcher);
    assert_eq!(completed.len(), 5);
    for reply in &completed {
        assert_eq!(reply.status, Status::Success);
    }
}

#[test]
fn connect_creates_a_context_and_disconnect_frees_it() {
    let mut dispatcher = software_dispatcher();
    let conn = ChannelId(2);

    dispatcher.channel_mut().push_connect(ServiceKind::Hash, conn, CALLER);
    run_all(&mut dispatcher);
    assert_eq!(dispatcher.active_contexts(), 1);

    dispatcher.channel_mut().push_disconnect(ServiceKind::Hash, conn, CALLER);
    run_all(&mut dispatcher);
    assert_eq!(dispatcher.active_contexts(), 0);
}

#[test]
fn unknown_opcode_is_not_supported() {
    let mut dispatcher = software_dispatcher();
    let conn = ChannelId(3);

    let channel = dispatcher.channel_mut();
    channel.push_connect(ServiceKind::Hash, conn, CALLER);
    channel.push_call(
        ServiceKind::Hash,
        conn,
        CALLER,
        params(common::crypto_header(0xFFFF, 0, 0), Vec::new()),
        [0; PARAM_COUNT],
    );

    let completed = run_all(&mut dispatcher);
    assert_eq!(completed[1].status, Status::NotSupported);
}

#[test]
fn malformed_header_is_a_communication_failure() {
    let mut dispatcher = software_dispatcher();
    let conn = ChannelId(4);

    let channel = dispatcher.channel_mut();
    channel.push_connect(ServiceKind::Hash, conn, CALLER);
    channel.push_call(
        ServiceKind::Hash,
        conn,
        CALLER,
        params(vec![1, 2, 3], Vec::new()),
        [0; PARAM_COUNT],
    );

    let completed = run_all(&mut dispatcher);
    assert_eq!(completed[1].status, Status::CommunicationFailure);
}

#[test]
fn unauthorized_handle_never_reaches_the_engine() {
    let (engine, probe) = CountingEngine::new();
    let mut dispatcher = Dispatcher::new(MemoryChannel::new(), engine, ServiceConfig::default());
    bring_up(&mut dispatcher);

    let conn = ChannelId(5);
    let channel = dispatcher.channel_mut();
    channel.push_connect(ServiceKind::Mac, conn, CALLER);
    channel.push_call(
        ServiceKind::Mac,
        conn,
        CALLER,
        params(mac_header(MacOp::SignSetup, 0x0101, 77), Vec::new()),
        [0; PARAM_COUNT],
    );

    let completed = run_all(&mut dispatcher);
    assert_eq!(completed[1].status, Status::InvalidHandle);
    assert_eq!(probe.key_ops(), 0);
}

#[test]
fn hash_clone_copies_state_across_connections() {
    let mut dispatcher = software_dispatcher();
    let source = ChannelId(10);
    let target = ChannelId(11);

    let channel = dispatcher.channel_mut();
    channel.push_connect(ServiceKind::Hash, source, CALLER);
    channel.push_connect(ServiceKind::Hash, target, CALLER);
    channel.push_call(
        ServiceKind::Hash,
        source,
        CALLER,
        params(hash_header(HashOp::Setup, alg::SHA_256), Vec::new()),
        [0; PARAM_COUNT],
    );
    channel.push_call(
        ServiceKind::Hash,
        source,
        CALLER,
        params(hash_header(HashOp::Update, 0), b"ab".to_vec()),
        [0; PARAM_COUNT],
    );
    channel.push_call(
        ServiceKind::Hash,
        source,
        CALLER,
        params(hash_header(HashOp::CloneBegin, 0), Vec::new()),
        [8, 0, 0, 0],
    );
    let completed = run_all(&mut dispatcher);
    let begin = completed.iter().find(|c| c.outputs[0].len() == 8).unwrap();
    assert_eq!(begin.status, Status::Success);
    let index = begin.outputs[0].clone();
    assert_eq!(dispatcher.live_clone_slots(), 1);

    let channel = dispatcher.channel_mut();
    channel.push_call(
        ServiceKind::Hash,
        target,
        CALLER,
        params(hash_header(HashOp::CloneEnd, 0), index),
        [0; PARAM_COUNT],
    );
    channel.push_call(
        ServiceKind::Hash,
        source,
        CALLER,
        params(hash_header(HashOp::Update, 0), b"c".to_vec()),
        [0; PARAM_COUNT],
    );
    channel.push_call(
        ServiceKind::Hash,
        target,
        CALLER,
        params(hash_header(HashOp::Update, 0), b"c".to_vec()),
        [0; PARAM_COUNT],
    );
    channel.push_call(
        ServiceKind::Hash,
        source,
        CALLER,
        params(hash_header(HashOp::Finish, 0), Vec::new()),
        [64, 8, 0, 0],
    );
    channel.push_call(
        ServiceKind::Hash,
        target,
        CALLER,
        params(hash_header(HashOp::Finish, 0), Vec::new()),
        [64, 8, 0, 0],
    );

    let completed = run_all(&mut dispatcher);
    let digests: Vec<&CompletedMessage> =
        completed.iter().filter(|c| c.outputs[0].len() == 32).collect();
    assert_eq!(digests.len(), 2);
    assert_eq!(digests[0].outputs[0], digests[1].outputs[0]);
    assert_eq!(dispatcher.live_clone_slots(), 0);
}

#[test]
fn source_disconnect_kills_pending_clones() {
    let mut dispatcher = software_dispatcher();
    let source = ChannelId(20);
    let target = ChannelId(21);

    let channel = dispatcher.channel_mut();
    channel.push_connect(ServiceKind::Hash, source, CALLER);
    channel.push_connect(ServiceKind::Hash, target, CALLER);
    channel.push_call(
        ServiceKind::Hash,
        source,
        CALLER,
        params(hash_header(HashOp::Setup, alg::SHA_256), Vec::new()),
        [0; PARAM_COUNT],
    );
    channel.push_call(
        ServiceKind::Hash,
        source,
        CALLER,
        params(hash_header(HashOp::CloneBegin, 0), Vec::new()),
        [8, 0, 0, 0],
    );
    let completed = run_all(&mut dispatcher);
    let index = completed.iter().find(|c| c.outputs[0].len() == 8).unwrap().outputs[0].clone();

    dispatcher.channel_mut().push_disconnect(ServiceKind::Hash, source, CALLER);
    run_all(&mut dispatcher);
    assert_eq!(dispatcher.live_clone_slots(), 0);

    // The stale index must not resolve for the target.
    dispatcher.channel_mut().push_call(
        ServiceKind::Hash,
        target,
        CALLER,
        params(hash_header(HashOp::CloneEnd, 0), index),
        [0; PARAM_COUNT],
    );
    let completed = run_all(&mut dispatcher);
    assert_eq!(completed[0].status, Status::BadState);
}

#[test]
fn rng_fills_the_declared_capacity() {
    let mut dispatcher = software_dispatcher();
    bring_up(&mut dispatcher);

    let conn = ChannelId(30);
    let channel = dispatcher.channel_mut();
    channel.push_connect(ServiceKind::Rng, conn, CALLER);
    channel.push_call(ServiceKind::Rng, conn, CALLER, no_params(), [16, 0, 0, 0]);

    let completed = run_all(&mut dispatcher);
    assert_eq!(completed[1].status, Status::Success);
    assert_eq!(completed[1].outputs[0].len(), 16);
}

#[test]
fn oversized_entropy_seed_is_refused() {
    let mut dispatcher = software_dispatcher();
    let conn = ChannelId(31);

    let channel = dispatcher.channel_mut();
    channel.push_connect(ServiceKind::EntropyInject, conn, CALLER);
    channel.push_call(
        ServiceKind::EntropyInject,
        conn,
        CALLER,
        params(vec![0u8; 4096], Vec::new()),
        [0; PARAM_COUNT],
    );
    channel.push_call(
        ServiceKind::EntropyInject,
        conn,
        CALLER,
        params(vec![0u8; 32], Vec::new()),
        [0; PARAM_COUNT],
    );

    let completed = run_all(&mut dispatcher);
    assert_eq!(completed[1].status, Status::InvalidArgument);
    assert_eq!(completed[2].status, Status::Success);
}
