mod common;

use std::path::Path;

use layout_consensus::{Acceptor, FileStore, Rank, Request, Response, StorageError};

use common::{proposer, TestLayout};

type DurableAcceptor = Acceptor<TestLayout, FileStore<TestLayout>>;

fn open(dir: &Path) -> DurableAcceptor {
    Acceptor::open(FileStore::open(dir).unwrap()).unwrap()
}

fn rank(sequence: u64) -> Rank {
    Rank::new(sequence, proposer(5))
}

fn bootstrap(acceptor: &mut DurableAcceptor, layout: TestLayout) {
    assert_eq!(acceptor.handle(Request::Bootstrap { layout }).unwrap(), Response::Ack);
}

fn prepare(acceptor: &mut DurableAcceptor, rank: Rank) -> Response<TestLayout> {
    let epoch = acceptor.epoch();
    acceptor.handle(Request::Prepare { rank, epoch }).unwrap()
}

fn propose(acceptor: &mut DurableAcceptor, rank: Rank, layout: TestLayout) -> Response<TestLayout> {
    let epoch = acceptor.epoch();
    acceptor.handle(Request::Propose { rank, layout, epoch }).unwrap()
}

#[test]
fn epoch_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut node = open(dir.path());
    bootstrap(&mut node, TestLayout::single(9000));
    assert_eq!(node.handle(Request::SetEpoch { epoch: 2 }).unwrap(), Response::Ack);
    assert_eq!(
        node.handle(Request::GetLayout).unwrap(),
        Response::Layout { layout: TestLayout::single(9000), epoch: 2 },
    );
    assert_eq!(node.handle(Request::SetEpoch { epoch: 1 }).unwrap(), Response::WrongEpoch(2));
    drop(node);

    let mut node = open(dir.path());
    assert_eq!(node.epoch(), 2);
    assert_eq!(node.handle(Request::SetEpoch { epoch: 1 }).unwrap(), Response::WrongEpoch(2));
}

#[test]
fn bootstrap_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let mut node = open(dir.path());
    bootstrap(&mut node, TestLayout::single(9000));
    drop(node);

    let mut node = open(dir.path());
    assert_eq!(
        node.handle(Request::Bootstrap { layout: TestLayout::single(9001) }).unwrap(),
        Response::AlreadyBootstrapped,
    );
    assert_eq!(
        node.handle(Request::GetLayout).unwrap(),
        Response::Layout { layout: TestLayout::single(9000), epoch: 0 },
    );
}

#[test]
fn paxos_phases_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let l100 = TestLayout::single(9000).at(100);

    let mut node = open(dir.path());
    bootstrap(&mut node, TestLayout::single(9000));
    assert!(matches!(prepare(&mut node, rank(100)), Response::PrepareAck { .. }));
    assert_eq!(node.state().phase1, Some(rank(100)));
    drop(node);

    let mut node = open(dir.path());
    assert_eq!(node.epoch(), 0);
    assert_eq!(node.state().phase1, Some(rank(100)));
    assert_eq!(propose(&mut node, rank(100), l100.clone()), Response::Ack);
    drop(node);

    let node = open(dir.path());
    assert_eq!(node.epoch(), 0);
    assert_eq!(node.state().phase1, Some(rank(100)));
    assert_eq!(node.state().phase2(), Some(rank(100)));
    assert_eq!(node.state().proposed(), Some(&l100));
    assert_eq!(node.state().layout.as_ref().map(|layout| layout.epoch), Some(0));
}

#[test]
fn prepare_validated_against_persisted_promise() {
    let dir = tempfile::tempdir().unwrap();
    let mut node = open(dir.path());
    bootstrap(&mut node, TestLayout::single(9000));
    prepare(&mut node, rank(100));
    drop(node);

    let mut node = open(dir.path());
    assert_eq!(prepare(&mut node, rank(99)), Response::PrepareReject(Some(rank(100))));
    assert!(matches!(prepare(&mut node, rank(101)), Response::PrepareAck { .. }));
}

#[test]
fn propose_validated_against_persisted_promise() {
    let dir = tempfile::tempdir().unwrap();
    let l100 = TestLayout::single(9000).at(100);
    let mut node = open(dir.path());
    bootstrap(&mut node, TestLayout::single(9000));
    prepare(&mut node, rank(100));
    drop(node);

    let mut node = open(dir.path());
    assert!(propose(&mut node, rank(99), l100.clone()).is_reject());
    assert!(propose(&mut node, rank(101), l100.clone()).is_reject());
    assert_eq!(propose(&mut node, rank(100), l100.clone()), Response::Ack);
    drop(node);

    let mut node = open(dir.path());
    assert_eq!(node.state().proposed(), Some(&l100));
    assert_eq!(
        propose(&mut node, rank(100), l100),
        Response::ProposeReject { phase1: Some(rank(100)), phase2: Some(rank(100)) },
    );
}

#[test]
fn competing_proposers_across_restart() {
    let dir = tempfile::tempdir().unwrap();
    let l100 = TestLayout::single(9000).at(100);
    let mine = Rank::new(100, proposer(5));
    let lower = Rank::new(100, proposer(2));
    let higher = Rank::new(100, proposer(8));
    let other = Rank::new(101, proposer(2));

    let mut node = open(dir.path());
    bootstrap(&mut node, TestLayout::single(9000));
    assert!(matches!(prepare(&mut node, mine), Response::PrepareAck { .. }));
    assert!(prepare(&mut node, lower).is_reject());
    assert!(matches!(prepare(&mut node, higher), Response::PrepareAck { .. }));
    assert!(matches!(prepare(&mut node, other), Response::PrepareAck { .. }));
    assert_eq!(node.state().phase1, Some(other));
    drop(node);

    let mut node = open(dir.path());
    assert_eq!(node.state().phase1, Some(other));
    assert_eq!(prepare(&mut node, other), Response::PrepareReject(Some(other)));

    // Same sequence, different proposer than the one holding the promise
    assert!(propose(&mut node, Rank::new(101, proposer(5)), l100.clone()).is_reject());
    assert_eq!(propose(&mut node, other, l100.clone()), Response::Ack);
    assert_eq!(node.state().phase2(), Some(other));
    assert_eq!(node.state().proposed(), Some(&l100));
}

#[test]
fn commit_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let l1 = TestLayout::single(9001).at(1);
    let mut node = open(dir.path());
    bootstrap(&mut node, TestLayout::single(9000));
    prepare(&mut node, rank(7));
    propose(&mut node, rank(7), l1.clone());
    let request = Request::Committed { rank: rank(7), layout: l1.clone(), epoch: 0 };
    assert_eq!(node.handle(request).unwrap(), Response::Ack);
    drop(node);

    let mut node = open(dir.path());
    assert_eq!(node.epoch(), 1);
    assert_eq!(node.state().phase1, None);
    assert_eq!(node.state().accepted, None);
    assert_eq!(node.handle(Request::GetLayout).unwrap(), Response::Layout { layout: l1, epoch: 1 });
    assert_eq!(prepare(&mut node, rank(1)), Response::PrepareAck { rank: None, layout: None });
}

#[test]
fn corrupt_record_refuses_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let mut node = open(dir.path());
    bootstrap(&mut node, TestLayout::single(9000));
    drop(node);

    let path = dir.path().join("acceptor.state");
    let mut bytes = std::fs::read(&path).unwrap();
    let middle = bytes.len() / 2;
    bytes[middle] ^= 0xff;
    std::fs::write(&path, &bytes).unwrap();

    let store = FileStore::<TestLayout>::open(dir.path()).unwrap();
    match Acceptor::open(store) {
    | Err(StorageError::Checksum { .. }) => (),
    | Err(other) => panic!("expected checksum failure, got {}", other),
    | Ok(_) => panic!("corrupt record loaded"),
    }
}
