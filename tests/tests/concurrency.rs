//! Concurrency: disjoint operations run freely, overlapping ones
//! serialize per document, and timed-out acquisitions leave nothing held.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use xylem_tests::prelude::*;

fn select(id: DocumentId, path: &[u32]) -> NodeSetSelector {
    NodeSetSelector(
        [NodeId::new(id, NodeAddr::from_path(path.to_vec()))]
            .into_iter()
            .collect(),
    )
}

fn node_content(tree: NodeTree) -> SequenceContent {
    SequenceContent(Sequence::one(Item::constructed(tree)))
}

fn docs(ids: &[DocumentId]) -> DocumentSet {
    ids.iter().copied().collect()
}

#[test]
fn test_disjoint_documents_do_not_contend() {
    // GIVEN document a exclusively locked by someone else
    let store = Arc::new(test_store());
    let a = store_sample(&store, "/db/a.xml");
    let b = store_sample(&store, "/db/b.xml");
    let held = store.locks().acquire(&docs(&[a]), LockMode::Exclusive).unwrap();

    // WHEN an update targets only document b
    let outcome = UpdateExecutor::new(&store, admin())
        .execute(
            OpKind::Delete,
            &select(b, &[1, 1]),
            &SequenceContent(Sequence::EMPTY),
        )
        .unwrap();

    // THEN it went through without waiting on a's lock
    assert_eq!(outcome.nodes_modified(), 1);
    drop(held);
}

#[test]
fn test_overlapping_writers_serialize_on_the_shared_document() {
    // GIVEN two writers inserting into the same root from two threads
    let store = Arc::new(test_store());
    let id = store_sample(&store, "/db/a.xml");

    let handles: Vec<_> = (2..=3u32)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                UpdateExecutor::new(&store, admin())
                    .execute(
                        OpKind::Insert(InsertPosition::Into),
                        &select(id, &[1]),
                        &node_content(element("n", &i.to_string())),
                    )
                    .is_ok()
            })
        })
        .collect();

    // THEN both commit, and both edits are visible
    for handle in handles {
        assert!(handle.join().unwrap());
    }
    let handle = store.document(id).unwrap();
    let doc = handle.read();
    let root = doc.root().unwrap();
    assert_eq!(doc.child_elements_named(&root, "n").len(), 3);
    assert_eq!(store.locks().held(id), 0);
}

#[test]
fn test_reader_blocks_writer_until_release() {
    // GIVEN a shared lock held on the document
    let store = Arc::new(test_store());
    let id = store_sample(&store, "/db/a.xml");
    let reader = store.locks().acquire(&docs(&[id]), LockMode::Shared).unwrap();

    // WHEN a writer tries within the bounded wait
    let result = UpdateExecutor::new(&store, admin()).execute(
        OpKind::Delete,
        &select(id, &[1, 1]),
        &SequenceContent(Sequence::EMPTY),
    );

    // THEN it times out without touching the document or leaking a lock
    assert!(matches!(
        result,
        Err(MutationError::Lock(xylem_store::LockError::Timeout { .. }))
    ));
    assert_eq!(store.document(id).unwrap().read().node_count(), 3);
    assert_eq!(store.locks().held(id), 1);

    // WHEN the reader releases
    drop(reader);

    // THEN the writer proceeds
    UpdateExecutor::new(&store, admin())
        .execute(
            OpKind::Delete,
            &select(id, &[1, 1]),
            &SequenceContent(Sequence::EMPTY),
        )
        .unwrap();
    assert_eq!(store.locks().held(id), 0);
}

#[test]
fn test_timed_out_multi_document_acquisition_leaves_nothing_held() {
    // GIVEN the higher-id document exclusively held elsewhere
    let store = Arc::new(test_store());
    let a = store_sample(&store, "/db/a.xml");
    let b = store_sample(&store, "/db/b.xml");
    let held = store.locks().acquire(&docs(&[b]), LockMode::Exclusive).unwrap();

    // WHEN one operation targets both documents
    let targets: NodeSet = [
        NodeId::new(a, NodeAddr::from_path(vec![1, 1])),
        NodeId::new(b, NodeAddr::from_path(vec![1, 1])),
    ]
    .into_iter()
    .collect();
    let result = UpdateExecutor::new(&store, admin()).execute(
        OpKind::Delete,
        &NodeSetSelector(targets),
        &SequenceContent(Sequence::EMPTY),
    );

    // THEN the timeout released a's already-taken lock and edited nothing
    assert!(matches!(result, Err(MutationError::Lock(_))));
    assert_eq!(store.locks().held(a), 0);
    assert_eq!(store.document(a).unwrap().read().node_count(), 3);
    assert_eq!(store.document(b).unwrap().read().node_count(), 3);
    drop(held);
}

#[test]
fn test_blocked_writer_proceeds_after_release() {
    // GIVEN a writer holding the document while another waits
    let store = Arc::new(test_store());
    let id = store_sample(&store, "/db/a.xml");
    let held = store.locks().acquire(&docs(&[id]), LockMode::Exclusive).unwrap();

    let contender = {
        let store = Arc::clone(&store);
        thread::spawn(move || {
            UpdateExecutor::new(&store, admin())
                .execute(
                    OpKind::UpdateValue,
                    &select(id, &[1, 1]),
                    &SequenceContent(Sequence::one(Item::string("2"))),
                )
                .is_ok()
        })
    };

    // WHEN the holder releases within the contender's bounded wait
    thread::sleep(Duration::from_millis(30));
    drop(held);

    // THEN the contender's update committed
    assert!(contender.join().unwrap());
    let handle = store.document(id).unwrap();
    assert_eq!(
        handle
            .read()
            .string_value(&NodeAddr::from_path(vec![1, 1]))
            .unwrap(),
        "2"
    );
}
