//! Protocol guarantees: cleanup on every exit path, the empty-selection /
//! empty-content asymmetry, listener pairing, and commit-failure atomicity.

use std::sync::Arc;

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

mod empty_cases {
    use super::*;

    #[test]
    fn test_empty_selection_is_a_noop_with_zero_locks() {
        // GIVEN a subscriber watching for updates
        let store = test_store();
        let id = store_sample(&store, "/db/a.xml");
        let subscriber = Arc::new(RecordingSubscriber::default());
        store.notifier().subscribe(subscriber.clone());

        // WHEN executing every variant against an empty selection
        let executor = UpdateExecutor::new(&store, admin());
        for kind in [
            OpKind::Replace,
            OpKind::Insert(InsertPosition::Into),
            OpKind::Delete,
            OpKind::Rename,
            OpKind::UpdateValue,
        ] {
            let outcome = executor
                .execute(
                    kind,
                    &NodeSetSelector(NodeSet::EMPTY),
                    &node_content(element("n", "2")),
                )
                .unwrap();
            assert!(outcome.is_noop());
        }

        // THEN nothing was locked, edited, or notified
        assert_eq!(store.locks().held(id), 0);
        assert_eq!(store.document(id).unwrap().read().node_count(), 3);
        assert!(subscriber.events().is_empty());
    }

    #[test]
    fn test_empty_content_is_an_error_for_content_operations() {
        let store = test_store();
        let id = store_sample(&store, "/db/a.xml");
        let executor = UpdateExecutor::new(&store, admin());
        for kind in [
            OpKind::Replace,
            OpKind::Insert(InsertPosition::Into),
            OpKind::Rename,
            OpKind::UpdateValue,
        ] {
            let result = executor.execute(
                kind,
                &select(id, &[1, 1]),
                &SequenceContent(Sequence::EMPTY),
            );
            assert!(matches!(result, Err(MutationError::EmptyContent)));
        }
        // Delete is the asymmetry: no content required.
        executor
            .execute(
                OpKind::Delete,
                &select(id, &[1, 1]),
                &SequenceContent(Sequence::EMPTY),
            )
            .unwrap();
    }
}

mod cleanup {
    use super::*;

    #[test]
    fn test_locks_released_after_permission_denial() {
        let store = test_store();
        let id = store_sample(&store, "/db/a.xml");
        let executor = UpdateExecutor::new(&store, guest());
        let result = executor.execute(
            OpKind::Delete,
            &select(id, &[1, 1]),
            &SequenceContent(Sequence::EMPTY),
        );
        assert!(matches!(result, Err(MutationError::PermissionDenied(_))));
        assert_eq!(store.locks().held(id), 0);
        // The denied writer did not block a later one.
        UpdateExecutor::new(&store, admin())
            .execute(
                OpKind::Delete,
                &select(id, &[1, 1]),
                &SequenceContent(Sequence::EMPTY),
            )
            .unwrap();
    }

    #[test]
    fn test_locks_released_after_apply_error() {
        let store = test_store();
        let id = store_sample(&store, "/db/a.xml");
        let result = UpdateExecutor::new(&store, admin()).execute(
            OpKind::Replace,
            &select(id, &[1]),
            &node_content(element("other", "x")),
        );
        assert!(matches!(result, Err(MutationError::RootReplacement(_))));
        assert_eq!(store.locks().held(id), 0);
    }

    #[test]
    fn test_locks_released_after_selection_type_error() {
        let store = test_store();
        let id = store_sample(&store, "/db/a.xml");
        // A selector producing atomics instead of nodes.
        let bad = |_: &Store| -> MutationResult<Sequence> {
            Ok(Sequence::one(Item::string("not a node")))
        };
        let result = UpdateExecutor::new(&store, admin()).execute(
            OpKind::Delete,
            &bad,
            &SequenceContent(Sequence::EMPTY),
        );
        assert!(matches!(result, Err(MutationError::SelectionType { .. })));
        assert_eq!(store.locks().held(id), 0);
    }

    #[test]
    fn test_listener_detached_on_success_and_failure() {
        // GIVEN a worker recording index events
        let store = test_store();
        let id = store_sample(&store, "/db/a.xml");
        let worker = Arc::new(RecordingWorker::default());
        store.register_worker(worker.clone());
        let executor = UpdateExecutor::new(&store, admin());

        // WHEN a successful insert runs
        executor
            .execute(
                OpKind::Insert(InsertPosition::Into),
                &select(id, &[1]),
                &node_content(element("n", "2")),
            )
            .unwrap();

        // THEN the worker saw the new element and its text, and the
        // listener slot is empty again
        assert_eq!(worker.event_count(), 2);
        assert!(!store.document(id).unwrap().read().metadata().has_listener());

        // WHEN a failing replace runs
        let before = worker.event_count();
        let result = executor.execute(
            OpKind::Replace,
            &select(id, &[1]),
            &node_content(element("other", "x")),
        );

        // THEN no event leaked and no listener stayed attached
        assert!(result.is_err());
        assert_eq!(worker.event_count(), before);
        assert!(!store.document(id).unwrap().read().metadata().has_listener());
    }
}

mod atomicity {
    use super::*;

    #[test]
    fn test_commit_failure_has_no_visible_effect() {
        // GIVEN a store whose journal accepts the setup commit only
        let store = failing_commit_store(1);
        let id = store_sample(&store, "/db/a.xml");
        let subscriber = Arc::new(RecordingSubscriber::default());
        store.notifier().subscribe(subscriber.clone());

        // WHEN the delete's commit is refused
        let result = UpdateExecutor::new(&store, admin()).execute(
            OpKind::Delete,
            &select(id, &[1, 1]),
            &SequenceContent(Sequence::EMPTY),
        );

        // THEN error, pre-image restored, nothing notified, lock released
        assert!(result.is_err());
        let handle = store.document(id).unwrap();
        assert_eq!(handle.read().node_count(), 3);
        assert!(subscriber.events().is_empty());
        assert_eq!(store.locks().held(id), 0);
    }

    #[test]
    fn test_partial_apply_failure_rolls_back_completed_edits() {
        // GIVEN one operation targeting a good node then a missing one
        let store = test_store();
        let id = store_sample(&store, "/db/a.xml");
        let targets: NodeSet = [
            NodeId::new(id, NodeAddr::from_path(vec![1, 1])),
            NodeId::new(id, NodeAddr::from_path(vec![1, 9])),
        ]
        .into_iter()
        .collect();

        // WHEN
        let result = UpdateExecutor::new(&store, admin()).execute(
            OpKind::Delete,
            &NodeSetSelector(targets),
            &SequenceContent(Sequence::EMPTY),
        );

        // THEN the successful first delete was undone with the failure
        assert!(matches!(result, Err(MutationError::InvalidSelection { .. })));
        assert_eq!(store.document(id).unwrap().read().node_count(), 3);
        assert_eq!(store.locks().held(id), 0);
    }
}

mod notification {
    use super::*;

    #[test]
    fn test_one_update_event_per_modified_document_after_commit() {
        // GIVEN two documents and a subscriber
        let store = test_store();
        let a = store_sample(&store, "/db/a.xml");
        let b = store_sample(&store, "/db/b.xml");
        let subscriber = Arc::new(RecordingSubscriber::default());
        store.notifier().subscribe(subscriber.clone());

        // WHEN one operation deletes a node in each
        let targets: NodeSet = [
            NodeId::new(a, NodeAddr::from_path(vec![1, 1])),
            NodeId::new(b, NodeAddr::from_path(vec![1, 1])),
        ]
        .into_iter()
        .collect();
        UpdateExecutor::new(&store, admin())
            .execute(
                OpKind::Delete,
                &NodeSetSelector(targets),
                &SequenceContent(Sequence::EMPTY),
            )
            .unwrap();

        // THEN exactly one Update per document, in ascending doc order
        assert_eq!(
            subscriber.events(),
            vec![(a, ChangeKind::Update), (b, ChangeKind::Update)]
        );
    }
}

mod defragmentation {
    use super::*;

    #[test]
    fn test_churn_past_threshold_triggers_reorganization() {
        // GIVEN a store with a two-edit threshold
        let store = defrag_store();
        let id = store_sample(&store, "/db/a.xml");
        let executor = UpdateExecutor::new(&store, admin());

        // WHEN churning the document past the threshold in one operation
        let content = SequenceContent(Sequence::from_items(vec![
            Item::constructed(element("n", "2")),
            Item::constructed(element("n", "3")),
            Item::constructed(element("n", "4")),
        ]));
        executor
            .execute(
                OpKind::Insert(InsertPosition::Into),
                &select(id, &[1]),
                &content,
            )
            .unwrap();

        // THEN the reorganization reset the accumulated stats
        let handle = store.document(id).unwrap();
        let doc = handle.read();
        assert_eq!(doc.metadata().fragmentation().edits(), 0);
        // Dense numbering survived: children are 1..4 under the root.
        let root = doc.root().unwrap();
        assert_eq!(doc.children(&root).len(), 4);
        assert!(doc.contains(&NodeAddr::from_path(vec![1, 4])));
    }
}
