//! Filtered reads, paging and identifier helpers through the store.

mod common;

use common::{open, Task};
use proptest::prelude::*;
use reldb_core::{
    format_id, join_seek_id, parse_id, seek, split_seek_id, Config, CoreError, Filter, Seekable,
    Store,
};
use std::ops::ControlFlow;

/// Six tasks: projects p1, p2, p1, p3, p1, p2; every even task is labeled "urgent".
fn seeded() -> Store<Task> {
    let store = open(Config::default().max_batch_calls(1));
    for (i, project) in ["p1", "p2", "p1", "p3", "p1", "p2"].into_iter().enumerate() {
        let mut task = Task::new(project, &format!("t{i}"));
        if i % 2 == 0 {
            task = task.labeled("urgent");
        }
        store.new_entry(task).unwrap();
    }
    store
}

fn page_titles(
    store: &Store<Task>,
    seek_id: Option<&str>,
    filters: &[Filter],
    limit: usize,
    reverse: bool,
) -> (Vec<String>, Option<String>) {
    let page = store.get_filtered(seek_id, filters, limit, reverse).unwrap();
    (page.entries.into_iter().map(|t| t.title).collect(), page.last_id)
}

#[test]
fn match_filter_reads_related_entries_in_id_order() {
    let store = seeded();
    let (titles, last) = page_titles(&store, None, &[Filter::matching("projects", "p1")], 0, false);
    assert_eq!(titles, vec!["t0", "t2", "t4"]);
    assert_eq!(last.as_deref(), Some("00000004"));

    let (titles, _) = page_titles(&store, None, &[Filter::matching("projects", "p1")], 0, true);
    assert_eq!(titles, vec!["t4", "t2", "t0"]);
}

#[test]
fn inverse_filter_alone_walks_every_entry() {
    let store = seeded();
    let (titles, _) = page_titles(
        &store,
        None,
        &[Filter::inverse_matching("projects", "p1")],
        0,
        false,
    );
    assert_eq!(titles, vec!["t1", "t3", "t5"]);
}

#[test]
fn filters_intersect() {
    let store = seeded();
    let filters = [
        Filter::inverse_matching("projects", "p1"),
        Filter::matching("labels", "urgent"),
    ];
    let (titles, _) = page_titles(&store, None, &filters, 0, false);
    assert!(titles.is_empty());

    let filters = [
        Filter::matching("projects", "p2"),
        Filter::inverse_matching("labels", "urgent"),
    ];
    let (titles, _) = page_titles(&store, None, &filters, 0, false);
    assert_eq!(titles, vec!["t1", "t5"]);
}

#[test]
fn unknown_relationship_id_is_an_empty_page() {
    let store = seeded();
    let page = store
        .get_filtered(None, &[Filter::matching("projects", "p9")], 10, false)
        .unwrap();
    assert!(page.entries.is_empty());
    assert_eq!(page.last_id, None);
}

#[test]
fn undeclared_relationship_key_is_rejected() {
    let store = seeded();
    let result = store.get_filtered(None, &[Filter::inverse_matching("owners", "u1")], 0, false);
    assert!(matches!(
        result,
        Err(CoreError::RelationshipNotFound { key }) if key == "owners"
    ));
}

#[test]
fn pages_resume_after_last_id() {
    let store = seeded();
    let filters = [Filter::matching("projects", "p1")];

    let (first, last) = page_titles(&store, None, &filters, 2, false);
    assert_eq!(first, vec!["t0", "t2"]);

    let (second, last) = page_titles(&store, last.as_deref(), &filters, 2, false);
    assert_eq!(second, vec!["t4"]);

    let (third, last) = page_titles(&store, last.as_deref(), &filters, 2, false);
    assert!(third.is_empty());
    assert_eq!(last, None);
}

#[test]
fn reverse_pages_resume_before_last_id() {
    let store = seeded();

    let (first, last) = page_titles(&store, None, &[], 4, true);
    assert_eq!(first, vec!["t5", "t4", "t3", "t2"]);

    let (second, _) = page_titles(&store, last.as_deref(), &[], 4, true);
    assert_eq!(second, vec!["t1", "t0"]);
}

#[test]
fn resume_after_removed_entry_does_not_skip() {
    let store = seeded();
    let (_, last) = page_titles(&store, None, &[], 3, false);
    assert_eq!(last.as_deref(), Some("00000002"));

    store.remove("00000002").unwrap();
    let (next, _) = page_titles(&store, last.as_deref(), &[], 0, false);
    assert_eq!(next, vec!["t3", "t4", "t5"]);
}

#[test]
fn sibling_relationship_ids_do_not_leak_into_scoped_reads() {
    let store = open(Config::default().max_batch_calls(1));
    store.new_entry(Task::new("a", "one")).unwrap();
    store.new_entry(Task::new("a:b", "colon")).unwrap();

    for sibling in ["a:", "a::b"] {
        assert!(matches!(
            store.new_entry(Task::new(sibling, "two")),
            Err(CoreError::InvalidRelationshipId { key, id }) if key == "projects" && id == sibling
        ));
    }

    let (titles, _) = page_titles(&store, None, &[Filter::matching("projects", "a")], 0, false);
    assert_eq!(titles, vec!["one"]);
    let (titles, _) = page_titles(&store, None, &[Filter::matching("projects", "a")], 0, true);
    assert_eq!(titles, vec!["one"]);
    let (titles, _) = page_titles(&store, None, &[Filter::matching("projects", "a:b")], 0, false);
    assert_eq!(titles, vec!["colon"]);
}

#[test]
fn for_each_id_stops_on_break() {
    let store = seeded();
    let mut seen = Vec::new();
    store
        .for_each_id(None, &[Filter::matching("labels", "urgent")], false, |id| {
            seen.push(id.to_string());
            Ok(if seen.len() == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            })
        })
        .unwrap();
    assert_eq!(seen, vec!["00000000", "00000002"]);
}

#[test]
fn for_each_propagates_callback_error() {
    let store = seeded();
    let result = store.for_each(None, &[], false, |_, task| {
        if task.title == "t3" {
            Err(CoreError::aborted("stop at t3"))
        } else {
            Ok(ControlFlow::Continue(()))
        }
    });
    assert!(matches!(result, Err(CoreError::Aborted { .. })));
}

#[test]
fn relationships_follow_edits() {
    let store = seeded();
    store.edit("00000003", Task::new("p1", "moved")).unwrap();

    let (titles, _) = page_titles(&store, None, &[Filter::matching("projects", "p1")], 0, false);
    assert_eq!(titles, vec!["t0", "t2", "moved", "t4"]);
    let (titles, _) = page_titles(&store, None, &[Filter::matching("projects", "p3")], 0, false);
    assert!(titles.is_empty());
}

#[test]
fn entry_cursor_seeks_by_id() {
    let store = seeded();
    let titles = store
        .cursor(|cursor| {
            let mut titles = Vec::new();
            let mut current = seek(cursor, Some("00000003"), false)?;
            while let Some((_, task)) = current {
                titles.push(task.title);
                current = cursor.next()?;
            }
            Ok(titles)
        })
        .unwrap();
    assert_eq!(titles, vec!["t4", "t5"]);
}

#[test]
fn relationship_membership_in_read_transaction() {
    let store = seeded();
    store
        .read_transaction(|txn| {
            assert!(!txn.is_writable());
            assert!(txn.is_related("projects", "p2", "00000005")?);
            assert!(!txn.is_related("projects", "p2", "00000004")?);

            let mut ids = txn.relationship_cursor("labels", "urgent")?;
            let first = ids.first()?;
            let last = ids.last()?;
            assert_eq!(first.as_deref(), Some("00000000"));
            assert_eq!(last.as_deref(), Some("00000004"));
            Ok(())
        })
        .unwrap();
}

#[test]
fn identifier_helpers() {
    assert_eq!(format_id(7, 8), "00000007");
    assert_eq!(parse_id("00000007").unwrap(), 7);
    assert!(matches!(
        parse_id("0000x007"),
        Err(CoreError::InvalidId { id, .. }) if id == "0000x007"
    ));

    let seek_id = join_seek_id("p1", "00000004");
    assert_eq!(seek_id, "p1::00000004");
    assert_eq!(split_seek_id(&seek_id), ("p1", "00000004"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn paging_visits_every_match_once(
        projects in proptest::collection::vec(0u8..3, 0..30),
        limit in 1usize..7,
        reverse in any::<bool>(),
    ) {
        let store = open(Config::default().max_batch_calls(1));
        let mut expected = Vec::new();
        for (i, project) in projects.iter().enumerate() {
            let title = format!("t{i}");
            store.new_entry(Task::new(&format!("p{project}"), &title)).unwrap();
            if *project == 1 {
                expected.push(title);
            }
        }
        if reverse {
            expected.reverse();
        }

        let filters = [Filter::matching("projects", "p1")];
        let mut seen = Vec::new();
        let mut last_id: Option<String> = None;
        loop {
            let page = store.get_filtered(last_id.as_deref(), &filters, limit, reverse).unwrap();
            prop_assert!(page.entries.len() <= limit);
            if page.entries.is_empty() {
                break;
            }
            seen.extend(page.entries.into_iter().map(|t| t.title));
            last_id = page.last_id;
        }
        prop_assert_eq!(seen, expected);
    }
}
