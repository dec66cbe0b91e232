mod common;

use common::backends;
use jot_core::{EntryStore, NamespaceStore, SqliteJotStore, StoreError};
use jot_core::db::open_db_in_memory;
use rusqlite::params;
use std::path::Path;

#[test]
fn create_then_get_returns_content_and_timestamp() {
    for backend in backends() {
        let store = backend.store;
        let namespace = store.track(Path::new("/proj")).unwrap();

        let id = store.create(namespace.id, "todo", "buy milk").unwrap();
        assert_eq!(id.namespace_id, namespace.id);
        assert_eq!(id.title, "todo");

        let entry = store.get(namespace.id, "todo").unwrap();
        assert_eq!(entry.content, "buy milk", "{}", backend.name);
        assert!(entry.updated_at > 0);
        assert_eq!(entry.id(), id);
    }
}

#[test]
fn empty_content_is_stored_as_empty_string() {
    for backend in backends() {
        let store = backend.store;
        let namespace = store.track(Path::new("/proj")).unwrap();
        store.create(namespace.id, "blank", "").unwrap();
        assert_eq!(store.get(namespace.id, "blank").unwrap().content, "");
    }
}

#[test]
fn get_missing_entry_reports_title() {
    for backend in backends() {
        let store = backend.store;
        let namespace = store.track(Path::new("/proj")).unwrap();
        let err = store.get(namespace.id, "nope").unwrap_err();
        assert!(
            matches!(&err, StoreError::EntryNotFound(title) if title == "nope"),
            "{}: {err}",
            backend.name
        );
    }
}

#[test]
fn duplicate_create_fails_without_overwriting() {
    for backend in backends() {
        let store = backend.store;
        let namespace = store.track(Path::new("/proj")).unwrap();
        store.create(namespace.id, "todo", "first").unwrap();

        let err = store.create(namespace.id, "todo", "second").unwrap_err();
        assert!(
            matches!(&err, StoreError::DuplicateEntry(title) if title == "todo"),
            "{}: {err}",
            backend.name
        );
        assert_eq!(store.get(namespace.id, "todo").unwrap().content, "first");
    }
}

#[test]
fn same_title_in_different_namespaces_is_independent() {
    for backend in backends() {
        let store = backend.store;
        let left = store.track(Path::new("/left")).unwrap();
        let right = store.track(Path::new("/right")).unwrap();

        store.create(left.id, "todo", "left side").unwrap();
        store.create(right.id, "todo", "right side").unwrap();

        assert_eq!(store.get(left.id, "todo").unwrap().content, "left side");
        assert_eq!(store.get(right.id, "todo").unwrap().content, "right side");
    }
}

#[test]
fn update_replaces_content_and_never_moves_timestamp_backwards() {
    for backend in backends() {
        let store = backend.store;
        let namespace = store.track(Path::new("/proj")).unwrap();
        store.create(namespace.id, "todo", "buy milk").unwrap();
        let before = store.get(namespace.id, "todo").unwrap();

        store.update(namespace.id, "todo", "buy milk").unwrap();
        let same = store.get(namespace.id, "todo").unwrap();
        assert_eq!(same.content, before.content, "{}", backend.name);
        assert!(same.updated_at >= before.updated_at, "{}", backend.name);

        store.update(namespace.id, "todo", "buy bread").unwrap();
        let changed = store.get(namespace.id, "todo").unwrap();
        assert_eq!(changed.content, "buy bread", "{}", backend.name);
        assert!(changed.updated_at >= same.updated_at, "{}", backend.name);
    }
}

#[test]
fn update_missing_entry_fails_with_not_found() {
    for backend in backends() {
        let store = backend.store;
        let namespace = store.track(Path::new("/proj")).unwrap();
        let err = store.update(namespace.id, "ghost", "boo").unwrap_err();
        assert!(
            matches!(&err, StoreError::EntryNotFound(title) if title == "ghost"),
            "{}: {err}",
            backend.name
        );
        assert!(store.list_by_namespace(namespace.id).unwrap().is_empty());
    }
}

#[test]
fn delete_removes_entry_and_rejects_missing_title() {
    for backend in backends() {
        let store = backend.store;
        let namespace = store.track(Path::new("/proj")).unwrap();
        store.create(namespace.id, "todo", "x").unwrap();

        store.delete(namespace.id, "todo").unwrap();
        assert!(store.list_by_namespace(namespace.id).unwrap().is_empty());

        let err = store.delete(namespace.id, "todo").unwrap_err();
        assert!(
            matches!(err, StoreError::EntryNotFound(_)),
            "{}",
            backend.name
        );
    }
}

#[test]
fn create_rejects_invalid_titles() {
    for backend in backends() {
        let store = backend.store;
        let namespace = store.track(Path::new("/proj")).unwrap();
        for title in ["", "   ", "two\nlines"] {
            let err = store.create(namespace.id, title, "x").unwrap_err();
            assert!(
                matches!(err, StoreError::InvalidTitle { .. }),
                "{}: {title:?}",
                backend.name
            );
        }
        assert!(store.list_by_namespace(namespace.id).unwrap().is_empty());
    }
}

#[test]
fn titles_with_separators_are_stored_verbatim() {
    for backend in backends() {
        let store = backend.store;
        let namespace = store.track(Path::new("/proj")).unwrap();
        store.create(namespace.id, "docs/api notes", "body").unwrap();

        let listed = store.list_by_namespace(namespace.id).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "docs/api notes", "{}", backend.name);
    }
}

#[test]
fn list_by_namespace_only_returns_own_entries() {
    for backend in backends() {
        let store = backend.store;
        let mine = store.track(Path::new("/mine")).unwrap();
        let other = store.track(Path::new("/other")).unwrap();
        store.create(mine.id, "a", "").unwrap();
        store.create(mine.id, "b", "").unwrap();
        store.create(other.id, "c", "").unwrap();

        let mut titles = store
            .list_by_namespace(mine.id)
            .unwrap()
            .into_iter()
            .map(|entry| entry.title)
            .collect::<Vec<_>>();
        titles.sort();
        assert_eq!(titles, vec!["a", "b"], "{}", backend.name);
    }
}

#[test]
fn sqlite_list_orders_by_updated_at_desc_then_title() {
    let store = SqliteJotStore::try_new(open_db_in_memory().unwrap()).unwrap();
    let namespace = store.track(Path::new("/proj")).unwrap();
    for title in ["older", "newer", "alpha", "beta"] {
        store.create(namespace.id, title, "").unwrap();
    }

    let conn = store.connection();
    for (title, updated_at) in [("older", 1_000), ("newer", 3_000), ("alpha", 2_000), ("beta", 2_000)]
    {
        conn.execute(
            "UPDATE entries SET updated_at = ?1 WHERE title = ?2;",
            params![updated_at, title],
        )
        .unwrap();
    }

    let titles = store
        .list_by_namespace(namespace.id)
        .unwrap()
        .into_iter()
        .map(|entry| entry.title)
        .collect::<Vec<_>>();
    assert_eq!(titles, vec!["newer", "alpha", "beta", "older"]);
}

#[test]
fn sqlite_update_keeps_later_timestamp_when_clock_is_behind() {
    let store = SqliteJotStore::try_new(open_db_in_memory().unwrap()).unwrap();
    let namespace = store.track(Path::new("/proj")).unwrap();
    store.create(namespace.id, "todo", "x").unwrap();

    let future = i64::MAX / 2;
    store
        .connection()
        .execute(
            "UPDATE entries SET updated_at = ?1 WHERE title = 'todo';",
            [future],
        )
        .unwrap();

    store.update(namespace.id, "todo", "y").unwrap();
    let entry = store.get(namespace.id, "todo").unwrap();
    assert_eq!(entry.content, "y");
    assert_eq!(entry.updated_at, future);
}
