//! End-to-end grouping scenarios over an in-memory store.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use horizon_msglist::config::GroupingConfig;
use horizon_msglist::model::classifier::DAY_MILLIS;
use horizon_msglist::model::translator;
use horizon_msglist::model::{
    GroupTable, GroupedCursor, MemoryRowStore, MessageRow, RowKind, RowStore, SelectionTracker,
    SortOrder,
};
use horizon_msglist::{Error, FixedClock};

// 2026-10-18T12:00:00Z
const T0: i64 = 1_792_324_800_000;

fn clock() -> FixedClock {
    FixedClock::from_millis_utc(T0)
}

fn by_timestamps(timestamps: &[i64]) -> MemoryRowStore {
    timestamps
        .iter()
        .enumerate()
        .map(|(i, &ts)| MessageRow::new(i as i64 + 1, ts))
        .collect::<Vec<_>>()
        .into()
}

fn by_subjects(subjects: &[Option<&str>]) -> MemoryRowStore {
    subjects
        .iter()
        .enumerate()
        .map(|(i, s)| MessageRow {
            id: i as i64 + 1,
            timestamp: T0,
            subject: s.map(str::to_owned),
            sender: None,
        })
        .collect::<Vec<_>>()
        .into()
}

/// Checks the structural invariants every table must satisfy.
fn assert_well_formed(table: &GroupTable, row_count: usize) {
    let entries = table.entries();
    assert_eq!(table.len(), row_count + table.group_count());
    if let Some(first) = entries.first() {
        assert!(first.is_group_header());
    }

    let mut previous_flat = 0;
    for (index, entry) in entries.iter().enumerate() {
        assert!(entry.flat_position() >= previous_flat);
        previous_flat = entry.flat_position();

        if entry.is_group_header() {
            let run = entries[index + 1..]
                .iter()
                .take_while(|e| !e.is_group_header())
                .count();
            assert_eq!(entry.item_count(), run);
            assert_eq!(entries[index + 1].flat_position(), entry.flat_position());
        }
    }
    assert!(table.visible_count() <= table.len());
}

#[test]
fn test_date_boundaries_yield_four_groups() {
    let mut store = by_timestamps(&[T0, T0 - 2 * DAY_MILLIS, T0 - 10 * DAY_MILLIS, T0 - 40 * DAY_MILLIS]);
    let table = GroupTable::build(&mut store, SortOrder::DateDesc, &clock()).unwrap();

    assert_eq!(table.group_count(), 4);
    assert_eq!(table.len(), 8);
    assert_well_formed(&table, 4);
}

#[test]
fn test_null_subjects_each_start_a_group() {
    let mut store = by_subjects(&[Some("Hi"), Some("Hi"), None, None, Some("Bye")]);
    let table = GroupTable::build(&mut store, SortOrder::Subject, &clock()).unwrap();

    assert_eq!(table.group_count(), 4);
    assert_eq!(table.len(), 9);
    let counts: Vec<_> = table.groups().map(|g| g.len()).collect();
    assert_eq!(counts, vec![2, 1, 1, 1]);
    assert_well_formed(&table, 5);
}

#[test]
fn test_single_group_toggle_counts() {
    let store = by_subjects(&[Some("Hi"); 5]);
    let mut cursor = GroupedCursor::new(store, SortOrder::Subject, &clock()).unwrap();

    assert_eq!(cursor.count(), 6);
    assert!(cursor.toggle_group(0).unwrap());
    assert_eq!(cursor.count(), 1);
    assert!(cursor.toggle_group(0).unwrap());
    assert_eq!(cursor.count(), 6);
}

#[test]
fn test_collapse_then_expand_restores_flags() {
    let store = by_timestamps(&[
        T0,
        T0 - 3_600_000,
        T0 - 2 * DAY_MILLIS,
        T0 - 3 * DAY_MILLIS,
        T0 - 3 * DAY_MILLIS - 60_000,
    ]);
    let mut cursor = GroupedCursor::new(store, SortOrder::DateDesc, &clock()).unwrap();
    cursor.toggle_group(0).unwrap();
    let before_count = cursor.count();
    let before = cursor.table().clone();

    // Third header in the partially collapsed list.
    let header = (0..cursor.count())
        .filter(|&v| cursor.entry_kind(v).is_some_and(|k| k.is_header()))
        .nth(2)
        .unwrap();
    cursor.toggle_group(header).unwrap();
    assert_ne!(cursor.count(), before_count);
    cursor.toggle_group(header).unwrap();

    assert_eq!(cursor.count(), before_count);
    assert_eq!(cursor.table(), &before);
}

#[test]
fn test_item_counts_survive_collapse() {
    let store = by_subjects(&[Some("a"), Some("a"), Some("b"), Some("b"), Some("b")]);
    let mut cursor = GroupedCursor::new(store, SortOrder::Subject, &clock()).unwrap();
    cursor.collapse_all();

    assert_eq!(cursor.count(), 2);
    assert_eq!(cursor.entry_kind(0), Some(RowKind::Header { item_count: 2 }));
    assert_eq!(cursor.item_count_label(1), 3);
    assert_eq!(cursor.item_count_for_group(2), 0);
}

#[test]
fn test_visible_positions_round_trip() {
    let store = by_subjects(&[Some("a"), Some("a"), Some("b"), None, Some("c"), Some("c")]);
    let mut cursor = GroupedCursor::new(store, SortOrder::Subject, &clock()).unwrap();
    cursor.toggle_group(3).unwrap();

    let entries = cursor.table().entries();
    for visible in 0..cursor.count() as isize {
        let flat = translator::flat_position_for_visible(entries, visible);
        let index = translator::entry_index_for_visible(entries, visible) as usize;
        let back = translator::visible_position_for_entry(entries, index).unwrap();
        assert_eq!(back as isize, visible);
        assert_eq!(translator::flat_position_for_visible(entries, back as isize), flat);
    }
}

#[test]
fn test_navigation_reads_the_right_rows() {
    let store = by_subjects(&[Some("a"), Some("a"), Some("b")]);
    let mut cursor = GroupedCursor::new(store, SortOrder::Subject, &clock()).unwrap();
    cursor.toggle_group(0).unwrap();

    let mut seen = Vec::new();
    while cursor.move_next().unwrap() {
        seen.push((cursor.current_kind().unwrap(), cursor.row_id().unwrap()));
    }
    assert_eq!(
        seen,
        vec![
            (RowKind::Header { item_count: 2 }, 1),
            (RowKind::Header { item_count: 1 }, 3),
            (RowKind::Item, 3),
        ]
    );
}

#[test]
fn test_group_select_then_deselect_leaves_items_unchanged() {
    let store = by_subjects(&[Some("a"), Some("a"), Some("b"), Some("b")]);
    let mut cursor = GroupedCursor::new(store, SortOrder::Subject, &clock()).unwrap();
    cursor.collapse_all();

    let mut selection = SelectionTracker::new();
    selection.set_item_selected(3, true);
    let changes = Arc::new(AtomicUsize::new(0));
    let changes_clone = changes.clone();
    selection.selection_changed.connect(move |_| {
        changes_clone.fetch_add(1, Ordering::SeqCst);
    });

    let outcome = selection
        .set_group_selected(&mut cursor, 0, true)
        .unwrap()
        .unwrap();
    assert!(outcome.layout_changed);
    assert_eq!(outcome.items_affected, 2);
    assert!(selection.is_selected(1, false) && selection.is_selected(2, false));

    selection.set_group_selected(&mut cursor, 0, false).unwrap();
    let mut items: Vec<_> = selection.selected_items().collect();
    items.sort_unstable();
    assert_eq!(items, vec![3]);
    assert_eq!(changes.load(Ordering::SeqCst), 2);
}

#[test]
fn test_empty_store_is_an_empty_list() {
    let mut cursor =
        GroupedCursor::new(MemoryRowStore::default(), SortOrder::Sender, &clock()).unwrap();
    assert_eq!(cursor.count(), 0);
    assert_eq!(cursor.entry_kind(0), None);
    assert!(!cursor.move_next().unwrap());
    assert!(matches!(cursor.row_id(), Err(Error::NoCurrentRow)));
    assert!(!cursor.move_to_visible(1).unwrap());
    assert!(cursor.is_after_last());
}

#[test]
fn test_sentinel_and_out_of_range_positions() {
    let store = by_subjects(&[Some("a"), Some("b")]);
    let mut cursor = GroupedCursor::new(store, SortOrder::Subject, &clock()).unwrap();

    assert!(!cursor.move_to_visible(-1).unwrap());
    assert!(cursor.is_before_first());
    assert!(!cursor.move_to_visible(cursor.count() as isize).unwrap());
    assert!(cursor.is_after_last());
    assert_eq!(cursor.store().position(), 2);

    let err = cursor.move_to_visible(-5).unwrap_err();
    assert!(matches!(err, Error::OutOfRange { position: -5, row_count: 2 }));
}

#[test]
fn test_config_drives_initial_state() {
    let config = GroupingConfig::from_toml_str(
        r#"
        sort_order = "subject"
        expanded_by_default = false
        "#,
    )
    .unwrap();
    let store = by_subjects(&[Some("a"), Some("a"), Some("b")]);
    let mut cursor = GroupedCursor::with_config(store, &config, &clock()).unwrap();

    assert_eq!(cursor.count(), 2);
    assert!(cursor.expand_all());
    assert_eq!(cursor.count(), 5);

    let disabled = GroupingConfig {
        enabled: false,
        ..config
    };
    let store = by_subjects(&[Some("a"), Some("a"), Some("b")]);
    let cursor = GroupedCursor::with_config(store, &disabled, &clock()).unwrap();
    assert_eq!(cursor.count(), 3);
    assert_eq!(cursor.table().group_count(), 2);
}

#[test]
fn test_build_logs_under_a_subscriber() {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter("horizon_msglist=debug")
        .with_test_writer()
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let mut store = by_subjects(&[Some("a"), Some("b")]);
        let table = GroupTable::build(&mut store, SortOrder::Subject, &clock()).unwrap();
        assert_eq!(table.group_count(), 2);
        assert_eq!(store.position(), -1);
    });
}
