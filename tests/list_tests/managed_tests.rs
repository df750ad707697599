//! ManagedList Tests
//!
//! Tests verify:
//! - Append / remove_last LIFO behaviour on the tail
//! - Bounds checking in get
//! - Concurrent readers and writers on one list

use std::sync::Arc;
use std::thread;

use remotelist::list::ManagedList;
use remotelist::ListError;

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_list_is_empty() {
    let list = ManagedList::new("a");

    assert_eq!(list.id(), "a");
    assert_eq!(list.size(), 0);
    assert!(list.is_empty());
    assert_eq!(list.to_vec(), Vec::<i64>::new());
}

#[test]
fn test_append_and_get() {
    let list = ManagedList::new("a");

    list.append(10);
    list.append(20);
    list.append(30);

    assert_eq!(list.size(), 3);
    assert_eq!(list.get(0).unwrap(), 10);
    assert_eq!(list.get(1).unwrap(), 20);
    assert_eq!(list.get(2).unwrap(), 30);
}

#[test]
fn test_duplicates_are_kept() {
    let list = ManagedList::new("a");

    list.append(5);
    list.append(5);

    assert_eq!(list.to_vec(), vec![5, 5]);
}

#[test]
fn test_remove_last_is_lifo() {
    let list = ManagedList::with_values("a", vec![1, 2, 3]);

    assert_eq!(list.remove_last().unwrap(), 3);
    assert_eq!(list.remove_last().unwrap(), 2);
    list.append(4);
    assert_eq!(list.remove_last().unwrap(), 4);
    assert_eq!(list.to_vec(), vec![1]);
}

#[test]
fn test_remove_last_on_empty_list() {
    let list = ManagedList::new("empty");

    match list.remove_last() {
        Err(ListError::EmptyList(id)) => assert_eq!(id, "empty"),
        other => panic!("expected EmptyList, got {:?}", other),
    }
    assert_eq!(list.size(), 0);
}

#[test]
fn test_get_out_of_range() {
    let list = ManagedList::with_values("a", vec![1, 2]);

    for index in [2, 3, i32::MAX, -1, i32::MIN] {
        match list.get(index) {
            Err(ListError::IndexOutOfRange { index: i, size }) => {
                assert_eq!(i, index);
                assert_eq!(size, 2);
            }
            other => panic!("expected IndexOutOfRange for {}, got {:?}", index, other),
        }
    }

    // State is untouched
    assert_eq!(list.to_vec(), vec![1, 2]);
}

#[test]
fn test_guards_expose_values() {
    let list = ManagedList::with_values("a", vec![1, 2]);

    {
        let mut data = list.write();
        data.push(3);
    }

    assert_eq!(*list.read(), vec![1, 2, 3]);
}

// =============================================================================
// Concurrent Access Tests
// =============================================================================

#[test]
fn test_concurrent_appends_are_all_kept() {
    let list = Arc::new(ManagedList::new("shared"));

    let mut handles = vec![];
    for t in 0..4 {
        let list = Arc::clone(&list);
        handles.push(thread::spawn(move || {
            for i in 0..250 {
                list.append(t * 1000 + i);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let mut values = list.to_vec();
    assert_eq!(values.len(), 1000);
    values.sort();
    let mut expected: Vec<i64> = (0..4)
        .flat_map(|t| (0..250).map(move |i| t * 1000 + i))
        .collect();
    expected.sort();
    assert_eq!(values, expected);
}

#[test]
fn test_concurrent_readers_see_consistent_sizes() {
    let list = Arc::new(ManagedList::with_values("a", (0..100).collect()));

    let mut handles = vec![];
    for _ in 0..4 {
        let list = Arc::clone(&list);
        handles.push(thread::spawn(move || {
            for i in 0..100 {
                assert_eq!(list.get(i).unwrap(), i as i64);
                assert_eq!(list.size(), 100);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
}
