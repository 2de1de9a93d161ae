#![forbid(unsafe_code)]

//! Property-based invariant tests for computed field caching.
//!
//! These tests verify invariants that must hold for **any** sequence of
//! writes and reads:
//!
//! 1. A write dirties exactly the computed fields that declare the written key.
//! 2. Getters run once per dirtying, never on a cache hit.
//! 3. Volatile fields run their getter on every read.
//! 4. Array-derived fields always match a plain `Vec` model after any sequence
//!    of mutations.
//! 5. Per-element bindings track exactly the elements currently in the list.

use std::cell::Cell;
use std::rc::Rc;

use computed_core::{ComputedField, ReactiveObject, Slot, Value};
use proptest::prelude::*;

const KEYS: [&str; 4] = ["a", "b", "c", "d"];

// ── Strategies ──────────────────────────────────────────────────────────

/// For each of four computed fields, the subset of KEYS it depends on.
fn dependency_sets() -> impl Strategy<Value = Vec<Vec<usize>>> {
    proptest::collection::vec(proptest::collection::vec(0usize..KEYS.len(), 0..3), 4)
}

/// A sequence of (key index, value) writes.
fn writes() -> impl Strategy<Value = Vec<(usize, i64)>> {
    proptest::collection::vec((0usize..KEYS.len(), -50i64..50), 1..40)
}

#[derive(Debug, Clone)]
enum ArrayOp {
    Push(i64),
    Unshift(i64),
    Pop,
    Shift,
    Splice(usize, usize, Vec<i64>),
    Set(usize, i64),
    Sort,
}

fn array_ops() -> impl Strategy<Value = Vec<ArrayOp>> {
    let op = prop_oneof![
        (-9i64..9).prop_map(ArrayOp::Push),
        (-9i64..9).prop_map(ArrayOp::Unshift),
        Just(ArrayOp::Pop),
        Just(ArrayOp::Shift),
        (0usize..6, 0usize..3, proptest::collection::vec(-9i64..9, 0..3))
            .prop_map(|(s, d, items)| ArrayOp::Splice(s, d, items)),
        (0usize..6, -9i64..9).prop_map(|(i, v)| ArrayOp::Set(i, v)),
        Just(ArrayOp::Sort),
    ];
    proptest::collection::vec(op, 1..30)
}

// ── Helpers ─────────────────────────────────────────────────────────────

struct Counted {
    field: ComputedField,
    calls: Rc<Cell<u32>>,
    deps: Vec<usize>,
}

fn build(deps: &[Vec<usize>]) -> (ReactiveObject, Vec<Counted>) {
    let object = ReactiveObject::wrap(KEYS.iter().map(|k| (*k, Slot::from(0))));
    let fields = deps
        .iter()
        .enumerate()
        .map(|(i, dep)| {
            let calls = Rc::new(Cell::new(0u32));
            let calls_in = Rc::clone(&calls);
            let paths: Vec<&str> = dep.iter().map(|&k| KEYS[k]).collect();
            let sum_keys = paths.iter().map(|p| (*p).to_owned()).collect::<Vec<_>>();
            let field = ComputedField::new(paths, move |o, _, _| {
                calls_in.set(calls_in.get() + 1);
                let sum: i64 = sum_keys
                    .iter()
                    .map(|k| o.get(k).as_i64().unwrap_or_default())
                    .sum();
                Value::from(sum)
            });
            object.set(&format!("computed{i}"), field.clone()).unwrap();
            Counted {
                field,
                calls,
                deps: dep.clone(),
            }
        })
        .collect();
    (object, fields)
}

fn apply_model(model: &mut Vec<i64>, op: &ArrayOp) {
    match op {
        ArrayOp::Push(v) => model.push(*v),
        ArrayOp::Unshift(v) => model.insert(0, *v),
        ArrayOp::Pop => {
            model.pop();
        }
        ArrayOp::Shift => {
            if !model.is_empty() {
                model.remove(0);
            }
        }
        ArrayOp::Splice(start, delete, items) => {
            let start = (*start).min(model.len());
            let end = start + (*delete).min(model.len() - start);
            model.splice(start..end, items.iter().copied());
        }
        ArrayOp::Set(index, v) => {
            if let Some(slot) = model.get_mut(*index) {
                *slot = *v;
            }
        }
        ArrayOp::Sort => model.sort_unstable(),
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 1 + 2. Writes dirty exactly the dependents; getters run once per dirtying
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn writes_dirty_exactly_dependents(deps in dependency_sets(), ops in writes()) {
        let (object, fields) = build(&deps);
        for i in 0..fields.len() {
            let _ = object.get(&format!("computed{i}"));
        }

        let mut expected_calls: Vec<u32> = fields.iter().map(|f| f.calls.get()).collect();
        for (key, value) in ops {
            object.set(KEYS[key], value).unwrap();
            for (i, f) in fields.iter().enumerate() {
                let should_be_dirty = f.deps.contains(&key);
                prop_assert_eq!(f.field.is_dirty(), should_be_dirty,
                    "computed{} deps {:?} after write to {}", i, f.deps, KEYS[key]);
                let read = object.get(&format!("computed{i}"));
                if should_be_dirty {
                    expected_calls[i] += 1;
                }
                prop_assert_eq!(f.calls.get(), expected_calls[i]);
                let sum: i64 = f.deps.iter().map(|&k| object.get(KEYS[k]).as_i64().unwrap_or_default()).sum();
                prop_assert_eq!(read, Value::from(sum));
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Consecutive reads never call the getter twice
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn consecutive_reads_hit_cache(deps in dependency_sets(), reads in 2usize..10) {
        let (object, fields) = build(&deps);
        for i in 0..fields.len() {
            let first = object.get(&format!("computed{i}"));
            for _ in 1..reads {
                prop_assert_eq!(object.get(&format!("computed{i}")), first.clone());
            }
            prop_assert_eq!(fields[i].calls.get(), 1);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Volatile fields recompute on every read
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn volatile_counts_every_read(reads in 1u32..25) {
        let calls = Rc::new(Cell::new(0u32));
        let calls_in = Rc::clone(&calls);
        let object = ReactiveObject::wrap([(
            "now",
            ComputedField::new(["tick"], move |_, _, _| {
                calls_in.set(calls_in.get() + 1);
                Value::from(i64::from(calls_in.get()))
            })
            .volatile(),
        )]);
        for n in 1..=reads {
            prop_assert_eq!(object.get("now"), Value::from(i64::from(n)));
        }
        prop_assert_eq!(calls.get(), reads);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Array-derived fields match a Vec model
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn array_projection_matches_model(ops in array_ops()) {
        let object = ReactiveObject::wrap([
            ("items", Slot::from(vec![1i64, 2, 3])),
            (
                "total",
                Slot::from(ComputedField::new(["items.[]"], |o, _, _| {
                    let total: i64 = o
                        .get("items")
                        .as_list()
                        .unwrap_or_default()
                        .iter()
                        .filter_map(Value::as_i64)
                        .sum();
                    Value::from(total)
                })),
            ),
        ]);
        let field = object.computed("total").unwrap();
        let mut model = vec![1i64, 2, 3];

        for op in &ops {
            let _ = object.get("total");
            let items = object.array("items").unwrap();
            let ok = match op {
                ArrayOp::Push(v) => items.push(*v).is_ok(),
                ArrayOp::Unshift(v) => items.unshift(*v).is_ok(),
                ArrayOp::Pop => items.pop().is_ok(),
                ArrayOp::Shift => items.shift().is_ok(),
                ArrayOp::Splice(s, d, xs) => items.splice(*s, *d, xs.clone()).is_ok(),
                ArrayOp::Set(i, v) => items.set(*i, *v).is_ok(),
                ArrayOp::Sort => items.sort().is_ok(),
            };
            apply_model(&mut model, op);
            prop_assert_eq!(field.is_dirty(), ok, "op {:?}", op);
            prop_assert_eq!(items.to_vec(), model.iter().map(|v| Value::from(*v)).collect::<Vec<_>>());
            prop_assert_eq!(object.get("total"), Value::from(model.iter().sum::<i64>()));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Per-element bindings follow membership
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn element_bindings_follow_membership(
        inserts in proptest::collection::vec(any::<bool>(), 1..12)
    ) {
        let object = ReactiveObject::wrap([
            ("items", Slot::from(Vec::<Value>::new())),
            ("names", Slot::from(ComputedField::new(["items.@each.name"], |o, _, _| {
                Value::from(o.get("items").as_list().map_or(0, <[Value]>::len) as i64)
            }))),
        ]);
        let field = object.computed("names").unwrap();
        let mut members: Vec<ReactiveObject> = Vec::new();
        let mut removed: Vec<ReactiveObject> = Vec::new();

        for insert in inserts {
            let items = object.array("items").unwrap();
            if insert || members.is_empty() {
                let element = ReactiveObject::wrap([("name", "n")]);
                items.push(element.clone()).unwrap();
                members.push(element);
            } else {
                items.shift().unwrap();
                removed.push(members.remove(0));
            }
        }

        for element in &members {
            prop_assert_eq!(element.binding_count("name"), 1);
            let _ = object.get("names");
            element.set("name", "changed").unwrap();
            prop_assert!(field.is_dirty());
        }
        for element in &removed {
            prop_assert_eq!(element.binding_count("name"), 0);
            let _ = object.get("names");
            element.set("name", "ignored").unwrap();
            prop_assert!(!field.is_dirty());
        }
    }
}
