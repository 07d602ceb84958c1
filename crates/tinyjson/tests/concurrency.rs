//! One engine shared by many threads over many distinct types.

use std::sync::{Arc, Barrier};
use std::thread;

use tinyjson::{FieldInfo, Record, Reflect, ReflectMut, ReflectRef, TinyJson, TypeInfo, Typed};

const THREADS: usize = 8;
const ROUNDS: u64 = 25;

/// A distinct record type per `N`.
#[derive(Debug, Default, Clone, PartialEq)]
struct Slot<const N: usize> {
    id: u64,
    label: String,
    payload: Vec<u8>,
}

impl<const N: usize> Typed for Slot<N> {
    fn type_info() -> TypeInfo {
        TypeInfo::record::<Self>(vec![
            FieldInfo::of::<u64>("id", None),
            FieldInfo::of::<String>("label", None),
            FieldInfo::of::<Vec<u8>>("payload", Some("payload,omitempty")),
        ])
    }
}

impl<const N: usize> Reflect for Slot<N> {
    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Record(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Record(self)
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

impl<const N: usize> Record for Slot<N> {
    fn field(&self, index: usize) -> Option<&dyn Reflect> {
        match index {
            0 => Some(&self.id),
            1 => Some(&self.label),
            2 => Some(&self.payload),
            _ => None,
        }
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        match index {
            0 => Some(&mut self.id),
            1 => Some(&mut self.label),
            2 => Some(&mut self.payload),
            _ => None,
        }
    }
}

fn exercise<const N: usize>(json: &TinyJson, round: u64) {
    let slot = Slot::<N> {
        id: N as u64 * 1_000 + round,
        label: format!("slot-{N}"),
        payload: vec![N as u8; N],
    };
    let bytes = json.encode(&slot).unwrap();
    let back: Slot<N> = json.decode_as(&bytes).unwrap();
    assert_eq!(back, slot);
}

macro_rules! exercise_all {
    ($json:expr, $round:expr, [$($n:literal),*]) => {
        $(exercise::<$n>($json, $round);)*
    };
}

fn exercise_every_slot(json: &TinyJson, round: u64) {
    exercise_all!(json, round, [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]);
}

#[test]
fn distinct_types_build_once_under_contention() {
    let json = TinyJson::new();
    let barrier = Barrier::new(THREADS);

    thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                barrier.wait();
                for round in 0..ROUNDS {
                    exercise_every_slot(&json, round);
                }
            });
        }
    });

    // 16 slot records plus u64, String, Vec<u8> and u8.
    assert_eq!(json.descriptors_built(), 20);
    exercise_every_slot(&json, ROUNDS);
    assert_eq!(json.descriptors_built(), 20);
}

#[test]
fn racing_first_use_of_one_type() {
    let json = Arc::new(TinyJson::new());
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let json = Arc::clone(&json);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let descriptor = json.resolve::<Slot<99>>().unwrap();
                exercise::<99>(&json, i as u64);
                descriptor
            })
        })
        .collect();

    let descriptors: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for descriptor in &descriptors[1..] {
        assert!(Arc::ptr_eq(descriptor, &descriptors[0]));
    }
    assert_eq!(json.descriptors_built(), 5);
}

#[test]
fn separate_engines_keep_separate_caches() {
    let engines: Vec<TinyJson> = (0..4).map(|_| TinyJson::new()).collect();
    thread::scope(|scope| {
        for json in &engines {
            scope.spawn(move || exercise::<3>(json, 0));
        }
    });
    for json in &engines {
        assert_eq!(json.descriptors_built(), 5);
    }
}
