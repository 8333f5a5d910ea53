use std::cell::Cell;
use std::rc::Rc;

use smallfn::{SmallFn, SmallFnMut};

#[test]
fn round_trip_inline_and_heap() {
    let inline: SmallFn<(), i32> = SmallFn::new(|| 42);
    assert!(!inline.is_heap());
    assert_eq!(inline.call(()), 42);

    let big = [21u64; 8];
    let heap: SmallFn<(), u64> = SmallFn::new(move || big.iter().sum::<u64>() / 4);
    assert!(heap.is_heap());
    assert_eq!(heap.call(()), 42);
}

#[test]
fn function_pointers_and_multiple_arguments() {
    fn add(a: i32, b: i32) -> i32 {
        a + b
    }

    let wrapped: SmallFn<(i32, i32), i32> = SmallFn::new(add);
    assert_eq!(wrapped.call((40, 2)), 42);

    let concat: SmallFn<(String, &'static str), String> = SmallFn::new(|mut a: String, b: &str| {
        a.push_str(b);
        a
    });
    assert_eq!(concat.call((String::from("4"), "2")), "42");
}

#[test]
fn result_conversion() {
    // The callable's result only has to convert into the declared type.
    let widen: SmallFn<(), i64> = SmallFn::new(|| 7i32);
    assert_eq!(widen.call(()), 7i64);
}

#[test]
fn captureless_closures_are_inline() {
    let double: SmallFn<(i32,), i32> = SmallFn::new(|x: i32| x * 2);
    assert!(!double.is_heap());
    assert_eq!(double.call((21,)), 42);
}

#[test]
fn copy_independence() {
    let mut original: SmallFnMut<(), u32> = SmallFnMut::new({
        let mut count = 0u32;
        move || {
            count += 1;
            count
        }
    });
    assert_eq!(original.call(()), 1);

    // The copy duplicates the state as it was at clone time, and mutating
    // it never shows through on the original.
    let mut copy = original.clone();
    assert_eq!(copy.call(()), 2);
    assert_eq!(copy.call(()), 3);
    assert_eq!(original.call(()), 2);
}

#[test]
fn shared_access_with_interior_mutability() {
    let calls = Rc::new(Cell::new(0u32));
    let observer = calls.clone();
    let f: SmallFn<(), u32> = SmallFn::new(move || {
        observer.set(observer.get() + 1);
        observer.get()
    });

    assert_eq!(f.call(()), 1);
    assert_eq!(f.call(()), 2);
    assert_eq!(calls.get(), 2);
}

#[test]
fn repeated_clone_and_drop_is_balanced() {
    struct Tally(Rc<Cell<u32>>);

    impl Clone for Tally {
        fn clone(&self) -> Self {
            Tally(self.0.clone())
        }
    }

    impl Drop for Tally {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    let drops = Rc::new(Cell::new(0u32));

    {
        let tally = Tally(drops.clone());
        let f: SmallFn<(), u32> = SmallFn::new(move || {
            let _ = &tally;
            7u32
        });
        assert!(!f.is_heap());
        for _ in 0..10 {
            let copy = f.clone();
            assert_eq!(copy.call(()), 7);
        }
    }
    assert_eq!(drops.get(), 11);

    drops.set(0);
    {
        let tally = Tally(drops.clone());
        let pad = [0u8; 64];
        let f: SmallFn<(), u32> = SmallFn::new(move || {
            let _ = (&tally, &pad);
            7u32
        });
        assert!(f.is_heap());
        for _ in 0..10 {
            let copy = f.clone();
            assert_eq!(copy.call(()), 7);
        }
    }
    assert_eq!(drops.get(), 11);
}

#[test]
fn take_drains_the_source() {
    let mut source: SmallFn<(), i32> = SmallFn::new(|| 42);
    let moved = source.take();

    assert!(source.is_empty());
    assert!(!moved.is_empty());
    assert_eq!(moved.call(()), 42);

    // Draining an empty wrapper stays a no-op.
    let drained = source.take();
    assert!(source.is_empty());
    assert!(drained.is_empty());
}

#[test]
fn swap_is_its_own_inverse() {
    let mut a: SmallFn<(), i32> = SmallFn::new(|| 42);
    let mut b: SmallFn<(), i32> = SmallFn::new(|| 43);

    a.swap(&mut b);
    assert_eq!(a.call(()), 43);
    assert_eq!(b.call(()), 42);

    a.swap(&mut b);
    assert_eq!(a.call(()), 42);
    assert_eq!(b.call(()), 43);
}

#[test]
fn swap_with_empty_wrappers() {
    let mut holding: SmallFn<(), i32> = SmallFn::new(|| 42);
    let mut empty = SmallFn::<(), i32>::empty();

    holding.swap(&mut empty);
    assert!(holding.is_empty());
    assert_eq!(empty.call(()), 42);

    let mut left = SmallFn::<(), i32>::empty();
    let mut right = SmallFn::<(), i32>::empty();
    left.swap(&mut right);
    assert!(left.is_empty());
    assert!(right.is_empty());
}

#[test]
fn size_threshold_boundary() {
    // A capture of exactly three words still fits inline.
    let exact = [42usize; 3];
    let fits: SmallFn<(), usize> = SmallFn::new(move || exact[0]);
    assert!(!fits.is_heap());
    assert_eq!(fits.call(()), 42);

    // One more byte of capture pushes the callable to the heap.
    #[derive(Clone)]
    struct Padded {
        words: [usize; 3],
        extra: u8,
    }

    let padded = Padded {
        words: [42; 3],
        extra: 0,
    };
    let spills: SmallFn<(), usize> = SmallFn::new(move || padded.words[0] + usize::from(padded.extra));
    assert!(spills.is_heap());
    assert_eq!(spills.call(()), 42);
}

#[test]
fn over_aligned_captures_are_heap_backed() {
    #[derive(Clone, Copy)]
    #[repr(align(64))]
    struct Aligned(u8);

    let value = Aligned(42);
    // Use the value whole, so the closure captures the aligned struct and
    // not just its `u8` field.
    let f: SmallFn<(), u8> = SmallFn::new(move || {
        let v = value;
        v.0
    });
    assert!(f.is_heap());
    assert_eq!(f.call(()), 42);
}

#[test]
fn zero_sized_over_aligned_captures_stay_inline() {
    #[derive(Clone, Copy)]
    #[repr(align(64))]
    struct Token;

    let token = Token;
    let f: SmallFn<(), i32> = SmallFn::new(move || {
        let _ = &token;
        42
    });
    assert!(!f.is_heap());
    assert_eq!(f.call(()), 42);
    assert_eq!(f.clone().call(()), 42);
}

#[test]
fn empty_state_observation() {
    let default = SmallFn::<(), i32>::default();
    let explicit = SmallFn::<(), i32>::empty();
    assert!(default.is_empty());
    assert!(explicit.is_empty());

    let mut holding: SmallFn<(), i32> = SmallFn::new(|| 42);
    assert!(!holding.is_empty());

    holding.clear();
    assert!(holding.is_empty());

    // Cloning an empty wrapper yields another empty wrapper.
    assert!(default.clone().is_empty());
}

#[test]
fn clear_destroys_the_callable() {
    let drops = Rc::new(Cell::new(false));
    let flag = drops.clone();

    struct SetOnDrop(Rc<Cell<bool>>);
    impl Clone for SetOnDrop {
        fn clone(&self) -> Self {
            SetOnDrop(self.0.clone())
        }
    }
    impl Drop for SetOnDrop {
        fn drop(&mut self) {
            self.0.set(true);
        }
    }

    let guard = SetOnDrop(flag);
    let mut f: SmallFn<(), bool> = SmallFn::new(move || guard.0.get());
    assert!(!drops.get());

    f.clear();
    assert!(drops.get());
}

#[test]
#[should_panic(expected = "invoked an empty closure wrapper")]
fn calling_an_empty_wrapper_panics() {
    let empty = SmallFn::<(), i32>::empty();
    empty.call(());
}

#[test]
#[should_panic(expected = "invoked an empty closure wrapper")]
fn calling_a_cleared_wrapper_panics() {
    let mut f: SmallFnMut<(), i32> = SmallFnMut::new(|| 42);
    f.clear();
    f.call(());
}
