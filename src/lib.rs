//! # SmallFn: Copyable Closures Without the Box
//!
//! [`SmallFn`] is a copyable, type-erased callable wrapper with inline
//! storage. It plays the role of `Box<dyn Fn(..)>` for cloneable callables,
//! but stores small ones directly inside the wrapper and only falls back to
//! a heap allocation when the callable is too large (or too strictly
//! aligned) for the inline buffer.
//!
//! ## Core Concept
//!
//! A boxed closure always costs an allocation and a fat pointer. `SmallFn`
//! instead pairs a fixed three-word buffer with a per-type static dispatch
//! table of three function pointers (invoke, clone, drop). Constructing a
//! wrapper picks the table for the concrete callable type and writes the
//! callable into the buffer: inline when it fits, behind a single owning
//! pointer when it does not. Every later operation (calling, cloning,
//! dropping) goes through the table, which knows how to reinterpret the
//! buffer's bytes. The whole wrapper is four pointer-words.
//!
//! ## Quick Start
//!
//! Add SmallFn to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! smallfn = "0.1"
//! ```
//!
//! Basic usage:
//!
//! ```rust
//! use smallfn::SmallFn;
//!
//! // Arguments are passed as a tuple.
//! let add: SmallFn<(i32, i32), i32> = SmallFn::new(|a: i32, b: i32| a + b);
//! assert_eq!(add.call((1, 2)), 3);
//!
//! // Small captures are stored inline; large ones go to the heap.
//! assert!(!add.is_heap());
//! let big = [0u8; 128];
//! let large: SmallFn<(), usize> = SmallFn::new(move || big.len());
//! assert!(large.is_heap());
//!
//! // Wrappers clone like values: deep, independent copies.
//! let copy = add.clone();
//! drop(add);
//! assert_eq!(copy.call((40, 2)), 42);
//! ```
//!
//! ## Variants
//!
//! One engine type, [`Engine`], parameterized by three orthogonal
//! call-qualifier flags (see the [`mode`] module), backs every variant.
//! Each variant is an alias pinning all three flags:
//!
//! | Alias | Calling | Accepts | On panic |
//! |---|---|---|---|
//! | [`SmallFn`] | `&self` | `Fn`-like | unwinds |
//! | [`SmallFnMut`] | `&mut self` | `FnMut`-like | unwinds |
//! | [`SmallFnOnce`] | `self` | `FnOnce`-like | unwinds |
//! | [`SmallConstFnOnce`] | `self` | `Fn`-like | unwinds |
//! | [`no_unwind::SmallFn`] (etc.) | as above | as above | aborts |
//!
//! Every variant requires the callable to be `Clone + 'static`; that is
//! what makes the wrapper itself cloneable after type erasure.
//!
//! ## The Empty State
//!
//! Wrappers can be created empty ([`SmallFn::empty`], [`Default`]) and
//! emptied again ([`SmallFn::clear`], [`SmallFn::take`]). Invoking an empty
//! wrapper is a contract violation, equivalent to calling through a null
//! function handle, and panics rather than returning an error.
//!
//! ## Configuration
//!
//! ### Feature Flags
//!
//! - **`std`** (enabled by default)
//!   - Links to the standard library
//!   - Disable for `#![no_std]` environments: `default-features = false`
//!     (the heap fallback still requires `alloc`)
//!
//! ## Thread Safety
//!
//! Wrappers are deliberately neither `Send` nor `Sync`: the erased
//! callable's own thread affinity is unknown after construction. Distinct
//! wrappers share nothing (a clone is an independent duplicate), so
//! cross-thread code should hand each thread its own clone instead.

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]
#![deny(clippy::as_conversions)]

extern crate alloc;

mod invoke;
pub mod mode;
mod smallfn;
mod storage;
mod vtable;

pub use crate::invoke::{InvokeMut, InvokeOnce, InvokeRef};
pub use crate::smallfn::{no_unwind, Engine, SmallConstFnOnce, SmallFn, SmallFnMut, SmallFnOnce};
