//! Marker types for the three orthogonal call-qualifier flags.
//!
//! A wrapper variant is described by three independent choices:
//!
//! - **access**: whether the stored callable is invoked through shared
//!   ([`Const`]) or exclusive ([`Mut`]) access;
//! - **invocation**: whether calling borrows the wrapper ([`ByRef`]) or
//!   consumes it ([`ByValue`]);
//! - **panic policy**: whether a panic escaping the callable propagates to
//!   the caller ([`MayUnwind`]) or aborts the process ([`AbortOnUnwind`]).
//!
//! One engine, [`Engine`], is parameterized by all three; the concrete
//! variants are plain type aliases. All marker traits are sealed.
//!
//! [`Engine`]: crate::Engine

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Const {}
    impl Sealed for super::Mut {}
    impl Sealed for super::ByRef {}
    impl Sealed for super::ByValue {}
    impl Sealed for super::MayUnwind {}
    impl Sealed for super::AbortOnUnwind {}
}

/// Access flag: how the stored callable is borrowed during a call.
pub trait Access: sealed::Sealed {}

/// Shared access: the callable is invoked through `&F` and must implement
/// [`InvokeRef`](crate::InvokeRef).
pub struct Const;

/// Exclusive access: the callable is invoked through `&mut F` (or by value
/// for consuming variants) and may mutate its captured state.
pub struct Mut;

impl Access for Const {}
impl Access for Mut {}

/// Invocation flag: what calling does to the wrapper itself.
pub trait CallMode: sealed::Sealed {}

/// Calling borrows the wrapper; it can be invoked again afterwards.
pub struct ByRef;

/// Calling consumes the wrapper, destroying the stored callable in the
/// process. This is the "rvalue invocation" form.
pub struct ByValue;

impl CallMode for ByRef {}
impl CallMode for ByValue {}

/// Panic flag: what happens when the stored callable panics.
pub trait PanicPolicy: sealed::Sealed {
    #[doc(hidden)]
    fn protect<T>(call: impl FnOnce() -> T) -> T;
}

/// Panics from the stored callable unwind into the caller unchanged.
pub struct MayUnwind;

/// The stored callable is required not to panic; if it does anyway, the
/// process is aborted. This contract cannot be checked statically, so it is
/// enforced with an abort guard around every call.
pub struct AbortOnUnwind;

impl PanicPolicy for MayUnwind {
    #[inline]
    fn protect<T>(call: impl FnOnce() -> T) -> T {
        call()
    }
}

impl PanicPolicy for AbortOnUnwind {
    #[inline]
    fn protect<T>(call: impl FnOnce() -> T) -> T {
        // Armed until the call returns; an unwind drops it and aborts.
        let guard = AbortGuard;
        let result = call();
        core::mem::forget(guard);
        result
    }
}

struct AbortGuard;

impl Drop for AbortGuard {
    fn drop(&mut self) {
        abort();
    }
}

#[cfg(feature = "std")]
fn abort() -> ! {
    std::process::abort();
}

/// Without `std` there is no process abort; panicking inside an unwind
/// escalates to an abort instead.
#[cfg(not(feature = "std"))]
fn abort() -> ! {
    struct Escalate;

    impl Drop for Escalate {
        fn drop(&mut self) {
            panic!("callable panicked in a non-unwinding wrapper");
        }
    }

    let _escalate = Escalate;
    panic!("callable panicked in a non-unwinding wrapper");
}
