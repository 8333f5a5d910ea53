use core::fmt;
use core::marker::PhantomData;
use core::mem::{self, ManuallyDrop};
use core::ptr::NonNull;

use static_assertions::const_assert_eq;

use crate::invoke::{InvokeMut, InvokeOnce, InvokeRef};
use crate::mode::{Access, ByRef, ByValue, CallMode, Const, MayUnwind, Mut, PanicPolicy};
use crate::storage::RawStorage;
use crate::vtable::Vtable;

/// The copyable, type-erased callable engine behind every variant alias.
///
/// `Engine` holds any cloneable callable matching the signature described
/// by the argument tuple `Args` and result type `R`. Callables up to three
/// pointer-words in size (and pointer alignment) are stored directly inside
/// the wrapper; larger ones are moved to the heap. Either way the concrete
/// type is erased behind a per-type static dispatch table, and the whole
/// wrapper is four pointer-words.
///
/// The three trailing type parameters select the call-qualifier variant;
/// see the [`mode`](crate::mode) module. Prefer the provided aliases
/// ([`SmallFn`], [`SmallFnMut`], [`SmallFnOnce`], [`SmallConstFnOnce`] and
/// their [`no_unwind`] siblings) over naming `Engine` directly: an alias
/// pins all three flags, so `new` and `call` resolve to exactly one
/// variant.
///
/// # Example
///
/// ```
/// use smallfn::SmallFn;
///
/// let add: SmallFn<(i32, i32), i32> = SmallFn::new(|a: i32, b: i32| a + b);
/// assert_eq!(add.call((1, 2)), 3);
///
/// // Copies are independent, deep clones.
/// let copy = add.clone();
/// drop(add);
/// assert_eq!(copy.call((40, 2)), 42);
/// ```
pub struct Engine<Args, R, A, C, P>
where
    A: Access,
    C: CallMode,
    P: PanicPolicy,
    Args: 'static,
    R: 'static,
{
    vtable: Option<&'static Vtable<Args, R>>,
    storage: RawStorage,
    _mode: PhantomData<(A, C, P)>,
}

// `Option<&Vtable>` folds the empty state into the null niche.
const_assert_eq!(mem::size_of::<SmallFn<(), ()>>(), 4 * mem::size_of::<usize>());

impl<Args, R, A, C, P> Engine<Args, R, A, C, P>
where
    A: Access,
    C: CallMode,
    P: PanicPolicy,
    Args: 'static,
    R: 'static,
{
    /// Creates a wrapper holding no callable.
    ///
    /// # Example
    ///
    /// ```
    /// use smallfn::SmallFn;
    ///
    /// let empty = SmallFn::<(), i32>::empty();
    /// assert!(empty.is_empty());
    /// ```
    pub const fn empty() -> Self {
        Engine {
            vtable: None,
            storage: RawStorage::empty(),
            _mode: PhantomData,
        }
    }

    /// Returns `true` if the wrapper holds no callable.
    pub fn is_empty(&self) -> bool {
        self.vtable.is_none()
    }

    /// Returns `true` if the stored callable is heap-allocated.
    ///
    /// An empty wrapper owns no allocation and reports `false`, as do
    /// zero-sized callables, which are never allocated.
    ///
    /// # Example
    ///
    /// ```
    /// use smallfn::SmallFn;
    ///
    /// let small: SmallFn<(), i32> = SmallFn::new(|| 42);
    /// assert!(!small.is_heap());
    ///
    /// let big = [0u8; 128];
    /// let large: SmallFn<(), usize> = SmallFn::new(move || big.len());
    /// assert!(large.is_heap());
    /// ```
    pub fn is_heap(&self) -> bool {
        matches!(self.vtable, Some(table) if table.heap)
    }

    /// Destroys the stored callable, leaving the wrapper empty.
    pub fn clear(&mut self) {
        if let Some(table) = self.vtable.take() {
            unsafe { (table.drop)(&mut self.storage) };
        }
    }

    /// Moves the stored callable out into a new wrapper, leaving this one
    /// empty. Constant-time: the storage bytes and table reference are
    /// transferred as-is, never the callable's own clone.
    ///
    /// # Example
    ///
    /// ```
    /// use smallfn::SmallFn;
    ///
    /// let mut source: SmallFn<(), i32> = SmallFn::new(|| 42);
    /// let moved = source.take();
    /// assert!(source.is_empty());
    /// assert_eq!(moved.call(()), 42);
    /// ```
    pub fn take(&mut self) -> Self {
        mem::replace(self, Engine::empty())
    }

    /// Exchanges the contents of two wrappers in constant time. Valid for
    /// any combination of empty and holding states.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    fn from_parts(table: &'static Vtable<Args, R>, storage: RawStorage) -> Self {
        Engine {
            vtable: Some(table),
            storage,
            _mode: PhantomData,
        }
    }
}

impl<Args, R, P> Engine<Args, R, Const, ByRef, P>
where
    P: PanicPolicy,
    Args: 'static,
    R: 'static,
{
    /// Wraps `f`, erasing its type.
    ///
    /// Shared-access variants accept any [`InvokeRef`] callable (the `Fn`
    /// analogue) whose result converts into `R`. The callable must be
    /// cloneable so the wrapper itself can be cloned.
    ///
    /// The conversion is driven by the callable's own result type: an
    /// unannotated integer literal is an `i32`, so a closure returning `7`
    /// only satisfies an `R` that `i32` converts into. Annotate the literal
    /// (`7u32`) to target other integer types.
    pub fn new<F>(f: F) -> Self
    where
        F: InvokeRef<Args> + Clone + 'static,
        F::Output: Into<R>,
    {
        Self::from_parts(Vtable::shared::<F, P>(), RawStorage::new(f))
    }

    /// Invokes the stored callable with `args`.
    ///
    /// # Panics
    ///
    /// Panics if the wrapper is empty; invoking an empty wrapper is a
    /// contract violation, not a recoverable error.
    pub fn call(&self, args: Args) -> R {
        match self.vtable {
            Some(table) => unsafe { (table.invoke)(NonNull::from(&self.storage), args) },
            None => empty_invoke(),
        }
    }
}

impl<Args, R, P> Engine<Args, R, Mut, ByRef, P>
where
    P: PanicPolicy,
    Args: 'static,
    R: 'static,
{
    /// Wraps `f`, erasing its type.
    ///
    /// Exclusive-access variants accept any [`InvokeMut`] callable (the
    /// `FnMut` analogue) whose result converts into `R`. The callable must
    /// be cloneable so the wrapper itself can be cloned.
    ///
    /// # Example
    ///
    /// ```
    /// use smallfn::SmallFnMut;
    ///
    /// let mut counter: SmallFnMut<(), u32> = SmallFnMut::new({
    ///     let mut count = 0u32;
    ///     move || {
    ///         count += 1;
    ///         count
    ///     }
    /// });
    /// assert_eq!(counter.call(()), 1);
    /// assert_eq!(counter.call(()), 2);
    /// ```
    pub fn new<F>(f: F) -> Self
    where
        F: InvokeMut<Args> + Clone + 'static,
        F::Output: Into<R>,
    {
        Self::from_parts(Vtable::exclusive::<F, P>(), RawStorage::new(f))
    }

    /// Invokes the stored callable with `args`, allowing it to mutate its
    /// captured state.
    ///
    /// # Panics
    ///
    /// Panics if the wrapper is empty; invoking an empty wrapper is a
    /// contract violation, not a recoverable error.
    pub fn call(&mut self, args: Args) -> R {
        match self.vtable {
            Some(table) => unsafe { (table.invoke)(NonNull::from(&mut self.storage), args) },
            None => empty_invoke(),
        }
    }
}

impl<Args, R, P> Engine<Args, R, Const, ByValue, P>
where
    P: PanicPolicy,
    Args: 'static,
    R: 'static,
{
    /// Wraps `f`, erasing its type.
    ///
    /// This variant invokes through shared access but consumes the wrapper
    /// when called, so it accepts [`InvokeRef`] callables.
    pub fn new<F>(f: F) -> Self
    where
        F: InvokeRef<Args> + Clone + 'static,
        F::Output: Into<R>,
    {
        Self::from_parts(Vtable::consuming_shared::<F, P>(), RawStorage::new(f))
    }

    /// Invokes the stored callable with `args`, consuming the wrapper and
    /// destroying the callable.
    ///
    /// # Panics
    ///
    /// Panics if the wrapper is empty; invoking an empty wrapper is a
    /// contract violation, not a recoverable error.
    pub fn call(self, args: Args) -> R {
        let mut this = ManuallyDrop::new(self);
        match this.vtable.take() {
            Some(table) => unsafe { (table.invoke)(NonNull::from(&mut this.storage), args) },
            None => empty_invoke(),
        }
    }
}

impl<Args, R, P> Engine<Args, R, Mut, ByValue, P>
where
    P: PanicPolicy,
    Args: 'static,
    R: 'static,
{
    /// Wraps `f`, erasing its type.
    ///
    /// Consuming variants accept any [`InvokeOnce`] callable (the `FnOnce`
    /// analogue) whose result converts into `R`. The callable must still be
    /// cloneable so the wrapper itself can be cloned.
    ///
    /// # Example
    ///
    /// ```
    /// use smallfn::SmallFnOnce;
    ///
    /// let message = String::from("hello");
    /// let f: SmallFnOnce<(), String> = SmallFnOnce::new(move || message);
    /// assert_eq!(f.call(()), "hello");
    /// ```
    pub fn new<F>(f: F) -> Self
    where
        F: InvokeOnce<Args> + Clone + 'static,
        F::Output: Into<R>,
    {
        Self::from_parts(Vtable::consuming::<F, P>(), RawStorage::new(f))
    }

    /// Invokes the stored callable with `args`, consuming the wrapper and
    /// the callable.
    ///
    /// # Panics
    ///
    /// Panics if the wrapper is empty; invoking an empty wrapper is a
    /// contract violation, not a recoverable error.
    pub fn call(self, args: Args) -> R {
        let mut this = ManuallyDrop::new(self);
        match this.vtable.take() {
            Some(table) => unsafe { (table.invoke)(NonNull::from(&mut this.storage), args) },
            None => empty_invoke(),
        }
    }
}

impl<Args, R, A, C, P> Clone for Engine<Args, R, A, C, P>
where
    A: Access,
    C: CallMode,
    P: PanicPolicy,
    Args: 'static,
    R: 'static,
{
    /// Deep-clones the stored callable through the dispatch table. The two
    /// wrappers are fully independent afterwards; inline-vs-heap placement
    /// is re-decided for the clone (and, being deterministic per type,
    /// always matches the original).
    fn clone(&self) -> Self {
        match self.vtable {
            Some(table) => Engine {
                vtable: Some(table),
                storage: unsafe { (table.clone)(&self.storage) },
                _mode: PhantomData,
            },
            None => Engine::empty(),
        }
    }
}

impl<Args, R, A, C, P> Drop for Engine<Args, R, A, C, P>
where
    A: Access,
    C: CallMode,
    P: PanicPolicy,
    Args: 'static,
    R: 'static,
{
    fn drop(&mut self) {
        if let Some(table) = self.vtable {
            unsafe { (table.drop)(&mut self.storage) };
        }
    }
}

impl<Args, R, A, C, P> Default for Engine<Args, R, A, C, P>
where
    A: Access,
    C: CallMode,
    P: PanicPolicy,
    Args: 'static,
    R: 'static,
{
    /// Equivalent to [`Engine::empty`].
    fn default() -> Self {
        Engine::empty()
    }
}

impl<Args, R, A, C, P> fmt::Debug for Engine<Args, R, A, C, P>
where
    A: Access,
    C: CallMode,
    P: PanicPolicy,
    Args: 'static,
    R: 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_empty() {
            "empty"
        } else if self.is_heap() {
            "heap"
        } else {
            "inline"
        };
        f.debug_tuple("SmallFn").field(&state).finish()
    }
}

#[cold]
fn empty_invoke() -> ! {
    panic!("invoked an empty closure wrapper");
}

/// Declares the concrete variant aliases of the [`Engine`].
///
/// Each alias pins the access, invocation, and panic-policy flags, which is
/// what makes `Alias::new(...)` resolve to a single inherent `new`.
macro_rules! declare_variants {
    ($($(#[$meta:meta])* $name:ident => ($a:ty, $c:ty, $p:ty);)*) => {
        $(
            $(#[$meta])*
            pub type $name<Args, R> = $crate::Engine<Args, R, $a, $c, $p>;
        )*
    };
}

declare_variants! {
    /// Shared-access, borrowing, panic-propagating variant: the `Fn`
    /// analogue. Calling takes `&self` and never mutates the callable.
    SmallFn => (Const, ByRef, MayUnwind);
    /// Exclusive-access, borrowing, panic-propagating variant: the `FnMut`
    /// analogue. Calling takes `&mut self` and may mutate captured state.
    SmallFnMut => (Mut, ByRef, MayUnwind);
    /// Consuming, panic-propagating variant: the `FnOnce` analogue. Calling
    /// takes `self` and destroys the stored callable.
    SmallFnOnce => (Mut, ByValue, MayUnwind);
    /// Consuming variant that invokes through shared access, mirroring a
    /// `const &&`-qualified call operator.
    SmallConstFnOnce => (Const, ByValue, MayUnwind);
}

/// Variants whose stored callable must not panic.
///
/// These mirror the panic-propagating variants exactly, except that a panic
/// escaping the underlying callable is treated as a fatal contract
/// violation and aborts the process instead of unwinding. This is the
/// closest rendition of a `noexcept` call contract: it cannot be verified
/// statically, so it is enforced at the call boundary.
pub mod no_unwind {
    use crate::mode::{AbortOnUnwind, ByRef, ByValue, Const, Mut};

    declare_variants! {
        /// Shared-access, borrowing, non-unwinding variant.
        SmallFn => (Const, ByRef, AbortOnUnwind);
        /// Exclusive-access, borrowing, non-unwinding variant.
        SmallFnMut => (Mut, ByRef, AbortOnUnwind);
        /// Consuming, non-unwinding variant.
        SmallFnOnce => (Mut, ByValue, AbortOnUnwind);
        /// Consuming, shared-access, non-unwinding variant.
        SmallConstFnOnce => (Const, ByValue, AbortOnUnwind);
    }
}
