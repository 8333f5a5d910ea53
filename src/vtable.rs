//! Per-type dispatch tables for the erased callable.
//!
//! Each concrete callable type `F` gets one `&'static` [`Vtable`] per
//! wrapper instantiation, created at compile time. The table's three
//! functions are instantiated together from the same `F`, so they agree on
//! how the paired [`RawStorage`] bytes are to be reinterpreted: `invoke`
//! calls exactly what construction (or `clone`) placed there, and `drop`
//! releases exactly what was allocated.
//!
//! Using a table of plain function pointers instead of a boxed trait object
//! keeps the erased value free of any embedded vtable pointer, so inline
//! values stay trivially relocatable and the wrapper carries only the table
//! address.

use core::ptr::NonNull;

use crate::invoke::{InvokeMut, InvokeOnce, InvokeRef};
use crate::mode::PanicPolicy;
use crate::storage::RawStorage;

pub(crate) struct Vtable<Args, R> {
    /// Invokes the stored callable with the forwarded argument tuple.
    ///
    /// The thunk behind this pointer encodes the variant's access and
    /// invocation flags: shared thunks only ever form `&F`, exclusive
    /// thunks form `&mut F`, and consuming thunks read `F` out of the
    /// storage, leaving it dead.
    pub(crate) invoke: unsafe fn(NonNull<RawStorage>, Args) -> R,
    /// Copy-constructs the stored callable into fresh storage, re-deciding
    /// inline-vs-heap placement (deterministic per type).
    pub(crate) clone: unsafe fn(&RawStorage) -> RawStorage,
    /// Destroys the stored callable and releases its heap block, if any.
    pub(crate) drop: unsafe fn(&mut RawStorage),
    /// Placement class of the erased type: `true` when it is heap-backed.
    pub(crate) heap: bool,
}

impl<Args, R> Vtable<Args, R> {
    /// Table for shared-access, borrowing invocation (`Fn`-like).
    pub(crate) const fn shared<F, P>() -> &'static Self
    where
        F: InvokeRef<Args> + Clone + 'static,
        F::Output: Into<R>,
        P: PanicPolicy,
        Args: 'static,
        R: 'static,
    {
        const {
            &Vtable {
                invoke: invoke_shared::<F, Args, R, P>,
                clone: clone_value::<F>,
                drop: drop_value::<F>,
                heap: RawStorage::heap_backed::<F>(),
            }
        }
    }

    /// Table for exclusive-access, borrowing invocation (`FnMut`-like).
    pub(crate) const fn exclusive<F, P>() -> &'static Self
    where
        F: InvokeMut<Args> + Clone + 'static,
        F::Output: Into<R>,
        P: PanicPolicy,
        Args: 'static,
        R: 'static,
    {
        const {
            &Vtable {
                invoke: invoke_exclusive::<F, Args, R, P>,
                clone: clone_value::<F>,
                drop: drop_value::<F>,
                heap: RawStorage::heap_backed::<F>(),
            }
        }
    }

    /// Table for shared-access, consuming invocation.
    pub(crate) const fn consuming_shared<F, P>() -> &'static Self
    where
        F: InvokeRef<Args> + Clone + 'static,
        F::Output: Into<R>,
        P: PanicPolicy,
        Args: 'static,
        R: 'static,
    {
        const {
            &Vtable {
                invoke: invoke_consuming_shared::<F, Args, R, P>,
                clone: clone_value::<F>,
                drop: drop_value::<F>,
                heap: RawStorage::heap_backed::<F>(),
            }
        }
    }

    /// Table for exclusive-access, consuming invocation (`FnOnce`-like).
    pub(crate) const fn consuming<F, P>() -> &'static Self
    where
        F: InvokeOnce<Args> + Clone + 'static,
        F::Output: Into<R>,
        P: PanicPolicy,
        Args: 'static,
        R: 'static,
    {
        const {
            &Vtable {
                invoke: invoke_consuming::<F, Args, R, P>,
                clone: clone_value::<F>,
                drop: drop_value::<F>,
                heap: RawStorage::heap_backed::<F>(),
            }
        }
    }
}

/// # Safety
///
/// `storage` must hold a live `F` placed by [`RawStorage::new::<F>`].
unsafe fn invoke_shared<F, Args, R, P>(storage: NonNull<RawStorage>, args: Args) -> R
where
    F: InvokeRef<Args>,
    F::Output: Into<R>,
    P: PanicPolicy,
{
    let callable = &*storage.as_ref().as_ptr::<F>();
    P::protect(|| callable.invoke(args).into())
}

/// # Safety
///
/// `storage` must hold a live `F` placed by [`RawStorage::new::<F>`], and
/// the caller must have exclusive access to it.
unsafe fn invoke_exclusive<F, Args, R, P>(mut storage: NonNull<RawStorage>, args: Args) -> R
where
    F: InvokeMut<Args>,
    F::Output: Into<R>,
    P: PanicPolicy,
{
    let callable = &mut *storage.as_mut().as_mut_ptr::<F>();
    P::protect(|| callable.invoke_mut(args).into())
}

/// # Safety
///
/// Same as [`invoke_exclusive`]; additionally the storage holds no value
/// afterward and must not be dropped or accessed again.
unsafe fn invoke_consuming_shared<F, Args, R, P>(mut storage: NonNull<RawStorage>, args: Args) -> R
where
    F: InvokeRef<Args>,
    F::Output: Into<R>,
    P: PanicPolicy,
{
    let callable = storage.as_mut().take::<F>();
    P::protect(|| callable.invoke(args).into())
}

/// # Safety
///
/// Same as [`invoke_consuming_shared`].
unsafe fn invoke_consuming<F, Args, R, P>(mut storage: NonNull<RawStorage>, args: Args) -> R
where
    F: InvokeOnce<Args>,
    F::Output: Into<R>,
    P: PanicPolicy,
{
    let callable = storage.as_mut().take::<F>();
    P::protect(|| callable.invoke_once(args).into())
}

/// # Safety
///
/// `storage` must hold a live `F` placed by [`RawStorage::new::<F>`].
unsafe fn clone_value<F: Clone>(storage: &RawStorage) -> RawStorage {
    let source = &*storage.as_ptr::<F>();
    RawStorage::new(source.clone())
}

/// # Safety
///
/// `storage` must hold a live `F` placed by [`RawStorage::new::<F>`]; the
/// storage holds no value afterward.
unsafe fn drop_value<F>(storage: &mut RawStorage) {
    storage.drop_in_place::<F>();
}
