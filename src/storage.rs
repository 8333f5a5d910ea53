use core::marker::PhantomData;
use core::mem::{self, MaybeUninit};
use core::ptr::NonNull;

#[cfg(not(feature = "std"))]
use alloc::alloc::{self, Layout};
#[cfg(feature = "std")]
use std::alloc::{self, Layout};

use static_assertions::{const_assert, const_assert_eq};

/// Inline capacity in pointer-sized words, matching the classic
/// three-word small-function buffer.
const INLINE_WORDS: usize = 3;

type InlineRegion = [usize; INLINE_WORDS];

const_assert_eq!(mem::size_of::<InlineRegion>(), INLINE_WORDS * mem::size_of::<usize>());
const_assert!(mem::align_of::<InlineRegion>() == mem::align_of::<usize>());

/// Untyped value storage: either the value's bytes inline, or a single
/// owning pointer to a heap allocation holding the value.
///
/// The storage is a dumb byte reservoir. It does not know which type it
/// holds, has no `Drop` impl, and is moved bitwise; all typed access goes
/// through the paired [`Vtable`] entry, which supplies the `T` that was
/// used at construction time.
///
/// Which representation is used is decided once, in [`RawStorage::new`],
/// from `T`'s size and alignment. The decision is a deterministic function
/// of `T`, so every storage holding a given type has the same placement.
///
/// [`Vtable`]: crate::vtable::Vtable
pub(crate) struct RawStorage {
    region: MaybeUninit<InlineRegion>,
    // The erased value's auto traits are unknown, so storage (and with it
    // every wrapper) must not be `Send` or `Sync`.
    _not_send: PhantomData<*mut ()>,
}

impl RawStorage {
    /// Whether `T` can be stored in the inline region.
    pub(crate) const fn fits<T>() -> bool {
        mem::size_of::<T>() <= mem::size_of::<InlineRegion>()
            && mem::align_of::<T>() <= mem::align_of::<InlineRegion>()
    }

    /// Whether `T` is stored behind a heap allocation. Zero-sized types
    /// never allocate, even when over-aligned.
    pub(crate) const fn heap_backed<T>() -> bool {
        mem::size_of::<T>() != 0 && !Self::fits::<T>()
    }

    /// Storage with no live value inside.
    pub(crate) const fn empty() -> RawStorage {
        RawStorage {
            region: MaybeUninit::uninit(),
            _not_send: PhantomData,
        }
    }

    /// Moves `value` into fresh storage, inline when it fits and
    /// heap-backed otherwise.
    ///
    /// Zero-sized values occupy no bytes at all; access hands out a
    /// dangling, well-aligned pointer instead. This also covers over-aligned
    /// ZSTs, which would otherwise hit the heap path with a zero-size layout.
    pub(crate) fn new<T>(value: T) -> RawStorage {
        let mut storage = RawStorage::empty();

        if mem::size_of::<T>() == 0 {
            // Writing a ZST through a dangling pointer is valid.
            unsafe { NonNull::<T>::dangling().as_ptr().write(value) };
        } else if Self::fits::<T>() {
            unsafe { storage.region.as_mut_ptr().cast::<T>().write(value) };
        } else {
            let layout = Layout::new::<T>();
            // SAFETY: the layout is non-zero-sized, checked above.
            let ptr = unsafe { alloc::alloc(layout) };
            if ptr.is_null() {
                alloc::handle_alloc_error(layout);
            }
            // SAFETY: `ptr` is non-null and has `T`'s size and alignment.
            unsafe {
                ptr.cast::<T>().write(value);
                storage.region.as_mut_ptr().cast::<*mut u8>().write(ptr);
            }
        }

        storage
    }

    /// Typed pointer to the live value.
    ///
    /// # Safety
    ///
    /// The storage must hold a live value that was placed by
    /// [`RawStorage::new::<T>`] with this exact `T`.
    pub(crate) unsafe fn as_ptr<T>(&self) -> *const T {
        if mem::size_of::<T>() == 0 {
            NonNull::<T>::dangling().as_ptr()
        } else if Self::fits::<T>() {
            self.region.as_ptr().cast::<T>()
        } else {
            self.region.as_ptr().cast::<*const T>().read()
        }
    }

    /// Typed mutable pointer to the live value.
    ///
    /// # Safety
    ///
    /// Same contract as [`RawStorage::as_ptr`].
    pub(crate) unsafe fn as_mut_ptr<T>(&mut self) -> *mut T {
        if mem::size_of::<T>() == 0 {
            NonNull::<T>::dangling().as_ptr()
        } else if Self::fits::<T>() {
            self.region.as_mut_ptr().cast::<T>()
        } else {
            self.region.as_ptr().cast::<*mut T>().read()
        }
    }

    /// Reads the value out and releases the heap block (if any) without
    /// running the value's destructor. The storage holds no value afterward.
    ///
    /// # Safety
    ///
    /// Same contract as [`RawStorage::as_ptr`]; the caller takes ownership
    /// of the returned value and must not access the storage again.
    pub(crate) unsafe fn take<T>(&mut self) -> T {
        let ptr = self.as_mut_ptr::<T>();
        let value = ptr.read();
        if Self::heap_backed::<T>() {
            alloc::dealloc(ptr.cast::<u8>(), Layout::new::<T>());
        }
        value
    }

    /// Runs the value's destructor, then releases the heap block when the
    /// value was heap-backed.
    ///
    /// # Safety
    ///
    /// Same contract as [`RawStorage::as_ptr`]; the storage holds no value
    /// afterward and must not be accessed again.
    pub(crate) unsafe fn drop_in_place<T>(&mut self) {
        let ptr = self.as_mut_ptr::<T>();
        ptr.drop_in_place();
        if Self::heap_backed::<T>() {
            alloc::dealloc(ptr.cast::<u8>(), Layout::new::<T>());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RawStorage;

    #[test]
    fn fit_boundary() {
        assert!(RawStorage::fits::<[usize; 3]>());
        assert!(!RawStorage::fits::<[usize; 4]>());
        assert!(RawStorage::fits::<u8>());
        assert!(RawStorage::fits::<()>());

        #[repr(align(64))]
        struct OverAligned(u8);
        assert!(!RawStorage::fits::<OverAligned>());
        assert!(RawStorage::heap_backed::<OverAligned>());

        // Over-aligned ZSTs miss the inline region but still never allocate.
        #[repr(align(64))]
        struct Tag;
        assert!(!RawStorage::fits::<Tag>());
        assert!(!RawStorage::heap_backed::<Tag>());
    }

    #[test]
    fn inline_round_trip() {
        let mut storage = RawStorage::new(0xABCDusize);
        unsafe {
            assert_eq!(*storage.as_ptr::<usize>(), 0xABCD);
            assert_eq!(storage.take::<usize>(), 0xABCD);
        }
    }

    #[test]
    fn heap_round_trip() {
        let big = [7usize; 16];
        let mut storage = RawStorage::new(big);
        unsafe {
            assert_eq!(*storage.as_ptr::<[usize; 16]>(), big);
            assert_eq!(storage.take::<[usize; 16]>(), big);
        }
    }

    #[test]
    fn drop_in_place_releases_owned_memory() {
        // A `Vec` fits inline; a pair of them does not.
        let mut inline = RawStorage::new(vec![1u8; 100]);
        unsafe { inline.drop_in_place::<Vec<u8>>() };

        let mut heap = RawStorage::new([vec![1u8; 100], vec![2u8; 200]]);
        unsafe { heap.drop_in_place::<[Vec<u8>; 2]>() };
    }

    #[test]
    fn zst() {
        #[repr(align(64))]
        struct Marker;

        let mut storage = RawStorage::new(Marker);
        unsafe {
            let ptr = storage.as_ptr::<Marker>();
            assert_eq!(ptr.align_offset(64), 0);
            storage.drop_in_place::<Marker>();
        }
    }
}
