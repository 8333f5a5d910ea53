//! Call-signature traits over argument tuples.
//!
//! Stable Rust cannot abstract over native `Fn(A, B) -> R` signatures, so
//! the wrapper is generic over an argument *tuple* instead, and these traits
//! bridge the two: every closure, function, and function pointer of arity
//! 0 through 8 implements them for the matching tuple type.
//!
//! The trait a candidate must satisfy is the wrapper's construction-time
//! compatibility check: shared-access variants demand [`InvokeRef`],
//! exclusive-access variants [`InvokeMut`], and consuming variants only
//! [`InvokeOnce`]. An incompatible callable is rejected by the compiler,
//! never at runtime.

/// A callable that can be invoked at least once, consuming it.
///
/// The analogue of [`FnOnce`] over an argument tuple.
pub trait InvokeOnce<Args> {
    /// The type returned by the call.
    type Output;

    /// Consumes the callable and invokes it with `args`.
    fn invoke_once(self, args: Args) -> Self::Output;
}

/// A callable that can be invoked through exclusive access.
///
/// The analogue of [`FnMut`] over an argument tuple.
pub trait InvokeMut<Args>: InvokeOnce<Args> {
    /// Invokes the callable with `args`, allowing it to mutate its state.
    fn invoke_mut(&mut self, args: Args) -> Self::Output;
}

/// A callable that can be invoked through shared access.
///
/// The analogue of [`Fn`] over an argument tuple.
pub trait InvokeRef<Args>: InvokeMut<Args> {
    /// Invokes the callable with `args` without mutating it.
    fn invoke(&self, args: Args) -> Self::Output;
}

macro_rules! impl_invoke {
    ($($arg:ident),*) => {
        impl<Func, $($arg,)* Ret> InvokeOnce<($($arg,)*)> for Func
        where
            Func: FnOnce($($arg),*) -> Ret,
        {
            type Output = Ret;

            #[allow(non_snake_case)]
            #[inline]
            fn invoke_once(self, ($($arg,)*): ($($arg,)*)) -> Ret {
                self($($arg),*)
            }
        }

        impl<Func, $($arg,)* Ret> InvokeMut<($($arg,)*)> for Func
        where
            Func: FnMut($($arg),*) -> Ret,
        {
            #[allow(non_snake_case)]
            #[inline]
            fn invoke_mut(&mut self, ($($arg,)*): ($($arg,)*)) -> Ret {
                self($($arg),*)
            }
        }

        impl<Func, $($arg,)* Ret> InvokeRef<($($arg,)*)> for Func
        where
            Func: Fn($($arg),*) -> Ret,
        {
            #[allow(non_snake_case)]
            #[inline]
            fn invoke(&self, ($($arg,)*): ($($arg,)*)) -> Ret {
                self($($arg),*)
            }
        }
    };
}

impl_invoke!();
impl_invoke!(A);
impl_invoke!(A, B);
impl_invoke!(A, B, C);
impl_invoke!(A, B, C, D);
impl_invoke!(A, B, C, D, E);
impl_invoke!(A, B, C, D, E, F);
impl_invoke!(A, B, C, D, E, F, G);
impl_invoke!(A, B, C, D, E, F, G, H);
