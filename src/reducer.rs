//! The inner reducer seam.

use std::fmt;
use std::marker::PhantomData;

/// A pure state-transition function wrapped by the optimistic log.
///
/// `reduce` may be called many times for the same action while the log
/// replays history, so it must not have side effects.
pub trait Reducer<A> {
    type State: Clone;

    /// State before any action has been seen. `prior` is a raw inner state left
    /// behind by a previous owner of the store slice, if any.
    fn init(&self, prior: Option<Self::State>) -> Self::State;

    fn reduce(&self, state: Self::State, action: &A) -> Self::State;
}

impl<A, R: Reducer<A> + ?Sized> Reducer<A> for &R {
    type State = R::State;

    fn init(&self, prior: Option<Self::State>) -> Self::State {
        (**self).init(prior)
    }

    fn reduce(&self, state: Self::State, action: &A) -> Self::State {
        (**self).reduce(state, action)
    }
}

/// Adapts a closure `Fn(S, &A) -> S` into a [`Reducer`].
///
/// The initial state is the prior value when there is one, else `S::default()`.
pub struct FnReducer<F, S> {
    f: F,
    _state: PhantomData<fn() -> S>,
}

/// Build a [`Reducer`] from a closure.
pub fn reducer_fn<S, A, F>(f: F) -> FnReducer<F, S>
where
    F: Fn(S, &A) -> S,
{
    FnReducer {
        f,
        _state: PhantomData,
    }
}

impl<A, S, F> Reducer<A> for FnReducer<F, S>
where
    S: Clone + Default,
    F: Fn(S, &A) -> S,
{
    type State = S;

    fn init(&self, prior: Option<S>) -> S {
        prior.unwrap_or_default()
    }

    fn reduce(&self, state: S, action: &A) -> S {
        (self.f)(state, action)
    }
}

impl<F: Clone, S> Clone for FnReducer<F, S> {
    fn clone(&self) -> Self {
        FnReducer {
            f: self.f.clone(),
            _state: PhantomData,
        }
    }
}

impl<F, S> fmt::Debug for FnReducer<F, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnReducer").finish_non_exhaustive()
    }
}
