//! Lazily map a function over a collection.

use strand_core::BoxError;

use crate::generator::Generator;

/// Lazily map `f` over `input`, preserving input order.
///
/// `f` runs once per element, and only when the consumer advances. Any
/// `IntoIterator` works; unordered collections such as `HashSet` are visited
/// in their own iteration order.
///
/// ```
/// use strand_gen::generator_invoke;
///
/// let squares = generator_invoke(|x: i32| x * x, vec![0, 1, 2, 3, 4]);
/// let squares: Vec<i32> = squares.map(Result::unwrap).collect();
/// assert_eq!(squares, vec![0, 1, 4, 9, 16]);
/// ```
pub fn generator_invoke<F, I, Out>(mut f: F, input: I) -> Generator<Out>
where
    F: FnMut(I::Item) -> Out + 'static,
    I: IntoIterator + 'static,
    I::IntoIter: 'static,
    I::Item: 'static,
    Out: 'static,
{
    Generator::new(move |co| async move {
        for item in input {
            co.yield_(f(item)).await;
        }
    })
}

/// Like [`generator_invoke`], but `f` may fail.
///
/// The first `Err` stops the generator: values already produced stay
/// delivered, the error is reported by the following `advance`, and no
/// later element is visited.
pub fn try_generator_invoke<F, I, Out, E>(mut f: F, input: I) -> Generator<Out>
where
    F: FnMut(I::Item) -> Result<Out, E> + 'static,
    E: Into<BoxError>,
    I: IntoIterator + 'static,
    I::IntoIter: 'static,
    I::Item: 'static,
    Out: 'static,
{
    Generator::new(move |co| async move {
        for item in input {
            let out = f(item).map_err(Into::<BoxError>::into)?;
            co.yield_(out).await;
        }
        Ok::<(), BoxError>(())
    })
}

/// Like [`generator_invoke`], but `f` also receives a shared `extra`
/// argument on every call.
pub fn generator_invoke_with<F, X, I, Out>(mut f: F, extra: X, input: I) -> Generator<Out>
where
    F: FnMut(&X, I::Item) -> Out + 'static,
    X: 'static,
    I: IntoIterator + 'static,
    I::IntoIter: 'static,
    I::Item: 'static,
    Out: 'static,
{
    Generator::new(move |co| async move {
        for item in input {
            co.yield_(f(&extra, item)).await;
        }
    })
}
