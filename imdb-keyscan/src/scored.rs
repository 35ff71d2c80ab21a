use std::cmp;
use std::slice;
use std::vec;

/// A collection of scored values, sorted in descending order by score.
///
/// Values with equal scores retain the order in which they were collected.
/// For a key file scan, this means ties are listed in file order.
#[derive(Clone, Debug, Default)]
pub struct SearchResults<T>(Vec<Scored<T>>);

impl<T> SearchResults<T> {
    /// Create an empty collection of scored values.
    pub fn new() -> SearchResults<T> {
        SearchResults(vec![])
    }

    /// Create a collection of search results from scored values in any
    /// order.
    ///
    /// The sort is stable, so values with equal scores keep their relative
    /// order from `unsorted`.
    pub fn from_unsorted(mut unsorted: Vec<Scored<T>>) -> SearchResults<T> {
        unsorted.sort_by(|s1, s2| s1.cmp(s2).reverse());
        SearchResults(unsorted)
    }

    /// Add a new scored value to this collection.
    ///
    /// The score provided must be less than or equal to every other score in
    /// this collection, otherwise this method will panic.
    pub fn push(&mut self, scored: Scored<T>) {
        assert!(self.0.last().map_or(true, |smallest| &scored <= smallest));
        self.0.push(scored);
    }

    /// Trim this collection so that it contains at most the first `size`
    /// results.
    ///
    /// A `size` of `0` means "no limit" and leaves the collection unchanged.
    pub fn truncate(&mut self, size: usize) {
        if size > 0 && self.0.len() > size {
            self.0.drain(size..);
        }
    }

    /// Returns the number of results in this collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if and only if this collection is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return a slice of search results in order.
    pub fn as_slice(&self) -> &[Scored<T>] {
        &self.0
    }

    /// Return an iterator over the search results in order.
    pub fn iter(&self) -> slice::Iter<Scored<T>> {
        self.0.iter()
    }

    /// Consume this collection and return the underlying sorted sequence of
    /// scored values.
    pub fn into_vec(self) -> Vec<Scored<T>> {
        self.0
    }
}

impl<T> IntoIterator for SearchResults<T> {
    type IntoIter = vec::IntoIter<Scored<T>>;
    type Item = Scored<T>;

    fn into_iter(self) -> vec::IntoIter<Scored<T>> {
        self.into_vec().into_iter()
    }
}

impl<'a, T> IntoIterator for &'a SearchResults<T> {
    type IntoIter = slice::Iter<'a, Scored<T>>;
    type Item = &'a Scored<T>;

    fn into_iter(self) -> slice::Iter<'a, Scored<T>> {
        self.iter()
    }
}

/// Any value associated with a score.
///
/// We define Eq and Ord on this type in a way that ignores `value` and only
/// uses the `score` to determine ordering. The public API of `Scored`
/// guarantees that scores are never `NaN`.
#[derive(Clone, Copy, Debug)]
pub struct Scored<T> {
    score: f64,
    value: T,
}

impl<T> Scored<T> {
    /// Create a new value `T` with a score of `1.0`.
    pub fn new(value: T) -> Scored<T> {
        Scored { score: 1.0, value }
    }

    /// Return the score for this item.
    ///
    /// Similarity scores live in `[0, 1]`, but bonuses added during a scan
    /// may push a search result slightly above `1.0`.
    ///
    /// The score returned is guaranteed to never be `NaN`.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Set the score, replacing the existing value with the given value.
    ///
    /// This panics if the given score is `NaN`.
    pub fn set_score(&mut self, score: f64) {
        assert!(score.is_finite());
        self.score = score;
    }

    /// Consume this scored value and return a new scored value that drops the
    /// existing score and replaces it with the given score.
    ///
    /// This panics if the given score is `NaN`.
    pub fn with_score(mut self, score: f64) -> Scored<T> {
        self.set_score(score);
        self
    }

    /// Consume this scored value and map its value using the function given,
    /// returning a new scored value with the result of the map and an
    /// unchanged score.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Scored<U> {
        Scored { score: self.score, value: f(self.value) }
    }

    /// Return a reference to the underlying value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Consume this scored value, drop the score and return the underlying
    /// `T`.
    pub fn into_value(self) -> T {
        self.value
    }

    /// Consume this scored value and return the underlying pair of score and
    /// `T`.
    pub fn into_pair(self) -> (f64, T) {
        (self.score, self.value)
    }
}

impl<T: Default> Default for Scored<T> {
    fn default() -> Scored<T> {
        Scored::new(T::default())
    }
}

impl<T> Eq for Scored<T> {}

impl<T> PartialEq for Scored<T> {
    fn eq(&self, other: &Scored<T>) -> bool {
        let (s1, s2) = (self.score, other.score);
        s1 == s2
    }
}

impl<T> Ord for Scored<T> {
    fn cmp(&self, other: &Scored<T>) -> cmp::Ordering {
        self.score
            .partial_cmp(&other.score)
            .unwrap_or(cmp::Ordering::Equal)
    }
}

impl<T> PartialOrd for Scored<T> {
    fn partial_cmp(&self, other: &Scored<T>) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}
