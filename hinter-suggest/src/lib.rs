#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Query interpretation and response assembly for [Hinter](../hinter/index.html).
//!
//! A suggest request flows through this crate in a fixed order: the raw query
//! string becomes [`QueryValues`], from which the class filters
//! ([`FilterSet`]) and the paging and versioning parameters
//! ([`PagingParameters`], [`VersionParameters`]) are read. The search term is
//! normalized, handed to a [`SuggestionLookup`], and the candidates it returns
//! are shaped into one of the [`SuggestResponse`] variants by [`assemble`].

mod filter;
mod index;
mod normalize;
mod params;
mod query;
mod response;

use fake::{
    faker::lorem::en::{Word, Words},
    Fake,
};
use serde::{Deserialize, Serialize};

pub use crate::filter::FilterSet;
pub use crate::index::{IndexError, IndexSnapshot, SnapshotEntry, SuggestIndex};
pub use crate::normalize::{
    equal_shaped_normalize_string, normalize_string, to_equal_shaped_latin, Normalizer,
    PreparedTerm, SanitizePolicy,
};
pub use crate::params::{PagingParameters, VersionParameters};
pub use crate::query::{parse_bool, QueryValues};
pub use crate::response::{assemble, PaginatedResponse, SuggestResponse, VersionedResponse};

/// A single suggestion that can be offered for a partial search term.
///
/// Outside of the index, suggestions are only ever moved around, sliced and
/// serialized. Nothing downstream of the lookup inspects their fields.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Suggestion {
    /// Identifier of the suggestion within the index snapshot.
    pub id: u64,

    /// The text to offer to the user.
    pub text: String,

    /// The class this suggestion belongs to, used for `class` filtering.
    pub class: String,

    /// Relative popularity. Higher weights are offered first.
    pub weight: u64,
}

impl<F> fake::Dummy<F> for Suggestion {
    fn dummy_with_rng<R: rand::Rng + ?Sized>(_config: &F, rng: &mut R) -> Self {
        Self {
            id: rng.gen(),
            text: Words(1..4).fake_with_rng::<Vec<String>, R>(rng).join(" "),
            class: Word().fake_with_rng(rng),
            weight: rng.gen_range(0..1000),
        }
    }
}

/// A source of suggestions for a search term.
///
/// Implementations are shared by every in-flight request, so they must be
/// safe to read concurrently and must not change while serving lookups.
pub trait SuggestionLookup: Send + Sync {
    /// The build version of the data behind this lookup.
    fn version(&self) -> u64;

    /// Find the suggestions for a search term.
    ///
    /// `part` is the term exactly as the user typed it, and `normalized_part`
    /// is the same term after normalization. An empty `include` set matches
    /// every class. The order of the returned suggestions is meaningful and is
    /// preserved by everything downstream.
    fn lookup(
        &self,
        part: &str,
        normalized_part: &str,
        include: &FilterSet,
        exclude: &FilterSet,
    ) -> Vec<Suggestion>;
}
