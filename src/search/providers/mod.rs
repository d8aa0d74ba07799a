//! Concrete search source implementations.
//!
//! Each submodule wraps a single external API and implements the
//! [`SearchSource`](super::SearchSource) trait.

pub mod anilist;
pub mod google_books;
pub mod tmdb;

pub use anilist::AniListSource;
pub use google_books::GoogleBooksSource;
pub use tmdb::{TmdbClient, TmdbMovieSource, TmdbTvSource};
