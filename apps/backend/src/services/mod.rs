//! Application services for the Moovi backend.

pub mod images;
pub mod tmdb;

pub use images::ImageUrls;
pub use tmdb::TmdbClient;
