mod movie;
mod recommendation;
mod tmdb;

pub use movie::{Movie, MovieDetails};
pub use recommendation::{Rating, Recommendation, Recommendations, YearBound, YearRange};
pub use tmdb::{TmdbGenre, TmdbMovie};
