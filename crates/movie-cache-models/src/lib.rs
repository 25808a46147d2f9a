pub mod favorite;
pub mod movie;
pub mod record;

pub use favorite::FavoriteChange;
pub use movie::{Movie, MovieDetail, MoviePage};
pub use record::{InvalidUpdate, MovieId, MovieRecord, MovieUpdate};
