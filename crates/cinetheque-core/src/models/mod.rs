pub mod category;
pub mod category_movie;
pub mod media;
pub mod movie;

pub use category::{Category, CategoryChanges, NewCategory};
pub use category_movie::{CategoryMovie, CategoryMovieChanges, NewCategoryMovie};
pub use media::{Media, MediaType, MediaUpsert};
pub use movie::{Movie, MovieChanges, NewMovie};
