//! OpenAPI documentation, served at `/api/openapi.json` and rendered by RapiDoc at `/docs`.

use utoipa::OpenApi;

use crate::handlers::{categories, category_movies, medias, movies};
use crate::{extract, resources};
use cinetheque_core::models::MediaType;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cinetheque API",
        version = "0.1.0",
        description = "Movie catalog API: movies with an optional poster, categories, the links between them, and the uploaded media records. Every response uses the `{success, data, message}` envelope."
    ),
    paths(
        movies::index,
        movies::search,
        movies::show,
        movies::store,
        movies::update,
        movies::destroy,
        categories::index,
        categories::search,
        categories::show,
        categories::store,
        categories::update,
        categories::destroy,
        medias::index,
        medias::show,
        medias::destroy,
        category_movies::index,
        category_movies::show,
        category_movies::store,
        category_movies::update,
        category_movies::destroy,
    ),
    components(
        schemas(
            resources::MovieResource,
            resources::CategoryResource,
            resources::MediaResource,
            resources::CategoryMovieResource,
            extract::MovieInput,
            categories::CategoryInput,
            category_movies::CategoryMovieInput,
            MediaType,
        )
    ),
    tags(
        (name = "Movies", description = "Movie CRUD and search; store/update accept a poster upload"),
        (name = "Categories", description = "Category CRUD and search"),
        (name = "Medias", description = "Uploaded media records"),
        (name = "CategoryMovies", description = "Links between categories and movies")
    )
)]
pub struct ApiDoc;
