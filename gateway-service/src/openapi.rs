use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use common::models::{Activity, ActivityRequest};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::get_weather,
        handlers::search_locations,
        handlers::suggest_activities,
    ),
    components(schemas(Activity, ActivityRequest)),
    tags(
        (name = "weather", description = "Forecast and location search"),
        (name = "activities", description = "Generated activity suggestions"),
    ),
)]
struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
