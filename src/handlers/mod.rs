pub mod course;

use actix_web::{error, get, web, HttpResponse, Responder};

use crate::{errors::CustomError, schema::HealthResponse, GlobalState};

#[get("/healthcheck")]
pub async fn healthcheck(data:web::Data<GlobalState>) -> impl Responder{
    HttpResponse::Ok().json(HealthResponse{
        status: "available".to_string(),
        environment: data.environment.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Bad request bodies come back as `{"error": "..."}` with a 400.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(1_048_576)
        .error_handler(|err, _req| {
            let message = match &err {
                error::JsonPayloadError::Deserialize(e) => format!("body contains invalid JSON: {e}"),
                other => other.to_string(),
            };
            CustomError{error: message}.into()
        })
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(healthcheck)
        .service(
            web::scope("/courses")
            .service(course::list_courses_handler)
            .service(course::create_course_handler)
            .service(course::show_course_handler)
            .service(course::update_course_handler)
            .service(course::delete_course_handler)
        );
}

#[cfg(test)]
mod tests{
    use actix_web::test::{self, TestRequest};

    use crate::{schema::HealthResponse, test_init_app::{init, lazy_pool}};

    #[actix_web::test]
    async fn test_healthcheck(){
        let app = init(lazy_pool()).await;

        let req = TestRequest::get().uri("/api/v1/healthcheck").to_request();
        let res: HealthResponse = test::call_and_read_body_json(&app, req).await;

        assert_eq!(res.status, "available");
        assert_eq!(res.environment, "test");
        assert_eq!(res.version, env!("CARGO_PKG_VERSION"));
    }
}
