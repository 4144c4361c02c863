use std::collections::HashMap;

use actix_web::{delete, get, http::header, patch, post, web::{self, Json}, HttpRequest, HttpResponse};

use crate::{errors::ModelError, models::{course::{validate_course, Course, SORT_SAFELIST}, filters::{validate_filters, Filters}}, schema::{course::{CourseListResponse, CourseResponse, CreateCourse, UpdateCourse}, MessageResponse}, utils::{read_csv, read_id_param, read_int, read_string}, validator::Validator, GlobalState};

const EXPECTED_VERSION_HEADER: &str = "X-Expected-Version";

fn ensure_valid(course: &Course) -> Result<(), ModelError> {
    let mut v = Validator::new();
    validate_course(&mut v, course);

    if !v.valid() {
        return Err(ModelError::FailedValidation(v.into_errors()));
    }
    Ok(())
}

#[post("")]
pub async fn create_course_handler(data:web::Data<GlobalState>, input:Json<CreateCourse>) -> Result<HttpResponse, ModelError> {
    let course = Course::from(input.into_inner());
    ensure_valid(&course)?;

    let course = data.models.courses.insert(course).await?;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/api/v1/courses/{}", course.id)))
        .json(CourseResponse{course: &course}))
}

#[get("/{id}")]
pub async fn show_course_handler(data:web::Data<GlobalState>, path:web::Path<String>) -> Result<HttpResponse, ModelError> {
    let id = read_id_param(&path.into_inner())?;

    let course = data.models.courses.get(id).await?;

    Ok(HttpResponse::Ok().json(CourseResponse{course: &course}))
}

#[patch("/{id}")]
pub async fn update_course_handler(data:web::Data<GlobalState>, path:web::Path<String>, input:Json<UpdateCourse>, req:HttpRequest) -> Result<HttpResponse, ModelError> {
    let id = read_id_param(&path.into_inner())?;

    let mut course = data.models.courses.get(id).await?;

    // The header lets a client pin the version it last saw across the
    // read-modify-write done here.
    if let Some(expected) = req.headers().get(EXPECTED_VERSION_HEADER) {
        let expected = expected.to_str().ok().and_then(|val| val.trim().parse::<i32>().ok());
        if expected != Some(course.version) {
            return Err(ModelError::EditConflict);
        }
    }

    input.into_inner().apply(&mut course);
    ensure_valid(&course)?;

    data.models.courses.update(&mut course).await?;

    Ok(HttpResponse::Ok().json(CourseResponse{course: &course}))
}

#[delete("/{id}")]
pub async fn delete_course_handler(data:web::Data<GlobalState>, path:web::Path<String>) -> Result<HttpResponse, ModelError> {
    let id = read_id_param(&path.into_inner())?;

    data.models.courses.delete(id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse{message: "course successfully deleted".to_string()}))
}

#[get("")]
pub async fn list_courses_handler(data:web::Data<GlobalState>, query:web::Query<HashMap<String, String>>) -> Result<HttpResponse, ModelError> {
    let qs = query.into_inner();
    let mut v = Validator::new();

    let title = read_string(&qs, "title", "");
    let subjects = read_csv(&qs, "subjects", vec![]);

    let filters = Filters{
        page: read_int(&qs, "page", 1, &mut v),
        page_size: read_int(&qs, "page_size", 20, &mut v),
        sort: read_string(&qs, "sort", "id"),
        sort_safelist: SORT_SAFELIST,
    };

    validate_filters(&mut v, &filters);
    if !v.valid() {
        return Err(ModelError::FailedValidation(v.into_errors()));
    }

    let (courses, metadata) = data.models.courses.get_all(&title, &subjects, &filters).await?;

    Ok(HttpResponse::Ok().json(CourseListResponse{courses, metadata}))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test::{self, TestRequest}};
    use serde_json::{json, Value};

    use crate::test_init_app::{init, lazy_pool, test_pool};

    #[actix_web::test]
    async fn test_create_course_rejects_invalid_input() {
        let app = init(lazy_pool()).await;

        let res = TestRequest::post()
            .uri("/api/v1/courses")
            .set_json(json!({"title": "", "year": 1700, "runtime": "10 mins", "subjects": ["cs", "cs"]}))
            .send_request(&app)
            .await;

        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body, json!({"error": {
            "title": "must be provided",
            "year": "must be greater than 1888",
            "subjects": "must not contain duplicate values",
        }}));
    }

    #[actix_web::test]
    async fn test_create_course_rejects_malformed_body() {
        let app = init(lazy_pool()).await;

        let res = TestRequest::post()
            .uri("/api/v1/courses")
            .set_json(json!({"title": "Intro", "runtime": "ninety"}))
            .send_request(&app)
            .await;

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert!(body["error"].as_str().unwrap().contains("invalid runtime format"));
    }

    #[actix_web::test]
    async fn test_list_courses_validates_query_before_touching_the_store() {
        let app = init(lazy_pool()).await;

        let res = TestRequest::get()
            .uri("/api/v1/courses?sort=-created_at&page=abc&page_size=500")
            .send_request(&app)
            .await;

        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body, json!({"error": {
            "page": "must be an integer value",
            "page_size": "must be a maximum of 100",
            "sort": "invalid sort value",
        }}));
    }

    #[actix_web::test]
    async fn test_non_positive_ids_are_not_found() {
        let app = init(lazy_pool()).await;

        for req in [
            TestRequest::get().uri("/api/v1/courses/0"),
            TestRequest::get().uri("/api/v1/courses/abc"),
            TestRequest::delete().uri("/api/v1/courses/0"),
            TestRequest::delete().uri("/api/v1/courses/-4"),
        ] {
            let res = req.send_request(&app).await;
            assert_eq!(res.status(), StatusCode::NOT_FOUND);
        }
    }

    #[actix_web::test]
    async fn test_course_lifecycle() {
        let Some(pool) = test_pool().await else { return };
        let app = init(pool).await;

        let res = TestRequest::post()
            .uri("/api/v1/courses")
            .set_json(json!({"title": "Intro to Systems", "year": 2020, "runtime": "50 mins", "subjects": ["cs", "systems"]}))
            .send_request(&app)
            .await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let location = res.headers().get("Location").unwrap().to_str().unwrap().to_string();
        let body: Value = test::read_body_json(res).await;
        let id = body["course"]["id"].as_i64().unwrap();
        assert_eq!(location, format!("/api/v1/courses/{id}"));
        assert_eq!(body["course"]["version"], 1);
        assert_eq!(body["course"]["runtime"], "50 mins");

        let res = TestRequest::patch()
            .uri(&location)
            .insert_header(("X-Expected-Version", "7"))
            .set_json(json!({"runtime": 55}))
            .send_request(&app)
            .await;
        assert_eq!(res.status(), StatusCode::CONFLICT);

        let res = TestRequest::patch()
            .uri(&location)
            .insert_header(("X-Expected-Version", "1"))
            .set_json(json!({"runtime": 55}))
            .send_request(&app)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["course"]["version"], 2);
        assert_eq!(body["course"]["runtime"], "55 mins");
        assert_eq!(body["course"]["title"], "Intro to Systems");

        let res = TestRequest::get()
            .uri("/api/v1/courses?title=systems&subjects=cs,systems&sort=-year")
            .send_request(&app)
            .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert!(body["courses"].as_array().unwrap().iter().any(|c| c["id"] == id));
        assert_eq!(body["metadata"]["current_page"], 1);

        let res = TestRequest::delete().uri(&location).send_request(&app).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "course successfully deleted");

        let res = TestRequest::get().uri(&location).send_request(&app).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
