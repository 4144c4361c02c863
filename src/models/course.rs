use std::{fmt, future::Future, time::Duration};

use chrono::{DateTime, Datelike, Utc};
use futures_util::TryStreamExt;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sqlx::{Pool, Postgres};
use thiserror::Error;

use crate::{errors::ModelError, models::filters::{calculate_metadata, Filters, Metadata}, validator::{unique, Validator}};

const QUERY_TIMEOUT: Duration = Duration::from_secs(3);

pub const SORT_SAFELIST: &[&str] = &["id", "title", "year", "runtime", "-id", "-title", "-year", "-runtime"];

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid runtime format")]
pub struct RuntimeError;

/// Course length in minutes. Its text form is `"<N> mins"`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, sqlx::Type)]
#[sqlx(transparent)]
pub struct Runtime(pub i32);

impl Runtime {
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn encode(&self) -> String {
        format!("{} mins", self.0)
    }

    pub fn decode(text: &str) -> Result<Runtime, RuntimeError> {
        let (minutes, unit) = text.split_once(' ').ok_or(RuntimeError)?;

        if unit != "mins" || minutes.is_empty() || !minutes.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RuntimeError);
        }

        minutes.parse::<i32>().map(Runtime).map_err(|_| RuntimeError)
    }
}

impl Serialize for Runtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encode())
    }
}

struct RuntimeVisitor;

impl de::Visitor<'_> for RuntimeVisitor {
    type Value = Runtime;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a runtime such as \"90 mins\" or a whole number of minutes")
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Runtime, E> {
        Runtime::decode(value).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Runtime, E> {
        i32::try_from(value).map(Runtime).map_err(|_| E::custom(RuntimeError))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Runtime, E> {
        i32::try_from(value).map(Runtime).map_err(|_| E::custom(RuntimeError))
    }
}

impl<'de> Deserialize<'de> for Runtime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Runtime, D::Error> {
        deserializer.deserialize_any(RuntimeVisitor)
    }
}

fn is_zero(value: &i32) -> bool {
    *value == 0
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Course{
    pub id: i64,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
    pub title: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub year: i32,
    #[serde(skip_serializing_if = "Runtime::is_zero")]
    pub runtime: Runtime,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<String>,
    pub version: i32,
}

impl Course {
    /// A record that has not been stored yet. The store assigns `id`,
    /// `created_at` and `version` on insert.
    pub fn new(title: String, year: i32, runtime: Runtime, subjects: Vec<String>) -> Self {
        Course{
            id: 0,
            created_at: DateTime::default(),
            title,
            year,
            runtime,
            subjects,
            version: 0,
        }
    }
}

pub fn validate_course(v: &mut Validator, course: &Course) {
    v.check(!course.title.is_empty(), "title", "must be provided");
    v.check(course.title.len() <= 500, "title", "must not be more than 500 bytes long");

    v.check(course.year != 0, "year", "must be provided");
    v.check(course.year >= 1888, "year", "must be greater than 1888");
    v.check(course.year <= Utc::now().year(), "year", "must not be in the future");

    v.check(!course.runtime.is_zero(), "runtime", "must be provided");
    v.check(course.runtime.0 > 0, "runtime", "must be a positive integer");

    v.check(!course.subjects.is_empty(), "subjects", "must contain at least 1 subject");
    v.check(course.subjects.len() <= 5, "subjects", "must not contain more than 5 subjects");
    v.check(unique(&course.subjects), "subjects", "must not contain duplicate values");
}

#[derive(sqlx::FromRow)]
struct CourseWithCount{
    total_records: i64,
    #[sqlx(flatten)]
    course: Course,
}

async fn with_timeout<T>(operation: impl Future<Output = Result<T, sqlx::Error>>) -> Result<T, ModelError> {
    match tokio::time::timeout(QUERY_TIMEOUT, operation).await {
        Ok(result) => result.map_err(ModelError::from),
        Err(_) => Err(ModelError::Timeout),
    }
}

#[derive(Debug, Clone)]
pub struct CourseModel{
    pool: Pool<Postgres>,
}

impl CourseModel {
    pub fn new(pool: Pool<Postgres>) -> Self {
        CourseModel{ pool }
    }

    pub async fn insert(&self, mut course: Course) -> Result<Course, ModelError> {
        let (id, created_at, version) = with_timeout(
            sqlx::query_as::<_, (i64, DateTime<Utc>, i32)>(
                r#"
                    INSERT INTO courses (title, year, runtime, subjects)
                    VALUES ($1, $2, $3, $4)
                    RETURNING id, created_at, version
                "#,
            )
            .bind(&course.title)
            .bind(course.year)
            .bind(course.runtime)
            .bind(&course.subjects)
            .fetch_one(&self.pool),
        )
        .await?;

        course.id = id;
        course.created_at = created_at;
        course.version = version;

        tracing::debug!(course_id = id, "inserted course");
        Ok(course)
    }

    pub async fn get(&self, id: i64) -> Result<Course, ModelError> {
        if id < 1 {
            return Err(ModelError::RecordNotFound);
        }

        let course = with_timeout(
            sqlx::query_as::<_, Course>(
                r#"
                    SELECT id, created_at, title, year, runtime, subjects, version FROM courses
                    WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await?;

        course.ok_or(ModelError::RecordNotFound)
    }

    /// Writes every mutable field, provided the stored version still equals
    /// `course.version`. On success `course.version` is set to the new version.
    pub async fn update(&self, course: &mut Course) -> Result<i32, ModelError> {
        let version = with_timeout(
            sqlx::query_scalar::<_, i32>(
                r#"
                    UPDATE courses
                    SET title = $1, year = $2, runtime = $3, subjects = $4, version = version + 1
                    WHERE id = $5 AND version = $6
                    RETURNING version
                "#,
            )
            .bind(&course.title)
            .bind(course.year)
            .bind(course.runtime)
            .bind(&course.subjects)
            .bind(course.id)
            .bind(course.version)
            .fetch_optional(&self.pool),
        )
        .await?;

        match version {
            Some(version) => {
                tracing::debug!(course_id = course.id, version, "updated course");
                course.version = version;
                Ok(version)
            }
            None => {
                tracing::debug!(course_id = course.id, version = course.version, "edit conflict");
                Err(ModelError::EditConflict)
            }
        }
    }

    pub async fn delete(&self, id: i64) -> Result<(), ModelError> {
        if id < 1 {
            return Err(ModelError::RecordNotFound);
        }

        let result = with_timeout(
            sqlx::query("DELETE FROM courses WHERE id = $1")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(ModelError::RecordNotFound);
        }

        tracing::debug!(course_id = id, "deleted course");
        Ok(())
    }

    /// One page of courses matching `title` (full text) and containing every
    /// entry of `subjects`. The total match count comes from the same query.
    pub async fn get_all(&self, title: &str, subjects: &[String], filters: &Filters) -> Result<(Vec<Course>, Metadata), ModelError> {
        let query = format!(
            r#"
                SELECT count(*) OVER() AS total_records, id, created_at, title, year, runtime, subjects, version
                FROM courses
                WHERE (to_tsvector('simple', title) @@ plainto_tsquery('simple', $1) OR $1 = '')
                AND (subjects @> $2 OR $2 = '{{}}')
                ORDER BY {} {}, id ASC
                LIMIT $3 OFFSET $4
            "#,
            filters.sort_column(),
            filters.sort_direction().as_sql(),
        );

        let (courses, total_records) = with_timeout(async {
            let mut rows = sqlx::query_as::<_, CourseWithCount>(&query)
                .bind(title)
                .bind(subjects)
                .bind(filters.limit())
                .bind(filters.offset())
                .fetch(&self.pool);

            let mut total_records = 0;
            let mut courses = Vec::new();

            while let Some(row) = rows.try_next().await? {
                total_records = row.total_records;
                courses.push(row.course);
            }

            Ok::<_, sqlx::Error>((courses, total_records))
        })
        .await?;

        Ok((courses, calculate_metadata(total_records, filters.page, filters.page_size)))
    }
}
