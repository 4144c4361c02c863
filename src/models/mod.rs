pub mod course;
pub mod filters;

use sqlx::{Pool, Postgres};

use course::CourseModel;

/// Every model, each holding its own handle to the shared pool.
#[derive(Debug, Clone)]
pub struct Models{
    pub courses: CourseModel,
}

impl Models {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Models{
            courses: CourseModel::new(pool),
        }
    }
}
