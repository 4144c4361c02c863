use serde::{Deserialize, Serialize};

use crate::models::{course::{Course, Runtime}, filters::Metadata};

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CreateCourse{
    pub title: String,
    pub year: i32,
    pub runtime: Runtime,
    pub subjects: Vec<String>,
}

impl From<CreateCourse> for Course {
    fn from(input: CreateCourse) -> Self {
        Course::new(input.title, input.year, input.runtime, input.subjects)
    }
}

/// Partial update body. A field left out of the request keeps its stored
/// value.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct UpdateCourse{
    pub title: Option<String>,
    pub year: Option<i32>,
    pub runtime: Option<Runtime>,
    pub subjects: Option<Vec<String>>,
}

impl UpdateCourse {
    pub fn apply(self, course: &mut Course) {
        if let Some(title) = self.title {
            course.title = title;
        }
        if let Some(year) = self.year {
            course.year = year;
        }
        if let Some(runtime) = self.runtime {
            course.runtime = runtime;
        }
        if let Some(subjects) = self.subjects {
            course.subjects = subjects;
        }
    }
}

#[derive(Serialize)]
pub struct CourseResponse<'a>{
    pub course: &'a Course,
}

#[derive(Serialize)]
pub struct CourseListResponse{
    pub courses: Vec<Course>,
    pub metadata: Metadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_course_only_touches_present_fields() {
        let mut course = Course::new("Intro to Systems".to_string(), 2020, Runtime(50), vec!["cs".to_string()]);

        let input: UpdateCourse = serde_json::from_str(r#"{"runtime": "55 mins"}"#).unwrap();
        input.apply(&mut course);

        assert_eq!(course.runtime, Runtime(55));
        assert_eq!(course.title, "Intro to Systems");
        assert_eq!(course.year, 2020);
        assert_eq!(course.subjects, vec!["cs"]);

        let input: UpdateCourse = serde_json::from_str(r#"{"title": "Intro to Systems II", "subjects": []}"#).unwrap();
        input.apply(&mut course);
        assert_eq!(course.title, "Intro to Systems II");
        assert!(course.subjects.is_empty());
    }

    #[test]
    fn test_create_course_accepts_both_runtime_shapes() {
        let text: CreateCourse = serde_json::from_str(r#"{"title": "A", "year": 2001, "runtime": "90 mins", "subjects": ["x"]}"#).unwrap();
        let number: CreateCourse = serde_json::from_str(r#"{"title": "A", "year": 2001, "runtime": 90, "subjects": ["x"]}"#).unwrap();
        assert_eq!(text.runtime, number.runtime);

        assert!(serde_json::from_str::<CreateCourse>(r#"{"title": "A", "rating": 5}"#).is_err());
        assert!(serde_json::from_str::<CreateCourse>(r#"{"runtime": "90 minutes"}"#).is_err());
    }
}
