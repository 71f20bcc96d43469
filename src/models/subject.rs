use crate::entities::subject_entity;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateSubjectRequest {
    #[schema(example = "Anatomía y Fisiología")]
    pub name: String,
    pub classroom_link: Option<String>,
    /// Two-month term, starting at 1
    pub term: Option<i32>,
    /// Defaults to the next position in the career's plan
    pub position: Option<i32>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateSubjectRequest {
    pub name: Option<String>,
    pub classroom_link: Option<String>,
    pub term: Option<i32>,
    pub position: Option<i32>,
}

/// `teacher_id: null` removes the current teacher.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct AssignTeacherRequest {
    pub teacher_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubjectResponse {
    pub id: i64,
    pub career_id: i64,
    pub name: String,
    pub classroom_link: String,
    pub term: Option<i32>,
    pub position: i32,
    pub teacher_id: Option<i64>,
    pub teacher_name: Option<String>,
}

impl SubjectResponse {
    pub fn new(m: subject_entity::Model, teacher_name: Option<String>) -> Self {
        Self {
            id: m.id,
            career_id: m.career_id,
            name: m.name,
            classroom_link: m.classroom_link,
            term: m.term,
            position: m.position,
            teacher_id: m.teacher_id,
            teacher_name,
        }
    }
}
