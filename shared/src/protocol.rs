use crate::{
    AuthResponse, Classroom, ClassroomGrades, Game, Grade, LeaderboardEntry, LeaderboardPage,
    Lesson, LoginRequest, PageQuery, SignupRequest, Tag, TeacherInfo, TeacherSearchResult, User,
};
use serde::{Serialize, de::DeserializeOwned};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
///
/// Path parameters live on the request value as `#[serde(skip)]` fields, so the
/// serialized form of the request is exactly the JSON body (when one is sent).
pub trait ApiRequest: Serialize {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// Whether the serialized request is sent as the JSON body.
    const SEND_BODY: bool;
    /// Whether the request carries the `Authorization: Bearer` header.
    const AUTHENTICATED: bool = true;
    /// Error text used when the server gives no `{message}`.
    const FAILURE: &'static str;

    /// The URL path, with path parameters filled in.
    fn path(&self) -> String;

    /// Query string pairs (keys may repeat).
    fn query(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Fallback error text for this particular request; defaults to `FAILURE`.
    fn failure(&self) -> &'static str {
        Self::FAILURE
    }

    /// Fixed error text for a given status, taking priority over the server message.
    fn status_message(&self, _status: u16) -> Option<&'static str> {
        None
    }
}

// =========================================================
// Auth
// =========================================================

impl ApiRequest for LoginRequest {
    type Response = AuthResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    const SEND_BODY: bool = true;
    const AUTHENTICATED: bool = false;
    const FAILURE: &'static str = "Invalid credentials";

    fn path(&self) -> String {
        "/auth/login".to_string()
    }

    fn status_message(&self, _status: u16) -> Option<&'static str> {
        Some(Self::FAILURE)
    }
}

impl ApiRequest for SignupRequest {
    type Response = AuthResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    const SEND_BODY: bool = true;
    const AUTHENTICATED: bool = false;
    const FAILURE: &'static str = "Registration failed";

    fn path(&self) -> String {
        "/auth/signup".to_string()
    }
}

// =========================================================
// Users
// =========================================================

#[derive(Debug, Clone, Serialize)]
pub struct GetUserRequest {
    #[serde(skip)]
    pub user_id: String,
}

impl ApiRequest for GetUserRequest {
    type Response = User;
    const METHOD: HttpMethod = HttpMethod::Get;
    const SEND_BODY: bool = false;
    const FAILURE: &'static str = "Failed to fetch user details";

    fn path(&self) -> String {
        format!("/users/{}", self.user_id)
    }
}

// =========================================================
// Classrooms
// =========================================================

#[derive(Debug, Clone, Serialize)]
pub struct CreateClassroomRequest {
    pub name: String,
}

impl ApiRequest for CreateClassroomRequest {
    type Response = Classroom;
    const METHOD: HttpMethod = HttpMethod::Post;
    const SEND_BODY: bool = true;
    const FAILURE: &'static str = "Failed to create classroom";

    fn path(&self) -> String {
        "/classroom".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteClassroomRequest {
    #[serde(skip)]
    pub id: String,
}

impl ApiRequest for DeleteClassroomRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;
    const SEND_BODY: bool = false;
    const FAILURE: &'static str = "Failed to delete classroom";

    fn path(&self) -> String {
        format!("/classroom/{}", self.id)
    }
}

/// Add users to a classroom
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddClassroomUsersRequest {
    #[serde(skip)]
    pub classroom_id: String,
    pub user_ids: Vec<String>,
}

impl ApiRequest for AddClassroomUsersRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Post;
    const SEND_BODY: bool = true;
    const FAILURE: &'static str = "Failed to add users to classroom";

    fn path(&self) -> String {
        format!("/classroom/{}/users", self.classroom_id)
    }
}

/// Remove users from a classroom (DELETE with a body)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveClassroomUsersRequest {
    #[serde(skip)]
    pub classroom_id: String,
    pub user_ids: Vec<String>,
}

impl ApiRequest for RemoveClassroomUsersRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;
    const SEND_BODY: bool = true;
    const FAILURE: &'static str = "Failed to remove users from classroom";

    fn path(&self) -> String {
        format!("/classroom/{}/users", self.classroom_id)
    }
}

// =========================================================
// Lessons
// =========================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLessonRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub classroom_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_ids: Option<Vec<String>>,
}

impl ApiRequest for CreateLessonRequest {
    type Response = Lesson;
    const METHOD: HttpMethod = HttpMethod::Post;
    const SEND_BODY: bool = true;
    const FAILURE: &'static str = "Failed to create lesson";

    fn path(&self) -> String {
        "/lessons".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassroomLessonsRequest {
    #[serde(skip)]
    pub classroom_id: String,
}

impl ApiRequest for ClassroomLessonsRequest {
    type Response = Vec<Lesson>;
    const METHOD: HttpMethod = HttpMethod::Get;
    const SEND_BODY: bool = false;
    const FAILURE: &'static str = "Failed to fetch lessons";

    fn path(&self) -> String {
        format!("/lessons/classroom/{}", self.classroom_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GetLessonRequest {
    #[serde(skip)]
    pub id: String,
}

impl ApiRequest for GetLessonRequest {
    type Response = Lesson;
    const METHOD: HttpMethod = HttpMethod::Get;
    const SEND_BODY: bool = false;
    const FAILURE: &'static str = "Failed to fetch lesson";

    fn path(&self) -> String {
        format!("/lessons/{}", self.id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteLessonRequest {
    #[serde(skip)]
    pub id: String,
}

impl ApiRequest for DeleteLessonRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;
    const SEND_BODY: bool = false;
    const FAILURE: &'static str = "Failed to delete lesson";

    fn path(&self) -> String {
        format!("/lessons/{}", self.id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteSummaryRequest {
    #[serde(skip)]
    pub lesson_id: String,
}

impl ApiRequest for DeleteSummaryRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;
    const SEND_BODY: bool = false;
    const FAILURE: &'static str = "Failed to delete summary";

    fn path(&self) -> String {
        summary_path(&self.lesson_id)
    }
}

/// Summary upload/download share this path; both bypass `ApiRequest`.
pub fn summary_path(lesson_id: &str) -> String {
    format!("/lessons/{}/summary", lesson_id)
}

// =========================================================
// Grades
// =========================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddGradeRequest {
    #[serde(skip)]
    pub lesson_id: String,
    pub student_id: String,
    pub grade: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl ApiRequest for AddGradeRequest {
    type Response = Grade;
    const METHOD: HttpMethod = HttpMethod::Post;
    const SEND_BODY: bool = true;
    const FAILURE: &'static str = "Failed to add grade";

    fn path(&self) -> String {
        format!("/grades/lesson/{}", self.lesson_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LessonGradesRequest {
    #[serde(skip)]
    pub lesson_id: String,
}

impl ApiRequest for LessonGradesRequest {
    type Response = Vec<Grade>;
    const METHOD: HttpMethod = HttpMethod::Get;
    const SEND_BODY: bool = false;
    const FAILURE: &'static str = "Failed to fetch lesson grades";

    fn path(&self) -> String {
        format!("/grades/lesson/{}", self.lesson_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentGradesRequest {
    #[serde(skip)]
    pub student_id: String,
}

impl ApiRequest for StudentGradesRequest {
    type Response = Vec<Grade>;
    const METHOD: HttpMethod = HttpMethod::Get;
    const SEND_BODY: bool = false;
    const FAILURE: &'static str = "Failed to fetch student grades";

    fn path(&self) -> String {
        format!("/grades/student/{}", self.student_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassroomGradesRequest {
    #[serde(skip)]
    pub classroom_id: String,
}

impl ApiRequest for ClassroomGradesRequest {
    type Response = ClassroomGrades;
    const METHOD: HttpMethod = HttpMethod::Get;
    const SEND_BODY: bool = false;
    const FAILURE: &'static str = "Failed to fetch classroom grades";

    fn path(&self) -> String {
        format!("/grades/classroom/{}", self.classroom_id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteGradeRequest {
    #[serde(skip)]
    pub lesson_id: String,
    #[serde(skip)]
    pub student_id: String,
}

impl ApiRequest for DeleteGradeRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Delete;
    const SEND_BODY: bool = false;
    const FAILURE: &'static str = "Failed to delete grade";

    fn path(&self) -> String {
        format!(
            "/grades/lesson/{}/student/{}",
            self.lesson_id, self.student_id
        )
    }
}

// =========================================================
// Leaderboard
// =========================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddScoreRequest {
    pub game_id: String,
    pub value: i64,
}

impl ApiRequest for AddScoreRequest {
    type Response = LeaderboardEntry;
    const METHOD: HttpMethod = HttpMethod::Post;
    const SEND_BODY: bool = true;
    const FAILURE: &'static str = "Failed to add score";

    fn path(&self) -> String {
        "/leaderboard".to_string()
    }
}

/// Which leaderboard to read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaderboardScope {
    Game(String),
    Classroom(String),
    User(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardRequest {
    #[serde(skip)]
    pub scope: LeaderboardScope,
    #[serde(skip)]
    pub page: PageQuery,
}

impl LeaderboardRequest {
    pub fn new(scope: LeaderboardScope) -> Self {
        Self {
            scope,
            page: PageQuery::default(),
        }
    }
}

impl ApiRequest for LeaderboardRequest {
    type Response = LeaderboardPage;
    const METHOD: HttpMethod = HttpMethod::Get;
    const SEND_BODY: bool = false;
    const FAILURE: &'static str = "Failed to fetch leaderboard";

    fn path(&self) -> String {
        match &self.scope {
            LeaderboardScope::Game(id) => format!("/leaderboard/game/{}", id),
            LeaderboardScope::Classroom(id) => format!("/leaderboard/classroom/{}", id),
            LeaderboardScope::User(id) => format!("/leaderboard/user/{}", id),
        }
    }

    fn failure(&self) -> &'static str {
        match self.scope {
            LeaderboardScope::Game(_) => "Failed to fetch game leaderboard",
            LeaderboardScope::Classroom(_) => "Failed to fetch classroom leaderboard",
            LeaderboardScope::User(_) => "Failed to fetch user scores",
        }
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("page", self.page.page.to_string()),
            ("limit", self.page.limit.to_string()),
        ]
    }
}

// =========================================================
// Tags & teacher search
// =========================================================

#[derive(Debug, Clone, Serialize)]
pub struct ListTagsRequest;

impl ApiRequest for ListTagsRequest {
    type Response = Vec<Tag>;
    const METHOD: HttpMethod = HttpMethod::Get;
    const SEND_BODY: bool = false;
    const FAILURE: &'static str = "Failed to fetch tags";

    fn path(&self) -> String {
        "/tags".to_string()
    }
}

/// Create a tag (re-uses `Tag` as the body)
impl ApiRequest for Tag {
    type Response = Tag;
    const METHOD: HttpMethod = HttpMethod::Post;
    const SEND_BODY: bool = true;
    const FAILURE: &'static str = "Failed to create tag";

    fn path(&self) -> String {
        "/tags".to_string()
    }

    fn status_message(&self, status: u16) -> Option<&'static str> {
        (status == 400).then_some("Tag name already exists")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchTeachersRequest {
    #[serde(skip)]
    pub tags: Vec<String>,
}

impl ApiRequest for SearchTeachersRequest {
    type Response = Vec<TeacherSearchResult>;
    const METHOD: HttpMethod = HttpMethod::Get;
    const SEND_BODY: bool = false;
    const FAILURE: &'static str = "Failed to search teachers";

    fn path(&self) -> String {
        "/teachers-info/search".to_string()
    }

    fn query(&self) -> Vec<(&'static str, String)> {
        self.tags.iter().map(|tag| ("tags", tag.clone())).collect()
    }
}

// =========================================================
// Teacher info
// =========================================================

#[derive(Debug, Clone, Serialize)]
pub struct GetTeacherInfoRequest;

impl ApiRequest for GetTeacherInfoRequest {
    type Response = TeacherInfo;
    const METHOD: HttpMethod = HttpMethod::Get;
    const SEND_BODY: bool = false;
    const FAILURE: &'static str = "Failed to fetch teacher info";

    fn path(&self) -> String {
        "/teacher-info".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct CreateTeacherInfoRequest(pub TeacherInfo);

impl ApiRequest for CreateTeacherInfoRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Post;
    const SEND_BODY: bool = true;
    const FAILURE: &'static str = "Failed to create teacher info";

    fn path(&self) -> String {
        "/teacher-info".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct UpdateTeacherInfoRequest(pub TeacherInfo);

impl ApiRequest for UpdateTeacherInfoRequest {
    type Response = ();
    const METHOD: HttpMethod = HttpMethod::Put;
    const SEND_BODY: bool = true;
    const FAILURE: &'static str = "Failed to update teacher info";

    fn path(&self) -> String {
        "/teacher-info".to_string()
    }
}

// =========================================================
// Games
// =========================================================

#[derive(Debug, Clone, Serialize)]
pub struct ListGamesRequest;

impl ApiRequest for ListGamesRequest {
    type Response = Vec<Game>;
    const METHOD: HttpMethod = HttpMethod::Get;
    const SEND_BODY: bool = false;
    const FAILURE: &'static str = "Failed to fetch games";

    fn path(&self) -> String {
        "/games".to_string()
    }
}
