use super::*;
use crate::web::MemoryStorage;
use classhub_shared::Role;
use std::cell::RefCell;
use std::collections::HashMap;

// =========================================================
// 测试工具: MockTransport
// =========================================================

struct MockTransport {
    // (Method URL) -> (Status, Status Text, Body)
    responses: RefCell<HashMap<String, (u16, String, String)>>,
    // 记录发出的请求
    requests: RefCell<Vec<HttpRequest>>,
    offline: bool,
}

impl MockTransport {
    fn new() -> Self {
        Self {
            responses: RefCell::new(HashMap::new()),
            requests: RefCell::new(Vec::new()),
            offline: false,
        }
    }

    fn offline() -> Self {
        Self {
            offline: true,
            ..Self::new()
        }
    }

    fn mock(&self, method: HttpMethod, url: &str, status: u16, status_text: &str, body: &str) {
        self.responses.borrow_mut().insert(
            format!("{} {}", method.as_str(), url),
            (status, status_text.to_string(), body.to_string()),
        );
    }

    fn last_request(&self) -> HttpRequest {
        self.requests
            .borrow()
            .last()
            .cloned()
            .expect("no request was sent")
    }
}

#[async_trait::async_trait(?Send)]
impl HttpTransport for MockTransport {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        self.requests.borrow_mut().push(req.clone());
        if self.offline {
            return Err(ApiError::Network("connection refused".to_string()));
        }

        let key = format!("{} {}", req.method.as_str(), req.url);
        let responses = self.responses.borrow();
        let (status, status_text, body) = responses
            .get(&key)
            .cloned()
            .unwrap_or((404, "Not Found".to_string(), String::new()));
        Ok(HttpResponse {
            status,
            status_text,
            body,
        })
    }
}

const BASE: &str = "http://api.test";

fn client(transport: MockTransport) -> (ClassHubApi<MockTransport, MemoryStorage>, MemoryStorage) {
    let storage = MemoryStorage::new();
    let api = ClassHubApi::new(
        AppConfig::new(BASE),
        SessionStore::new(storage.clone()),
        transport,
    );
    (api, storage)
}

fn signed_in_client(transport: MockTransport) -> ClassHubApi<MockTransport, MemoryStorage> {
    let (api, _) = client(transport);
    api.session().set("tok-1", "u1", "3");
    api
}

fn credentials() -> LoginRequest {
    LoginRequest {
        username: "anna".to_string(),
        password: "secret".to_string(),
    }
}

// =========================================================
// 认证
// =========================================================

#[tokio::test]
async fn test_login_persists_session() {
    let transport = MockTransport::new();
    transport.mock(
        HttpMethod::Post,
        "http://api.test/auth/login",
        200,
        "OK",
        r#"{"token":"abc","userId":"42","roleId":3}"#,
    );
    let (api, storage) = client(transport);

    let auth = api.login(&credentials()).await.unwrap();
    assert_eq!(auth.role(), Some(Role::Teacher));

    assert_eq!(storage.get("token").as_deref(), Some("abc"));
    assert_eq!(storage.get("userId").as_deref(), Some("42"));
    assert_eq!(storage.get("roleId").as_deref(), Some("3"));
    assert_eq!(api.session().role(), Some(Role::Teacher));

    let sent = api.transport.last_request();
    assert_eq!(sent.header("Authorization"), None);
    assert_eq!(
        sent.body.as_deref(),
        Some(r#"{"username":"anna","password":"secret"}"#)
    );
}

#[tokio::test]
async fn test_login_failure_leaves_session_empty() {
    let transport = MockTransport::new();
    transport.mock(
        HttpMethod::Post,
        "http://api.test/auth/login",
        401,
        "Unauthorized",
        r#"{"message":"user not found"}"#,
    );
    let (api, storage) = client(transport);

    let err = api.login(&credentials()).await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid credentials");
    assert_eq!(err.status(), Some(401));
    assert_eq!(storage.len(), 0);
}

#[tokio::test]
async fn test_signup_surfaces_server_message() {
    let transport = MockTransport::new();
    transport.mock(
        HttpMethod::Post,
        "http://api.test/auth/signup",
        409,
        "Conflict",
        r#"{"message":"Username already taken","status":409}"#,
    );
    let (api, _) = client(transport);

    let err = api
        .signup(&SignupRequest {
            username: "anna".to_string(),
            password: "pw".to_string(),
            name: None,
            surname: None,
            role_id: Role::Student,
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Username already taken");
}

#[tokio::test]
async fn test_logout_clears_session() {
    let api = signed_in_client(MockTransport::new());
    assert!(api.session().is_authenticated());
    api.logout();
    assert!(!api.session().is_authenticated());
}

// =========================================================
// 认证头与请求构建
// =========================================================

#[tokio::test]
async fn test_authenticated_request_carries_bearer_token() {
    let transport = MockTransport::new();
    transport.mock(
        HttpMethod::Get,
        "http://api.test/users/u7",
        200,
        "OK",
        r#"{"id":"u7","username":"pete"}"#,
    );
    let api = signed_in_client(transport);

    let user = api.user("u7").await.unwrap();
    assert_eq!(user.username, "pete");

    let sent = api.transport.last_request();
    assert_eq!(sent.method, HttpMethod::Get);
    assert_eq!(sent.header("Authorization"), Some("Bearer tok-1"));
    assert_eq!(sent.header("Accept"), Some("application/json"));
    assert_eq!(sent.body, None);
}

#[tokio::test]
async fn test_anonymous_request_has_no_authorization_header() {
    let transport = MockTransport::new();
    transport.mock(HttpMethod::Get, "http://api.test/tags", 200, "OK", "[]");
    let (api, _) = client(transport);

    let tags = api.tags().await.unwrap();
    assert!(tags.is_empty());
    assert_eq!(api.transport.last_request().header("Authorization"), None);
}

#[tokio::test]
async fn test_delete_with_body_and_empty_response() {
    let transport = MockTransport::new();
    transport.mock(
        HttpMethod::Delete,
        "http://api.test/classroom/c1/users",
        204,
        "No Content",
        "",
    );
    let api = signed_in_client(transport);

    api.remove_classroom_users("c1", vec!["u2".to_string()])
        .await
        .unwrap();

    let sent = api.transport.last_request();
    assert_eq!(sent.body.as_deref(), Some(r#"{"userIds":["u2"]}"#));
}

#[tokio::test]
async fn test_void_endpoint_ignores_response_body() {
    let transport = MockTransport::new();
    transport.mock(
        HttpMethod::Delete,
        "http://api.test/lessons/L1",
        200,
        "OK",
        r#"{"deleted":true}"#,
    );
    let api = signed_in_client(transport);

    assert!(api.delete_lesson("L1").await.is_ok());
}

#[tokio::test]
async fn test_leaderboard_sends_paging_query() {
    let transport = MockTransport::new();
    transport.mock(
        HttpMethod::Get,
        "http://api.test/leaderboard/game/g1",
        200,
        "OK",
        r#"{"data":[],"pagination":{"total":0,"pageSize":5,"offset":10}}"#,
    );
    let api = signed_in_client(transport);

    let page = api
        .leaderboard(
            LeaderboardScope::Game("g1".to_string()),
            PageQuery { page: 3, limit: 5 },
        )
        .await
        .unwrap();
    assert_eq!(page.pagination.offset, 10);

    let sent = api.transport.last_request();
    assert_eq!(
        sent.query,
        vec![("page", "3".to_string()), ("limit", "5".to_string())]
    );
}

#[tokio::test]
async fn test_add_score_posts_game_and_value() {
    let transport = MockTransport::new();
    transport.mock(
        HttpMethod::Post,
        "http://api.test/leaderboard",
        201,
        "Created",
        r#"{"userId":"u1","username":"anna","value":120,"createdAt":"2024-03-01T10:00:00Z"}"#,
    );
    let api = signed_in_client(transport);

    let entry = api.add_score("g1", 120).await.unwrap();
    assert_eq!(entry.value, 120);
    assert_eq!(
        api.transport.last_request().body.as_deref(),
        Some(r#"{"gameId":"g1","value":120}"#)
    );
}

#[tokio::test]
async fn test_classroom_grades_grouped_by_student() {
    let transport = MockTransport::new();
    transport.mock(
        HttpMethod::Get,
        "http://api.test/grades/classroom/c1",
        200,
        "OK",
        r#"{"s1":[{"studentId":"s1","grade":4.5,"lessonId":"L1"}],"s2":[]}"#,
    );
    let api = signed_in_client(transport);

    let grades = api.classroom_grades("c1").await.unwrap();
    assert_eq!(grades.len(), 2);
    assert_eq!(grades["s1"][0].grade, 4.5);
    assert!(grades["s2"].is_empty());
}

#[tokio::test]
async fn test_signup_persists_session() {
    let transport = MockTransport::new();
    transport.mock(
        HttpMethod::Post,
        "http://api.test/auth/signup",
        201,
        "Created",
        r#"{"token":"new","userId":"7","roleId":2}"#,
    );
    let (api, storage) = client(transport);

    let auth = api
        .signup(&SignupRequest {
            username: "olga".to_string(),
            password: "pw".to_string(),
            name: Some("Olga".to_string()),
            surname: None,
            role_id: Role::Parent,
        })
        .await
        .unwrap();
    assert_eq!(auth.role(), Some(Role::Parent));
    assert_eq!(storage.get("token").as_deref(), Some("new"));
    assert_eq!(storage.get("roleId").as_deref(), Some("2"));

    let sent = api.transport.last_request();
    assert_eq!(sent.header("Authorization"), None);
    assert_eq!(
        sent.body.as_deref(),
        Some(r#"{"username":"olga","password":"pw","name":"Olga","roleId":2}"#)
    );
}

#[tokio::test]
async fn test_login_with_unknown_role_still_signs_in() {
    let transport = MockTransport::new();
    transport.mock(
        HttpMethod::Post,
        "http://api.test/auth/login",
        200,
        "OK",
        r#"{"token":"abc","userId":"42","roleId":4}"#,
    );
    let (api, storage) = client(transport);

    let auth = api.login(&credentials()).await.unwrap();
    assert_eq!(auth.role(), None);
    assert_eq!(storage.get("token").as_deref(), Some("abc"));
    assert_eq!(storage.get("roleId").as_deref(), Some("4"));
    assert!(api.session().is_authenticated());
    assert_eq!(api.session().role(), None);
}

// =========================================================
// 班级与课程
// =========================================================

#[tokio::test]
async fn test_create_and_delete_classroom() {
    let transport = MockTransport::new();
    transport.mock(
        HttpMethod::Post,
        "http://api.test/classroom",
        201,
        "Created",
        r#"{"id":"c1","name":"7B","admins":[],"students":[]}"#,
    );
    transport.mock(
        HttpMethod::Delete,
        "http://api.test/classroom/c1",
        204,
        "No Content",
        "",
    );
    let api = signed_in_client(transport);

    let classroom = api.create_classroom("7B").await.unwrap();
    assert_eq!(classroom.id, "c1");
    let sent = api.transport.last_request();
    assert_eq!(sent.method, HttpMethod::Post);
    assert_eq!(sent.header("Authorization"), Some("Bearer tok-1"));
    assert_eq!(sent.body.as_deref(), Some(r#"{"name":"7B"}"#));

    api.delete_classroom("c1").await.unwrap();
    let sent = api.transport.last_request();
    assert_eq!(sent.method, HttpMethod::Delete);
    assert_eq!(sent.url, "http://api.test/classroom/c1");
    assert_eq!(sent.body, None);
}

#[tokio::test]
async fn test_add_classroom_users_posts_ids() {
    let transport = MockTransport::new();
    transport.mock(
        HttpMethod::Post,
        "http://api.test/classroom/c1/users",
        200,
        "OK",
        "",
    );
    let api = signed_in_client(transport);

    api.add_classroom_users("c1", vec!["u2".to_string(), "u3".to_string()])
        .await
        .unwrap();
    let sent = api.transport.last_request();
    assert_eq!(sent.method, HttpMethod::Post);
    assert_eq!(sent.header("Authorization"), Some("Bearer tok-1"));
    assert_eq!(sent.body.as_deref(), Some(r#"{"userIds":["u2","u3"]}"#));
}

#[tokio::test]
async fn test_classroom_lessons_and_create_lesson() {
    let transport = MockTransport::new();
    transport.mock(
        HttpMethod::Get,
        "http://api.test/lessons/classroom/c1",
        200,
        "OK",
        r#"[{"id":"L1","name":"Fractions","gameIds":["g1"]}]"#,
    );
    transport.mock(
        HttpMethod::Post,
        "http://api.test/lessons",
        201,
        "Created",
        r#"{"id":"L2","name":"Decimals"}"#,
    );
    let api = signed_in_client(transport);

    let lessons = api.classroom_lessons("c1").await.unwrap();
    assert_eq!(lessons[0].game_ids, Some(vec!["g1".to_string()]));
    assert_eq!(api.transport.last_request().body, None);

    let lesson = api
        .create_lesson(&CreateLessonRequest {
            name: "Decimals".to_string(),
            description: None,
            classroom_id: "c1".to_string(),
            game_ids: None,
        })
        .await
        .unwrap();
    assert_eq!(lesson.id, "L2");
    assert_eq!(
        api.transport.last_request().body.as_deref(),
        Some(r#"{"name":"Decimals","classroomId":"c1"}"#)
    );
}

#[tokio::test]
async fn test_delete_summary() {
    let transport = MockTransport::new();
    transport.mock(
        HttpMethod::Delete,
        "http://api.test/lessons/L1/summary",
        204,
        "No Content",
        "",
    );
    let api = signed_in_client(transport);

    api.delete_summary("L1").await.unwrap();
    let sent = api.transport.last_request();
    assert_eq!(sent.method, HttpMethod::Delete);
    assert_eq!(sent.header("Authorization"), Some("Bearer tok-1"));
}

// =========================================================
// 成绩
// =========================================================

#[tokio::test]
async fn test_add_grade_sends_fractional_grade() {
    let transport = MockTransport::new();
    transport.mock(
        HttpMethod::Post,
        "http://api.test/grades/lesson/L1",
        201,
        "Created",
        r#"{"studentId":"s1","grade":4.5,"comment":"good","lessonId":"L1"}"#,
    );
    let api = signed_in_client(transport);

    let grade = api
        .add_grade(&AddGradeRequest {
            lesson_id: "L1".to_string(),
            student_id: "s1".to_string(),
            grade: 4.5,
            comment: Some("good".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(grade.grade, 4.5);

    let sent = api.transport.last_request();
    assert_eq!(sent.header("Authorization"), Some("Bearer tok-1"));
    assert_eq!(
        sent.body.as_deref(),
        Some(r#"{"studentId":"s1","grade":4.5,"comment":"good"}"#)
    );
}

#[tokio::test]
async fn test_student_grades_accept_integer_grades() {
    let transport = MockTransport::new();
    transport.mock(
        HttpMethod::Get,
        "http://api.test/grades/student/s1",
        200,
        "OK",
        r#"[{"studentId":"s1","grade":5,"lessonId":"L1"}]"#,
    );
    let api = signed_in_client(transport);

    let grades = api.student_grades("s1").await.unwrap();
    assert_eq!(grades.len(), 1);
    assert_eq!(grades[0].grade, 5.0);
}

#[tokio::test]
async fn test_delete_grade() {
    let transport = MockTransport::new();
    transport.mock(
        HttpMethod::Delete,
        "http://api.test/grades/lesson/L1/student/s1",
        204,
        "No Content",
        "",
    );
    let api = signed_in_client(transport);

    api.delete_grade("L1", "s1").await.unwrap();
    assert_eq!(api.transport.last_request().method, HttpMethod::Delete);
}

// =========================================================
// 排行榜、标签与教师资料
// =========================================================

#[tokio::test]
async fn test_user_leaderboard_default_paging() {
    let transport = MockTransport::new();
    transport.mock(
        HttpMethod::Get,
        "http://api.test/leaderboard/user/u1",
        200,
        "OK",
        r#"{"data":[],"pagination":{"total":0,"pageSize":10,"offset":0}}"#,
    );
    let api = signed_in_client(transport);

    api.leaderboard(
        LeaderboardScope::User("u1".to_string()),
        PageQuery::default(),
    )
    .await
    .unwrap();
    let sent = api.transport.last_request();
    assert_eq!(sent.header("Authorization"), Some("Bearer tok-1"));
    assert_eq!(
        sent.query,
        vec![("page", "1".to_string()), ("limit", "10".to_string())]
    );
}

#[tokio::test]
async fn test_leaderboard_failure_names_scope() {
    let transport = MockTransport::new();
    transport.mock(
        HttpMethod::Get,
        "http://api.test/leaderboard/classroom/c1",
        500,
        "Internal Server Error",
        "",
    );
    let api = signed_in_client(transport);

    let err = api
        .leaderboard(
            LeaderboardScope::Classroom("c1".to_string()),
            PageQuery::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to fetch classroom leaderboard: Internal Server Error"
    );
}

#[tokio::test]
async fn test_search_teachers_repeats_tags_query() {
    let transport = MockTransport::new();
    transport.mock(
        HttpMethod::Get,
        "http://api.test/teachers-info/search",
        200,
        "OK",
        r#"[{"teacherId":"t1","teacherName":"Ivan","teacherSurname":"Petrov","aboutTeacher":"","canHelpWith":"algebra","tagsId":["math"]}]"#,
    );
    let api = signed_in_client(transport);

    let found = api
        .search_teachers(vec!["math".to_string(), "physics".to_string()])
        .await
        .unwrap();
    assert_eq!(found[0].teacher_id, "t1");

    let sent = api.transport.last_request();
    assert_eq!(
        sent.query,
        vec![("tags", "math".to_string()), ("tags", "physics".to_string())]
    );
    assert_eq!(sent.body, None);
}

#[tokio::test]
async fn test_teacher_info_create_then_update() {
    let transport = MockTransport::new();
    transport.mock(
        HttpMethod::Post,
        "http://api.test/teacher-info",
        201,
        "Created",
        "",
    );
    transport.mock(
        HttpMethod::Put,
        "http://api.test/teacher-info",
        200,
        "OK",
        "{}",
    );
    let api = signed_in_client(transport);

    let info = TeacherInfo {
        about_teacher: Some("Maths teacher".to_string()),
        ..Default::default()
    };
    api.create_teacher_info(info.clone()).await.unwrap();
    let sent = api.transport.last_request();
    assert_eq!(sent.method, HttpMethod::Post);
    assert_eq!(
        sent.body.as_deref(),
        Some(r#"{"aboutTeacher":"Maths teacher"}"#)
    );

    api.update_teacher_info(info).await.unwrap();
    let sent = api.transport.last_request();
    assert_eq!(sent.method, HttpMethod::Put);
    assert_eq!(sent.header("Authorization"), Some("Bearer tok-1"));
}

// =========================================================
// 错误处理
// =========================================================

#[tokio::test]
async fn test_fallback_message_uses_status_text() {
    let transport = MockTransport::new();
    transport.mock(
        HttpMethod::Get,
        "http://api.test/grades/lesson/L1",
        500,
        "Internal Server Error",
        "oops",
    );
    let api = signed_in_client(transport);

    let err = api.lesson_grades("L1").await.unwrap_err();
    assert_eq!(
        err,
        ApiError::Status {
            status: 500,
            message: "Failed to fetch lesson grades: Internal Server Error".to_string(),
        }
    );
}

#[tokio::test]
async fn test_duplicate_tag_message() {
    let transport = MockTransport::new();
    transport.mock(
        HttpMethod::Post,
        "http://api.test/tags",
        400,
        "Bad Request",
        "",
    );
    let api = signed_in_client(transport);

    let err = api.create_tag("math").await.unwrap_err();
    assert_eq!(err.to_string(), "Tag name already exists");
}

#[tokio::test]
async fn test_network_failure_is_reported() {
    let api = signed_in_client(MockTransport::offline());
    let err = api.teacher_info().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
}

#[tokio::test]
async fn test_malformed_success_body_is_decode_error() {
    let transport = MockTransport::new();
    transport.mock(
        HttpMethod::Get,
        "http://api.test/lessons/L1",
        200,
        "OK",
        "not json",
    );
    let api = signed_in_client(transport);

    let err = api.lesson("L1").await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

// =========================================================
// 小游戏
// =========================================================

#[tokio::test]
async fn test_lesson_games_get_mount_urls() {
    let transport = MockTransport::new();
    transport.mock(
        HttpMethod::Get,
        "http://api.test/games",
        200,
        "OK",
        r#"[{"id":"1","name":"Pet"},{"id":"2","name":"Chess"}]"#,
    );
    let api = signed_in_client(transport);

    let games = api.lesson_games("L9").await.unwrap();
    assert_eq!(games[0].url.as_deref(), Some("/lesson/L9/pet"));
    assert_eq!(games[1].url, None);
}
