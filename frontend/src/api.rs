//! REST API 客户端
//!
//! 所有端点都以 `ApiRequest` 描述（见 `classhub_shared::protocol`），
//! 客户端只负责：拼 URL、附加认证头、序列化请求体、把非 2xx 响应转换为 `ApiError`。
//! HTTP 发送通过 `HttpTransport` 抽象，浏览器中使用 fetch，测试中使用 Mock。

use crate::config::AppConfig;
use crate::error::{ApiError, ApiResult, failure_message};
use crate::session::SessionStore;
use crate::web::{KeyValueStore, LocalStorage};
use classhub_shared::protocol::*;
use classhub_shared::{
    AuthResponse, Classroom, ClassroomGrades, Game, Grade, HEADER_AUTHORIZATION,
    LeaderboardEntry, LeaderboardPage, Lesson, LoginRequest, PageQuery, SignupRequest, Tag,
    TeacherInfo, TeacherSearchResult, User,
};
use leptos::logging::error;
use serde::de::DeserializeOwned;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub query: Vec<(&'static str, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: String) -> Self {
        Self {
            method,
            url,
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    #[cfg(test)]
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    /// 检查响应是否成功 (2xx)
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP 发送特性 (Trait)
///
/// (?Send) 是因为浏览器环境下 fetch 相关类型不是 Send 的
#[async_trait::async_trait(?Send)]
pub trait HttpTransport {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse>;
}

// =========================================================
// 实现层: fetch 客户端
// =========================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

#[async_trait::async_trait(?Send)]
impl HttpTransport for FetchTransport {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        use gloo_net::http::Request;

        let mut builder = match req.method {
            HttpMethod::Get => Request::get(&req.url),
            HttpMethod::Post => Request::post(&req.url),
            HttpMethod::Put => Request::put(&req.url),
            HttpMethod::Delete => Request::delete(&req.url),
        };
        if !req.query.is_empty() {
            builder = builder.query(req.query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        for (key, value) in &req.headers {
            builder = builder.header(key, value);
        }

        let sent = match req.body {
            Some(body) => {
                builder
                    .body(body)
                    .map_err(|e| ApiError::Encode(e.to_string()))?
                    .send()
                    .await
            }
            None => builder.send().await,
        };
        let response = sent.map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        let status_text = response.status_text();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;

        Ok(HttpResponse {
            status,
            status_text,
            body,
        })
    }
}

// =========================================================
// API 客户端
// =========================================================

/// 浏览器中使用的客户端类型
pub type AppApi = ClassHubApi<FetchTransport, LocalStorage>;

#[derive(Debug, Clone)]
pub struct ClassHubApi<T = FetchTransport, S = LocalStorage> {
    config: AppConfig,
    session: SessionStore<S>,
    transport: T,
}

impl<T: HttpTransport, S: KeyValueStore> ClassHubApi<T, S> {
    pub fn new(config: AppConfig, session: SessionStore<S>, transport: T) -> Self {
        Self {
            config,
            session,
            transport,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn session(&self) -> &SessionStore<S> {
        &self.session
    }

    /// 构建请求：URL、查询参数、通用头、认证头、请求体
    pub fn build_request<R: ApiRequest>(&self, req: &R) -> ApiResult<HttpRequest> {
        let mut http = HttpRequest::new(R::METHOD, self.config.url(&req.path()))
            .with_header("Accept", "application/json")
            .with_header("Content-Type", "application/json");
        http.query = req.query();

        if R::AUTHENTICATED {
            if let Some(token) = self.session.token() {
                http = http.with_header(HEADER_AUTHORIZATION, &format!("Bearer {}", token));
            }
        }

        if R::SEND_BODY {
            let body = serde_json::to_string(req)
                .map_err(|e| ApiError::Encode(e.to_string()))?;
            http.body = Some(body);
        }

        Ok(http)
    }

    /// 执行一个 API 请求
    pub async fn execute<R: ApiRequest>(&self, req: &R) -> ApiResult<R::Response> {
        let http = self.build_request(req)?;
        let method = http.method;
        let url = http.url.clone();

        let response = self.transport.send(http).await.inspect_err(|e| {
            error!("[Api] {} {} failed: {}", method.as_str(), url, e);
        })?;

        if !response.ok() {
            let message = failure_message(
                req.status_message(response.status),
                req.failure(),
                &response.status_text,
                &response.body,
            );
            error!(
                "[Api] {} {} returned {}: {}",
                method.as_str(),
                url,
                response.status,
                message
            );
            return Err(ApiError::Status {
                status: response.status,
                message,
            });
        }

        decode_body(&response.body)
    }

    // --- Auth ---

    /// 登录，成功后写入会话
    pub async fn login(&self, credentials: &LoginRequest) -> ApiResult<AuthResponse> {
        let auth = self.execute(credentials).await?;
        self.session.store(&auth);
        Ok(auth)
    }

    /// 注册，成功后写入会话
    pub async fn signup(&self, data: &SignupRequest) -> ApiResult<AuthResponse> {
        let auth = self.execute(data).await?;
        self.session.store(&auth);
        Ok(auth)
    }

    pub fn logout(&self) {
        self.session.clear();
    }

    // --- Users ---

    pub async fn user(&self, user_id: &str) -> ApiResult<User> {
        self.execute(&GetUserRequest {
            user_id: user_id.to_string(),
        })
        .await
    }

    // --- Classrooms ---

    pub async fn create_classroom(&self, name: &str) -> ApiResult<Classroom> {
        self.execute(&CreateClassroomRequest {
            name: name.to_string(),
        })
        .await
    }

    pub async fn delete_classroom(&self, id: &str) -> ApiResult<()> {
        self.execute(&DeleteClassroomRequest { id: id.to_string() }).await
    }

    pub async fn add_classroom_users(
        &self,
        classroom_id: &str,
        user_ids: Vec<String>,
    ) -> ApiResult<()> {
        self.execute(&AddClassroomUsersRequest {
            classroom_id: classroom_id.to_string(),
            user_ids,
        })
        .await
    }

    pub async fn remove_classroom_users(
        &self,
        classroom_id: &str,
        user_ids: Vec<String>,
    ) -> ApiResult<()> {
        self.execute(&RemoveClassroomUsersRequest {
            classroom_id: classroom_id.to_string(),
            user_ids,
        })
        .await
    }

    // --- Lessons ---

    pub async fn create_lesson(&self, req: &CreateLessonRequest) -> ApiResult<Lesson> {
        self.execute(req).await
    }

    pub async fn classroom_lessons(&self, classroom_id: &str) -> ApiResult<Vec<Lesson>> {
        self.execute(&ClassroomLessonsRequest {
            classroom_id: classroom_id.to_string(),
        })
        .await
    }

    pub async fn lesson(&self, id: &str) -> ApiResult<Lesson> {
        self.execute(&GetLessonRequest { id: id.to_string() }).await
    }

    pub async fn delete_lesson(&self, id: &str) -> ApiResult<()> {
        self.execute(&DeleteLessonRequest { id: id.to_string() }).await
    }

    pub async fn delete_summary(&self, lesson_id: &str) -> ApiResult<()> {
        self.execute(&DeleteSummaryRequest {
            lesson_id: lesson_id.to_string(),
        })
        .await
    }

    // --- Grades ---

    pub async fn add_grade(&self, req: &AddGradeRequest) -> ApiResult<Grade> {
        self.execute(req).await
    }

    pub async fn lesson_grades(&self, lesson_id: &str) -> ApiResult<Vec<Grade>> {
        self.execute(&LessonGradesRequest {
            lesson_id: lesson_id.to_string(),
        })
        .await
    }

    pub async fn student_grades(&self, student_id: &str) -> ApiResult<Vec<Grade>> {
        self.execute(&StudentGradesRequest {
            student_id: student_id.to_string(),
        })
        .await
    }

    pub async fn classroom_grades(&self, classroom_id: &str) -> ApiResult<ClassroomGrades> {
        self.execute(&ClassroomGradesRequest {
            classroom_id: classroom_id.to_string(),
        })
        .await
    }

    pub async fn delete_grade(&self, lesson_id: &str, student_id: &str) -> ApiResult<()> {
        self.execute(&DeleteGradeRequest {
            lesson_id: lesson_id.to_string(),
            student_id: student_id.to_string(),
        })
        .await
    }

    // --- Leaderboard ---

    pub async fn add_score(&self, game_id: &str, value: i64) -> ApiResult<LeaderboardEntry> {
        self.execute(&AddScoreRequest {
            game_id: game_id.to_string(),
            value,
        })
        .await
    }

    pub async fn leaderboard(
        &self,
        scope: LeaderboardScope,
        page: PageQuery,
    ) -> ApiResult<LeaderboardPage> {
        self.execute(&LeaderboardRequest { scope, page }).await
    }

    // --- Tags & teachers ---

    pub async fn tags(&self) -> ApiResult<Vec<Tag>> {
        self.execute(&ListTagsRequest).await
    }

    pub async fn create_tag(&self, name: &str) -> ApiResult<Tag> {
        self.execute(&Tag {
            name: name.to_string(),
        })
        .await
    }

    pub async fn search_teachers(&self, tags: Vec<String>) -> ApiResult<Vec<TeacherSearchResult>> {
        self.execute(&SearchTeachersRequest { tags }).await
    }

    pub async fn teacher_info(&self) -> ApiResult<TeacherInfo> {
        self.execute(&GetTeacherInfoRequest).await
    }

    pub async fn create_teacher_info(&self, info: TeacherInfo) -> ApiResult<()> {
        self.execute(&CreateTeacherInfoRequest(info)).await
    }

    pub async fn update_teacher_info(&self, info: TeacherInfo) -> ApiResult<()> {
        self.execute(&UpdateTeacherInfoRequest(info)).await
    }

    // --- Games ---

    /// 获取小游戏列表，并为已知游戏补全课程内的挂载 URL
    pub async fn lesson_games(&self, lesson_id: &str) -> ApiResult<Vec<Game>> {
        let games = self.execute(&ListGamesRequest).await?;
        Ok(games
            .into_iter()
            .map(|game| game.with_lesson_url(lesson_id))
            .collect())
    }
}

/// 解析成功响应体
///
/// 空响应体按 `null` 解析；响应体无法解析但目标类型接受 `null`（如 `()`）时同样成功。
fn decode_body<T: DeserializeOwned>(body: &str) -> ApiResult<T> {
    if body.trim().is_empty() {
        return serde_json::from_str("null").map_err(|e| ApiError::Decode(e.to_string()));
    }
    serde_json::from_str(body).or_else(|e| {
        serde_json::from_str("null").map_err(|_| ApiError::Decode(e.to_string()))
    })
}

#[cfg(test)]
mod tests;
