//! 业务数据模型
//!
//! 与后端 REST API 的 JSON 结构一一对应（camelCase 字段）。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =========================================================
// 用户与班级
// =========================================================

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
}

impl User {
    /// 展示用名称：优先 "名 姓"，否则退回用户名
    pub fn display_name(&self) -> String {
        match (self.name.as_deref(), self.surname.as_deref()) {
            (Some(name), Some(surname)) => format!("{} {}", name, surname),
            (Some(name), None) => name.to_string(),
            (None, Some(surname)) => surname.to_string(),
            (None, None) => self.username.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LessonRef {
    pub id: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Classroom {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub admins: Vec<User>,
    #[serde(default)]
    pub students: Vec<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lessons: Option<Vec<LessonRef>>,
}

// =========================================================
// 课程
// =========================================================

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_ids: Option<Vec<String>>,
}

// =========================================================
// 成绩
// =========================================================

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub student_id: String,
    pub grade: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub lesson_id: String,
}

/// 班级成绩：学生 ID -> 成绩列表
pub type ClassroomGrades = HashMap<String, Vec<Grade>>;

// =========================================================
// 排行榜
// =========================================================

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    pub value: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub page_size: u32,
    pub offset: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LeaderboardPage {
    pub data: Vec<LeaderboardEntry>,
    pub pagination: Pagination,
}

/// 分页参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

// =========================================================
// 标签与教师资料
// =========================================================

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Tag {
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeacherSearchResult {
    pub teacher_id: String,
    pub teacher_name: String,
    pub teacher_surname: String,
    pub about_teacher: String,
    pub can_help_with: String,
    #[serde(default)]
    pub tags_id: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TeacherInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about_teacher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_help_with: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume: Option<String>,
}

// =========================================================
// 小游戏
// =========================================================

/// 已知小游戏名称 -> 挂载路径片段
const GAME_SLUGS: [(&str, &str); 5] = [
    ("Agent", "agent"),
    ("Pet", "pet"),
    ("Robot", "robot"),
    ("Space", "space"),
    ("Testing", "testing"),
];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Game {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Game {
    /// 游戏名称对应的挂载路径片段，未知游戏返回 `None`
    pub fn slug(&self) -> Option<&'static str> {
        game_slug(&self.name)
    }

    /// 为课程内的游戏补全挂载 URL：`/lesson/{lesson_id}/{slug}`
    pub fn with_lesson_url(mut self, lesson_id: &str) -> Self {
        self.url = self
            .slug()
            .map(|slug| format!("/lesson/{}/{}", lesson_id, slug));
        self
    }
}

pub fn game_slug(name: &str) -> Option<&'static str> {
    GAME_SLUGS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, slug)| *slug)
}

pub fn is_known_game_slug(slug: &str) -> bool {
    GAME_SLUGS.iter().any(|(_, known)| *known == slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(name: &str) -> Game {
        Game {
            id: "g1".to_string(),
            name: name.to_string(),
            url: None,
        }
    }

    #[test]
    fn test_known_game_gets_lesson_url() {
        let g = game("Robot").with_lesson_url("L7");
        assert_eq!(g.url.as_deref(), Some("/lesson/L7/robot"));
    }

    #[test]
    fn test_unknown_game_has_no_url() {
        let g = Game {
            url: Some("stale".to_string()),
            ..game("Chess")
        }
        .with_lesson_url("L7");
        assert_eq!(g.url, None);
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut user = User {
            id: "1".to_string(),
            username: "anna".to_string(),
            name: None,
            surname: None,
        };
        assert_eq!(user.display_name(), "anna");
        user.name = Some("Anna".to_string());
        assert_eq!(user.display_name(), "Anna");
        user.surname = Some("Ivanova".to_string());
        assert_eq!(user.display_name(), "Anna Ivanova");
    }

    #[test]
    fn test_leaderboard_page_parses() {
        let json = r#"{
            "data": [{"userId":"u1","username":"anna","value":120,"createdAt":"2024-03-01T10:00:00Z"}],
            "pagination": {"total": 1, "pageSize": 10, "offset": 0}
        }"#;
        let page: LeaderboardPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].value, 120);
        assert_eq!(page.pagination.total, 1);
    }

    #[test]
    fn test_grade_accepts_integer_and_fractional_values() {
        let grades: Vec<Grade> = serde_json::from_str(
            r#"[{"studentId":"s1","grade":5,"lessonId":"L1"},
                {"studentId":"s2","grade":3.5,"comment":"ok","lessonId":"L1"}]"#,
        )
        .unwrap();
        assert_eq!(grades[0].grade, 5.0);
        assert_eq!(grades[1].grade, 3.5);
        assert_eq!(grades[1].comment.as_deref(), Some("ok"));
    }
}
