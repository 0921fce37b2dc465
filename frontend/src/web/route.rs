//! 路由定义模块 - 领域模型
//!
//! 这是纯粹的业务逻辑层，不依赖于 DOM 或 web_sys。
//! 定义了应用的所有路由、静态路由表以及按角色分派的个人中心视图。

use classhub_shared::{Role, is_known_game_slug};
use std::fmt::Display;

/// 静态路由表条目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub pattern: &'static str,
    pub requires_auth: bool,
}

/// 应用路由表（启动时确定，之后不可变）
pub const ROUTE_TABLE: &[RouteDescriptor] = &[
    RouteDescriptor {
        pattern: "/",
        requires_auth: false,
    },
    RouteDescriptor {
        pattern: "/login",
        requires_auth: false,
    },
    RouteDescriptor {
        pattern: "/login-teacher",
        requires_auth: false,
    },
    RouteDescriptor {
        pattern: "/login-student",
        requires_auth: false,
    },
    RouteDescriptor {
        pattern: "/signup",
        requires_auth: false,
    },
    RouteDescriptor {
        pattern: "/signup-teacher",
        requires_auth: false,
    },
    RouteDescriptor {
        pattern: "/cabinet",
        requires_auth: true,
    },
    RouteDescriptor {
        pattern: "/teacher-cabinet",
        requires_auth: true,
    },
    RouteDescriptor {
        pattern: "/classroom/:id",
        requires_auth: true,
    },
    RouteDescriptor {
        pattern: "/lesson/:id",
        requires_auth: true,
    },
    RouteDescriptor {
        pattern: "/lesson/:id/:game",
        requires_auth: true,
    },
    RouteDescriptor {
        pattern: "/leaderboard",
        requires_auth: true,
    },
];

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 首页 (默认路由)
    #[default]
    Landing,
    Login,
    LoginTeacher,
    LoginStudent,
    Signup,
    SignupTeacher,
    /// 通用个人中心（学生 / 家长）
    Cabinet,
    TeacherCabinet,
    Classroom(String),
    Lesson(String),
    /// 课程内嵌小游戏挂载页
    LessonGame { lesson_id: String, game: String },
    Leaderboard,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path 解析为路由枚举
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let segments: Vec<&str> = trimmed.split('/').skip(1).collect();

        match segments.as_slice() {
            [] => Self::Landing,
            ["login"] => Self::Login,
            ["login-teacher"] => Self::LoginTeacher,
            ["login-student"] => Self::LoginStudent,
            ["signup"] => Self::Signup,
            ["signup-teacher"] => Self::SignupTeacher,
            ["cabinet"] => Self::Cabinet,
            ["teacher-cabinet"] => Self::TeacherCabinet,
            ["leaderboard"] => Self::Leaderboard,
            ["classroom", id] if !id.is_empty() => Self::Classroom(id.to_string()),
            ["lesson", id] if !id.is_empty() => Self::Lesson(id.to_string()),
            ["lesson", id, game] if !id.is_empty() && is_known_game_slug(game) => {
                Self::LessonGame {
                    lesson_id: id.to_string(),
                    game: game.to_string(),
                }
            }
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path
    pub fn to_path(&self) -> String {
        match self {
            Self::Landing => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::LoginTeacher => "/login-teacher".to_string(),
            Self::LoginStudent => "/login-student".to_string(),
            Self::Signup => "/signup".to_string(),
            Self::SignupTeacher => "/signup-teacher".to_string(),
            Self::Cabinet => "/cabinet".to_string(),
            Self::TeacherCabinet => "/teacher-cabinet".to_string(),
            Self::Classroom(id) => format!("/classroom/{}", id),
            Self::Lesson(id) => format!("/lesson/{}", id),
            Self::LessonGame { lesson_id, game } => format!("/lesson/{}/{}", lesson_id, game),
            Self::Leaderboard => "/leaderboard".to_string(),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// 路由在路由表中的模式，`NotFound` 不在表中
    pub fn pattern(&self) -> Option<&'static str> {
        let pattern = match self {
            Self::Landing => "/",
            Self::Login => "/login",
            Self::LoginTeacher => "/login-teacher",
            Self::LoginStudent => "/login-student",
            Self::Signup => "/signup",
            Self::SignupTeacher => "/signup-teacher",
            Self::Cabinet => "/cabinet",
            Self::TeacherCabinet => "/teacher-cabinet",
            Self::Classroom(_) => "/classroom/:id",
            Self::Lesson(_) => "/lesson/:id",
            Self::LessonGame { .. } => "/lesson/:id/:game",
            Self::Leaderboard => "/leaderboard",
            Self::NotFound => return None,
        };
        Some(pattern)
    }

    pub fn descriptor(&self) -> Option<&'static RouteDescriptor> {
        let pattern = self.pattern()?;
        ROUTE_TABLE.iter().find(|d| d.pattern == pattern)
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    ///
    /// 不在路由表中的路由视为公开。
    pub fn requires_auth(&self) -> bool {
        self.descriptor().is_some_and(|d| d.requires_auth)
    }

    /// 是否位于公开集合中（首页与登录/注册页）
    pub fn is_public(&self) -> bool {
        self.descriptor().is_some_and(|d| !d.requires_auth)
    }

    /// 登录 / 注册表单页，已认证用户不应再访问
    pub fn is_auth_form(&self) -> bool {
        matches!(
            self,
            Self::Login
                | Self::LoginTeacher
                | Self::LoginStudent
                | Self::Signup
                | Self::SignupTeacher
        )
    }

    /// 获取认证失败时的重定向目标
    pub fn auth_failure_redirect() -> Self {
        Self::Login
    }

    /// 获取认证成功后按角色进入的个人中心
    pub fn cabinet_for(role: Option<Role>) -> Self {
        match role {
            Some(Role::Teacher) => Self::TeacherCabinet,
            Some(Role::Student) | Some(Role::Parent) | None => Self::Cabinet,
        }
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

/// `/cabinet` 实际渲染的视图
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CabinetView {
    Student,
    Parent,
    Teacher,
}

impl CabinetView {
    /// 角色 -> 视图的全映射，缺失角色按学生处理
    pub fn for_role(role: Option<Role>) -> Self {
        match role {
            Some(Role::Teacher) => Self::Teacher,
            Some(Role::Parent) => Self::Parent,
            Some(Role::Student) | None => Self::Student,
        }
    }
}
