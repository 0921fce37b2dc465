//! ClassHub 前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route`: 路由定义与路由表（领域模型）
//! - `web::guard`: 导航守卫（纯判定逻辑）
//! - `web::router`: 路由服务（核心引擎）
//! - `session` / `auth`: 会话持久化与认证状态
//! - `api`: REST API 客户端
//! - `components`: UI 组件层

mod api;
mod auth;
mod config;
mod error;
mod session;
mod components {
    pub mod cabinet;
    pub mod classroom;
    pub mod landing;
    pub mod lesson;
    pub mod login;
}

use crate::api::{AppApi, FetchTransport};
use crate::auth::AuthContext;
use crate::components::cabinet::CabinetPage;
use crate::components::classroom::{ClassroomPage, LeaderboardPage};
use crate::components::landing::LandingPage;
use crate::components::lesson::{GamePage, LessonPage};
use crate::components::login::{AuthForm, AuthPage};
use crate::config::AppConfig;
use crate::session::SessionStore;

use classhub_shared::Role;
use leptos::prelude::*;

// 原生 Web API 封装模块
pub(crate) mod web {
    pub mod guard;
    pub mod route;
    pub mod router;
    mod storage;
    mod transfer;

    #[cfg(test)]
    pub use storage::MemoryStorage;
    pub use storage::{KeyValueStore, LocalStorage};
}

use web::route::{AppRoute, CabinetView};
use web::router::{Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Landing => view! { <LandingPage /> }.into_any(),
        AppRoute::Login => view! { <AuthPage form=AuthForm::Login role=None /> }.into_any(),
        AppRoute::LoginStudent => {
            view! { <AuthPage form=AuthForm::Login role=Some(Role::Student) /> }.into_any()
        }
        AppRoute::LoginTeacher => {
            view! { <AuthPage form=AuthForm::Login role=Some(Role::Teacher) /> }.into_any()
        }
        AppRoute::Signup => view! { <AuthPage form=AuthForm::Signup role=None /> }.into_any(),
        AppRoute::SignupTeacher => {
            view! { <AuthPage form=AuthForm::Signup role=Some(Role::Teacher) /> }.into_any()
        }
        AppRoute::Cabinet => view! { <CabinetPage /> }.into_any(),
        AppRoute::TeacherCabinet => {
            view! { <CabinetPage variant=CabinetView::Teacher /> }.into_any()
        }
        AppRoute::Classroom(id) => view! { <ClassroomPage classroom_id=id /> }.into_any(),
        AppRoute::Lesson(id) => view! { <LessonPage lesson_id=id /> }.into_any(),
        AppRoute::LessonGame { lesson_id, game } => {
            view! { <GamePage lesson_id=lesson_id game=game /> }.into_any()
        }
        AppRoute::Leaderboard => view! { <LeaderboardPage /> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"页面未找到"</p>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 配置与 API 客户端（会话存储显式注入）
    let config = AppConfig::from_build_env();
    let api: AppApi = AppApi::new(config, SessionStore::new(web::LocalStorage), FetchTransport);

    // 2. 创建认证上下文（从 LocalStorage 恢复会话）
    let auth_ctx = AuthContext::new(api);
    provide_context(auth_ctx);

    // 3. 获取认证信息信号，用于注入路由服务（解耦！）
    let access = auth_ctx.access_signal();

    view! {
        // 4. 路由器组件：注入认证信号实现守卫
        <Router access=access>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
