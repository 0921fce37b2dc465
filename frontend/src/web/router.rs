//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，实现高内聚：
//! 所有对 window.history 的操作都集中在此模块。
//! 实现了"监听 -> 守卫 -> 处理 -> 加载"的导航流程，守卫判定见 `guard` 模块。

use leptos::logging::log;
use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::guard::{Access, GuardDecision, NavigationGuard};
use super::route::AppRoute;

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 推送 History 状态（内部工具函数）
fn push_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 替换 History 状态（内部工具函数，用于重定向）
fn replace_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
/// 会话信息以信号形式注入，路由服务不直接读取存储。
#[derive(Clone, Copy)]
pub struct RouterService {
    /// 当前路由（只读信号）
    current_route: ReadSignal<AppRoute>,
    /// 设置当前路由（写入信号）
    set_route: WriteSignal<AppRoute>,
    /// 认证信息（注入的信号，实现解耦）
    access: Signal<Access>,
    guard: NavigationGuard,
}

impl RouterService {
    /// 创建新的路由服务，初始地址同样经过守卫
    fn new(access: Signal<Access>, guard: NavigationGuard) -> Self {
        let requested = AppRoute::from_path(&current_path());
        let decision = guard.check(&requested, access.get_untracked());
        if let GuardDecision::Redirect(target) = &decision {
            log!("[Router] Initial route {} redirected to {}.", requested, target);
            replace_history_state(&target.to_path());
        }
        let (current_route, set_route) = signal(decision.resolve(requested));

        Self {
            current_route,
            set_route,
            access,
            guard,
        }
    }

    /// 获取当前路由信号
    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// **核心方法：导航与守卫**
    ///
    /// 流程：请求 -> 验证(Guard) -> 处理 -> 加载
    pub fn navigate(&self, path: &str) {
        let requested = AppRoute::from_path(path);
        let access = self.access.get_untracked();
        let route = self.guarded(requested.clone(), access);

        // 验证通过时保留原始地址（含未知路径），被重定向时写入目标地址
        let target_path = if route == requested {
            path.to_string()
        } else {
            route.to_path()
        };
        push_history_state(&target_path);
        self.set_route.set(route);
    }

    /// 运行守卫并返回最终路由
    fn guarded(&self, requested: AppRoute, access: Access) -> AppRoute {
        match self.guard.check(&requested, access) {
            GuardDecision::Allow => requested,
            GuardDecision::Redirect(target) => {
                log!("[Router] {} redirected to {}.", requested, target);
                target
            }
        }
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let router = *self;

        let closure = Closure::<dyn Fn()>::new(move || {
            let target_route = AppRoute::from_path(&current_path());
            let access = router.access.get_untracked();
            let route = router.guarded(target_route.clone(), access);

            // popstate 时地址已由浏览器写入，只有被重定向时才需要替换
            if route != target_route {
                replace_history_state(&route.to_path());
            }
            router.set_route.set(route);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 设置认证状态变化时的自动重定向
    ///
    /// 登录后离开登录页、登出后离开受保护页面，都交给同一个守卫判定。
    fn setup_auth_redirect(&self) {
        let router = *self;

        Effect::new(move |_| {
            let access = router.access.get();
            let route = router.current_route.get_untracked();

            if let GuardDecision::Redirect(target) = router.guard.check(&route, access) {
                log!(
                    "[Router] Session changed (signed in: {}), redirecting to {}.",
                    access.is_authenticated,
                    target
                );
                push_history_state(&target.to_path());
                router.set_route.set(target);
            }
        });
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(access: Signal<Access>, guard: NavigationGuard) -> RouterService {
    let router = RouterService::new(access, guard);

    // 初始化监听器
    router.init_popstate_listener();
    router.setup_auth_redirect();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
///
/// 提供路由上下文，应在 App 根部使用。
#[component]
pub fn Router(
    /// 会话认证信息信号
    access: Signal<Access>,
    /// 导航守卫
    #[prop(optional)]
    guard: NavigationGuard,
    /// 子组件
    children: Children,
) -> impl IntoView {
    provide_router(access, guard);

    children()
}

/// 路由出口组件
///
/// 根据当前路由状态渲染对应的组件。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || {
        let current = router.current_route().get();
        matcher(current)
    }
}

/// 站内链接，点击时走路由服务而不是整页跳转
#[component]
pub fn Link(
    /// 目标路径
    #[prop(into)]
    to: String,
    #[prop(optional, into)]
    class: String,
    /// 子内容
    children: Children,
) -> impl IntoView {
    let router = use_router();

    let target = to.clone();
    let on_click = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        router.navigate(&target);
    };

    view! {
        <a href=to class=class on:click=on_click>
            {children()}
        </a>
    }
}
