//! 导航守卫
//!
//! 每次路由切换前同步调用，只会得到"放行"或"重定向到某个路由"两种结果，
//! 从不产生错误：守卫运行在页面挂载之前，没有面向用户的错误通道。

use super::route::AppRoute;
use classhub_shared::Role;

/// 守卫输入：当前会话的认证信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Access {
    pub is_authenticated: bool,
    pub role: Option<Role>,
}

impl Access {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(role: Option<Role>) -> Self {
        Self {
            is_authenticated: true,
            role,
        }
    }

    fn is_teacher(&self) -> bool {
        self.role.is_some_and(Role::is_teacher)
    }
}

/// 守卫判定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(AppRoute),
}

impl GuardDecision {
    /// 最终应当进入的路由
    pub fn resolve(self, requested: AppRoute) -> AppRoute {
        match self {
            GuardDecision::Allow => requested,
            GuardDecision::Redirect(target) => target,
        }
    }
}

/// 守卫策略开关
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuardPolicy {
    /// 已登录用户访问登录/注册页时，是否送回其个人中心
    pub redirect_signed_in_from_auth_forms: bool,
}

impl Default for GuardPolicy {
    fn default() -> Self {
        Self {
            redirect_signed_in_from_auth_forms: true,
        }
    }
}

/// 导航守卫
#[derive(Debug, Clone, Copy)]
pub struct NavigationGuard {
    policy: GuardPolicy,
}

impl Default for NavigationGuard {
    fn default() -> Self {
        Self::new(GuardPolicy::default())
    }
}

impl NavigationGuard {
    pub fn new(policy: GuardPolicy) -> Self {
        Self { policy }
    }

    /// **核心方法：判定一次路由切换**
    pub fn check(&self, destination: &AppRoute, access: Access) -> GuardDecision {
        // 路由表之外的地址直接放行，交给 NotFound 视图
        if destination.descriptor().is_none() {
            return GuardDecision::Allow;
        }

        if destination.is_public() {
            if access.is_authenticated
                && destination.is_auth_form()
                && self.policy.redirect_signed_in_from_auth_forms
            {
                return GuardDecision::Redirect(AppRoute::cabinet_for(access.role));
            }
            return GuardDecision::Allow;
        }

        if destination.requires_auth() && !access.is_authenticated {
            return GuardDecision::Redirect(AppRoute::auth_failure_redirect());
        }

        match destination {
            AppRoute::Cabinet if access.is_teacher() => {
                GuardDecision::Redirect(AppRoute::TeacherCabinet)
            }
            AppRoute::TeacherCabinet if !access.is_teacher() => {
                GuardDecision::Redirect(AppRoute::Cabinet)
            }
            _ => GuardDecision::Allow,
        }
    }
}
