//! 认证模块
//!
//! 持久化的会话存放在 `SessionStore` 中，这里只维护一份响应式镜像，
//! 路由服务通过注入的 `Access` 信号感知登录状态变化。

use crate::api::AppApi;
use crate::error::ApiResult;
use crate::session::Session;
use crate::web::guard::Access;
use classhub_shared::{AuthResponse, LoginRequest, SignupRequest};
use leptos::logging::log;
use leptos::prelude::*;

/// 认证状态
#[derive(Clone, Default, PartialEq)]
pub struct AuthState {
    /// 当前会话快照
    pub session: Session,
}

/// 认证上下文
///
/// 包含读写信号与 API 客户端，通过 Context 在组件间共享。
#[derive(Clone, Copy)]
pub struct AuthContext {
    /// 认证状态（只读）
    pub state: ReadSignal<AuthState>,
    /// 设置认证状态（写入）
    set_state: WriteSignal<AuthState>,
    api: StoredValue<AppApi>,
}

impl AuthContext {
    /// 创建认证上下文，并从持久化存储恢复会话
    pub fn new(api: AppApi) -> Self {
        let session = api.session().get();
        log!(
            "[Session] Restored (signed in: {}, role: {:?}).",
            session.is_authenticated(),
            session.role
        );
        let (state, set_state) = signal(AuthState { session });
        Self {
            state,
            set_state,
            api: StoredValue::new(api),
        }
    }

    pub fn api(&self) -> AppApi {
        self.api.get_value()
    }

    /// 获取认证信息信号（用于路由服务注入）
    pub fn access_signal(&self) -> Signal<Access> {
        let state = self.state;
        Signal::derive(move || state.with(|s| s.session.access()))
    }

    /// 从存储重新读取会话
    fn refresh(&self) {
        let session = self.api.with_value(|api| api.session().get());
        self.set_state.set(AuthState { session });
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 登录并保存会话
///
/// 导航由路由服务监听会话变化后自动完成。
pub async fn login(ctx: AuthContext, credentials: LoginRequest) -> ApiResult<AuthResponse> {
    let auth = ctx.api().login(&credentials).await?;
    log!("[Session] Signed in as {} (role: {:?}).", auth.user_id, auth.role());
    ctx.refresh();
    Ok(auth)
}

/// 注册并保存会话
pub async fn signup(ctx: AuthContext, data: SignupRequest) -> ApiResult<AuthResponse> {
    let auth = ctx.api().signup(&data).await?;
    log!("[Session] Signed up as {} (role: {:?}).", auth.user_id, auth.role());
    ctx.refresh();
    Ok(auth)
}

/// 注销并清除会话
pub fn logout(ctx: AuthContext) {
    let was_signed_in = ctx.api.with_value(|api| {
        let signed_in = api.session().is_authenticated();
        api.logout();
        signed_in
    });
    if was_signed_in {
        log!("[Session] Signed out.");
    }
    ctx.refresh();
}
