//! 登录 / 注册页面
//!
//! 学生、家长与教师共用一套表单，`role` 决定标题与注册时提交的角色。
//! 登录成功后无需手动跳转：路由服务监听会话变化，按角色送往个人中心。

use crate::auth::{login, signup, use_auth};
use crate::web::router::Link;
use classhub_shared::{LoginRequest, Role, SignupRequest};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthForm {
    Login,
    Signup,
}

fn heading(form: AuthForm, role: Option<Role>) -> &'static str {
    match (form, role) {
        (AuthForm::Login, Some(Role::Teacher)) => "教师登录",
        (AuthForm::Login, Some(Role::Student)) => "学生登录",
        (AuthForm::Login, _) => "登录",
        (AuthForm::Signup, Some(Role::Teacher)) => "教师注册",
        (AuthForm::Signup, _) => "注册",
    }
}

fn optional(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[component]
pub fn AuthPage(form: AuthForm, role: Option<Role>) -> impl IntoView {
    let auth = use_auth();

    let (username, set_username) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (name, set_name) = signal(String::new());
    let (surname, set_surname) = signal(String::new());
    // 通用注册页可在学生与家长之间选择
    let (signup_role, set_signup_role) = signal(role.unwrap_or(Role::Student));
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if username.get().trim().is_empty() || password.get().is_empty() {
            set_error_msg.set(Some("请填写用户名和密码".to_string()));
            return;
        }

        set_is_submitting.set(true);
        set_error_msg.set(None);

        spawn_local(async move {
            let result = match form {
                AuthForm::Login => {
                    let credentials = LoginRequest {
                        username: username.get_untracked().trim().to_string(),
                        password: password.get_untracked(),
                    };
                    login(auth, credentials).await
                }
                AuthForm::Signup => {
                    let data = SignupRequest {
                        username: username.get_untracked().trim().to_string(),
                        password: password.get_untracked(),
                        name: optional(name.get_untracked()),
                        surname: optional(surname.get_untracked()),
                        role_id: signup_role.get_untracked(),
                    };
                    signup(auth, data).await
                }
            };
            if let Err(e) = result {
                set_error_msg.set(Some(e.to_string()));
            }
            set_is_submitting.set(false);
        });
    };

    let (switch_href, switch_label) = match (form, role) {
        (AuthForm::Login, Some(Role::Teacher)) => ("/signup-teacher", "还没有账号？注册"),
        (AuthForm::Login, _) => ("/signup", "还没有账号？注册"),
        (AuthForm::Signup, Some(Role::Teacher)) => ("/login-teacher", "已有账号？登录"),
        (AuthForm::Signup, _) => ("/login", "已有账号？登录"),
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <h1 class="text-3xl font-bold">{heading(form, role)}</h1>

                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <Show when=move || error_msg.get().is_some()>
                            <div role="alert" class="alert alert-error text-sm py-2">
                                <span>{move || error_msg.get().unwrap_or_default()}</span>
                            </div>
                        </Show>

                        <div class="form-control">
                            <label class="label" for="username">
                                <span class="label-text">"用户名"</span>
                            </label>
                            <input
                                id="username"
                                type="text"
                                on:input=move |ev| set_username.set(event_target_value(&ev))
                                prop:value=username
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control">
                            <label class="label" for="password">
                                <span class="label-text">"密码"</span>
                            </label>
                            <input
                                id="password"
                                type="password"
                                on:input=move |ev| set_password.set(event_target_value(&ev))
                                prop:value=password
                                class="input input-bordered"
                                required
                            />
                        </div>

                        <Show when=move || form == AuthForm::Signup>
                            <div class="grid grid-cols-2 gap-4">
                                <input
                                    type="text"
                                    placeholder="名"
                                    on:input=move |ev| set_name.set(event_target_value(&ev))
                                    prop:value=name
                                    class="input input-bordered"
                                />
                                <input
                                    type="text"
                                    placeholder="姓"
                                    on:input=move |ev| set_surname.set(event_target_value(&ev))
                                    prop:value=surname
                                    class="input input-bordered"
                                />
                            </div>
                        </Show>

                        <Show when=move || form == AuthForm::Signup && role.is_none()>
                            <select
                                class="select select-bordered w-full"
                                on:change=move |ev| {
                                    let picked = event_target_value(&ev);
                                    let role = Role::parse_id(&picked).unwrap_or(Role::Student);
                                    set_signup_role.set(role);
                                }
                            >
                                <option value="1" selected=move || signup_role.get() == Role::Student>"学生"</option>
                                <option value="2" selected=move || signup_role.get() == Role::Parent>"家长"</option>
                            </select>
                        </Show>

                        <div class="form-control mt-6">
                            <button class="btn btn-primary" disabled=move || is_submitting.get()>
                                {move || if is_submitting.get() {
                                    view! { <span class="loading loading-spinner"></span> "提交中..." }.into_any()
                                } else if form == AuthForm::Login {
                                    "登录".into_any()
                                } else {
                                    "注册".into_any()
                                }}
                            </button>
                        </div>

                        <Link to=switch_href class="link link-hover text-sm text-center">
                            {switch_label}
                        </Link>
                    </form>
                </div>
            </div>
        </div>
    }
}
