use crate::auth::use_auth;
use crate::web::router::Link;
use leptos::prelude::*;

#[component]
pub fn LandingPage() -> impl IntoView {
    let auth = use_auth();
    let signed_in = move || auth.state.with(|s| s.session.is_authenticated());

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content text-center">
                <div class="max-w-md space-y-6">
                    <h1 class="text-5xl font-bold">"ClassHub"</h1>
                    <p>"班级、课程、成绩与小游戏，一站式管理。"</p>
                    <Show
                        when=signed_in
                        fallback=|| view! {
                            <div class="flex flex-wrap justify-center gap-2">
                                <Link to="/login-student" class="btn btn-primary">"学生登录"</Link>
                                <Link to="/login-teacher" class="btn btn-secondary">"教师登录"</Link>
                                <Link to="/signup" class="btn btn-ghost">"注册"</Link>
                            </div>
                        }
                    >
                        <Link to="/cabinet" class="btn btn-primary">"进入个人中心"</Link>
                    </Show>
                </div>
            </div>
        </div>
    }
}
