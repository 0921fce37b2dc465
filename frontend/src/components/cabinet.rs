use crate::auth::{logout, use_auth};
use crate::web::route::CabinetView;
use crate::web::router::Link;
use classhub_shared::{Classroom, Grade, Tag, TeacherInfo, TeacherSearchResult};
use leptos::prelude::*;
use leptos::task::spawn_local;

/// 个人中心页面顶栏（含注销按钮）
#[component]
pub fn PageHeader(title: &'static str) -> impl IntoView {
    let auth = use_auth();
    let on_logout = move |_| logout(auth);
    let (display_name, set_display_name) = signal(String::new());

    Effect::new(move |_| {
        let Some(user_id) = auth.state.with(|s| s.session.user_id.clone()) else {
            return;
        };
        let api = auth.api();
        spawn_local(async move {
            // 名称仅用于展示，失败时保持空白
            if let Ok(user) = api.user(&user_id).await {
                set_display_name.set(user.display_name());
            }
        });
    });

    view! {
        <div class="navbar bg-base-100 rounded-box shadow-sm">
            <div class="flex-1">
                <Link to="/" class="btn btn-ghost text-xl">"ClassHub"</Link>
                <span class="text-base-content/60 ml-2">{title}</span>
            </div>
            <div class="flex-none gap-2">
                <span class="text-sm">{display_name}</span>
                <Link to="/leaderboard" class="btn btn-ghost btn-sm">"排行榜"</Link>
                <button class="btn btn-outline btn-error btn-sm" on:click=on_logout>
                    "注销"
                </button>
            </div>
        </div>
    }
}

/// 通知条：(消息内容, 是否出错)
#[component]
pub fn Notice(notice: ReadSignal<Option<(String, bool)>>) -> impl IntoView {
    view! {
        {move || notice.get().map(|(msg, is_err)| {
            let class = if is_err { "alert alert-error" } else { "alert alert-success" };
            view! { <div role="alert" class=class><span>{msg}</span></div> }
        })}
    }
}

/// 个人中心
///
/// 未指定 `variant` 时按当前会话角色分派；教师访问 `/cabinet`
/// 已由导航守卫重定向到 `/teacher-cabinet`，这里只负责渲染。
#[component]
pub fn CabinetPage(#[prop(optional)] variant: Option<CabinetView>) -> impl IntoView {
    let auth = use_auth();

    let current = move || {
        variant.unwrap_or_else(|| CabinetView::for_role(auth.state.with(|s| s.session.role)))
    };

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8">
            <div class="max-w-5xl mx-auto space-y-6">
                {move || match current() {
                    CabinetView::Student => view! { <StudentCabinet /> }.into_any(),
                    CabinetView::Parent => view! { <ParentCabinet /> }.into_any(),
                    CabinetView::Teacher => view! { <TeacherCabinet /> }.into_any(),
                }}
            </div>
        </div>
    }
}

// =========================================================
// 学生
// =========================================================

#[component]
fn StudentCabinet() -> impl IntoView {
    let auth = use_auth();
    let (grades, set_grades) = signal(Vec::<Grade>::new());
    let (loading, set_loading) = signal(true);
    let (notice, set_notice) = signal(Option::<(String, bool)>::None);

    Effect::new(move |_| {
        let Some(user_id) = auth.state.with(|s| s.session.user_id.clone()) else {
            return;
        };
        let api = auth.api();
        set_loading.set(true);
        spawn_local(async move {
            match api.student_grades(&user_id).await {
                Ok(data) => set_grades.set(data),
                Err(e) => set_notice.set(Some((format!("加载成绩失败: {}", e), true))),
            }
            set_loading.set(false);
        });
    });

    view! {
        <PageHeader title="学生中心" />
        <Notice notice=notice />
        <div class="card bg-base-100 shadow-sm">
            <div class="card-body">
                <h2 class="card-title">"我的成绩"</h2>
                <Show
                    when=move || !loading.get()
                    fallback=|| view! { <span class="loading loading-dots"></span> }
                >
                    <Show
                        when=move || grades.with(|g| !g.is_empty())
                        fallback=|| view! { <p class="text-base-content/60">"暂无成绩"</p> }
                    >
                        <table class="table">
                            <thead>
                                <tr><th>"课程"</th><th>"成绩"</th><th>"评语"</th></tr>
                            </thead>
                            <tbody>
                                <For
                                    each=move || grades.get()
                                    key=|g| g.lesson_id.clone()
                                    children=|g: Grade| {
                                        let href = format!("/lesson/{}", g.lesson_id);
                                        view! {
                                            <tr>
                                                <td><Link to=href class="link">{g.lesson_id.clone()}</Link></td>
                                                <td>{g.grade}</td>
                                                <td>{g.comment.unwrap_or_default()}</td>
                                            </tr>
                                        }
                                    }
                                />
                            </tbody>
                        </table>
                    </Show>
                </Show>
            </div>
        </div>
    }
}

// =========================================================
// 家长
// =========================================================

/// 家长按标签检索教师
#[component]
fn ParentCabinet() -> impl IntoView {
    let auth = use_auth();
    let (tags, set_tags) = signal(Vec::<Tag>::new());
    let (selected, set_selected) = signal(Vec::<String>::new());
    let (teachers, set_teachers) = signal(Vec::<TeacherSearchResult>::new());
    let (notice, set_notice) = signal(Option::<(String, bool)>::None);

    let api = auth.api();
    spawn_local(async move {
        match api.tags().await {
            Ok(data) => set_tags.set(data),
            Err(e) => set_notice.set(Some((format!("加载标签失败: {}", e), true))),
        }
    });

    let toggle = move |name: String| {
        set_selected.update(|list| {
            if let Some(pos) = list.iter().position(|t| *t == name) {
                list.remove(pos);
            } else {
                list.push(name);
            }
        });
    };

    let on_search = move |_| {
        let api = auth.api();
        let wanted = selected.get_untracked();
        spawn_local(async move {
            match api.search_teachers(wanted).await {
                Ok(data) => {
                    set_notice.set(None);
                    set_teachers.set(data);
                }
                Err(e) => set_notice.set(Some((format!("检索失败: {}", e), true))),
            }
        });
    };

    view! {
        <PageHeader title="家长中心" />
        <Notice notice=notice />
        <div class="card bg-base-100 shadow-sm">
            <div class="card-body space-y-4">
                <h2 class="card-title">"寻找老师"</h2>
                <div class="flex flex-wrap gap-2">
                    <For
                        each=move || tags.get()
                        key=|t| t.name.clone()
                        children=move |t: Tag| {
                            let name = t.name.clone();
                            let active = {
                                let name = name.clone();
                                move || selected.with(|s| s.contains(&name))
                            };
                            view! {
                                <button
                                    class=move || if active() { "badge badge-primary" } else { "badge badge-outline" }
                                    on:click=move |_| toggle(name.clone())
                                >
                                    {t.name}
                                </button>
                            }
                        }
                    />
                </div>
                <button class="btn btn-primary btn-sm w-fit" on:click=on_search>"检索"</button>
                <ul class="space-y-3">
                    <For
                        each=move || teachers.get()
                        key=|t| t.teacher_id.clone()
                        children=|t: TeacherSearchResult| view! {
                            <li class="p-3 rounded-box bg-base-200">
                                <p class="font-semibold">{format!("{} {}", t.teacher_name, t.teacher_surname)}</p>
                                <p class="text-sm">{t.about_teacher}</p>
                                <p class="text-sm text-base-content/60">{t.can_help_with}</p>
                            </li>
                        }
                    />
                </ul>
            </div>
        </div>
    }
}

// =========================================================
// 教师
// =========================================================

#[component]
fn TeacherCabinet() -> impl IntoView {
    let auth = use_auth();
    let (classrooms, set_classrooms) = signal(Vec::<Classroom>::new());
    let (new_name, set_new_name) = signal(String::new());
    let (notice, set_notice) = signal(Option::<(String, bool)>::None);

    let on_create = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let name = new_name.get().trim().to_string();
        if name.is_empty() {
            return;
        }
        let api = auth.api();
        spawn_local(async move {
            match api.create_classroom(&name).await {
                Ok(classroom) => {
                    set_classrooms.update(|list| list.push(classroom));
                    set_new_name.set(String::new());
                    set_notice.set(Some(("班级已创建".to_string(), false)));
                }
                Err(e) => set_notice.set(Some((format!("创建班级失败: {}", e), true))),
            }
        });
    };

    let handle_delete = move |id: String| {
        let api = auth.api();
        spawn_local(async move {
            match api.delete_classroom(&id).await {
                Ok(()) => {
                    set_classrooms.update(|list| list.retain(|c| c.id != id));
                    set_notice.set(Some(("班级已删除".to_string(), false)));
                }
                Err(e) => set_notice.set(Some((format!("删除班级失败: {}", e), true))),
            }
        });
    };

    view! {
        <PageHeader title="教师中心" />
        <Notice notice=notice />
        <div class="card bg-base-100 shadow-sm">
            <div class="card-body space-y-4">
                <h2 class="card-title">"我的班级"</h2>
                <form class="join" on:submit=on_create>
                    <input
                        type="text"
                        placeholder="新班级名称"
                        class="input input-bordered join-item"
                        on:input=move |ev| set_new_name.set(event_target_value(&ev))
                        prop:value=new_name
                    />
                    <button class="btn btn-primary join-item">"创建"</button>
                </form>
                <ul class="menu bg-base-200 rounded-box">
                    <For
                        each=move || classrooms.get()
                        key=|c| c.id.clone()
                        children=move |c: Classroom| {
                            let href = format!("/classroom/{}", c.id);
                            let id = c.id.clone();
                            view! {
                                <li class="flex flex-row justify-between">
                                    <Link to=href>{c.name}</Link>
                                    <button
                                        class="btn btn-ghost btn-xs text-error"
                                        on:click=move |_| handle_delete(id.clone())
                                    >
                                        "删除"
                                    </button>
                                </li>
                            }
                        }
                    />
                </ul>
            </div>
        </div>
        <TeacherProfile set_notice=set_notice />
    }
}

/// 教师资料：首次保存走 POST，之后走 PUT
#[component]
fn TeacherProfile(set_notice: WriteSignal<Option<(String, bool)>>) -> impl IntoView {
    let auth = use_auth();
    let (about, set_about) = signal(String::new());
    let (help_with, set_help_with) = signal(String::new());
    let (exists, set_exists) = signal(false);
    let (saving, set_saving) = signal(false);
    let (new_tag, set_new_tag) = signal(String::new());

    let api = auth.api();
    spawn_local(async move {
        match api.teacher_info().await {
            Ok(info) => {
                set_about.set(info.about_teacher.unwrap_or_default());
                set_help_with.set(info.can_help_with.unwrap_or_default());
                set_exists.set(true);
            }
            // 尚未填写资料
            Err(e) if e.status() == Some(404) => {}
            Err(e) => set_notice.set(Some((format!("加载资料失败: {}", e), true))),
        }
    });

    let on_add_tag = move |_| {
        let name = new_tag.get_untracked().trim().to_string();
        if name.is_empty() {
            return;
        }
        let api = auth.api();
        spawn_local(async move {
            match api.create_tag(&name).await {
                Ok(tag) => {
                    set_new_tag.set(String::new());
                    set_notice.set(Some((format!("标签 {} 已创建", tag.name), false)));
                }
                Err(e) => set_notice.set(Some((e.to_string(), true))),
            }
        });
    };

    let on_save = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let info = TeacherInfo {
            about_teacher: Some(about.get_untracked()),
            can_help_with: Some(help_with.get_untracked()),
            ..Default::default()
        };
        let api = auth.api();
        let update = exists.get_untracked();
        set_saving.set(true);
        spawn_local(async move {
            let result = if update {
                api.update_teacher_info(info).await
            } else {
                api.create_teacher_info(info).await
            };
            match result {
                Ok(()) => {
                    set_exists.set(true);
                    set_notice.set(Some(("资料已保存".to_string(), false)));
                }
                Err(e) => set_notice.set(Some((format!("保存资料失败: {}", e), true))),
            }
            set_saving.set(false);
        });
    };

    view! {
        <div class="card bg-base-100 shadow-sm">
            <form class="card-body space-y-3" on:submit=on_save>
                <h2 class="card-title">"个人资料"</h2>
                <textarea
                    class="textarea textarea-bordered"
                    placeholder="自我介绍"
                    on:input=move |ev| set_about.set(event_target_value(&ev))
                    prop:value=about
                ></textarea>
                <textarea
                    class="textarea textarea-bordered"
                    placeholder="可辅导内容"
                    on:input=move |ev| set_help_with.set(event_target_value(&ev))
                    prop:value=help_with
                ></textarea>
                <button class="btn btn-primary btn-sm w-fit" disabled=move || saving.get()>
                    "保存"
                </button>
                <div class="join">
                    <input
                        type="text"
                        placeholder="新标签"
                        class="input input-bordered input-sm join-item"
                        on:input=move |ev| set_new_tag.set(event_target_value(&ev))
                        prop:value=new_tag
                    />
                    <button type="button" class="btn btn-sm join-item" on:click=on_add_tag>
                        "添加标签"
                    </button>
                </div>
            </form>
        </div>
    }
}
