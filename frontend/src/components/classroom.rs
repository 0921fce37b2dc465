use crate::auth::use_auth;
use crate::components::cabinet::{Notice, PageHeader};
use crate::web::router::Link;
use classhub_shared::protocol::{CreateLessonRequest, LeaderboardScope};
use classhub_shared::{ClassroomGrades, LeaderboardEntry, LeaderboardPage, Lesson, PageQuery};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn ClassroomPage(classroom_id: String) -> impl IntoView {
    let auth = use_auth();
    let is_teacher = move || auth.state.with(|s| s.session.role.is_some_and(|r| r.is_teacher()));

    let (lessons, set_lessons) = signal(Vec::<Lesson>::new());
    let (lesson_name, set_lesson_name) = signal(String::new());
    let (notice, set_notice) = signal(Option::<(String, bool)>::None);
    let classroom_id = StoredValue::new(classroom_id);

    let api = auth.api();
    let id = classroom_id.get_value();
    spawn_local(async move {
        match api.classroom_lessons(&id).await {
            Ok(data) => set_lessons.set(data),
            Err(e) => set_notice.set(Some((format!("加载课程失败: {}", e), true))),
        }
    });

    let on_create = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let name = lesson_name.get().trim().to_string();
        if name.is_empty() {
            return;
        }
        let req = CreateLessonRequest {
            name,
            description: None,
            classroom_id: classroom_id.get_value(),
            game_ids: None,
        };
        let api = auth.api();
        spawn_local(async move {
            match api.create_lesson(&req).await {
                Ok(lesson) => {
                    set_lessons.update(|list| list.push(lesson));
                    set_lesson_name.set(String::new());
                }
                Err(e) => set_notice.set(Some((format!("创建课程失败: {}", e), true))),
            }
        });
    };

    let handle_delete_lesson = move |id: String| {
        let api = auth.api();
        spawn_local(async move {
            match api.delete_lesson(&id).await {
                Ok(()) => set_lessons.update(|list| list.retain(|l| l.id != id)),
                Err(e) => set_notice.set(Some((format!("删除课程失败: {}", e), true))),
            }
        });
    };

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8">
            <div class="max-w-5xl mx-auto space-y-6">
                <PageHeader title="班级" />
                <Notice notice=notice />
                <div class="card bg-base-100 shadow-sm">
                    <div class="card-body space-y-4">
                        <h2 class="card-title">"课程"</h2>
                        <Show when=is_teacher>
                            <form class="join" on:submit=on_create>
                                <input
                                    type="text"
                                    placeholder="新课程名称"
                                    class="input input-bordered join-item"
                                    on:input=move |ev| set_lesson_name.set(event_target_value(&ev))
                                    prop:value=lesson_name
                                />
                                <button class="btn btn-primary join-item">"添加"</button>
                            </form>
                        </Show>
                        <ul class="menu bg-base-200 rounded-box">
                            <For
                                each=move || lessons.get()
                                key=|l| l.id.clone()
                                children=move |l: Lesson| {
                                    let href = format!("/lesson/{}", l.id);
                                    let id = l.id.clone();
                                    view! {
                                        <li class="flex flex-row justify-between">
                                            <Link to=href>{l.name}</Link>
                                            <Show when=is_teacher>
                                                {
                                                    let id = id.clone();
                                                    view! {
                                                        <button
                                                            class="btn btn-ghost btn-xs text-error"
                                                            on:click=move |_| handle_delete_lesson(id.clone())
                                                        >
                                                            "删除"
                                                        </button>
                                                    }
                                                }
                                            </Show>
                                        </li>
                                    }
                                }
                            />
                        </ul>
                    </div>
                </div>
                <Show when=is_teacher>
                    <MembersPanel classroom_id=classroom_id.get_value() set_notice=set_notice />
                    <ClassroomGradesPanel classroom_id=classroom_id.get_value() set_notice=set_notice />
                </Show>
                <Leaderboard scope=LeaderboardScope::Classroom(classroom_id.get_value()) />
            </div>
        </div>
    }
}

/// 班级成员管理（按用户 ID 添加 / 移除）
#[component]
fn MembersPanel(
    classroom_id: String,
    set_notice: WriteSignal<Option<(String, bool)>>,
) -> impl IntoView {
    let auth = use_auth();
    let classroom_id = StoredValue::new(classroom_id);
    let (user_ids, set_user_ids) = signal(String::new());

    // 逗号或空白分隔
    let parse_ids = move || {
        user_ids
            .get_untracked()
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>()
    };

    let on_change = move |add: bool| {
        let ids = parse_ids();
        if ids.is_empty() {
            return;
        }
        let api = auth.api();
        let id = classroom_id.get_value();
        spawn_local(async move {
            let result = if add {
                api.add_classroom_users(&id, ids).await
            } else {
                api.remove_classroom_users(&id, ids).await
            };
            match result {
                Ok(()) => {
                    set_user_ids.set(String::new());
                    let msg = if add { "成员已添加" } else { "成员已移除" };
                    set_notice.set(Some((msg.to_string(), false)));
                }
                Err(e) => set_notice.set(Some((e.to_string(), true))),
            }
        });
    };

    view! {
        <div class="card bg-base-100 shadow-sm">
            <div class="card-body space-y-3">
                <h2 class="card-title">"成员"</h2>
                <input
                    type="text"
                    placeholder="用户 ID，逗号分隔"
                    class="input input-bordered input-sm"
                    on:input=move |ev| set_user_ids.set(event_target_value(&ev))
                    prop:value=user_ids
                />
                <div class="flex gap-2">
                    <button class="btn btn-primary btn-sm" on:click=move |_| on_change(true)>
                        "添加"
                    </button>
                    <button class="btn btn-outline btn-error btn-sm" on:click=move |_| on_change(false)>
                        "移除"
                    </button>
                </div>
            </div>
        </div>
    }
}

/// 班级成绩汇总
#[component]
fn ClassroomGradesPanel(
    classroom_id: String,
    set_notice: WriteSignal<Option<(String, bool)>>,
) -> impl IntoView {
    let auth = use_auth();
    let (grades, set_grades) = signal(ClassroomGrades::new());

    let api = auth.api();
    spawn_local(async move {
        match api.classroom_grades(&classroom_id).await {
            Ok(data) => set_grades.set(data),
            Err(e) => set_notice.set(Some((e.to_string(), true))),
        }
    });

    let rows = move || {
        let mut rows = grades.with(|g| {
            g.iter()
                .map(|(student, list)| {
                    let average = if list.is_empty() {
                        None
                    } else {
                        Some(list.iter().map(|g| g.grade).sum::<f64>() / list.len() as f64)
                    };
                    (student.clone(), list.len(), average)
                })
                .collect::<Vec<_>>()
        });
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    };

    view! {
        <div class="card bg-base-100 shadow-sm">
            <div class="card-body">
                <h2 class="card-title">"班级成绩"</h2>
                <table class="table table-sm">
                    <thead>
                        <tr><th>"学生"</th><th>"成绩数"</th><th>"平均"</th></tr>
                    </thead>
                    <tbody>
                        {move || rows()
                            .into_iter()
                            .map(|(student, count, average)| view! {
                                <tr>
                                    <td>{student}</td>
                                    <td>{count}</td>
                                    <td>{average.map(|a| format!("{:.1}", a)).unwrap_or_else(|| "-".to_string())}</td>
                                </tr>
                            })
                            .collect_view()}
                    </tbody>
                </table>
            </div>
        </div>
    }
}

/// 当前用户的游戏得分
#[component]
pub fn LeaderboardPage() -> impl IntoView {
    let auth = use_auth();

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8">
            <div class="max-w-5xl mx-auto space-y-6">
                <PageHeader title="排行榜" />
                {move || auth.state.with(|s| s.session.user_id.clone()).map(|user_id| {
                    view! { <Leaderboard scope=LeaderboardScope::User(user_id) /> }
                })}
            </div>
        </div>
    }
}

/// 分页排行榜
#[component]
fn Leaderboard(scope: LeaderboardScope) -> impl IntoView {
    let auth = use_auth();
    let (page, set_page) = signal(PageQuery::default());
    let (data, set_data) = signal(Option::<LeaderboardPage>::None);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);
    let scope = StoredValue::new(scope);

    Effect::new(move |_| {
        let query = page.get();
        let api = auth.api();
        let scope = scope.get_value();
        spawn_local(async move {
            match api.leaderboard(scope, query).await {
                Ok(result) => {
                    set_error_msg.set(None);
                    set_data.set(Some(result));
                }
                Err(e) => set_error_msg.set(Some(e.to_string())),
            }
        });
    });

    let has_next = move || {
        data.with(|d| {
            d.as_ref().is_some_and(|d| {
                d.pagination.offset + (d.data.len() as u64) < d.pagination.total
            })
        })
    };
    let has_prev = move || page.with(|p| p.page > 1);

    view! {
        <div class="card bg-base-100 shadow-sm">
            <div class="card-body">
                <h2 class="card-title">"排行榜"</h2>
                <Show when=move || error_msg.get().is_some()>
                    <div role="alert" class="alert alert-error text-sm">
                        {move || error_msg.get().unwrap_or_default()}
                    </div>
                </Show>
                <table class="table table-zebra">
                    <thead>
                        <tr><th>"#"</th><th>"用户"</th><th>"得分"</th><th>"时间"</th></tr>
                    </thead>
                    <tbody>
                        {move || data.get().map(|d| {
                            let offset = d.pagination.offset;
                            d.data
                                .into_iter()
                                .enumerate()
                                .map(|(i, entry)| view! { <LeaderboardRow rank={offset + i as u64 + 1} entry=entry /> })
                                .collect_view()
                        })}
                    </tbody>
                </table>
                <div class="join self-end">
                    <button
                        class="join-item btn btn-sm"
                        disabled=move || !has_prev()
                        on:click=move |_| set_page.update(|p| p.page -= 1)
                    >
                        "«"
                    </button>
                    <button class="join-item btn btn-sm">{move || page.get().page}</button>
                    <button
                        class="join-item btn btn-sm"
                        disabled=move || !has_next()
                        on:click=move |_| set_page.update(|p| p.page += 1)
                    >
                        "»"
                    </button>
                </div>
            </div>
        </div>
    }
}

#[component]
fn LeaderboardRow(rank: u64, entry: LeaderboardEntry) -> impl IntoView {
    let who = match (entry.name.as_deref(), entry.surname.as_deref()) {
        (Some(name), Some(surname)) => format!("{} {}", name, surname),
        _ => entry.username.clone(),
    };
    view! {
        <tr>
            <td>{rank}</td>
            <td>{who}</td>
            <td class="font-mono">{entry.value}</td>
            <td class="text-base-content/60">{entry.created_at.format("%Y-%m-%d %H:%M").to_string()}</td>
        </tr>
    }
}
