//! 课程详情与小游戏挂载页

use crate::auth::use_auth;
use crate::components::cabinet::{Notice, PageHeader};
use crate::web::router::Link;
use classhub_shared::protocol::AddGradeRequest;
use classhub_shared::{Game, Grade, Lesson};
use leptos::html::Input;
use leptos::prelude::*;
use leptos::task::spawn_local;
use wasm_bindgen::JsCast;
use web_sys::FormData;

#[component]
pub fn LessonPage(lesson_id: String) -> impl IntoView {
    let auth = use_auth();
    let is_teacher = move || auth.state.with(|s| s.session.role.is_some_and(|r| r.is_teacher()));
    let lesson_id = StoredValue::new(lesson_id);

    let (lesson, set_lesson) = signal(Option::<Lesson>::None);
    let (games, set_games) = signal(Vec::<Game>::new());
    let (notice, set_notice) = signal(Option::<(String, bool)>::None);

    let api = auth.api();
    let id = lesson_id.get_value();
    spawn_local(async move {
        match api.lesson(&id).await {
            Ok(data) => set_lesson.set(Some(data)),
            Err(e) => {
                set_notice.set(Some((format!("加载课程失败: {}", e), true)));
                return;
            }
        }
        match api.lesson_games(&id).await {
            Ok(data) => set_games.set(data),
            Err(e) => set_notice.set(Some((format!("加载小游戏失败: {}", e), true))),
        }
    });

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8">
            <div class="max-w-5xl mx-auto space-y-6">
                <PageHeader title="课程" />
                <Notice notice=notice />
                {move || lesson.get().map(|l| view! {
                    <div class="card bg-base-100 shadow-sm">
                        <div class="card-body">
                            <h2 class="card-title">{l.name}</h2>
                            <p>{l.description.unwrap_or_default()}</p>
                        </div>
                    </div>
                })}
                <div class="card bg-base-100 shadow-sm">
                    <div class="card-body">
                        <h2 class="card-title">"小游戏"</h2>
                        <div class="flex flex-wrap gap-2">
                            <For
                                each=move || games.get()
                                key=|g| g.id.clone()
                                children=|g: Game| {
                                    match g.url {
                                        Some(url) => view! {
                                            <Link to=url class="btn btn-outline btn-sm">{g.name}</Link>
                                        }.into_any(),
                                        None => view! {
                                            <span class="btn btn-disabled btn-sm">{g.name}</span>
                                        }.into_any(),
                                    }
                                }
                            />
                        </div>
                    </div>
                </div>
                <SummaryPanel lesson_id=lesson_id.get_value() set_notice=set_notice />
                <Show when=is_teacher>
                    <GradesPanel lesson_id=lesson_id.get_value() set_notice=set_notice />
                </Show>
            </div>
        </div>
    }
}

// =========================================================
// 课程总结
// =========================================================

#[component]
fn SummaryPanel(
    lesson_id: String,
    set_notice: WriteSignal<Option<(String, bool)>>,
) -> impl IntoView {
    let auth = use_auth();
    let is_teacher = move || auth.state.with(|s| s.session.role.is_some_and(|r| r.is_teacher()));
    let lesson_id = StoredValue::new(lesson_id);
    let file_input: NodeRef<Input> = NodeRef::new();
    let (progress, set_progress) = signal(Option::<f64>::None);

    let on_upload = move |_| {
        let Some(file) = file_input
            .get()
            .and_then(|input| input.files())
            .and_then(|files| files.get(0))
        else {
            set_notice.set(Some(("请先选择文件".to_string(), true)));
            return;
        };
        let form = match FormData::new() {
            Ok(form) => form,
            Err(e) => {
                set_notice.set(Some((format!("上传失败: {:?}", e), true)));
                return;
            }
        };
        if let Err(e) = form.append_with_blob("file", &file) {
            set_notice.set(Some((format!("上传失败: {:?}", e), true)));
            return;
        }

        let api = auth.api();
        let id = lesson_id.get_value();
        set_progress.set(Some(0.0));
        spawn_local(async move {
            let result = api
                .upload_summary(&id, &form, move |percent| set_progress.set(Some(percent)))
                .await;
            match result {
                Ok(()) => set_notice.set(Some(("总结已上传".to_string(), false))),
                Err(e) => set_notice.set(Some((e.to_string(), true))),
            }
            set_progress.set(None);
        });
    };

    let on_download = move |_| {
        let api = auth.api();
        let id = lesson_id.get_value();
        spawn_local(async move {
            if let Err(e) = api.download_summary(&id).await {
                set_notice.set(Some((e.to_string(), true)));
            }
        });
    };

    let on_delete = move |_| {
        let api = auth.api();
        let id = lesson_id.get_value();
        spawn_local(async move {
            match api.delete_summary(&id).await {
                Ok(()) => set_notice.set(Some(("总结已删除".to_string(), false))),
                Err(e) => set_notice.set(Some((e.to_string(), true))),
            }
        });
    };

    view! {
        <div class="card bg-base-100 shadow-sm">
            <div class="card-body space-y-3">
                <h2 class="card-title">"课程总结"</h2>
                <button class="btn btn-outline btn-sm w-fit" on:click=on_download>"下载"</button>
                <Show when=is_teacher>
                    <div class="flex items-center gap-2">
                        <input type="file" class="file-input file-input-bordered file-input-sm" node_ref=file_input />
                        <button class="btn btn-primary btn-sm" on:click=on_upload disabled=move || progress.get().is_some()>
                            "上传"
                        </button>
                        <button class="btn btn-ghost btn-sm text-error" on:click=on_delete>"删除"</button>
                    </div>
                    {move || progress.get().map(|p| view! {
                        <progress class="progress progress-primary w-full" value=p max="100"></progress>
                    })}
                </Show>
            </div>
        </div>
    }
}

// =========================================================
// 成绩（教师）
// =========================================================

#[component]
fn GradesPanel(
    lesson_id: String,
    set_notice: WriteSignal<Option<(String, bool)>>,
) -> impl IntoView {
    let auth = use_auth();
    let lesson_id = StoredValue::new(lesson_id);
    let (grades, set_grades) = signal(Vec::<Grade>::new());
    let (student_id, set_student_id) = signal(String::new());
    let (grade, set_grade) = signal(String::new());

    let api = auth.api();
    let id = lesson_id.get_value();
    spawn_local(async move {
        match api.lesson_grades(&id).await {
            Ok(data) => set_grades.set(data),
            Err(e) => set_notice.set(Some((e.to_string(), true))),
        }
    });

    let on_add = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let Ok(value) = grade.get().trim().parse::<f64>() else {
            set_notice.set(Some(("成绩必须是数字".to_string(), true)));
            return;
        };
        let req = AddGradeRequest {
            lesson_id: lesson_id.get_value(),
            student_id: student_id.get().trim().to_string(),
            grade: value,
            comment: None,
        };
        let api = auth.api();
        spawn_local(async move {
            match api.add_grade(&req).await {
                Ok(added) => {
                    set_grades.update(|list| {
                        list.retain(|g| g.student_id != added.student_id);
                        list.push(added);
                    });
                    set_student_id.set(String::new());
                    set_grade.set(String::new());
                }
                Err(e) => set_notice.set(Some((e.to_string(), true))),
            }
        });
    };

    let handle_delete = move |student: String| {
        let api = auth.api();
        let id = lesson_id.get_value();
        spawn_local(async move {
            match api.delete_grade(&id, &student).await {
                Ok(()) => set_grades.update(|list| list.retain(|g| g.student_id != student)),
                Err(e) => set_notice.set(Some((e.to_string(), true))),
            }
        });
    };

    view! {
        <div class="card bg-base-100 shadow-sm">
            <div class="card-body space-y-3">
                <h2 class="card-title">"成绩"</h2>
                <form class="flex gap-2" on:submit=on_add>
                    <input
                        type="text"
                        placeholder="学生 ID"
                        class="input input-bordered input-sm"
                        on:input=move |ev| set_student_id.set(event_target_value(&ev))
                        prop:value=student_id
                    />
                    <input
                        type="number"
                        step="0.1"
                        placeholder="成绩"
                        class="input input-bordered input-sm w-24"
                        on:input=move |ev| set_grade.set(event_target_value(&ev))
                        prop:value=grade
                    />
                    <button class="btn btn-primary btn-sm">"记录"</button>
                </form>
                <table class="table table-sm">
                    <tbody>
                        <For
                            each=move || grades.get()
                            key=|g| g.student_id.clone()
                            children=move |g: Grade| {
                                let student = g.student_id.clone();
                                view! {
                                    <tr>
                                        <td>{g.student_id}</td>
                                        <td>{g.grade}</td>
                                        <td>
                                            <button
                                                class="btn btn-ghost btn-xs text-error"
                                                on:click=move |_| handle_delete(student.clone())
                                            >
                                                "删除"
                                            </button>
                                        </td>
                                    </tr>
                                }
                            }
                        />
                    </tbody>
                </table>
            </div>
        </div>
    }
}

// =========================================================
// 小游戏
// =========================================================

/// 小游戏挂载页
///
/// 游戏脚本自行挂载到 `#game-root`，并通过 `data-lesson-id` 读取所属课程。
/// 一局结束后在 window 上派发 `game-score` 事件（`detail` 为得分），由这里提交到排行榜。
#[component]
pub fn GamePage(lesson_id: String, game: String) -> impl IntoView {
    let auth = use_auth();
    let back = format!("/lesson/{}", lesson_id);
    let (game_id, set_game_id) = signal(Option::<String>::None);
    let (notice, set_notice) = signal(Option::<(String, bool)>::None);

    let api = auth.api();
    let (lesson, slug) = (lesson_id.clone(), game.clone());
    spawn_local(async move {
        match api.lesson_games(&lesson).await {
            Ok(games) => {
                let id = games
                    .into_iter()
                    .find(|g| g.slug() == Some(slug.as_str()))
                    .map(|g| g.id);
                set_game_id.set(id);
            }
            Err(e) => set_notice.set(Some((format!("加载小游戏失败: {}", e), true))),
        }
    });

    let handle = window_event_listener_untyped(SCORE_EVENT, move |ev: web_sys::Event| {
        let Some(value) = score_from_event(&ev) else {
            return;
        };
        let Some(id) = game_id.get_untracked() else {
            return;
        };
        let api = auth.api();
        spawn_local(async move {
            match api.add_score(&id, value).await {
                Ok(entry) => set_notice.set(Some((format!("得分 {} 已记录", entry.value), false))),
                Err(e) => set_notice.set(Some((e.to_string(), true))),
            }
        });
    });
    on_cleanup(move || handle.remove());

    view! {
        <div class="min-h-screen bg-base-200 p-4 md:p-8">
            <div class="max-w-5xl mx-auto space-y-4">
                <Link to=back class="btn btn-ghost btn-sm">"« 返回课程"</Link>
                <Notice notice=notice />
                <div
                    id="game-root"
                    class="card bg-base-100 shadow-sm min-h-[480px]"
                    data-lesson-id=lesson_id
                    data-game=game
                ></div>
            </div>
        </div>
    }
}

const SCORE_EVENT: &str = "game-score";

fn score_from_event(ev: &web_sys::Event) -> Option<i64> {
    let detail = ev.dyn_ref::<web_sys::CustomEvent>()?.detail();
    detail
        .as_f64()
        .filter(|v| v.is_finite())
        .map(|v| v.round() as i64)
}
