use drawcast::chart::{ChartData, ChartFeed, ChartKind, PollOutcome};
use drawcast::config::DrawcastConfig;
use drawcast::debounce::DebounceTicket;
use drawcast::pipeline::{Applied, PendingCall, RealtimePipeline};
use drawcast::raster::Point;
use drawcast::time::Instant;
use drawcast::{group_by_file, Feedback, FileGroup, HistoryClient, InferenceClient};
use leptos::prelude::*;
use tracing::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;

use crate::ui_model::{canvas_point, ClientRect};

mod canvas;
mod charts;
mod files;
mod logging;
mod storage;

use canvas::CanvasSurface;

pub fn start() {
    logging::install();
    mount_to_body(|| view! { <App /> });
}

#[component]
fn App() -> impl IntoView {
    let config = storage::load_config();
    let initial_theme = storage::load_theme().unwrap_or(config.theme);
    storage::apply_theme_to_document(initial_theme);
    info!(base_url = %config.base_url, "drawcast starting");

    let endpoints = config.endpoints();
    let export_url = endpoints.export_url();
    let canvas_size = config.canvas_size;
    let pipeline_config = DrawcastConfig {
        theme: initial_theme,
        ..config.clone()
    };

    let client = StoredValue::new_local(InferenceClient::new(endpoints.clone()));
    let history = StoredValue::new_local(HistoryClient::new(endpoints, config.history_limit));
    let pipeline = StoredValue::new_local(None::<RealtimePipeline<CanvasSurface>>);
    let feed = StoredValue::new_local(ChartFeed::new(
        config.history_limit,
        config.poll_interval(),
    ));
    let debounce_handle = StoredValue::new_local(None::<i32>);
    let poll_handle = StoredValue::new_local(None::<i32>);

    let (theme, set_theme) = signal(initial_theme);
    let (feedback, set_feedback) = signal(Feedback::Idle);
    let (chart_data, set_chart_data) = signal(None::<ChartData>);
    let (chart_status, set_chart_status) = signal(String::new());
    let (batch, set_batch) = signal(Vec::<FileGroup>::new());
    let (status, set_status) = signal(String::new());

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
    let accuracy_ref = NodeRef::<leptos::html::Canvas>::new();
    let loss_ref = NodeRef::<leptos::html::Canvas>::new();

    // The pipeline needs the mounted canvas.
    Effect::new(move |_| {
        let Some(el) = canvas_ref.get() else {
            return;
        };
        if pipeline.with_value(Option::is_some) {
            return;
        }
        match CanvasSurface::new(el).and_then(|s| RealtimePipeline::new(s, &pipeline_config)) {
            Ok(p) => pipeline.set_value(Some(p)),
            Err(e) => set_status.set(format!("canvas unavailable: {e}")),
        }
    });

    let dispatch = move |call: PendingCall| {
        let client = client.get_value();
        spawn_local(async move {
            let results = client.predict(&call.raster).await;
            let mut shown = None;
            pipeline.update_value(|p| {
                if let Some(p) = p.as_mut() {
                    if p.complete(call.token, results) == Applied::Displayed {
                        shown = Some(p.feedback().clone());
                    }
                }
            });
            if let Some(fb) = shown {
                set_feedback.set(fb);
            }
        });
    };

    let fire = move |generation: u64| {
        debounce_handle.set_value(None);
        let mut pending = None;
        pipeline.update_value(|p| {
            if let Some(p) = p.as_mut() {
                pending = Some(p.fire_debounce(generation));
            }
        });
        match pending {
            Some(Ok(Some(call))) => dispatch(call),
            Some(Err(e)) => set_status.set(format!("snapshot failed: {e}")),
            _ => {}
        }
    };

    let cancel_timer = move || {
        if let Some(id) = debounce_handle.get_value() {
            if let Some(w) = web_sys::window() {
                w.clear_timeout_with_handle(id);
            }
            debounce_handle.set_value(None);
        }
    };

    let schedule = move |ticket: DebounceTicket| {
        cancel_timer();
        let Some(window) = web_sys::window() else {
            set_status.set("no window".to_string());
            return;
        };
        let delay_ms = i32::try_from(ticket.delay.as_millis()).unwrap_or(i32::MAX);
        let cb = Closure::once_into_js(move || fire(ticket.generation));
        match window
            .set_timeout_with_callback_and_timeout_and_arguments_0(cb.unchecked_ref(), delay_ms)
        {
            Ok(id) => debounce_handle.set_value(Some(id)),
            Err(_) => set_status.set("failed to start debounce timer".to_string()),
        }
    };

    let to_point = move |ev: &web_sys::MouseEvent| -> Option<Point> {
        let canvas = canvas_ref.get_untracked()?;
        let r = canvas.get_bounding_client_rect();
        Some(canvas_point(
            ev.client_x() as f64,
            ev.client_y() as f64,
            ClientRect {
                left: r.left(),
                top: r.top(),
                width: r.width(),
                height: r.height(),
            },
            canvas.width(),
            canvas.height(),
        ))
    };

    let on_down = move |ev: web_sys::MouseEvent| {
        let Some(pt) = to_point(&ev) else {
            return;
        };
        pipeline.update_value(|p| {
            if let Some(p) = p.as_mut() {
                p.pointer_down(pt);
            }
        });
    };

    let on_move = move |ev: web_sys::MouseEvent| {
        let Some(pt) = to_point(&ev) else {
            return;
        };
        let mut moved = None;
        pipeline.update_value(|p| {
            if let Some(p) = p.as_mut() {
                moved = Some(p.pointer_move(pt, Instant::now()));
            }
        });
        match moved {
            Some(Ok(Some(ticket))) => schedule(ticket),
            Some(Err(e)) => set_status.set(format!("draw failed: {e}")),
            _ => {}
        }
    };

    let on_up = move |_: web_sys::MouseEvent| {
        pipeline.update_value(|p| {
            if let Some(p) = p.as_mut() {
                p.pointer_up();
            }
        });
    };

    let on_leave = move |_: web_sys::MouseEvent| {
        pipeline.update_value(|p| {
            if let Some(p) = p.as_mut() {
                p.pointer_leave();
            }
        });
    };

    let do_clear = move || {
        cancel_timer();
        let mut res = Ok(());
        pipeline.update_value(|p| {
            if let Some(p) = p.as_mut() {
                res = p.clear();
            }
        });
        set_feedback.set(Feedback::Idle);
        if let Err(e) = res {
            set_status.set(format!("clear failed: {e}"));
        }
    };

    // Theme changes repaint the drawing canvas and the charts.
    Effect::new(move |_| {
        let t = theme.get();
        storage::apply_theme_to_document(t);
        storage::save_theme(t);
        let mut res = Ok(());
        pipeline.update_value(|p| {
            if let Some(p) = p.as_mut() {
                res = p.set_theme(t);
            }
        });
        if let Err(e) = res {
            set_status.set(format!("theme repaint failed: {e}"));
        }
    });

    Effect::new(move |_| {
        let t = theme.get();
        chart_data.with(|data| {
            for (node, kind) in [
                (accuracy_ref, ChartKind::Accuracy),
                (loss_ref, ChartKind::Loss),
            ] {
                if let Some(c) = node.get() {
                    if let Err(e) = charts::draw_model_chart(&c, data.as_ref(), kind, t) {
                        warn!(error = %e, chart = kind.label(), "chart draw failed");
                    }
                }
            }
        });
    });

    let poll_once = move || {
        let history = history.get_value();
        spawn_local(async move {
            let fetched = history.fetch().await;
            let mut outcome = None;
            let mut data = None;
            feed.update_value(|f| {
                outcome = Some(f.apply(fetched));
                data = f.data().cloned();
            });
            match outcome {
                Some(PollOutcome::Redrawn) => {
                    set_chart_data.set(data);
                    set_chart_status.set(String::new());
                }
                Some(PollOutcome::KeptFailed(e)) => set_chart_status.set(e.to_string()),
                _ => {}
            }
        });
    };

    // The feed owns the schedule; the interval only wakes it up.
    let poll_if_due = move || {
        let mut due = false;
        feed.update_value(|f| due = f.poll_due(Instant::now()));
        if due {
            poll_once();
        }
    };

    poll_if_due();
    let poll_ms = feed.with_value(|f| i32::try_from(f.interval().as_millis()).unwrap_or(i32::MAX));
    if let Some(window) = web_sys::window() {
        let cb = Closure::wrap(Box::new(move || poll_if_due()) as Box<dyn FnMut()>);
        match window.set_interval_with_callback_and_timeout_and_arguments_0(
            cb.as_ref().unchecked_ref(),
            poll_ms,
        ) {
            Ok(id) => {
                cb.forget();
                poll_handle.set_value(Some(id));
            }
            Err(_) => set_status.set("failed to start history poll".to_string()),
        }
    }

    on_cleanup(move || {
        if let Some(w) = web_sys::window() {
            if let Some(id) = poll_handle.get_value() {
                w.clear_interval_with_handle(id);
            }
            if let Some(id) = debounce_handle.get_value() {
                w.clear_timeout_with_handle(id);
            }
        }
        pipeline.update_value(|p| {
            if let Some(p) = p.as_mut() {
                p.teardown();
            }
        });
    });

    let on_files = move |ev: web_sys::Event| {
        let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        else {
            return;
        };
        let Some(list) = input.files() else {
            return;
        };
        if list.length() == 0 {
            return;
        }
        let client = client.get_value();
        set_status.set(format!("uploading {} file(s)", list.length()));
        spawn_local(async move {
            match files::read_uploads(&list).await {
                Ok(uploads) => {
                    let results = client.predict_batch(uploads).await;
                    set_batch.set(group_by_file(results));
                    set_status.set(String::new());
                }
                Err(e) => set_status.set(e),
            }
        });
    };

    let size_attr = canvas_size.to_string();

    view! {
        <main class="app">
            <header class="app-header">
                <h1 class="brand">"Drawcast"</h1>
                <div class="app-header-right">
                    <span class="status">{move || status.get()}</span>
                    <a class="btn sm ghost" href=export_url download="predictions.csv">
                        "Export CSV"
                    </a>
                    <button
                        class="btn sm ghost"
                        title=move || format!("Theme: {}", theme.get().label())
                        on:click=move |_| set_theme.set(theme.get().toggle())
                    >
                        {move || theme.get().icon()}" "{move || theme.get().label()}
                    </button>
                </div>
            </header>

            <section class="draw">
                <canvas
                    node_ref=canvas_ref
                    class="draw-canvas"
                    width=size_attr.clone()
                    height=size_attr
                    on:mousedown=on_down
                    on:mousemove=on_move
                    on:mouseup=on_up
                    on:mouseleave=on_leave
                ></canvas>
                <div class="draw-controls">
                    <button class="btn" on:click=move |_| do_clear()>"Clear"</button>
                </div>
                <pre
                    class="feedback"
                    class:has-errors=move || feedback.with(Feedback::has_failures)
                >
                    {move || feedback.with(Feedback::render)}
                </pre>
            </section>

            <section class="upload">
                <label class="btn">
                    "Upload images"
                    <input type="file" accept="image/*" multiple=true hidden=true on:change=on_files />
                </label>
                <ul class="batch-results">
                    {move || {
                        batch
                            .get()
                            .into_iter()
                            .map(|g| {
                                view! {
                                    <li>
                                        <strong>{g.filename.clone()}</strong>
                                        <pre>{g.feedback.render()}</pre>
                                    </li>
                                }
                            })
                            .collect_view()
                    }}
                </ul>
            </section>

            <section class="charts">
                <canvas node_ref=accuracy_ref class="chart" width="480" height="220"></canvas>
                <canvas node_ref=loss_ref class="chart" width="480" height="220"></canvas>
                <p class="subtle">{move || chart_status.get()}</p>
            </section>
        </main>
    }
}
