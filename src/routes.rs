use std::net::SocketAddr;

use askama::Template;
use axum::{
    extract::{ConnectInfo, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::{Cookie, SignedCookieJar};
use tower_http::trace::TraceLayer;

use crate::{
    app_state::AppState,
    charts,
    database::LikeToggle,
    error::AppResult,
    farm_map,
    models::{Comment, CommentForm, EditForm, Post, PostForm, PostSummary, ProductionRow},
    report::ProductionReport,
};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/create/", get(create_form).post(create_post))
        .route("/post/{id}", get(view_post))
        .route("/edit/{id}", get(edit_form).post(edit_post))
        .route("/delete/{id}", post(delete_post))
        .route("/post/comment/{id}", post(add_comment))
        .route("/post/like/{id}", post(like_post))
        .route("/fms", get(fms_dashboard))
        .route("/fms_result", get(fms_result))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

const FLASH_COOKIE: &str = "flash";

fn flash(jar: SignedCookieJar, message: &str) -> SignedCookieJar {
    let mut cookie = Cookie::new(FLASH_COOKIE, message.to_string());
    cookie.set_path("/");
    jar.add(cookie)
}

fn take_flash(jar: SignedCookieJar) -> (SignedCookieJar, Option<String>) {
    match jar.get(FLASH_COOKIE) {
        Some(cookie) => {
            let message = cookie.value().to_string();
            let mut removal = Cookie::from(FLASH_COOKIE);
            removal.set_path("/");
            (jar.remove(removal), Some(message))
        }
        None => (jar, None),
    }
}

// Presence-only validation, same as the board has always done: an empty
// string is as missing as an absent field.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn chart_or_none(result: anyhow::Result<String>, which: &str) -> Option<String> {
    match result {
        Ok(uri) => Some(uri),
        Err(err) => {
            tracing::warn!("{which} chart failed to render: {err:#}");
            None
        }
    }
}

async fn index(State(state): State<AppState>, jar: SignedCookieJar) -> AppResult<Response> {
    let posts = state.db.list_posts().await?;
    let (jar, flash) = take_flash(jar);
    let page = IndexTemplate { flash, posts };
    Ok((jar, Html(page.render()?)).into_response())
}

async fn create_form(jar: SignedCookieJar) -> AppResult<Response> {
    let (jar, flash) = take_flash(jar);
    let page = CreateTemplate { flash };
    Ok((jar, Html(page.render()?)).into_response())
}

async fn create_post(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(form): Form<PostForm>,
) -> AppResult<Response> {
    let (Some(title), Some(author), Some(content)) = (
        present(form.title),
        present(form.author),
        present(form.content),
    ) else {
        let jar = flash(jar, "Please fill in every field.");
        return Ok((jar, Redirect::to("/create/")).into_response());
    };

    let id = state.db.create_post(&title, &author, &content).await?;
    let jar = flash(jar, "Post created.");
    Ok((jar, Redirect::to(&format!("/post/{id}"))).into_response())
}

async fn view_post(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    jar: SignedCookieJar,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let Some(post) = state.db.view_and_increment(id).await? else {
        let jar = flash(jar, "Post not found.");
        return Ok((jar, Redirect::to("/")).into_response());
    };

    let comments = state.db.list_comments(id).await?;
    let liked = state.db.has_liked(id, &addr.ip().to_string()).await?;

    let (jar, flash) = take_flash(jar);
    let page = ViewTemplate {
        flash,
        post,
        comments,
        liked,
    };
    Ok((jar, Html(page.render()?)).into_response())
}

async fn edit_form(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let Some(post) = state.db.fetch_post(id).await? else {
        let jar = flash(jar, "Post not found.");
        return Ok((jar, Redirect::to("/")).into_response());
    };

    let (jar, flash) = take_flash(jar);
    let page = EditTemplate { flash, post };
    Ok((jar, Html(page.render()?)).into_response())
}

async fn edit_post(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(id): Path<i64>,
    Form(form): Form<EditForm>,
) -> AppResult<Response> {
    let (Some(title), Some(content)) = (present(form.title), present(form.content)) else {
        let jar = flash(jar, "Please provide both a title and content.");
        return Ok((jar, Redirect::to(&format!("/edit/{id}"))).into_response());
    };

    if !state.db.update_post(id, &title, &content).await? {
        let jar = flash(jar, "Post not found.");
        return Ok((jar, Redirect::to("/")).into_response());
    }

    let jar = flash(jar, "Post updated.");
    Ok((jar, Redirect::to(&format!("/post/{id}"))).into_response())
}

async fn delete_post(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    state.db.delete_post(id).await?;
    let jar = flash(jar, "Post deleted.");
    Ok((jar, Redirect::to("/")).into_response())
}

async fn add_comment(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Path(id): Path<i64>,
    Form(form): Form<CommentForm>,
) -> AppResult<Response> {
    let (Some(author), Some(content)) = (present(form.author), present(form.content)) else {
        let jar = flash(jar, "Please provide both an author and content.");
        return Ok((jar, Redirect::to(&format!("/post/{id}"))).into_response());
    };

    state.db.add_comment(id, &author, &content).await?;
    let jar = flash(jar, "Comment added.");
    Ok((jar, Redirect::to(&format!("/post/{id}"))).into_response())
}

async fn like_post(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    jar: SignedCookieJar,
    Path(id): Path<i64>,
) -> AppResult<Response> {
    let message = match state.db.toggle_like(id, &addr.ip().to_string()).await? {
        LikeToggle::Liked => "Like recorded.",
        LikeToggle::Unliked => "Like removed.",
    };

    let jar = flash(jar, message);
    Ok((jar, Redirect::to(&format!("/post/{id}"))).into_response())
}

async fn fms_dashboard(State(state): State<AppState>) -> AppResult<Response> {
    let rows = state.db.fetch_production_rows().await?;

    let plot = if rows.is_empty() {
        None
    } else {
        let report = ProductionReport::from_rows(&rows);
        chart_or_none(charts::breed_weight_chart(&report), "breed weight")
    };

    let page = FmsTemplate { rows, plot };
    Ok(Html(page.render()?).into_response())
}

async fn fms_result(State(state): State<AppState>) -> AppResult<Response> {
    let rows = state.db.fetch_production_rows().await?;
    if rows.is_empty() {
        return Ok("There is no production data yet.".into_response());
    }

    let report = ProductionReport::from_rows(&rows);
    let breed_plot = chart_or_none(charts::breed_share_chart(&report), "breed share");
    let farm_plot = chart_or_none(charts::farm_weight_chart(&report), "farm weight");
    let map_html = farm_map::render(&report);

    let page = FmsResultTemplate {
        rows,
        total_count: report.total_count,
        pass_count: report.pass_count,
        pass_rate: format!("{:.1}", report.pass_rate),
        breed_plot,
        farm_plot,
        map_html,
    };
    Ok(Html(page.render()?).into_response())
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    flash: Option<String>,
    posts: Vec<PostSummary>,
}

#[derive(Template)]
#[template(path = "create.html")]
struct CreateTemplate {
    flash: Option<String>,
}

#[derive(Template)]
#[template(path = "view.html")]
struct ViewTemplate {
    flash: Option<String>,
    post: Post,
    comments: Vec<Comment>,
    liked: bool,
}

#[derive(Template)]
#[template(path = "edit.html")]
struct EditTemplate {
    flash: Option<String>,
    post: Post,
}

#[derive(Template)]
#[template(path = "fms.html")]
struct FmsTemplate {
    rows: Vec<ProductionRow>,
    plot: Option<String>,
}

#[derive(Template)]
#[template(path = "fms_result.html")]
struct FmsResultTemplate {
    rows: Vec<ProductionRow>,
    total_count: usize,
    pass_count: usize,
    pass_rate: String,
    breed_plot: Option<String>,
    farm_plot: Option<String>,
    map_html: String,
}
