use anyhow::Result;
use chrono::Utc;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::time::Duration;

use crate::models::{Comment, Post, PostSummary, ProductionRow};

/// Outcome of a like toggle for a given caller address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeToggle {
    Liked,
    Unliked,
}

// Async board database over a bounded SQLx connection pool. Exhausting the
// pool queues the caller up to the acquire timeout, then the statement fails.
pub struct BoardDatabase {
    pub pool: SqlitePool,
}

impl BoardDatabase {
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await?;

        Ok(BoardDatabase { pool })
    }

    pub async fn init(&self) -> Result<()> {
        // Discussion board tables
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                author TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT,
                view_count INTEGER NOT NULL DEFAULT 0,
                like_count INTEGER NOT NULL DEFAULT 0
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS comments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id INTEGER NOT NULL,
                author TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        // The unique constraint backs the atomic like toggle: two concurrent
        // first-time likes from one address cannot both insert.
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS likes (
                post_id INTEGER NOT NULL,
                user_ip TEXT NOT NULL,
                UNIQUE(post_id, user_ip)
            )",
        )
        .execute(&self.pool)
        .await?;

        // Production reporting tables (read-only reference data)
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS chick_info (
                chick_no INTEGER PRIMARY KEY,
                breeds TEXT NOT NULL,
                gender TEXT NOT NULL,
                farm TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS prod_result (
                chick_no INTEGER NOT NULL,
                raw_weight REAL,
                prod_date TEXT
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id, created_at)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list_posts(&self) -> Result<Vec<PostSummary>> {
        let posts = sqlx::query_as::<_, PostSummary>(
            "SELECT id, title, author, created_at, view_count, like_count
             FROM posts ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    pub async fn create_post(&self, title: &str, author: &str, content: &str) -> Result<i64> {
        let row = sqlx::query(
            "INSERT INTO posts (title, author, content, created_at) VALUES (?, ?, ?, ?)
             RETURNING id",
        )
        .bind(title)
        .bind(author)
        .bind(content)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("id"))
    }

    /// Fetch a post for display and bump its view counter in one statement.
    /// Deliberately not idempotent: every successful call increments the
    /// counter by one.
    pub async fn view_and_increment(&self, id: i64) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            "UPDATE posts SET view_count = view_count + 1 WHERE id = ?
             RETURNING id, title, author, content, created_at, updated_at, view_count, like_count",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    /// Plain read without the counter bump, for the edit form.
    pub async fn fetch_post(&self, id: i64) -> Result<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(
            "SELECT id, title, author, content, created_at, updated_at, view_count, like_count
             FROM posts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    /// Returns false when no post matched. The author column is immutable on
    /// edit and is never part of this statement.
    pub async fn update_post(&self, id: i64, title: &str, content: &str) -> Result<bool> {
        let result =
            sqlx::query("UPDATE posts SET title = ?, content = ?, updated_at = ? WHERE id = ?")
                .bind(title)
                .bind(content)
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deleting a missing id affects zero rows and is not an error.
    pub async fn delete_post(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn list_comments(&self, post_id: i64) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT id, post_id, author, content, created_at
             FROM comments WHERE post_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    pub async fn add_comment(&self, post_id: i64, author: &str, content: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO comments (post_id, author, content, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(post_id)
        .bind(author)
        .bind(content)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Toggle the like row for (post, address) and keep `like_count` in step,
    /// all inside one transaction. Delete-first: when nothing was deleted the
    /// caller had no like and one is inserted, so there is no read-then-write
    /// gap for concurrent toggles to race through.
    pub async fn toggle_like(&self, post_id: i64, user_ip: &str) -> Result<LikeToggle> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM likes WHERE post_id = ? AND user_ip = ?")
            .bind(post_id)
            .bind(user_ip)
            .execute(&mut *tx)
            .await?;

        let toggle = if deleted.rows_affected() > 0 {
            sqlx::query("UPDATE posts SET like_count = like_count - 1 WHERE id = ?")
                .bind(post_id)
                .execute(&mut *tx)
                .await?;
            LikeToggle::Unliked
        } else {
            sqlx::query("INSERT INTO likes (post_id, user_ip) VALUES (?, ?)")
                .bind(post_id)
                .bind(user_ip)
                .execute(&mut *tx)
                .await?;
            sqlx::query("UPDATE posts SET like_count = like_count + 1 WHERE id = ?")
                .bind(post_id)
                .execute(&mut *tx)
                .await?;
            LikeToggle::Liked
        };

        tx.commit().await?;

        Ok(toggle)
    }

    pub async fn has_liked(&self, post_id: i64, user_ip: &str) -> Result<bool> {
        let row = sqlx::query("SELECT COUNT(*) FROM likes WHERE post_id = ? AND user_ip = ?")
            .bind(post_id)
            .bind(user_ip)
            .fetch_one(&self.pool)
            .await?;

        let count: i64 = row.get(0);
        Ok(count > 0)
    }

    /// Read-only reporting join. An empty table set yields an empty vector,
    /// not an error.
    pub async fn fetch_production_rows(&self) -> Result<Vec<ProductionRow>> {
        let rows = sqlx::query_as::<_, ProductionRow>(
            "SELECT c.chick_no, c.breeds, c.gender, c.farm, p.raw_weight, p.prod_date
             FROM chick_info c
             LEFT JOIN prod_result p ON c.chick_no = p.chick_no
             ORDER BY c.chick_no ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
