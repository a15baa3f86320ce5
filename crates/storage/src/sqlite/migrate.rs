use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs a single, consolidated migration for the current schema.
///
/// Creates the full schema: question bank, exams, sessions, results, student
/// roster, admin users, and indexes. Identifier lists and answer maps are
/// stored as JSON text. No foreign keys: an exam may be deleted while its
/// sessions and results live on, and grading has to cope with that.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: full schema.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS questions (
                    id TEXT PRIMARY KEY,
                    subject TEXT NOT NULL,
                    class_level TEXT NOT NULL,
                    prompt TEXT NOT NULL,
                    options TEXT NOT NULL,
                    correct_answer TEXT NOT NULL,
                    points INTEGER NOT NULL CHECK (points > 0)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS exams (
                    id TEXT PRIMARY KEY,
                    title TEXT NOT NULL,
                    class_level TEXT NOT NULL,
                    subject TEXT,
                    question_ids TEXT NOT NULL,
                    questions_to_display INTEGER,
                    duration_mins INTEGER NOT NULL CHECK (duration_mins > 0),
                    passing_score INTEGER NOT NULL CHECK (passing_score BETWEEN 0 AND 100),
                    total_points INTEGER NOT NULL CHECK (total_points >= 0),
                    is_active INTEGER NOT NULL,
                    created_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS exam_sessions (
                    id TEXT PRIMARY KEY,
                    exam_id TEXT NOT NULL,
                    student_name TEXT NOT NULL,
                    student_number TEXT NOT NULL,
                    token TEXT NOT NULL,
                    question_ids TEXT NOT NULL,
                    answers TEXT NOT NULL,
                    current_question_index INTEGER NOT NULL CHECK (current_question_index >= 0),
                    started_at TEXT NOT NULL,
                    ended_at TEXT,
                    is_completed INTEGER NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS results (
                    id TEXT PRIMARY KEY,
                    session_id TEXT NOT NULL,
                    exam_id TEXT NOT NULL,
                    student_name TEXT NOT NULL,
                    student_number TEXT NOT NULL,
                    score INTEGER NOT NULL CHECK (score >= 0),
                    total_points INTEGER NOT NULL CHECK (total_points >= 0),
                    percentage INTEGER NOT NULL CHECK (percentage BETWEEN 0 AND 100),
                    passed INTEGER NOT NULL,
                    answers TEXT NOT NULL,
                    correct TEXT NOT NULL,
                    completed_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS students (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    student_number TEXT NOT NULL,
                    class_level TEXT NOT NULL,
                    sex TEXT
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS users (
                    id TEXT PRIMARY KEY,
                    username TEXT NOT NULL UNIQUE,
                    password_hash TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_exams_class_level
                    ON exams (class_level);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_sessions_exam
                    ON exam_sessions (exam_id);
            ",
        )
        .execute(&mut *tx)
        .await?;

        // intentionally not UNIQUE: duplicate-submission protection stays a
        // read-before-write check at the service layer
        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_results_session
                    ON results (session_id);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
