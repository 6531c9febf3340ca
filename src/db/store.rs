use chrono::{DateTime, Utc};
use sqlx::{types::Json, PgPool};

use crate::{
    error::AppResult,
    models::{
        DisplayGame, EventKind, Preference, SaveOutcome, StoredRecommendation, UserEvent,
        ValidatedRecommendation,
    },
};

/// Exclusion-relevant reads, preference writes and saved genre filters
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Every game ever recommended to the user
    async fn recommended_game_ids(&self, steam_id: &str) -> AppResult<Vec<String>>;

    /// Games the user marked with `preference`, newest first
    async fn preference_game_ids(
        &self,
        steam_id: &str,
        preference: Preference,
    ) -> AppResult<Vec<String>>;

    /// Records or replaces the user's verdict on a game
    async fn set_preference(
        &self,
        steam_id: &str,
        game_id: &str,
        preference: Preference,
    ) -> AppResult<()>;

    /// Removes a verdict, returning whether one existed
    async fn delete_preference(&self, steam_id: &str, game_id: &str) -> AppResult<bool>;

    /// The user's saved genre filter, `None` if they never saved one
    async fn saved_genres(&self, steam_id: &str) -> AppResult<Option<Vec<String>>>;

    /// Records or replaces the user's genre filter
    async fn save_genres(&self, steam_id: &str, genres: &[String]) -> AppResult<()>;

    /// Removes the genre filter, returning whether one existed
    async fn delete_saved_genres(&self, steam_id: &str) -> AppResult<bool>;
}

/// Recommendation history and the user event log
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationStore: Send + Sync {
    /// Persists a recommendation; a repeat of an existing (user, game) pair is
    /// reported as `AlreadyRecommended`, not as an error
    async fn save_recommendation(
        &self,
        steam_id: &str,
        recommendation: &ValidatedRecommendation,
        requested_genres: &[String],
    ) -> AppResult<SaveOutcome>;

    /// A page of history, newest first
    async fn list_recommendations(
        &self,
        steam_id: &str,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<StoredRecommendation>>;

    async fn count_recommendations(&self, steam_id: &str) -> AppResult<i64>;

    async fn record_event(&self, steam_id: &str, kind: EventKind, game_id: &str) -> AppResult<()>;

    /// Newest first, optionally restricted to one kind
    async fn list_events(
        &self,
        steam_id: &str,
        kind: Option<EventKind>,
        limit: i64,
    ) -> AppResult<Vec<UserEvent>>;
}

/// PostgreSQL implementation of both stores
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RecommendationRow {
    game_id: String,
    title: String,
    thumbnail: String,
    release_date: String,
    publisher: String,
    developer: String,
    price: String,
    sale_price: String,
    description: String,
    reasoning: String,
    match_score: i64,
    requested_genres: Json<Vec<String>>,
    created_at: DateTime<Utc>,
}

impl From<RecommendationRow> for StoredRecommendation {
    fn from(row: RecommendationRow) -> Self {
        StoredRecommendation {
            game: DisplayGame {
                id: row.game_id.clone(),
                title: row.title,
                thumbnail: row.thumbnail,
                release_date: row.release_date,
                publisher: row.publisher,
                developer: row.developer,
                price: row.price,
                sale_price: row.sale_price,
                description: row.description,
            },
            game_id: row.game_id,
            reasoning: row.reasoning,
            match_score: row.match_score,
            requested_genres: row.requested_genres.0,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct EventRow {
    event_type: String,
    game_id: String,
    created_at: DateTime<Utc>,
}

impl EventRow {
    /// `None` for an event type this build does not know
    fn into_event(self) -> Option<UserEvent> {
        Some(UserEvent {
            event_type: EventKind::parse(&self.event_type)?,
            game_id: self.game_id,
            created_at: self.created_at,
        })
    }
}

#[async_trait::async_trait]
impl PreferenceStore for PgStore {
    async fn recommended_game_ids(&self, steam_id: &str) -> AppResult<Vec<String>> {
        let ids = sqlx::query_scalar("SELECT game_id FROM recommendations WHERE steam_id = $1")
            .bind(steam_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }

    async fn preference_game_ids(
        &self,
        steam_id: &str,
        preference: Preference,
    ) -> AppResult<Vec<String>> {
        let ids = sqlx::query_scalar(
            r#"
            SELECT game_id FROM preferences
            WHERE steam_id = $1 AND preference = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(steam_id)
        .bind(preference.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn set_preference(
        &self,
        steam_id: &str,
        game_id: &str,
        preference: Preference,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO preferences (steam_id, game_id, preference)
            VALUES ($1, $2, $3)
            ON CONFLICT (steam_id, game_id) DO UPDATE
            SET preference = EXCLUDED.preference, created_at = now()
            "#,
        )
        .bind(steam_id)
        .bind(game_id)
        .bind(preference.as_str())
        .execute(&self.pool)
        .await?;

        tracing::info!(
            steam_id = %steam_id,
            game_id = %game_id,
            preference = %preference,
            "Preference saved"
        );

        Ok(())
    }

    async fn delete_preference(&self, steam_id: &str, game_id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM preferences WHERE steam_id = $1 AND game_id = $2")
            .bind(steam_id)
            .bind(game_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn saved_genres(&self, steam_id: &str) -> AppResult<Option<Vec<String>>> {
        let genres: Option<Json<Vec<String>>> =
            sqlx::query_scalar("SELECT genres FROM filter_genres WHERE steam_id = $1")
                .bind(steam_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(genres.map(|genres| genres.0))
    }

    async fn save_genres(&self, steam_id: &str, genres: &[String]) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO filter_genres (steam_id, genres)
            VALUES ($1, $2)
            ON CONFLICT (steam_id) DO UPDATE
            SET genres = EXCLUDED.genres, updated_at = now()
            "#,
        )
        .bind(steam_id)
        .bind(Json(genres))
        .execute(&self.pool)
        .await?;

        tracing::info!(steam_id = %steam_id, genres = ?genres, "Genre filter saved");

        Ok(())
    }

    async fn delete_saved_genres(&self, steam_id: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM filter_genres WHERE steam_id = $1")
            .bind(steam_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl RecommendationStore for PgStore {
    async fn save_recommendation(
        &self,
        steam_id: &str,
        recommendation: &ValidatedRecommendation,
        requested_genres: &[String],
    ) -> AppResult<SaveOutcome> {
        let game = &recommendation.game;

        let inserted: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO recommendations
                (steam_id, game_id, title, thumbnail, release_date, publisher, developer,
                 price, sale_price, description, reasoning, match_score, requested_genres)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (steam_id, game_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(steam_id)
        .bind(&recommendation.game_id)
        .bind(&game.title)
        .bind(&game.thumbnail)
        .bind(&game.release_date)
        .bind(&game.publisher)
        .bind(&game.developer)
        .bind(&game.price)
        .bind(&game.sale_price)
        .bind(&game.description)
        .bind(&recommendation.reasoning)
        .bind(recommendation.match_score)
        .bind(Json(requested_genres))
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(id) => Ok(SaveOutcome::Saved(id)),
            None => {
                tracing::info!(
                    steam_id = %steam_id,
                    game_id = %recommendation.game_id,
                    "Duplicate recommendation not saved"
                );
                Ok(SaveOutcome::AlreadyRecommended)
            }
        }
    }

    async fn list_recommendations(
        &self,
        steam_id: &str,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<StoredRecommendation>> {
        let rows: Vec<RecommendationRow> = sqlx::query_as(
            r#"
            SELECT game_id, title, thumbnail, release_date, publisher, developer, price,
                   sale_price, description, reasoning, match_score, requested_genres, created_at
            FROM recommendations
            WHERE steam_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(steam_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(StoredRecommendation::from).collect())
    }

    async fn count_recommendations(&self, steam_id: &str) -> AppResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM recommendations WHERE steam_id = $1")
            .bind(steam_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn record_event(&self, steam_id: &str, kind: EventKind, game_id: &str) -> AppResult<()> {
        sqlx::query("INSERT INTO user_events (steam_id, event_type, game_id) VALUES ($1, $2, $3)")
            .bind(steam_id)
            .bind(kind.as_str())
            .bind(game_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_events(
        &self,
        steam_id: &str,
        kind: Option<EventKind>,
        limit: i64,
    ) -> AppResult<Vec<UserEvent>> {
        let rows: Vec<EventRow> = sqlx::query_as(
            r#"
            SELECT event_type, game_id, created_at
            FROM user_events
            WHERE steam_id = $1 AND ($2::TEXT IS NULL OR event_type = $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3
            "#,
        )
        .bind(steam_id)
        .bind(kind.map(|kind| kind.as_str()))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().filter_map(EventRow::into_event).collect())
    }
}
