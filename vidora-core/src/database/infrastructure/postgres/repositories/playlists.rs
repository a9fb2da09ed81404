use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{OWNER_JSON, VIDEO_CARD_COLUMNS};
use crate::database::ports::playlists::PlaylistsRepository;
use crate::domain::{OwnerSummary, Playlist, PlaylistDetail, PlaylistSummary, VideoCard};
use crate::error::{CoreError, Result};

const PLAYLIST_SELECT: &str = r#"
    SELECT
        p.id, p.name, p.description, p.owner_id, p.created_at, p.updated_at,
        ARRAY(
            SELECT pv.video_id FROM playlist_videos pv
            WHERE pv.playlist_id = p.id
            ORDER BY pv.position
        ) AS videos
    FROM playlists p
    WHERE p.id = $1
"#;

#[derive(sqlx::FromRow)]
struct PlaylistHeader {
    id: Uuid,
    name: String,
    description: String,
    owner_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[sqlx(json)]
    owner: OwnerSummary,
}

#[derive(Clone, Debug)]
pub struct PostgresPlaylistsRepository {
    pool: PgPool,
}

impl PostgresPlaylistsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn load_in(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<Playlist> {
        sqlx::query_as::<_, Playlist>(PLAYLIST_SELECT)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| CoreError::not_found("Playlist not found"))
    }

    async fn touch(tx: &mut Transaction<'_, Postgres>, id: Uuid) -> Result<()> {
        let touched = sqlx::query("UPDATE playlists SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?
            .rows_affected();
        if touched == 0 {
            return Err(CoreError::not_found("Playlist not found"));
        }
        Ok(())
    }
}

#[async_trait]
impl PlaylistsRepository for PostgresPlaylistsRepository {
    async fn create_playlist(&self, owner: Uuid, name: &str, description: &str) -> Result<Playlist> {
        let id = Uuid::now_v7();
        let mut tx = self.pool().begin().await?;
        sqlx::query(
            r#"
            INSERT INTO playlists (id, owner_id, name, description)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(name)
        .bind(description)
        .execute(&mut *tx)
        .await?;
        let playlist = Self::load_in(&mut tx, id).await?;
        tx.commit().await?;
        Ok(playlist)
    }

    async fn get_playlist(&self, id: Uuid) -> Result<Option<Playlist>> {
        let playlist = sqlx::query_as::<_, Playlist>(PLAYLIST_SELECT)
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(playlist)
    }

    async fn playlist_detail(&self, id: Uuid) -> Result<Option<PlaylistDetail>> {
        let header = sqlx::query_as::<_, PlaylistHeader>(&format!(
            r#"
            SELECT p.id, p.name, p.description, p.owner_id, p.created_at, p.updated_at,
                   {OWNER_JSON} AS owner
            FROM playlists p
            JOIN users u ON u.id = p.owner_id
            WHERE p.id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        let Some(header) = header else {
            return Ok(None);
        };

        let videos = sqlx::query_as::<_, VideoCard>(&format!(
            r#"
            SELECT {VIDEO_CARD_COLUMNS}
            FROM playlist_videos pv
            JOIN videos v ON v.id = pv.video_id
            JOIN users u ON u.id = v.owner_id
            WHERE pv.playlist_id = $1 AND v.is_published
            ORDER BY pv.position
            "#
        ))
        .bind(id)
        .fetch_all(self.pool())
        .await?;

        let playlist = Playlist {
            id: header.id,
            name: header.name,
            description: header.description,
            owner: header.owner_id,
            videos: videos.iter().map(|v| v.id).collect(),
            created_at: header.created_at,
            updated_at: header.updated_at,
        };
        Ok(Some(PlaylistDetail::new(&playlist, header.owner, videos)))
    }

    async fn user_playlists(&self, owner: Uuid) -> Result<Vec<PlaylistSummary>> {
        let playlists = sqlx::query_as::<_, PlaylistSummary>(
            r#"
            SELECT
                p.id, p.name, p.description, p.created_at, p.updated_at,
                COUNT(v.id) AS total_videos,
                COALESCE(SUM(v.views), 0)::BIGINT AS total_views
            FROM playlists p
            LEFT JOIN playlist_videos pv ON pv.playlist_id = p.id
            LEFT JOIN videos v ON v.id = pv.video_id
            WHERE p.owner_id = $1
            GROUP BY p.id
            ORDER BY p.created_at DESC
            "#,
        )
        .bind(owner)
        .fetch_all(self.pool())
        .await?;
        Ok(playlists)
    }

    async fn update_playlist(
        &self,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Playlist> {
        let mut tx = self.pool().begin().await?;
        sqlx::query(
            r#"
            UPDATE playlists
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .execute(&mut *tx)
        .await?;
        let playlist = Self::load_in(&mut tx, id).await?;
        tx.commit().await?;
        Ok(playlist)
    }

    async fn delete_playlist(&self, id: Uuid) -> Result<()> {
        let deleted = sqlx::query("DELETE FROM playlists WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?
            .rows_affected();
        if deleted == 0 {
            return Err(CoreError::not_found("Playlist not found"));
        }
        Ok(())
    }

    async fn add_video(&self, id: Uuid, video: Uuid) -> Result<Playlist> {
        let mut tx = self.pool().begin().await?;
        Self::touch(&mut tx, id).await?;
        sqlx::query(
            r#"
            INSERT INTO playlist_videos (playlist_id, video_id, position)
            VALUES (
                $1, $2,
                COALESCE((SELECT MAX(position) + 1 FROM playlist_videos WHERE playlist_id = $1), 0)
            )
            ON CONFLICT (playlist_id, video_id) DO NOTHING
            "#,
        )
        .bind(id)
        .bind(video)
        .execute(&mut *tx)
        .await?;
        let playlist = Self::load_in(&mut tx, id).await?;
        tx.commit().await?;
        Ok(playlist)
    }

    async fn remove_video(&self, id: Uuid, video: Uuid) -> Result<Playlist> {
        let mut tx = self.pool().begin().await?;
        Self::touch(&mut tx, id).await?;
        sqlx::query("DELETE FROM playlist_videos WHERE playlist_id = $1 AND video_id = $2")
            .bind(id)
            .bind(video)
            .execute(&mut *tx)
            .await?;
        let playlist = Self::load_in(&mut tx, id).await?;
        tx.commit().await?;
        Ok(playlist)
    }
}
