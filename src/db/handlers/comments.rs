//! Database repository for comments.

use async_trait::async_trait;
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

use crate::db::errors::{DbError, Result};
use crate::db::handlers::repository::Repository;
use crate::db::models::comments::{
    CommentCreateDBRequest, CommentDBResponse, CommentUpdateDBRequest,
    CommentWithContextDBResponse,
};
use crate::types::{CommentId, PostId, UserId, abbrev_uuid};

#[derive(Debug, Clone, Default)]
pub struct CommentFilter {
    pub post: Option<PostId>,
    pub owner: Option<UserId>,
    pub approved: Option<bool>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

pub struct Comments<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Comments<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Approved comments under a post, oldest first so threads read in
    /// conversation order, joined with their authors.
    #[instrument(skip(self), fields(post_id = %abbrev_uuid(&post_id)), err)]
    pub async fn list_approved_for_post(
        &mut self,
        post_id: PostId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CommentWithContextDBResponse>> {
        let comments = sqlx::query_as::<_, CommentWithContextDBResponse>(
            r#"
            SELECT c.id, c.content, c.user_id, c.post_id,
                   c.is_approved, c.created_at, c.updated_at,
                   u.first_name AS owner_first_name,
                   u.last_name AS owner_last_name,
                   u.picture_url AS owner_picture_url,
                   p.title AS post_title
            FROM comments c
            JOIN users u ON u.id = c.user_id
            JOIN posts p ON p.id = c.post_id
            WHERE c.post_id = $1 AND c.is_approved = TRUE
            ORDER BY c.created_at ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(post_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(comments)
    }

    /// Comments awaiting moderation, newest first, with their authors and
    /// the title of the post they were left on.
    #[instrument(skip(self), err)]
    pub async fn list_pending_with_context(
        &mut self,
    ) -> Result<Vec<CommentWithContextDBResponse>> {
        let comments = sqlx::query_as::<_, CommentWithContextDBResponse>(
            r#"
            SELECT c.id, c.content, c.user_id, c.post_id,
                   c.is_approved, c.created_at, c.updated_at,
                   u.first_name AS owner_first_name,
                   u.last_name AS owner_last_name,
                   u.picture_url AS owner_picture_url,
                   p.title AS post_title
            FROM comments c
            JOIN users u ON u.id = c.user_id
            JOIN posts p ON p.id = c.post_id
            WHERE c.is_approved = FALSE
            ORDER BY c.created_at DESC
            "#,
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(comments)
    }

    /// Mark a comment as approved. Already-approved comments are left as-is.
    #[instrument(skip(self), fields(comment_id = %abbrev_uuid(&id)), err)]
    pub async fn approve(&mut self, id: CommentId) -> Result<CommentDBResponse> {
        let comment = sqlx::query_as::<_, CommentDBResponse>(
            r#"
            UPDATE comments SET is_approved = TRUE, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(comment)
    }

    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &CommentFilter) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM comments
            WHERE ($1::uuid IS NULL OR post_id = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
              AND ($3::boolean IS NULL OR is_approved = $3)
            "#,
        )
        .bind(filter.post)
        .bind(filter.owner)
        .bind(filter.approved)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(count)
    }
}

#[async_trait]
impl Repository for Comments<'_> {
    type CreateRequest = CommentCreateDBRequest;
    type UpdateRequest = CommentUpdateDBRequest;
    type Response = CommentDBResponse;
    type Id = CommentId;
    type Filter = CommentFilter;

    /// New comments always start unapproved. A missing post surfaces as a
    /// foreign key violation rather than a pre-flight existence check.
    #[instrument(skip(self, request), fields(post_id = %abbrev_uuid(&request.post_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let id = Uuid::new_v4();

        let comment = sqlx::query_as::<_, CommentDBResponse>(
            r#"
            INSERT INTO comments (id, content, user_id, post_id, is_approved)
            VALUES ($1, $2, $3, $4, FALSE)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.content)
        .bind(request.user_id)
        .bind(request.post_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(comment)
    }

    #[instrument(skip(self), fields(comment_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let comment =
            sqlx::query_as::<_, CommentDBResponse>("SELECT * FROM comments WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *self.db)
                .await?;

        Ok(comment)
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let limit = filter.limit.unwrap_or(100);
        let skip = filter.skip.unwrap_or(0);

        let comments = sqlx::query_as::<_, CommentDBResponse>(
            r#"
            SELECT * FROM comments
            WHERE ($1::uuid IS NULL OR post_id = $1)
              AND ($2::uuid IS NULL OR user_id = $2)
              AND ($3::boolean IS NULL OR is_approved = $3)
            ORDER BY created_at DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filter.post)
        .bind(filter.owner)
        .bind(filter.approved)
        .bind(limit)
        .bind(skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(comments)
    }

    /// Partial update. Approval state is never touched here.
    #[instrument(skip(self, request), fields(comment_id = %abbrev_uuid(&id)), err)]
    async fn update(
        &mut self,
        id: Self::Id,
        request: &Self::UpdateRequest,
    ) -> Result<Self::Response> {
        let comment = sqlx::query_as::<_, CommentDBResponse>(
            r#"
            UPDATE comments SET
                content = COALESCE($2, content),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.content)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(comment)
    }

    #[instrument(skip(self), fields(comment_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::users::Role;
    use crate::db::handlers::posts::Posts;
    use crate::db::handlers::users::Users;
    use crate::db::models::posts::PostCreateDBRequest;
    use crate::db::models::users::UserCreateDBRequest;
    use sqlx::PgPool;

    async fn seed_post(conn: &mut PgConnection) -> (UserId, PostId) {
        let mut users = Users::new(conn);
        let user = users
            .create(&UserCreateDBRequest {
                email: format!("{}@example.com", Uuid::new_v4().simple()),
                password_hash: "hash".to_string(),
                role: Role::User,
            })
            .await
            .unwrap();

        let mut posts = Posts::new(conn);
        let post = posts
            .create(&PostCreateDBRequest {
                title: "A post".to_string(),
                description: "words".to_string(),
                image: None,
                user_id: user.id,
            })
            .await
            .unwrap();

        (user.id, post.id)
    }

    #[sqlx::test]
    #[test_log::test]
    async fn new_comments_start_unapproved(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let (user_id, post_id) = seed_post(&mut conn).await;

        let mut comments = Comments::new(&mut conn);
        let comment = comments
            .create(&CommentCreateDBRequest {
                content: "first!".to_string(),
                user_id,
                post_id,
            })
            .await
            .unwrap();
        assert!(!comment.is_approved);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn comment_on_missing_post_is_foreign_key_violation(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let (user_id, _) = seed_post(&mut conn).await;

        let mut comments = Comments::new(&mut conn);
        let err = comments
            .create(&CommentCreateDBRequest {
                content: "orphan".to_string(),
                user_id,
                post_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn approved_comments_read_oldest_first(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let (user_id, post_id) = seed_post(&mut conn).await;

        let mut comments = Comments::new(&mut conn);
        let first = comments
            .create(&CommentCreateDBRequest {
                content: "first".to_string(),
                user_id,
                post_id,
            })
            .await
            .unwrap();
        let second = comments
            .create(&CommentCreateDBRequest {
                content: "second".to_string(),
                user_id,
                post_id,
            })
            .await
            .unwrap();
        comments
            .create(&CommentCreateDBRequest {
                content: "pending".to_string(),
                user_id,
                post_id,
            })
            .await
            .unwrap();

        comments.approve(first.id).await.unwrap();
        comments.approve(second.id).await.unwrap();

        let listed = comments
            .list_approved_for_post(post_id, 10, 0)
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first.id);
        assert_eq!(listed[1].id, second.id);
        assert_eq!(listed[0].post_title, "A post");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn deleting_post_cascades_to_comments(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let (user_id, post_id) = seed_post(&mut conn).await;

        let comment_id = {
            let mut comments = Comments::new(&mut conn);
            comments
                .create(&CommentCreateDBRequest {
                    content: "bye".to_string(),
                    user_id,
                    post_id,
                })
                .await
                .unwrap()
                .id
        };

        let mut posts = Posts::new(&mut conn);
        assert!(posts.delete(post_id).await.unwrap());

        let mut comments = Comments::new(&mut conn);
        assert!(comments.get_by_id(comment_id).await.unwrap().is_none());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn pending_listing_includes_post_context(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let (user_id, post_id) = seed_post(&mut conn).await;

        let mut comments = Comments::new(&mut conn);
        comments
            .create(&CommentCreateDBRequest {
                content: "needs review".to_string(),
                user_id,
                post_id,
            })
            .await
            .unwrap();

        let pending = comments.list_pending_with_context().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].post_title, "A post");
        assert!(!pending[0].is_approved);
    }
}
