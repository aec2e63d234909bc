use async_trait::async_trait;
use facilitrack_core::facility::{Comment, NewComment};
use facilitrack_core::storage::{CommentRepository, Result};
use uuid::Uuid;

use super::TableRepository;
use crate::storage::conversions::{comment_to_item, item_to_comment};
use crate::storage::keys;
use crate::storage::store::{KeyQuery, PutCondition, SortCondition};

#[async_trait]
impl CommentRepository for TableRepository {
    async fn insert_comment(&self, comment: &NewComment) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let item = comment_to_item(&comment.clone().into_comment(id))?;

        self.store.put_item(item, PutCondition::Always).await?;

        tracing::debug!(task_id = %comment.task_id, comment_id = %id, "inserted comment");
        Ok(id)
    }

    async fn list_comments_for_task(
        &self,
        facility_id: Uuid,
        space_id: Uuid,
        task_id: Uuid,
    ) -> Result<Vec<Comment>> {
        let query = KeyQuery::primary(
            keys::task_partition(facility_id, space_id)?,
            SortCondition::BeginsWith(keys::comment_prefix(task_id)?),
        );

        let items = self.store.query(&query).await?;
        items.iter().map(item_to_comment).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::storage::repository::test_support::repository;

    #[tokio::test]
    async fn test_comments_listed_per_task() {
        let (repo, _) = repository();
        let (f, s, t) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let created_at = Utc::now() - Duration::minutes(5);
        let draft = NewComment {
            facility_id: f,
            space_id: s,
            task_id: t,
            text: "Waiting on parts".to_string(),
            created_at,
            author_email: "alice@x.com".to_string(),
            author_name: "Alice Smith".to_string(),
        };

        let id = repo.insert_comment(&draft).await.unwrap();
        repo.insert_comment(&NewComment {
            task_id: Uuid::new_v4(),
            ..draft.clone()
        })
        .await
        .unwrap();

        let comments = repo.list_comments_for_task(f, s, t).await.unwrap();
        assert_eq!(comments, vec![draft.into_comment(id)]);
    }

    #[tokio::test]
    async fn test_comments_for_task_without_comments() {
        let (repo, _) = repository();
        let comments = repo
            .list_comments_for_task(Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap();
        assert!(comments.is_empty());
    }
}
