/// Course community board: posts, comments and policy acceptances

use lms_shared::models::{
    comment::{Comment, CreateComment},
    policy::Policy,
    post::{CreatePost, Post, PostChanges},
    user::User,
};
use lms_shared::store::Store;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::{ServiceError, ServiceResult};
use crate::envelope::Envelope;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PostRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PostUpdateRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Content is required"))]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CommentRequest {
    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PoliciesRequest {
    #[validate(length(min = 1, message = "At least one policy is required"))]
    pub names: Vec<String>,
}

/// Number of removed rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub count: u64,
}

#[derive(Clone)]
pub struct BoardService {
    store: Arc<dyn Store>,
}

impl BoardService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn require_post(&self, id: Uuid) -> ServiceResult<Post> {
        self.store
            .find_post(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Post not found"))
    }

    async fn require_comment(&self, id: Uuid) -> ServiceResult<Comment> {
        self.store
            .find_comment(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Comment not found"))
    }

    // Posts

    pub async fn get_post(&self, id: Uuid) -> ServiceResult<Envelope<Post>> {
        let post = self.require_post(id).await?;
        Ok(Envelope::ok("Successfully fetch post info", post))
    }

    /// Posts of a course, newest first
    pub async fn get_all_posts(&self, course_id: Uuid) -> ServiceResult<Envelope<Vec<Post>>> {
        let posts = self.store.list_posts(course_id).await?;
        if posts.is_empty() {
            return Err(ServiceError::not_found("No Posts found"));
        }
        Ok(Envelope::ok("Successfully fetch all Posts info", posts))
    }

    pub async fn create_post(&self, course_id: Uuid, user: &User, req: PostRequest) -> ServiceResult<Envelope<Post>> {
        if self.store.find_course(course_id).await?.is_none() {
            return Err(ServiceError::not_found("course not found"));
        }

        let post = self
            .store
            .create_post(CreatePost {
                title: req.title,
                content: req.content,
                course_id,
                author_id: user.id,
            })
            .await?;

        tracing::info!(post_id = %post.id, course_id = %course_id, "Post created");
        Ok(Envelope::ok("Successfully create post record", post))
    }

    pub async fn update_post(&self, id: Uuid, req: PostUpdateRequest) -> ServiceResult<Envelope<Post>> {
        self.require_post(id).await?;

        let changes = PostChanges {
            title: req.title,
            content: req.content,
        };
        if changes.is_empty() {
            return Err(ServiceError::wrong_keys());
        }

        let post = self
            .store
            .update_post(id, changes)
            .await?
            .ok_or_else(|| ServiceError::not_found("Post not found"))?;
        Ok(Envelope::ok("Successfully updated post record", post))
    }

    pub async fn delete_post(&self, id: Uuid) -> ServiceResult<Envelope<Post>> {
        let post = self.require_post(id).await?;
        self.store.delete_post(id).await?;
        Ok(Envelope::ok("Successfully deleted post record", post))
    }

    // Comments

    pub async fn create_post_comment(
        &self,
        post_id: Uuid,
        user: &User,
        req: CommentRequest,
    ) -> ServiceResult<Envelope<Comment>> {
        self.require_post(post_id).await?;

        let comment = self
            .store
            .create_comment(CreateComment {
                content: req.content,
                post_id,
                author_id: user.id,
            })
            .await?;

        Ok(Envelope::ok("Successfully create comment record", comment))
    }

    /// Comments of a post, oldest first; may be empty
    pub async fn get_post_comments(&self, post_id: Uuid) -> ServiceResult<Envelope<Vec<Comment>>> {
        let comments = self.store.list_comments(post_id).await?;
        Ok(Envelope::ok("Successfully fetch all Comments info", comments))
    }

    pub async fn update_post_comment(&self, id: Uuid, req: CommentRequest) -> ServiceResult<Envelope<Comment>> {
        self.require_comment(id).await?;

        let comment = self
            .store
            .update_comment(id, req.content)
            .await?
            .ok_or_else(|| ServiceError::not_found("Comment not found"))?;
        Ok(Envelope::ok("Successfully updated comment record", comment))
    }

    pub async fn delete_post_comment(&self, id: Uuid) -> ServiceResult<Envelope<Comment>> {
        let comment = self.require_comment(id).await?;
        self.store.delete_comment(id).await?;
        Ok(Envelope::ok("Successfully deleted comment record", comment))
    }

    // Policies

    pub async fn create_policies(&self, user: &User, req: PoliciesRequest) -> ServiceResult<Envelope<Vec<Policy>>> {
        let policies = self.store.create_policies(user.id, req.names).await?;
        Ok(Envelope::ok("Successfully accepted policies", policies))
    }

    pub async fn get_user_policies(&self, user: &User) -> ServiceResult<Envelope<Vec<Policy>>> {
        let policies = self.store.list_policies(user.id).await?;
        Ok(Envelope::ok("Successfully fetch user policies", policies))
    }

    /// Removes every acceptance record
    pub async fn delete_policies(&self) -> ServiceResult<Envelope<Deleted>> {
        let count = self.store.delete_all_policies().await?;

        tracing::warn!(count, "All policy acceptances removed");
        Ok(Envelope::ok("Successfully deleted policies", Deleted { count }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_shared::models::{
        course::CreateCourse,
        user::{CreateUser, Role},
    };
    use lms_shared::store::{CourseStore, MemoryStore, UserStore};

    async fn fixture() -> (BoardService, User, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let user = store
            .create_user(CreateUser {
                first_name: "Pat".to_string(),
                last_name: "Poster".to_string(),
                email: "pat@example.com".to_string(),
                password_hash: "unused".to_string(),
                phone: "555".to_string(),
                role: Role::User,
                photo: None,
            })
            .await
            .unwrap();
        let course = store
            .create_course(CreateCourse {
                title: "Rust".to_string(),
                description: "d".to_string(),
            })
            .await
            .unwrap();

        (BoardService::new(store), user, course.id)
    }

    fn post(title: &str) -> PostRequest {
        PostRequest {
            title: title.to_string(),
            content: "Hello".to_string(),
        }
    }

    #[tokio::test]
    async fn test_posts_lifecycle() {
        let (service, user, course_id) = fixture().await;

        assert_eq!(service.get_all_posts(course_id).await.unwrap_err().public_message(), "No Posts found");

        let first = service.create_post(course_id, &user, post("first")).await.unwrap().data;
        service.create_post(course_id, &user, post("second")).await.unwrap();

        let posts = service.get_all_posts(course_id).await.unwrap().data;
        assert_eq!(posts[0].title, "second");

        let err = service.update_post(first.id, PostUpdateRequest::default()).await.unwrap_err();
        assert_eq!(err.public_message(), "wrong keys");

        let updated = service
            .update_post(
                first.id,
                PostUpdateRequest {
                    content: Some("Edited".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .data;
        assert_eq!(updated.content, "Edited");
        assert_eq!(updated.title, "first");

        service.delete_post(first.id).await.unwrap();
        assert!(service.get_post(first.id).await.is_err());
    }

    #[test]
    fn test_blank_post_update_is_invalid() {
        let blank_title = PostUpdateRequest {
            title: Some(String::new()),
            ..Default::default()
        };
        assert!(blank_title.validate().is_err());

        let blank_content = PostUpdateRequest {
            content: Some(String::new()),
            ..Default::default()
        };
        assert!(blank_content.validate().is_err());
    }

    #[tokio::test]
    async fn test_post_on_missing_course() {
        let (service, user, _) = fixture().await;
        let err = service.create_post(Uuid::new_v4(), &user, post("x")).await.unwrap_err();
        assert_eq!(err.public_message(), "course not found");
    }

    #[tokio::test]
    async fn test_comments() {
        let (service, user, course_id) = fixture().await;
        let p = service.create_post(course_id, &user, post("topic")).await.unwrap().data;

        assert!(service.get_post_comments(p.id).await.unwrap().data.is_empty());

        let comment = service
            .create_post_comment(p.id, &user, CommentRequest { content: "+1".to_string() })
            .await
            .unwrap()
            .data;
        assert_eq!(comment.author_id, user.id);

        let edited = service
            .update_post_comment(comment.id, CommentRequest { content: "+2".to_string() })
            .await
            .unwrap()
            .data;
        assert_eq!(edited.content, "+2");

        service.delete_post(p.id).await.unwrap();
        let err = service.delete_post_comment(comment.id).await.unwrap_err();
        assert_eq!(err.public_message(), "Comment not found");
    }

    #[tokio::test]
    async fn test_policies() {
        let (service, user, _) = fixture().await;

        let created = service
            .create_policies(
                &user,
                PoliciesRequest {
                    names: vec!["terms".to_string(), "privacy".to_string()],
                },
            )
            .await
            .unwrap();
        assert_eq!(created.data.len(), 2);
        assert_eq!(service.get_user_policies(&user).await.unwrap().data.len(), 2);

        let deleted = service.delete_policies().await.unwrap();
        assert_eq!(deleted.data, Deleted { count: 2 });
        assert!(service.get_user_policies(&user).await.unwrap().data.is_empty());
    }
}
