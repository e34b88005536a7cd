/// Learner progress: chapter completion and last-seen section
///
/// Writes always act on the calling user; reads take the user id from the path.

use lms_shared::models::{
    progress::{ChapterProgress, LastSeen, UpsertChapterProgress},
    user::User,
};
use lms_shared::store::Store;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::{ServiceError, ServiceResult};
use crate::envelope::Envelope;

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChapterProgressRequest {
    pub course_id: Uuid,
    pub chapter_id: Uuid,
    pub completed: bool,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LastSeenRequest {
    pub course_id: Uuid,
    pub section_id: Uuid,
}

#[derive(Clone)]
pub struct ProgressService {
    store: Arc<dyn Store>,
}

impl ProgressService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    async fn require_course(&self, course_id: Uuid) -> ServiceResult<()> {
        if self.store.find_course(course_id).await?.is_none() {
            return Err(ServiceError::not_found("course not found"));
        }
        Ok(())
    }

    /// Whether `chapter_id` sits in a module of `course_id`
    async fn chapter_in_course(&self, chapter_id: Uuid, course_id: Uuid) -> ServiceResult<bool> {
        let Some(chapter) = self.store.find_chapter(chapter_id).await? else {
            return Ok(false);
        };
        let module = self.store.find_module(chapter.module_id).await?;
        Ok(module.is_some_and(|m| m.course_id == course_id))
    }

    /// Records the caller's completion state for a chapter
    pub async fn update_user_chapter_progress(
        &self,
        req: ChapterProgressRequest,
        user: &User,
    ) -> ServiceResult<Envelope<ChapterProgress>> {
        self.require_course(req.course_id).await?;
        if !self.chapter_in_course(req.chapter_id, req.course_id).await? {
            return Err(ServiceError::not_found("Chapter not found"));
        }

        let progress = self
            .store
            .upsert_chapter_progress(UpsertChapterProgress {
                user_id: user.id,
                course_id: req.course_id,
                chapter_id: req.chapter_id,
                completed: req.completed,
            })
            .await?;

        tracing::debug!(
            user_id = %user.id,
            chapter_id = %req.chapter_id,
            completed = req.completed,
            "Chapter progress recorded"
        );
        Ok(Envelope::ok("Successfully updated chapter progress", progress))
    }

    /// Progress rows of a user in a course; an empty list is a valid answer
    pub async fn get_user_chapter_progress(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> ServiceResult<Envelope<Vec<ChapterProgress>>> {
        let rows = self.store.list_chapter_progress(user_id, course_id).await?;
        Ok(Envelope::ok("Successfully fetch chapter progress", rows))
    }

    pub async fn get_last_seen(&self, user_id: Uuid, course_id: Uuid) -> ServiceResult<Envelope<LastSeen>> {
        let last_seen = self
            .store
            .find_last_seen(user_id, course_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Last seen not found"))?;

        Ok(Envelope::ok("Successfully fetch last seen", last_seen))
    }

    pub async fn update_last_seen(&self, req: LastSeenRequest, user: &User) -> ServiceResult<Envelope<LastSeen>> {
        self.require_course(req.course_id).await?;
        let in_course = match self.store.find_section(req.section_id).await? {
            Some(section) => self.chapter_in_course(section.chapter_id, req.course_id).await?,
            None => false,
        };
        if !in_course {
            return Err(ServiceError::not_found("section not found"));
        }

        let last_seen = self
            .store
            .upsert_last_seen(user.id, req.course_id, req.section_id)
            .await?;

        Ok(Envelope::ok("Successfully updated last seen", last_seen))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_shared::models::{
        chapter::CreateChapter,
        course::CreateCourse,
        module::CreateModule,
        section::CreateSection,
        user::{CreateUser, Role},
    };
    use lms_shared::store::{CourseStore, MemoryStore, UserStore};

    struct Fixture {
        service: ProgressService,
        user: User,
        course_id: Uuid,
        chapter_id: Uuid,
        section_id: Uuid,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let user = store
            .create_user(CreateUser {
                first_name: "Lin".to_string(),
                last_name: "Learner".to_string(),
                email: "lin@example.com".to_string(),
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
        let module = store
            .create_module(CreateModule {
                title: "M".to_string(),
                description: "d".to_string(),
                course_id: course.id,
            })
            .await
            .unwrap();
        let chapter = store
            .create_chapter(CreateChapter {
                title: "C".to_string(),
                description: "d".to_string(),
                module_id: module.id,
            })
            .await
            .unwrap();
        let section = store
            .create_section(CreateSection {
                title: "S".to_string(),
                description: "d".to_string(),
                chapter_id: chapter.id,
            })
            .await
            .unwrap();

        Fixture {
            service: ProgressService::new(store),
            user,
            course_id: course.id,
            chapter_id: chapter.id,
            section_id: section.id,
        }
    }

    #[tokio::test]
    async fn test_progress_upsert_overwrites() {
        let f = fixture().await;

        for completed in [false, true] {
            f.service
                .update_user_chapter_progress(
                    ChapterProgressRequest {
                        course_id: f.course_id,
                        chapter_id: f.chapter_id,
                        completed,
                    },
                    &f.user,
                )
                .await
                .unwrap();
        }

        let rows = f.service.get_user_chapter_progress(f.user.id, f.course_id).await.unwrap().data;
        assert_eq!(rows.len(), 1);
        assert!(rows[0].completed);
    }

    #[tokio::test]
    async fn test_progress_unknown_chapter() {
        let f = fixture().await;
        let err = f
            .service
            .update_user_chapter_progress(
                ChapterProgressRequest {
                    course_id: f.course_id,
                    chapter_id: Uuid::new_v4(),
                    completed: true,
                },
                &f.user,
            )
            .await
            .unwrap_err();

        assert_eq!(err.public_message(), "Chapter not found");
    }

    async fn other_course(f: &Fixture) -> Uuid {
        f.service
            .store
            .create_course(CreateCourse {
                title: "Go".to_string(),
                description: "d".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_progress_rejects_chapter_of_another_course() {
        let f = fixture().await;
        let course_id = other_course(&f).await;

        let err = f
            .service
            .update_user_chapter_progress(
                ChapterProgressRequest {
                    course_id,
                    chapter_id: f.chapter_id,
                    completed: true,
                },
                &f.user,
            )
            .await
            .unwrap_err();

        assert_eq!(err.public_message(), "Chapter not found");
        assert!(f.service.get_user_chapter_progress(f.user.id, course_id).await.unwrap().data.is_empty());
    }

    #[tokio::test]
    async fn test_last_seen_rejects_section_of_another_course() {
        let f = fixture().await;
        let course_id = other_course(&f).await;

        let err = f
            .service
            .update_last_seen(
                LastSeenRequest {
                    course_id,
                    section_id: f.section_id,
                },
                &f.user,
            )
            .await
            .unwrap_err();

        assert_eq!(err.public_message(), "section not found");
        assert!(f.service.get_last_seen(f.user.id, course_id).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_progress_is_ok() {
        let f = fixture().await;
        let rows = f.service.get_user_chapter_progress(f.user.id, f.course_id).await.unwrap();
        assert!(rows.data.is_empty());
    }

    #[tokio::test]
    async fn test_last_seen_roundtrip() {
        let f = fixture().await;

        let err = f.service.get_last_seen(f.user.id, f.course_id).await.unwrap_err();
        assert_eq!(err.public_message(), "Last seen not found");

        f.service
            .update_last_seen(
                LastSeenRequest {
                    course_id: f.course_id,
                    section_id: f.section_id,
                },
                &f.user,
            )
            .await
            .unwrap();

        let seen = f.service.get_last_seen(f.user.id, f.course_id).await.unwrap().data;
        assert_eq!(seen.section_id, f.section_id);
    }
}
