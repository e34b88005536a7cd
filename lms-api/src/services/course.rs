/// Course tree: courses, modules, chapters and sections
///
/// All four levels share one contract:
///
/// | Operation        | Failure                                   |
/// |------------------|-------------------------------------------|
/// | get one          | not found                                 |
/// | list by parent   | empty result (`"No Modules found"`, ...)  |
/// | create           | duplicate course title; missing parent    |
/// | update           | not found; no known keys (`"wrong keys"`) |
/// | delete           | not found; returns the deleted record     |
///
/// Children are created under the parent named by the request's `id` field.

use lms_shared::models::{
    chapter::{Chapter, CreateChapter},
    course::{Course, CreateCourse},
    module::{CreateModule, Module},
    section::{CreateSection, Section},
    user::User,
    ContentChanges,
};
use lms_shared::store::{Store, StoreError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use super::{ServiceError, ServiceResult};
use crate::envelope::Envelope;

const TITLE_TAKEN: &str = "Course already exist with specified title";

/// New course
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CourseRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
}

/// New module, chapter or section; `id` is the parent
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChildRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    pub id: Uuid,
}

/// Title/description changes for any level of the tree
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ContentUpdateRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: Option<String>,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: Option<String>,
}

impl From<ContentUpdateRequest> for ContentChanges {
    fn from(req: ContentUpdateRequest) -> Self {
        ContentChanges {
            title: req.title,
            description: req.description,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AssignCourseRequest {
    pub user_id: Uuid,
    pub course_id: Uuid,
}

/// Module with its chapters, for learner navigation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleOutline {
    #[serde(flatten)]
    pub module: Module,
    pub chapters: Vec<Chapter>,
}

/// Sections of a chapter plus the caller's completion flag
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSections {
    pub chapter_id: Uuid,
    pub completed: bool,
    pub sections: Vec<Section>,
}

/// Aggregate counts for one course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseReport {
    pub course_id: Uuid,
    pub title: String,
    pub modules: usize,
    pub chapters: usize,
    pub sections: usize,
    pub learners: i64,
    pub completed_chapters: i64,
}

/// Empty object payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Empty {}

fn found<T>(value: Option<T>, message: &str) -> ServiceResult<T> {
    value.ok_or_else(|| ServiceError::not_found(message))
}

fn non_empty<T>(items: Vec<T>, message: &str) -> ServiceResult<Vec<T>> {
    if items.is_empty() {
        return Err(ServiceError::not_found(message));
    }
    Ok(items)
}

fn title_conflict(err: StoreError) -> ServiceError {
    match err {
        StoreError::UniqueViolation(_) => ServiceError::Conflict(TITLE_TAKEN.to_string()),
        other => other.into(),
    }
}

#[derive(Clone)]
pub struct CourseService {
    store: Arc<dyn Store>,
}

impl CourseService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    // Courses

    pub async fn get_course(&self, id: Uuid) -> ServiceResult<Envelope<Course>> {
        let course = found(self.store.find_course(id).await?, "course not found")?;
        Ok(Envelope::ok("Successfully fetch Course info", course))
    }

    pub async fn get_all_courses(&self) -> ServiceResult<Envelope<Vec<Course>>> {
        let courses = non_empty(self.store.list_courses().await?, "No Courses found")?;
        Ok(Envelope::ok("Successfully fetch all Courses info", courses))
    }

    pub async fn create_course(&self, req: CourseRequest) -> ServiceResult<Envelope<Course>> {
        if self.store.find_course_by_title(&req.title).await?.is_some() {
            return Err(ServiceError::Conflict(TITLE_TAKEN.to_string()));
        }

        let course = self
            .store
            .create_course(CreateCourse {
                title: req.title,
                description: req.description,
            })
            .await
            .map_err(title_conflict)?;

        tracing::info!(course_id = %course.id, "Course created");
        Ok(Envelope::ok("Successfully create course record", course))
    }

    pub async fn update_course(&self, id: Uuid, req: ContentUpdateRequest) -> ServiceResult<Envelope<Course>> {
        let changes = ContentChanges::from(req);
        found(self.store.find_course(id).await?, "course not found")?;
        if changes.is_empty() {
            return Err(ServiceError::wrong_keys());
        }

        let course = self.store.update_course(id, changes).await.map_err(title_conflict)?;
        let course = found(course, "course not found")?;
        Ok(Envelope::ok("Successfully updated course record", course))
    }

    pub async fn delete_course(&self, id: Uuid) -> ServiceResult<Envelope<Course>> {
        let course = found(self.store.find_course(id).await?, "Course not found")?;
        self.store.delete_course(id).await?;

        tracing::info!(course_id = %id, "Course deleted");
        Ok(Envelope::ok("Successfully deleted course record", course))
    }

    // Modules

    pub async fn get_module(&self, id: Uuid) -> ServiceResult<Envelope<Module>> {
        let module = found(self.store.find_module(id).await?, "Module not found")?;
        Ok(Envelope::ok("Successfully fetch module info", module))
    }

    pub async fn get_all_modules(&self, course_id: Uuid) -> ServiceResult<Envelope<Vec<Module>>> {
        let modules = non_empty(self.store.list_modules(course_id).await?, "No Modules found")?;
        Ok(Envelope::ok("Successfully fetch all Modules info", modules))
    }

    pub async fn create_module(&self, req: ChildRequest) -> ServiceResult<Envelope<Module>> {
        let module = self
            .store
            .create_module(CreateModule {
                title: req.title,
                description: req.description,
                course_id: req.id,
            })
            .await?;

        Ok(Envelope::ok("Successfully create module record", module))
    }

    pub async fn update_module(&self, id: Uuid, req: ContentUpdateRequest) -> ServiceResult<Envelope<Module>> {
        let changes = ContentChanges::from(req);
        found(self.store.find_module(id).await?, "Module not found")?;
        if changes.is_empty() {
            return Err(ServiceError::wrong_keys());
        }

        let module = found(self.store.update_module(id, changes).await?, "Module not found")?;
        Ok(Envelope::ok("Successfully updated module record", module))
    }

    pub async fn delete_module(&self, id: Uuid) -> ServiceResult<Envelope<Module>> {
        let module = found(self.store.find_module(id).await?, "Module not found")?;
        self.store.delete_module(id).await?;
        Ok(Envelope::ok("Successfully deleted module record", module))
    }

    // Chapters

    pub async fn get_chapter(&self, id: Uuid) -> ServiceResult<Envelope<Chapter>> {
        let chapter = found(self.store.find_chapter(id).await?, "Chapter not found")?;
        Ok(Envelope::ok("Successfully fetch Chapter info", chapter))
    }

    pub async fn get_all_chapters(&self, module_id: Uuid) -> ServiceResult<Envelope<Vec<Chapter>>> {
        let chapters = non_empty(self.store.list_chapters(module_id).await?, "No Chapters found")?;
        Ok(Envelope::ok("Successfully fetch all Chapters info", chapters))
    }

    pub async fn create_chapter(&self, req: ChildRequest) -> ServiceResult<Envelope<Chapter>> {
        let chapter = self
            .store
            .create_chapter(CreateChapter {
                title: req.title,
                description: req.description,
                module_id: req.id,
            })
            .await?;

        Ok(Envelope::ok("Successfully create chapter record", chapter))
    }

    pub async fn update_chapter(&self, id: Uuid, req: ContentUpdateRequest) -> ServiceResult<Envelope<Chapter>> {
        let changes = ContentChanges::from(req);
        found(self.store.find_chapter(id).await?, "Chapter not found")?;
        if changes.is_empty() {
            return Err(ServiceError::wrong_keys());
        }

        let chapter = found(self.store.update_chapter(id, changes).await?, "Chapter not found")?;
        Ok(Envelope::ok("Successfully updated chapter record", chapter))
    }

    pub async fn delete_chapter(&self, id: Uuid) -> ServiceResult<Envelope<Chapter>> {
        let chapter = found(self.store.find_chapter(id).await?, "Chapter not found")?;
        self.store.delete_chapter(id).await?;
        Ok(Envelope::ok("Successfully deleted chapter record", chapter))
    }

    // Sections

    pub async fn get_section(&self, id: Uuid) -> ServiceResult<Envelope<Section>> {
        let section = found(self.store.find_section(id).await?, "section not found")?;
        Ok(Envelope::ok("Successfully fetch section info", section))
    }

    pub async fn get_all_sections(&self, chapter_id: Uuid) -> ServiceResult<Envelope<Vec<Section>>> {
        let sections = non_empty(self.store.list_sections(chapter_id).await?, "No Sections found")?;
        Ok(Envelope::ok("Successfully fetch all Sections info", sections))
    }

    pub async fn create_section(&self, req: ChildRequest) -> ServiceResult<Envelope<Section>> {
        let section = self
            .store
            .create_section(CreateSection {
                title: req.title,
                description: req.description,
                chapter_id: req.id,
            })
            .await?;

        Ok(Envelope::ok("Successfully create section record", section))
    }

    pub async fn update_section(&self, id: Uuid, req: ContentUpdateRequest) -> ServiceResult<Envelope<Section>> {
        let changes = ContentChanges::from(req);
        found(self.store.find_section(id).await?, "section not found")?;
        if changes.is_empty() {
            return Err(ServiceError::wrong_keys());
        }

        let section = found(self.store.update_section(id, changes).await?, "section not found")?;
        Ok(Envelope::ok("Successfully updated section record", section))
    }

    pub async fn delete_section(&self, id: Uuid) -> ServiceResult<Envelope<Section>> {
        let section = found(self.store.find_section(id).await?, "Section not found")?;
        self.store.delete_section(id).await?;
        Ok(Envelope::ok("Successfully deleted section record", section))
    }

    // Assignments and learner views

    /// Links a user to a course; repeating the call is a no-op
    pub async fn assign_course(&self, req: AssignCourseRequest) -> ServiceResult<Envelope<Empty>> {
        found(self.store.find_course(req.course_id).await?, "course not found")?;
        found(self.store.find_user(req.user_id).await?, "user not found")?;

        self.store.assign_course(req.user_id, req.course_id).await?;

        tracing::info!(user_id = %req.user_id, course_id = %req.course_id, "Course assigned");
        Ok(Envelope::ok("Successfully assigned course", Empty {}))
    }

    pub async fn get_all_assigned_courses(&self, user_id: Uuid) -> ServiceResult<Envelope<Vec<Course>>> {
        found(self.store.find_user(user_id).await?, "User not found")?;
        let courses = non_empty(self.store.list_assigned_courses(user_id).await?, "No Courses found")?;
        Ok(Envelope::ok("Successfully fetch all assigned Courses info", courses))
    }

    /// Modules of a course with their chapters nested
    pub async fn get_all_user_modules(&self, course_id: Uuid) -> ServiceResult<Envelope<Vec<ModuleOutline>>> {
        let modules = non_empty(self.store.list_modules(course_id).await?, "No Modules found")?;

        let mut outline = Vec::with_capacity(modules.len());
        for module in modules {
            let chapters = self.store.list_chapters(module.id).await?;
            outline.push(ModuleOutline { module, chapters });
        }

        Ok(Envelope::ok("Successfully fetch all Modules info", outline))
    }

    pub async fn get_all_user_sections(&self, chapter_id: Uuid, user: &User) -> ServiceResult<Envelope<UserSections>> {
        let sections = non_empty(self.store.list_sections(chapter_id).await?, "No Sections found")?;
        let completed = self
            .store
            .find_chapter_progress(user.id, chapter_id)
            .await?
            .map(|progress| progress.completed)
            .unwrap_or(false);

        Ok(Envelope::ok(
            "Successfully fetch all Sections info",
            UserSections {
                chapter_id,
                completed,
                sections,
            },
        ))
    }

    pub async fn get_course_report(&self, course_id: Uuid) -> ServiceResult<Envelope<CourseReport>> {
        let course = found(self.store.find_course(course_id).await?, "course not found")?;

        let modules = self.store.list_modules(course_id).await?;
        let mut chapters = 0;
        let mut sections = 0;
        for module in &modules {
            for chapter in self.store.list_chapters(module.id).await? {
                chapters += 1;
                sections += self.store.list_sections(chapter.id).await?.len();
            }
        }

        let report = CourseReport {
            course_id,
            title: course.title,
            modules: modules.len(),
            chapters,
            sections,
            learners: self.store.count_course_assignees(course_id).await?,
            completed_chapters: self.store.count_completed_chapters(course_id).await?,
        };

        Ok(Envelope::ok("Successfully fetch course report", report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lms_shared::models::user::{CreateUser, Role};
    use lms_shared::store::{MemoryStore, UserStore};

    fn service() -> (CourseService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (CourseService::new(store.clone()), store)
    }

    fn course(title: &str) -> CourseRequest {
        CourseRequest {
            title: title.to_string(),
            description: "An introduction".to_string(),
        }
    }

    fn child(parent: Uuid, title: &str) -> ChildRequest {
        ChildRequest {
            title: title.to_string(),
            description: "body".to_string(),
            id: parent,
        }
    }

    fn title_change(title: &str) -> ContentUpdateRequest {
        ContentUpdateRequest {
            title: Some(title.to_string()),
            description: None,
        }
    }

    async fn learner(store: &MemoryStore) -> User {
        store
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
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_unknown_course() {
        let (service, _) = service();
        let err = service.get_course(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.public_message(), "course not found");
    }

    #[tokio::test]
    async fn test_duplicate_title_conflicts() {
        let (service, _) = service();
        service.create_course(course("Rust")).await.unwrap();

        let err = service.create_course(course("Rust")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(ref m) if m == TITLE_TAKEN));
    }

    #[tokio::test]
    async fn test_empty_update_always_fails() {
        let (service, _) = service();
        let created = service.create_course(course("Rust")).await.unwrap().data;

        let err = service.update_course(created.id, ContentUpdateRequest::default()).await.unwrap_err();
        assert_eq!(err.public_message(), "wrong keys");

        let err = service
            .update_course(Uuid::new_v4(), ContentUpdateRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn test_blank_update_fields_are_invalid() {
        assert!(title_change("").validate().is_err());
        assert!(ContentUpdateRequest {
            description: Some(String::new()),
            ..Default::default()
        }
        .validate()
        .is_err());
        assert!(ContentUpdateRequest::default().validate().is_ok());
    }

    #[tokio::test]
    async fn test_update_merges_supplied_keys() {
        let (service, _) = service();
        let created = service.create_course(course("Rust")).await.unwrap().data;

        let updated = service.update_course(created.id, title_change("Rust 2")).await.unwrap().data;
        assert_eq!(updated.title, "Rust 2");
        assert_eq!(updated.description, "An introduction");
    }

    #[tokio::test]
    async fn test_update_to_taken_title_conflicts() {
        let (service, _) = service();
        service.create_course(course("Rust")).await.unwrap();
        let go = service.create_course(course("Go")).await.unwrap().data;

        let err = service.update_course(go.id, title_change("Rust")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_then_get() {
        let (service, _) = service();
        let created = service.create_course(course("Rust")).await.unwrap().data;

        let deleted = service.delete_course(created.id).await.unwrap();
        assert_eq!(deleted.data, created);

        let err = service.get_course(created.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_chapter_and_section_updates_hit_their_own_rows() {
        let (service, _) = service();
        let c = service.create_course(course("Rust")).await.unwrap().data;
        let m = service.create_module(child(c.id, "Module")).await.unwrap().data;
        let ch = service.create_chapter(child(m.id, "Chapter")).await.unwrap().data;
        let s = service.create_section(child(ch.id, "Section")).await.unwrap().data;

        let chapter = service.update_chapter(ch.id, title_change("Chapter 1")).await.unwrap().data;
        let section = service.update_section(s.id, title_change("Section 1")).await.unwrap().data;

        assert_eq!(chapter.title, "Chapter 1");
        assert_eq!(section.title, "Section 1");
        assert_eq!(service.get_module(m.id).await.unwrap().data.title, "Module");
    }

    #[tokio::test]
    async fn test_child_under_missing_parent() {
        let (service, _) = service();
        let err = service.create_module(child(Uuid::new_v4(), "Orphan")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Store(StoreError::ForeignKeyViolation(_))));
    }

    #[tokio::test]
    async fn test_empty_lists() {
        let (service, _) = service();
        let id = Uuid::new_v4();

        assert_eq!(service.get_all_courses().await.unwrap_err().public_message(), "No Courses found");
        assert_eq!(service.get_all_modules(id).await.unwrap_err().public_message(), "No Modules found");
        assert_eq!(service.get_all_chapters(id).await.unwrap_err().public_message(), "No Chapters found");
        assert_eq!(service.get_all_sections(id).await.unwrap_err().public_message(), "No Sections found");
    }

    #[tokio::test]
    async fn test_assign_and_list() {
        let (service, store) = service();
        let user = learner(&store).await;
        let c = service.create_course(course("Rust")).await.unwrap().data;

        let err = service
            .assign_course(AssignCourseRequest {
                user_id: user.id,
                course_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.public_message(), "course not found");

        let err = service
            .assign_course(AssignCourseRequest {
                user_id: Uuid::new_v4(),
                course_id: c.id,
            })
            .await
            .unwrap_err();
        assert_eq!(err.public_message(), "user not found");

        for _ in 0..2 {
            service
                .assign_course(AssignCourseRequest {
                    user_id: user.id,
                    course_id: c.id,
                })
                .await
                .unwrap();
        }

        let assigned = service.get_all_assigned_courses(user.id).await.unwrap().data;
        assert_eq!(assigned, vec![c]);
    }

    #[tokio::test]
    async fn test_outline_sections_and_report() {
        let (service, store) = service();
        let user = learner(&store).await;
        let c = service.create_course(course("Rust")).await.unwrap().data;
        let m = service.create_module(child(c.id, "Module")).await.unwrap().data;
        let ch = service.create_chapter(child(m.id, "Chapter")).await.unwrap().data;
        service.create_section(child(ch.id, "S1")).await.unwrap();
        service.create_section(child(ch.id, "S2")).await.unwrap();

        let outline = service.get_all_user_modules(c.id).await.unwrap().data;
        assert_eq!(outline.len(), 1);
        assert_eq!(outline[0].chapters, vec![ch.clone()]);

        let sections = service.get_all_user_sections(ch.id, &user).await.unwrap().data;
        assert_eq!(sections.sections.len(), 2);
        assert!(!sections.completed);

        let report = service.get_course_report(c.id).await.unwrap().data;
        assert_eq!(report.modules, 1);
        assert_eq!(report.chapters, 1);
        assert_eq!(report.sections, 2);
        assert_eq!(report.learners, 0);
        assert_eq!(report.completed_chapters, 0);
    }
}
