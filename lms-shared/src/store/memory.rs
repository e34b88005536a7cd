/// In-process gateway
///
/// Keeps every table in a `Vec` behind one `tokio::sync::RwLock`. Rows stay in
/// insertion order, which doubles as `created_at ASC`. Unique keys, foreign
/// keys and `ON DELETE CASCADE` follow the SQL migrations so that services
/// behave the same against either backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{BoardStore, CourseStore, ProgressStore, Store, StoreError, StoreResult, UserStore};
use crate::models::{
    chapter::{Chapter, CreateChapter},
    comment::{Comment, CreateComment},
    course::{Course, CreateCourse},
    module::{CreateModule, Module},
    policy::Policy,
    post::{CreatePost, Post, PostChanges},
    progress::{ChapterProgress, LastSeen, UpsertChapterProgress},
    section::{CreateSection, Section},
    user::{CreateUser, UpdateUser, User},
    ContentChanges,
};

#[derive(Debug, Clone)]
struct Assignment {
    user_id: Uuid,
    course_id: Uuid,
}

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    courses: Vec<Course>,
    modules: Vec<Module>,
    chapters: Vec<Chapter>,
    sections: Vec<Section>,
    assignments: Vec<Assignment>,
    progress: Vec<ChapterProgress>,
    last_seen: Vec<LastSeen>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    policies: Vec<Policy>,
}

fn fk(table: &str, column: &str) -> StoreError {
    StoreError::ForeignKeyViolation(format!("{}_{}_fkey", table, column))
}

fn merge_content(
    changes: ContentChanges,
    title: &mut String,
    description: &mut String,
    updated_at: &mut DateTime<Utc>,
) {
    if let Some(new_title) = changes.title {
        *title = new_title;
    }
    if let Some(new_description) = changes.description {
        *description = new_description;
    }
    *updated_at = Utc::now();
}

impl Tables {
    fn user_exists(&self, id: Uuid) -> bool {
        self.users.iter().any(|u| u.id == id)
    }

    fn course_exists(&self, id: Uuid) -> bool {
        self.courses.iter().any(|c| c.id == id)
    }

    fn drop_sections(&mut self, ids: &[Uuid]) {
        self.last_seen.retain(|l| !ids.contains(&l.section_id));
        self.sections.retain(|s| !ids.contains(&s.id));
    }

    fn drop_chapters(&mut self, ids: &[Uuid]) {
        let sections: Vec<Uuid> = self
            .sections
            .iter()
            .filter(|s| ids.contains(&s.chapter_id))
            .map(|s| s.id)
            .collect();
        self.drop_sections(&sections);
        self.progress.retain(|p| !ids.contains(&p.chapter_id));
        self.chapters.retain(|c| !ids.contains(&c.id));
    }

    fn drop_modules(&mut self, ids: &[Uuid]) {
        let chapters: Vec<Uuid> = self
            .chapters
            .iter()
            .filter(|c| ids.contains(&c.module_id))
            .map(|c| c.id)
            .collect();
        self.drop_chapters(&chapters);
        self.modules.retain(|m| !ids.contains(&m.id));
    }

    fn drop_posts(&mut self, ids: &[Uuid]) {
        self.comments.retain(|c| !ids.contains(&c.post_id));
        self.posts.retain(|p| !ids.contains(&p.id));
    }

    fn drop_course(&mut self, id: Uuid) {
        let modules: Vec<Uuid> = self
            .modules
            .iter()
            .filter(|m| m.course_id == id)
            .map(|m| m.id)
            .collect();
        self.drop_modules(&modules);

        let posts: Vec<Uuid> = self.posts.iter().filter(|p| p.course_id == id).map(|p| p.id).collect();
        self.drop_posts(&posts);

        self.assignments.retain(|a| a.course_id != id);
        self.progress.retain(|p| p.course_id != id);
        self.last_seen.retain(|l| l.course_id != id);
        self.courses.retain(|c| c.id != id);
    }

    fn drop_user(&mut self, id: Uuid) {
        let posts: Vec<Uuid> = self.posts.iter().filter(|p| p.author_id == id).map(|p| p.id).collect();
        self.drop_posts(&posts);

        self.comments.retain(|c| c.author_id != id);
        self.assignments.retain(|a| a.user_id != id);
        self.progress.retain(|p| p.user_id != id);
        self.last_seen.retain(|l| l.user_id != id);
        self.policies.retain(|p| p.user_id != id);
        self.users.retain(|u| u.id != id);
    }
}

/// Store keeping every row in process memory
///
/// Used by the integration tests; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.tables.read().await.users.clone())
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == data.email) {
            return Err(StoreError::UniqueViolation("users_email_key".to_string()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            first_name: data.first_name,
            last_name: data.last_name,
            email: data.email,
            password_hash: data.password_hash,
            phone: data.phone,
            role: data.role,
            photo: data.photo,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());

        Ok(user)
    }

    async fn update_user(&self, id: Uuid, data: UpdateUser) -> StoreResult<Option<User>> {
        let mut tables = self.tables.write().await;
        if let Some(email) = &data.email {
            if tables.users.iter().any(|u| u.id != id && &u.email == email) {
                return Err(StoreError::UniqueViolation("users_email_key".to_string()));
            }
        }

        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        data.apply(user);
        user.updated_at = Utc::now();

        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.user_exists(id) {
            return Ok(false);
        }
        tables.drop_user(id);
        Ok(true)
    }
}

#[async_trait]
impl CourseStore for MemoryStore {
    async fn find_course(&self, id: Uuid) -> StoreResult<Option<Course>> {
        let tables = self.tables.read().await;
        Ok(tables.courses.iter().find(|c| c.id == id).cloned())
    }

    async fn find_course_by_title(&self, title: &str) -> StoreResult<Option<Course>> {
        let tables = self.tables.read().await;
        Ok(tables.courses.iter().find(|c| c.title == title).cloned())
    }

    async fn list_courses(&self) -> StoreResult<Vec<Course>> {
        Ok(self.tables.read().await.courses.clone())
    }

    async fn create_course(&self, data: CreateCourse) -> StoreResult<Course> {
        let mut tables = self.tables.write().await;
        if tables.courses.iter().any(|c| c.title == data.title) {
            return Err(StoreError::UniqueViolation("courses_title_key".to_string()));
        }

        let now = Utc::now();
        let course = Course {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            created_at: now,
            updated_at: now,
        };
        tables.courses.push(course.clone());

        Ok(course)
    }

    async fn update_course(&self, id: Uuid, changes: ContentChanges) -> StoreResult<Option<Course>> {
        let mut tables = self.tables.write().await;
        if let Some(title) = &changes.title {
            if tables.courses.iter().any(|c| c.id != id && &c.title == title) {
                return Err(StoreError::UniqueViolation("courses_title_key".to_string()));
            }
        }

        let Some(course) = tables.courses.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        merge_content(changes, &mut course.title, &mut course.description, &mut course.updated_at);

        Ok(Some(course.clone()))
    }

    async fn delete_course(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.course_exists(id) {
            return Ok(false);
        }
        tables.drop_course(id);
        Ok(true)
    }

    async fn assign_course(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if !tables.user_exists(user_id) {
            return Err(fk("course_assignments", "user_id"));
        }
        if !tables.course_exists(course_id) {
            return Err(fk("course_assignments", "course_id"));
        }

        let exists = tables
            .assignments
            .iter()
            .any(|a| a.user_id == user_id && a.course_id == course_id);
        if !exists {
            tables.assignments.push(Assignment { user_id, course_id });
        }

        Ok(())
    }

    async fn list_assigned_courses(&self, user_id: Uuid) -> StoreResult<Vec<Course>> {
        let tables = self.tables.read().await;
        let courses = tables
            .assignments
            .iter()
            .filter(|a| a.user_id == user_id)
            .filter_map(|a| tables.courses.iter().find(|c| c.id == a.course_id).cloned())
            .collect();
        Ok(courses)
    }

    async fn count_course_assignees(&self, course_id: Uuid) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables.assignments.iter().filter(|a| a.course_id == course_id).count() as i64)
    }

    async fn find_module(&self, id: Uuid) -> StoreResult<Option<Module>> {
        let tables = self.tables.read().await;
        Ok(tables.modules.iter().find(|m| m.id == id).cloned())
    }

    async fn list_modules(&self, course_id: Uuid) -> StoreResult<Vec<Module>> {
        let tables = self.tables.read().await;
        Ok(tables.modules.iter().filter(|m| m.course_id == course_id).cloned().collect())
    }

    async fn create_module(&self, data: CreateModule) -> StoreResult<Module> {
        let mut tables = self.tables.write().await;
        if !tables.course_exists(data.course_id) {
            return Err(fk("modules", "course_id"));
        }

        let now = Utc::now();
        let module = Module {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            course_id: data.course_id,
            created_at: now,
            updated_at: now,
        };
        tables.modules.push(module.clone());

        Ok(module)
    }

    async fn update_module(&self, id: Uuid, changes: ContentChanges) -> StoreResult<Option<Module>> {
        let mut tables = self.tables.write().await;
        let Some(module) = tables.modules.iter_mut().find(|m| m.id == id) else {
            return Ok(None);
        };
        merge_content(changes, &mut module.title, &mut module.description, &mut module.updated_at);

        Ok(Some(module.clone()))
    }

    async fn delete_module(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.modules.iter().any(|m| m.id == id) {
            return Ok(false);
        }
        tables.drop_modules(&[id]);
        Ok(true)
    }

    async fn find_chapter(&self, id: Uuid) -> StoreResult<Option<Chapter>> {
        let tables = self.tables.read().await;
        Ok(tables.chapters.iter().find(|c| c.id == id).cloned())
    }

    async fn list_chapters(&self, module_id: Uuid) -> StoreResult<Vec<Chapter>> {
        let tables = self.tables.read().await;
        Ok(tables.chapters.iter().filter(|c| c.module_id == module_id).cloned().collect())
    }

    async fn create_chapter(&self, data: CreateChapter) -> StoreResult<Chapter> {
        let mut tables = self.tables.write().await;
        if !tables.modules.iter().any(|m| m.id == data.module_id) {
            return Err(fk("chapters", "module_id"));
        }

        let now = Utc::now();
        let chapter = Chapter {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            module_id: data.module_id,
            created_at: now,
            updated_at: now,
        };
        tables.chapters.push(chapter.clone());

        Ok(chapter)
    }

    async fn update_chapter(&self, id: Uuid, changes: ContentChanges) -> StoreResult<Option<Chapter>> {
        let mut tables = self.tables.write().await;
        let Some(chapter) = tables.chapters.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        merge_content(changes, &mut chapter.title, &mut chapter.description, &mut chapter.updated_at);

        Ok(Some(chapter.clone()))
    }

    async fn delete_chapter(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.chapters.iter().any(|c| c.id == id) {
            return Ok(false);
        }
        tables.drop_chapters(&[id]);
        Ok(true)
    }

    async fn find_section(&self, id: Uuid) -> StoreResult<Option<Section>> {
        let tables = self.tables.read().await;
        Ok(tables.sections.iter().find(|s| s.id == id).cloned())
    }

    async fn list_sections(&self, chapter_id: Uuid) -> StoreResult<Vec<Section>> {
        let tables = self.tables.read().await;
        Ok(tables.sections.iter().filter(|s| s.chapter_id == chapter_id).cloned().collect())
    }

    async fn create_section(&self, data: CreateSection) -> StoreResult<Section> {
        let mut tables = self.tables.write().await;
        if !tables.chapters.iter().any(|c| c.id == data.chapter_id) {
            return Err(fk("sections", "chapter_id"));
        }

        let now = Utc::now();
        let section = Section {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            chapter_id: data.chapter_id,
            created_at: now,
            updated_at: now,
        };
        tables.sections.push(section.clone());

        Ok(section)
    }

    async fn update_section(&self, id: Uuid, changes: ContentChanges) -> StoreResult<Option<Section>> {
        let mut tables = self.tables.write().await;
        let Some(section) = tables.sections.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        merge_content(changes, &mut section.title, &mut section.description, &mut section.updated_at);

        Ok(Some(section.clone()))
    }

    async fn delete_section(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.sections.iter().any(|s| s.id == id) {
            return Ok(false);
        }
        tables.drop_sections(&[id]);
        Ok(true)
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn upsert_chapter_progress(&self, data: UpsertChapterProgress) -> StoreResult<ChapterProgress> {
        let mut tables = self.tables.write().await;
        if !tables.user_exists(data.user_id) {
            return Err(fk("chapter_progress", "user_id"));
        }
        if !tables.course_exists(data.course_id) {
            return Err(fk("chapter_progress", "course_id"));
        }
        if !tables.chapters.iter().any(|c| c.id == data.chapter_id) {
            return Err(fk("chapter_progress", "chapter_id"));
        }

        let now = Utc::now();
        if let Some(row) = tables
            .progress
            .iter_mut()
            .find(|p| p.user_id == data.user_id && p.chapter_id == data.chapter_id)
        {
            row.completed = data.completed;
            row.course_id = data.course_id;
            row.updated_at = now;
            return Ok(row.clone());
        }

        let row = ChapterProgress {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            course_id: data.course_id,
            chapter_id: data.chapter_id,
            completed: data.completed,
            created_at: now,
            updated_at: now,
        };
        tables.progress.push(row.clone());

        Ok(row)
    }

    async fn find_chapter_progress(&self, user_id: Uuid, chapter_id: Uuid) -> StoreResult<Option<ChapterProgress>> {
        let tables = self.tables.read().await;
        Ok(tables
            .progress
            .iter()
            .find(|p| p.user_id == user_id && p.chapter_id == chapter_id)
            .cloned())
    }

    async fn list_chapter_progress(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<Vec<ChapterProgress>> {
        let tables = self.tables.read().await;
        Ok(tables
            .progress
            .iter()
            .filter(|p| p.user_id == user_id && p.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn count_completed_chapters(&self, course_id: Uuid) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .progress
            .iter()
            .filter(|p| p.course_id == course_id && p.completed)
            .count() as i64)
    }

    async fn upsert_last_seen(&self, user_id: Uuid, course_id: Uuid, section_id: Uuid) -> StoreResult<LastSeen> {
        let mut tables = self.tables.write().await;
        if !tables.user_exists(user_id) {
            return Err(fk("last_seen", "user_id"));
        }
        if !tables.course_exists(course_id) {
            return Err(fk("last_seen", "course_id"));
        }
        if !tables.sections.iter().any(|s| s.id == section_id) {
            return Err(fk("last_seen", "section_id"));
        }

        let now = Utc::now();
        if let Some(row) = tables
            .last_seen
            .iter_mut()
            .find(|l| l.user_id == user_id && l.course_id == course_id)
        {
            row.section_id = section_id;
            row.updated_at = now;
            return Ok(row.clone());
        }

        let row = LastSeen {
            user_id,
            course_id,
            section_id,
            updated_at: now,
        };
        tables.last_seen.push(row.clone());

        Ok(row)
    }

    async fn find_last_seen(&self, user_id: Uuid, course_id: Uuid) -> StoreResult<Option<LastSeen>> {
        let tables = self.tables.read().await;
        Ok(tables
            .last_seen
            .iter()
            .find(|l| l.user_id == user_id && l.course_id == course_id)
            .cloned())
    }
}

#[async_trait]
impl BoardStore for MemoryStore {
    async fn find_post(&self, id: Uuid) -> StoreResult<Option<Post>> {
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn list_posts(&self, course_id: Uuid) -> StoreResult<Vec<Post>> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .iter()
            .rev()
            .filter(|p| p.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn create_post(&self, data: CreatePost) -> StoreResult<Post> {
        let mut tables = self.tables.write().await;
        if !tables.course_exists(data.course_id) {
            return Err(fk("posts", "course_id"));
        }
        if !tables.user_exists(data.author_id) {
            return Err(fk("posts", "author_id"));
        }

        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            title: data.title,
            content: data.content,
            course_id: data.course_id,
            author_id: data.author_id,
            created_at: now,
            updated_at: now,
        };
        tables.posts.push(post.clone());

        Ok(post)
    }

    async fn update_post(&self, id: Uuid, changes: PostChanges) -> StoreResult<Option<Post>> {
        let mut tables = self.tables.write().await;
        let Some(post) = tables.posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if let Some(title) = changes.title {
            post.title = title;
        }
        if let Some(content) = changes.content {
            post.content = content;
        }
        post.updated_at = Utc::now();

        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if !tables.posts.iter().any(|p| p.id == id) {
            return Ok(false);
        }
        tables.drop_posts(&[id]);
        Ok(true)
    }

    async fn find_comment(&self, id: Uuid) -> StoreResult<Option<Comment>> {
        let tables = self.tables.read().await;
        Ok(tables.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn list_comments(&self, post_id: Uuid) -> StoreResult<Vec<Comment>> {
        let tables = self.tables.read().await;
        Ok(tables.comments.iter().filter(|c| c.post_id == post_id).cloned().collect())
    }

    async fn create_comment(&self, data: CreateComment) -> StoreResult<Comment> {
        let mut tables = self.tables.write().await;
        if !tables.posts.iter().any(|p| p.id == data.post_id) {
            return Err(fk("comments", "post_id"));
        }
        if !tables.user_exists(data.author_id) {
            return Err(fk("comments", "author_id"));
        }

        let now = Utc::now();
        let comment = Comment {
            id: Uuid::new_v4(),
            content: data.content,
            post_id: data.post_id,
            author_id: data.author_id,
            created_at: now,
            updated_at: now,
        };
        tables.comments.push(comment.clone());

        Ok(comment)
    }

    async fn update_comment(&self, id: Uuid, content: String) -> StoreResult<Option<Comment>> {
        let mut tables = self.tables.write().await;
        let Some(comment) = tables.comments.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        comment.content = content;
        comment.updated_at = Utc::now();

        Ok(Some(comment.clone()))
    }

    async fn delete_comment(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.comments.len();
        tables.comments.retain(|c| c.id != id);
        Ok(tables.comments.len() < before)
    }

    async fn create_policies(&self, user_id: Uuid, names: Vec<String>) -> StoreResult<Vec<Policy>> {
        let mut tables = self.tables.write().await;
        if !tables.user_exists(user_id) {
            return Err(fk("policies", "user_id"));
        }

        let now = Utc::now();
        let created: Vec<Policy> = names
            .into_iter()
            .map(|name| Policy {
                id: Uuid::new_v4(),
                user_id,
                name,
                accepted_at: now,
            })
            .collect();
        tables.policies.extend(created.iter().cloned());

        Ok(created)
    }

    async fn list_policies(&self, user_id: Uuid) -> StoreResult<Vec<Policy>> {
        let tables = self.tables.read().await;
        Ok(tables.policies.iter().filter(|p| p.user_id == user_id).cloned().collect())
    }

    async fn delete_all_policies(&self) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let removed = tables.policies.len() as u64;
        tables.policies.clear();
        Ok(removed)
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
