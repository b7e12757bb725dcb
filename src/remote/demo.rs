use async_trait::async_trait;
use serde_json::json;

use super::{CollectionSource, WriteReply};
use crate::error::{AppError, AppResult};
use crate::record::Record;
use crate::screen::Screen;

/// Built-in sample records, used when a live read fails with nothing on
/// screen yet, and for `--offline` browsing. Read-only.
pub struct DemoSource;

/// Sample dataset for a screen, if it has one.
pub fn dataset(screen_id: &str) -> Option<Vec<Record>> {
    let values = match screen_id {
        "blog" => json!([
            {"id": "demo-post-1", "title": "Golden Hour on the Quad", "author": "Photo Club",
             "date": "2025-03-14", "tags": ["landscape", "campus"], "status": "published",
             "excerpt": "Notes from our spring photo walk."},
            {"id": "demo-post-2", "title": "Night Sky Workshop Recap", "author": "Photo Club",
             "date": "2025-02-02", "tags": ["astro", "workshop"], "status": "published",
             "excerpt": "Long exposures, star trails and cold hands."},
            {"id": "demo-post-3", "title": "Portrait Lighting 101", "author": "Photo Club",
             "date": "2025-01-10", "tags": ["portrait"], "status": "draft",
             "excerpt": "One light, one reflector, many looks."}
        ]),
        "gallery" => json!([
            {"id": "demo-photo-1", "title": "Library Steps", "photographer": "Sample Member",
             "category": "architecture", "uploadedAt": "2025-03-01",
             "imageUrl": "https://example.com/demo/library.jpg"},
            {"id": "demo-photo-2", "title": "Morning Fog", "photographer": "Sample Member",
             "category": "landscape", "uploadedAt": "2025-02-20",
             "imageUrl": "https://example.com/demo/fog.jpg"}
        ]),
        "applications" => json!([
            {"id": "demo-app-1", "Full Name": "Sample Applicant", "Email": "applicant@example.com",
             "Student ID": "000000", "Department": "Fine Arts", "Timestamp": "2025-03-05",
             "status": "pending"},
            {"id": "demo-app-2", "Full Name": "Another Applicant", "Email": "another@example.com",
             "Student ID": "000001", "Department": "Physics", "Timestamp": "2025-02-27",
             "status": "approved"}
        ]),
        "submissions" => json!([
            {"submissionId": "demo-sub-1", "name": "Sample Entrant", "email": "entrant@example.com",
             "photoTitle": "Reflections", "category": "street", "timestamp": "2025-03-10",
             "status": "pending"}
        ]),
        _ => return None,
    };

    match values {
        serde_json::Value::Array(items) => {
            Some(items.into_iter().filter_map(Record::from_value).collect())
        }
        _ => None,
    }
}

#[async_trait]
impl CollectionSource for DemoSource {
    fn id(&self) -> &str {
        "demo"
    }

    fn is_demo(&self) -> bool {
        true
    }

    async fn fetch_raw(
        &self,
        screen: &Screen,
        _params: &[(String, String)],
    ) -> AppResult<Vec<Record>> {
        dataset(screen.id).ok_or_else(|| {
            AppError::EndpointNotFound(format!("no demo data for screen '{}'", screen.id))
        })
    }

    async fn send(&self, screen: &Screen, _fields: &[(String, String)]) -> AppResult<WriteReply> {
        Err(AppError::Validation(format!(
            "{} is showing demo data; changes cannot be saved",
            screen.title
        )))
    }
}
