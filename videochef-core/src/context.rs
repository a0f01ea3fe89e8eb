//! Immutable snapshot of a creation run's accumulated state.
//!
//! Each transition returns a new context; earlier snapshots are never touched.
//! Steps share contexts through `Arc` so concurrent steps can read the same
//! snapshot without copying.

use uuid::Uuid;

use crate::types::RecipeCaption;

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionContext {
    recipe_id: Uuid,
    video_id: String,
    video_url: String,
    video_title: Option<String>,
    file_uri: Option<String>,
    mime_type: Option<String>,
    caption: Option<RecipeCaption>,
}

impl ExecutionContext {
    /// Seed context for a new run: no file info, no caption.
    pub fn of(recipe_id: Uuid, video_id: impl Into<String>, video_url: impl Into<String>) -> Self {
        Self {
            recipe_id,
            video_id: video_id.into(),
            video_url: video_url.into(),
            video_title: None,
            file_uri: None,
            mime_type: None,
            caption: None,
        }
    }

    /// Seed context carrying the title reported by the video host.
    pub fn of_titled(
        recipe_id: Uuid,
        video_id: impl Into<String>,
        video_url: impl Into<String>,
        video_title: impl Into<String>,
    ) -> Self {
        Self {
            video_title: Some(video_title.into()),
            ..Self::of(recipe_id, video_id, video_url)
        }
    }

    /// Copy of this context with the verified file attached.
    ///
    /// Only the verify step attaches file info; a context never has it
    /// replaced.
    pub fn with_file_info(&self, file_uri: impl Into<String>, mime_type: impl Into<String>) -> Self {
        debug_assert!(
            self.file_uri.is_none() && self.mime_type.is_none(),
            "file info is already attached"
        );
        Self {
            file_uri: Some(file_uri.into()),
            mime_type: Some(mime_type.into()),
            ..self.clone()
        }
    }

    /// Copy of this context with the extracted caption attached.
    pub fn with_caption(&self, caption: RecipeCaption) -> Self {
        debug_assert!(self.caption.is_none(), "caption is already attached");
        Self {
            caption: Some(caption),
            ..self.clone()
        }
    }

    pub fn recipe_id(&self) -> Uuid {
        self.recipe_id
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn video_url(&self) -> &str {
        &self.video_url
    }

    pub fn video_title(&self) -> Option<&str> {
        self.video_title.as_deref()
    }

    pub fn file_uri(&self) -> Option<&str> {
        self.file_uri.as_deref()
    }

    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    pub fn caption(&self) -> Option<&RecipeCaption> {
        self.caption.as_ref()
    }

    /// `(file_uri, mime_type)` when both are present.
    pub fn file_info(&self) -> Option<(&str, &str)> {
        Some((self.file_uri.as_deref()?, self.mime_type.as_deref()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caption(recipe_id: Uuid) -> RecipeCaption {
        RecipeCaption {
            id: Uuid::new_v4(),
            recipe_id,
            lang_code: "en".to_string(),
            segments: vec![],
        }
    }

    #[test]
    fn seed_context_has_no_file_or_caption() {
        let ctx = ExecutionContext::of(Uuid::new_v4(), "video-456", "https://youtu.be/video-456");
        assert_eq!(ctx.video_id(), "video-456");
        assert_eq!(ctx.video_title(), None);
        assert_eq!(ctx.file_uri(), None);
        assert_eq!(ctx.mime_type(), None);
        assert!(ctx.caption().is_none());
        assert!(ctx.file_info().is_none());
    }

    #[test]
    fn with_file_info_leaves_original_untouched() {
        let seed = ExecutionContext::of_titled(Uuid::new_v4(), "v", "https://youtu.be/v", "Title");
        let verified = seed.with_file_info("s3://bucket/file.mp4", "video/mp4");

        assert_eq!(seed.file_uri(), None);
        assert_eq!(verified.file_info(), Some(("s3://bucket/file.mp4", "video/mp4")));
        assert_eq!(verified.video_title(), Some("Title"));
        assert_eq!(verified.recipe_id(), seed.recipe_id());
    }

    #[test]
    fn with_caption_carries_file_info_forward() {
        let recipe_id = Uuid::new_v4();
        let verified = ExecutionContext::of(recipe_id, "v", "https://youtu.be/v")
            .with_file_info("s3://bucket/file.mp4", "video/mp4");
        let captioned = verified.with_caption(caption(recipe_id));

        assert!(verified.caption().is_none());
        assert_eq!(captioned.file_info(), verified.file_info());
        assert_eq!(captioned.caption().map(|c| c.recipe_id), Some(recipe_id));
    }

    #[test]
    fn empty_mime_type_still_counts_as_present() {
        let ctx = ExecutionContext::of(Uuid::new_v4(), "v", "u").with_file_info("s3://x", "");
        assert_eq!(ctx.file_info(), Some(("s3://x", "")));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "file info is already attached")]
    fn file_info_is_never_replaced() {
        let verified =
            ExecutionContext::of(Uuid::new_v4(), "v", "u").with_file_info("s3://a", "video/mp4");
        let _ = verified.with_file_info("s3://b", "video/mp4");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "caption is already attached")]
    fn caption_is_never_replaced() {
        let recipe_id = Uuid::new_v4();
        let captioned =
            ExecutionContext::of(recipe_id, "v", "u").with_caption(caption(recipe_id));
        let _ = captioned.with_caption(caption(recipe_id));
    }
}
