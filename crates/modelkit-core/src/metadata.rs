use std::sync::Arc;

use crate::material::Texture;

/// Descriptive information about a loaded file.
///
/// Formats that carry both a local-language and an English ("universal") text fill both
/// variants.
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub title: Option<String>,
    pub title_universal: Option<String>,
    pub comment: Option<String>,
    pub comment_universal: Option<String>,
    pub author: Option<String>,
    pub copyright: Option<String>,
    pub generator: Option<String>,
    pub thumbnail: Option<Arc<Texture>>,
}

impl Metadata {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.title_universal.is_none()
            && self.comment.is_none()
            && self.comment_universal.is_none()
            && self.author.is_none()
            && self.copyright.is_none()
            && self.generator.is_none()
            && self.thumbnail.is_none()
    }
}
