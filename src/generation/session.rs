use std::path::{Path, PathBuf};

use crate::{
    error::{BannerError, Result},
    models::{FailureKind, GenerationOutcome, Layout, ReferenceImage},
};

use super::{
    download::{banner_filename, save_png, FilenameStyle},
    BannerClient,
};

/// Per-layout state owned by the presentation layer.
///
/// `generate` borrows the session mutably, so a second call cannot start while one is
/// pending; sessions for different layouts share nothing.
#[derive(Debug, Clone)]
pub struct LayoutSession {
    layout: Layout,
    prompt: String,
    reference: Option<ReferenceImage>,
    outcome: Option<GenerationOutcome>,
}

impl LayoutSession {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            prompt: String::new(),
            reference: None,
            outcome: None,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn reference(&self) -> Option<&ReferenceImage> {
        self.reference.as_ref()
    }

    /// Replaces any previously attached image.
    pub fn attach_reference(&mut self, reference: ReferenceImage) {
        self.reference = Some(reference);
    }

    /// Attaches an uploaded file; a non-image upload leaves the session with no reference.
    pub fn attach_upload(&mut self, bytes: &[u8], declared_mime: Option<&str>) -> bool {
        self.reference = ReferenceImage::from_upload(bytes, declared_mime);
        self.reference.is_some()
    }

    pub fn clear_reference(&mut self) {
        self.reference = None;
    }

    pub fn outcome(&self) -> Option<&GenerationOutcome> {
        self.outcome.as_ref()
    }

    pub fn clear_outcome(&mut self) {
        self.outcome = None;
    }

    pub fn can_generate(&self) -> bool {
        !self.prompt.trim().is_empty()
    }

    /// What to show in the layout's preview: the generated image, else the reference.
    pub fn preview(&self) -> Option<String> {
        self.outcome
            .as_ref()
            .and_then(GenerationOutcome::to_data_url)
            .or_else(|| self.reference.as_ref().map(|r| r.data_url().to_string()))
    }

    pub fn error_message(&self) -> Option<String> {
        self.outcome.as_ref().and_then(GenerationOutcome::display_error)
    }

    pub async fn generate(&mut self, client: &BannerClient) -> &GenerationOutcome {
        self.outcome = None;

        let outcome = if self.can_generate() {
            client
                .generate(&self.layout, &self.prompt, self.reference.as_ref())
                .await
        } else {
            GenerationOutcome::failure(FailureKind::MalformedInput, BannerError::EmptyPrompt.to_string())
        };

        self.outcome.insert(outcome)
    }

    pub fn download_filename(&self, style: FilenameStyle) -> Option<String> {
        match &self.outcome {
            Some(outcome) if outcome.is_success() => {
                Some(banner_filename(&self.layout, &self.prompt, style))
            }
            _ => None,
        }
    }

    pub fn save_to(&self, dir: impl AsRef<Path>, style: FilenameStyle) -> Result<PathBuf> {
        match &self.outcome {
            Some(GenerationOutcome::Success { image, mime_type }) => {
                if mime_type != "image/png" {
                    log::warn!("Saving {} data under a .png name", mime_type);
                }
                save_png(dir, &banner_filename(&self.layout, &self.prompt, style), image)
            }
            _ => Err(BannerError::ResponseError(format!(
                "No generated image for layout '{}'",
                self.layout.id
            ))),
        }
    }
}

/// Which layouts were written to disk and which were not, with the reason.
#[derive(Debug, Default)]
pub struct SaveReport {
    pub saved: Vec<(String, PathBuf)>,
    pub failed: Vec<(String, String)>,
}

impl SaveReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Saves every session that produced an image. A failed generation or a failed write is
/// recorded against its layout and the rest of the batch is still saved.
pub fn save_all(sessions: &[LayoutSession], dir: &Path, style: FilenameStyle) -> SaveReport {
    let mut report = SaveReport::default();
    for session in sessions {
        let id = session.layout().id.clone();
        if let Some(message) = session.error_message() {
            log::error!("❌ {}: {}", id, message);
            report.failed.push((id, message));
            continue;
        }
        match session.save_to(dir, style) {
            Ok(path) => {
                log::info!("✅ {} → {}", id, path.display());
                report.saved.push((id, path));
            }
            Err(e) => {
                log::error!("❌ {}: could not save banner: {}", id, e);
                report.failed.push((id, e.to_string()));
            }
        }
    }
    report
}
