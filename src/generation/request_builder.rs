use crate::{
    error::Result,
    models::{GenerationRequest, Layout, Part, ReferenceImage},
};

pub const REFERENCE_CLAUSE: &str = "Use the attached image as a reference and modify it to match the description and dimensions.";
pub const SCRATCH_CLAUSE: &str = "Generate a new image from scratch based on the description.";

/// The single text instruction sent with every request.
pub fn compose_instruction(layout: &Layout, prompt: &str, has_reference: bool) -> String {
    format!(
        "Generate a banner image based on the following description: \"{}\".\n\
         The final image MUST be exactly {} pixels wide and {} pixels tall.\n\
         Ensure the aspect ratio is precisely {}. {}",
        prompt.trim(),
        layout.width,
        layout.height,
        layout.aspect_ratio(),
        if has_reference {
            REFERENCE_CLAUSE
        } else {
            SCRATCH_CLAUSE
        }
    )
}

/// Builds the request for one generation call.
///
/// `prompt` must be non-empty; sessions check this before calling. A reference image
/// whose data URL cannot be split into MIME type and payload fails with
/// `MalformedReferenceImage`.
pub fn build(
    layout: &Layout,
    prompt: &str,
    reference: Option<&ReferenceImage>,
) -> Result<GenerationRequest> {
    let inline = reference.map(ReferenceImage::decode).transpose()?;

    let mut parts = vec![Part::Text {
        body: compose_instruction(layout, prompt, inline.is_some()),
    }];
    if let Some((mime_type, data)) = inline {
        parts.push(Part::InlineBinary { mime_type, data });
    }

    Ok(GenerationRequest::new(parts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::BannerError, models::DEFAULT_IMAGE_MIME};

    #[test]
    fn test_text_only_for_every_layout() {
        for layout in Layout::catalog() {
            let request = build(&layout, "sale banner", None).unwrap();
            assert_eq!(request.parts.len(), 1);

            let text: Vec<&str> = request.texts().collect();
            assert_eq!(text.len(), 1);
            assert!(text[0].contains(&layout.width.to_string()));
            assert!(text[0].contains(&layout.height.to_string()));
            assert!(text[0].contains(&layout.aspect_ratio()));
            assert!(text[0].contains(SCRATCH_CLAUSE));
            assert!(!text[0].contains(REFERENCE_CLAUSE));
            assert_eq!(request.inline_parts().count(), 0);
        }
    }

    #[test]
    fn test_reference_adds_one_inline_part() {
        let reference = ReferenceImage::from_bytes(&[9, 8, 7], "image/webp");
        for layout in Layout::catalog() {
            let request = build(&layout, "spring sale", Some(&reference)).unwrap();
            let inline: Vec<_> = request.inline_parts().collect();
            assert_eq!(inline, vec![("image/webp", &[9u8, 8, 7][..])]);
            assert!(matches!(&request.parts[0], Part::Text { body } if body.contains(REFERENCE_CLAUSE)));
        }
    }

    #[test]
    fn test_undeclared_mime_defaults_to_png() {
        let layout = &Layout::catalog()[0];
        let reference = ReferenceImage::from_data_url("data:;base64,AQID");
        let request = build(layout, "x", Some(&reference)).unwrap();
        assert_eq!(
            request.inline_parts().next().map(|(mime, _)| mime),
            Some(DEFAULT_IMAGE_MIME)
        );
    }

    #[test]
    fn test_malformed_reference() {
        let layout = &Layout::catalog()[0];
        let reference = ReferenceImage::from_data_url("image/png:AQID");
        assert!(matches!(
            build(layout, "x", Some(&reference)),
            Err(BannerError::MalformedReferenceImage(_))
        ));
    }
}
