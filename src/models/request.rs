use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::content::{Content, ContentPart, GenerateContentRequest, GenerationConfig, InlineData};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text { body: String },
    InlineBinary { mime_type: String, data: Vec<u8> },
}

/// Provider-neutral request: an ordered list of parts, rebuilt for every generation call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationRequest {
    pub parts: Vec<Part>,
}

impl GenerationRequest {
    pub fn new(parts: Vec<Part>) -> Self {
        Self { parts }
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|part| match part {
            Part::Text { body } => Some(body.as_str()),
            Part::InlineBinary { .. } => None,
        })
    }

    pub fn inline_parts(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.parts.iter().filter_map(|part| match part {
            Part::InlineBinary { mime_type, data } => Some((mime_type.as_str(), data.as_slice())),
            Part::Text { .. } => None,
        })
    }

    /// The `generateContent` body for this request.
    pub fn to_wire(&self) -> GenerateContentRequest {
        let parts = self
            .parts
            .iter()
            .map(|part| match part {
                Part::Text { body } => ContentPart {
                    text: Some(body.clone()),
                    inline_data: None,
                },
                Part::InlineBinary { mime_type, data } => ContentPart {
                    text: None,
                    inline_data: Some(InlineData {
                        mime_type: Some(mime_type.clone()),
                        data: STANDARD.encode(data),
                    }),
                },
            })
            .collect();

        GenerateContentRequest {
            contents: vec![Content { role: None, parts }],
            generation_config: GenerationConfig::default(),
        }
    }

    /// Short description for logs; never includes payload bytes.
    pub fn summary(&self) -> String {
        let inline: Vec<String> = self
            .inline_parts()
            .map(|(mime, data)| format!("{} ({} bytes)", mime, data.len()))
            .collect();
        format!(
            "{} text part(s), {} inline part(s){}",
            self.texts().count(),
            inline.len(),
            if inline.is_empty() {
                String::new()
            } else {
                format!(": {}", inline.join(", "))
            }
        )
    }
}
