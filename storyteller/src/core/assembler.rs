//! Story assembly from generated parts

use std::collections::BTreeMap;

use crate::config::AssemblyConfig;
use crate::error::AssemblyError;
use crate::types::{GenerationResult, Story};

/// Collects generated parts and stitches them together in part order
#[derive(Debug)]
pub struct StoryAssembler {
    expected_parts: usize,
    config: AssemblyConfig,
    parts: BTreeMap<usize, GenerationResult>,
}

impl StoryAssembler {
    pub fn new(expected_parts: usize, config: AssemblyConfig) -> Self {
        Self {
            expected_parts,
            config,
            parts: BTreeMap::new(),
        }
    }

    /// Add a generated part. Parts may arrive in any order; each index is
    /// accepted once and must have content.
    pub fn append(&mut self, result: GenerationResult) -> Result<(), AssemblyError> {
        let part_index = result.part_index;
        if part_index >= self.expected_parts {
            return Err(AssemblyError::PartOutOfRange {
                part_index,
                expected: self.expected_parts,
            });
        }
        if result.text.trim().is_empty() {
            return Err(AssemblyError::EmptySegment { part_index });
        }
        if self.parts.contains_key(&part_index) {
            return Err(AssemblyError::DuplicatePart { part_index });
        }
        self.parts.insert(part_index, result);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Produce the final story; fails unless every planned part is present
    pub fn finalize(self, title: &str) -> Result<Story, AssemblyError> {
        if self.parts.len() != self.expected_parts {
            return Err(AssemblyError::IncompleteStory {
                expected: self.expected_parts,
                actual: self.parts.len(),
            });
        }

        let total = self.expected_parts;
        let mut sections = Vec::with_capacity(total + 1);
        if self.config.include_title {
            sections.push(title.to_string());
        }
        for (index, part) in &self.parts {
            let label = self.config.render_label(index + 1, total);
            if label.is_empty() {
                sections.push(part.text.trim().to_string());
            } else {
                sections.push(format!("{}\n{}", label, part.text.trim()));
            }
        }

        Ok(Story {
            title: title.to_string(),
            full_text: sections.join(&self.config.separator),
            parts: self.parts.into_values().collect(),
        })
    }
}
