//! Narrative arc planning

use crate::error::PlanError;
use crate::types::{MAX_PARTS, MIN_PARTS, PartPlan, PartRole};

const COMPLETE_TEMPLATE: &str = "Write a complete, self-contained horror story titled \"{title}\". \
Establish the setting and characters, build dread steadily, deliver a frightening climax and end with a resolution \
that leaves a lingering chill.";

const OPENING_TEMPLATE: &str = "Write part {number} of {total} of a horror story titled \"{title}\". \
This is the opening: introduce the setting, the main characters and the first unsettling sign that something is wrong. \
Do not resolve anything yet; end on a note of unease.";

const RISING_TEMPLATE: &str = "Write part {number} of {total} of the horror story \"{title}\". \
Continue directly from the story so far. Escalate the tension: the disturbances grow harder to explain and the characters \
are drawn deeper in. Keep names, places and established facts consistent.";

const CLIMAX_TEMPLATE: &str = "Write part {number} of {total} of the horror story \"{title}\". \
This is the climax: the threat reveals itself fully and the characters face it directly. Make it the most intense part \
of the story while staying consistent with everything established so far.";

const RESOLUTION_TEMPLATE: &str = "Write part {number} of {total}, the final part, of the horror story \"{title}\". \
Bring the story to its ending: resolve the central threat or its consequences and close every open thread, \
leaving the reader with a final haunting image.";

/// Position of the climax as a fraction of the arc
const CLIMAX_POSITION: f64 = 0.75;

/// Derives a structural role and prompt scaffold for each part
pub struct PartPlanner;

impl PartPlanner {
    /// Plan `total_parts` parts
    ///
    /// One part gets the `Complete` role. Otherwise index 0 opens, the last
    /// index resolves, the index nearest 75% of the way through is the climax
    /// (only when there is a middle to place it in) and the rest rise.
    pub fn plan(total_parts: usize) -> Result<Vec<PartPlan>, PlanError> {
        if !(MIN_PARTS..=MAX_PARTS).contains(&total_parts) {
            return Err(PlanError::InvalidPartCount {
                requested: total_parts as i64,
                min: MIN_PARTS,
                max: MAX_PARTS,
            });
        }

        let climax = Self::climax_index(total_parts);

        Ok((0..total_parts)
            .map(|index| {
                let role = match index {
                    _ if total_parts == 1 => PartRole::Complete,
                    0 => PartRole::Opening,
                    i if i == total_parts - 1 => PartRole::Resolution,
                    i if Some(i) == climax => PartRole::Climax,
                    _ => PartRole::Rising,
                };
                PartPlan {
                    index,
                    total_parts,
                    role,
                    prompt_template: Self::template_for(role),
                }
            })
            .collect())
    }

    /// Climax index for stories with at least one middle part
    fn climax_index(total_parts: usize) -> Option<usize> {
        if total_parts < 3 {
            return None;
        }
        let position = ((total_parts - 1) as f64 * CLIMAX_POSITION).round() as usize;
        Some(position.clamp(1, total_parts - 2))
    }

    pub fn template_for(role: PartRole) -> &'static str {
        match role {
            PartRole::Complete => COMPLETE_TEMPLATE,
            PartRole::Opening => OPENING_TEMPLATE,
            PartRole::Rising => RISING_TEMPLATE,
            PartRole::Climax => CLIMAX_TEMPLATE,
            PartRole::Resolution => RESOLUTION_TEMPLATE,
        }
    }
}
